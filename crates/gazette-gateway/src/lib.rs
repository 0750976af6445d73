// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Gazette newsletter service.
//!
//! Exposes the polling API of [`gazette_jobs::JobService`] as JSON over
//! axum, plus unauthenticated `/health` and `/metrics` endpoints.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{router, start_server, GatewayState, HealthState, ServerConfig};
