// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `gazette serve` command implementation.
//!
//! Wires the command pipeline, SMTP mailer, duration cache and job registry
//! into a [`JobService`], optionally reaps settled jobs, and serves the
//! gateway until SIGINT or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use gazette_config::model::GazetteConfig;
use gazette_core::{GazetteError, HealthStatus, MailerAdapter, PipelineAdapter, PluginAdapter};
use gazette_email::SmtpMailer;
use gazette_gateway::{AuthConfig, GatewayState, HealthState, ServerConfig};
use gazette_jobs::{JobRegistry, JobService, RuntimeCache};
use gazette_pipeline::CommandPipeline;

/// Runs the `gazette serve` command.
pub async fn run_serve(config: GazetteConfig) -> Result<(), GazetteError> {
    init_tracing(&config.server.log_level);

    #[cfg(feature = "prometheus")]
    let prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>> = {
        let adapter = gazette_prometheus::PrometheusAdapter::new()?;
        Some(Arc::new(move || adapter.render()))
    };
    #[cfg(not(feature = "prometheus"))]
    let prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>> = None;

    let pipeline = Arc::new(CommandPipeline::from_config(&config));
    let mailer = Arc::new(SmtpMailer::new(&config.email));
    log_health(&*pipeline).await;
    log_health(&*mailer).await;

    let registry = Arc::new(JobRegistry::with_system_clock());
    let cache = Arc::new(RuntimeCache::from_config(&config.runtime));
    let pipeline: Arc<dyn PipelineAdapter> = pipeline;
    let mailer: Arc<dyn MailerAdapter> = mailer;
    let service = Arc::new(JobService::new(
        &config,
        registry.clone(),
        cache,
        pipeline,
        mailer,
    ));

    let cancel = install_signal_handler();

    if let Some(retention_secs) = config.jobs.retention_secs {
        spawn_reaper(
            registry,
            Duration::from_secs(retention_secs),
            Duration::from_secs(config.jobs.reap_interval_secs.max(1)),
            cancel.clone(),
        );
    }

    let state = GatewayState {
        service,
        auth: AuthConfig {
            bearer_token: config.server.bearer_token.clone(),
        },
        health: HealthState {
            start_time: std::time::Instant::now(),
            prometheus_render,
        },
    };
    let server = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };

    info!(
        topics = config.topics.len(),
        auth = config.server.bearer_token.is_some(),
        "gazette serve starting"
    );
    gazette_gateway::start_server(&server, state, cancel.cancelled_owned()).await?;
    info!("gazette serve shutdown complete");
    Ok(())
}

async fn log_health(adapter: &dyn PluginAdapter) {
    match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => debug!(adapter = adapter.name(), "adapter healthy"),
        Ok(HealthStatus::Degraded(reason)) | Ok(HealthStatus::Unhealthy(reason)) => {
            warn!(adapter = adapter.name(), %reason, "adapter not fully operational")
        }
        Err(e) => warn!(adapter = adapter.name(), error = %e, "adapter health check failed"),
    }
}

/// Periodically evict settled jobs older than `retention`.
fn spawn_reaper(
    registry: Arc<JobRegistry>,
    retention: Duration,
    interval: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let evicted = registry.reap(retention);
                    debug!(evicted = evicted.len(), remaining = registry.len(), "reaper pass");
                }
            }
        }
        debug!("reaper stopped");
    })
}

/// Cancel the returned token on SIGINT or (on unix) SIGTERM.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                        _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler, Ctrl+C only");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
    });

    token
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gazette={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazette_jobs::ManualClock;

    #[tokio::test]
    async fn reaper_evicts_settled_jobs_until_cancelled() {
        let clock = Arc::new(ManualClock::default());
        let registry = Arc::new(JobRegistry::new(clock.clone()));
        let id = registry.create(vec!["it_hacks".into()]).unwrap();
        registry
            .update(&id, |job| job.terminal_error = Some("boom".to_string()))
            .unwrap();
        clock.advance_secs(120);

        let cancel = CancellationToken::new();
        let handle = spawn_reaper(
            registry.clone(),
            Duration::from_secs(60),
            Duration::from_millis(10),
            cancel.clone(),
        );

        for _ in 0..100 {
            if registry.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!registry.contains(&id));

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn signal_handler_returns_live_token() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        token.cancel();
    }
}
