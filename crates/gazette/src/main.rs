// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gazette - monthly tech newsletter generator.
//!
//! This is the binary entry point: the gateway server plus a couple of
//! client commands that talk to it.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod status;

use clap::{Parser, Subcommand};

use gazette_config::model::GazetteConfig;

/// Gazette - monthly tech newsletter generator.
#[derive(Parser, Debug)]
#[command(name = "gazette", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway and job workers.
    Serve,
    /// Show the progress of a run on the running gateway.
    Status {
        /// Job identifier returned when the run was started.
        job_id: String,
        /// Print the raw status report as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// List the configured newsletter topics.
    Topics,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match gazette_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            gazette_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Status { job_id, json, plain }) => {
            status::run_status(&config, &job_id, json, plain).await
        }
        Some(Commands::Topics) => {
            print!("{}", render_topics(&config));
            Ok(())
        }
        None => {
            println!("gazette: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("gazette: {e}");
        std::process::exit(1);
    }
}

/// One line per configured topic: icon, slug, label.
fn render_topics(config: &GazetteConfig) -> String {
    let width = config.topics.iter().map(|t| t.slug.len()).max().unwrap_or(0);
    config
        .topics
        .iter()
        .map(|t| format!("{} {:<width$}  {}\n", t.icon, t.slug, t.label))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the stats epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_status_flags() {
        let cli = Cli::try_parse_from(["gazette", "status", "abc123", "--json"]).unwrap();
        match cli.command {
            Some(Commands::Status { job_id, json, plain }) => {
                assert_eq!(job_id, "abc123");
                assert!(json);
                assert!(!plain);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn status_requires_job_id() {
        assert!(Cli::try_parse_from(["gazette", "status"]).is_err());
    }

    #[test]
    fn topics_are_listed_in_catalog_order() {
        let rendered = render_topics(&GazetteConfig::default());
        let slugs: Vec<&str> = rendered
            .lines()
            .filter_map(|l| l.split_whitespace().nth(1))
            .collect();
        assert_eq!(
            slugs,
            vec!["ai_at_work", "it_hacks", "o365_updates", "tech_discovery", "tech_trends"]
        );
        assert!(rendered.contains("IT Hacks"));
    }
}
