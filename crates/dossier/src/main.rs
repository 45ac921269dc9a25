// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dossier - a retrieval-augmented chat backend that answers questions
//! about one person.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod check;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Dossier - answers questions about one person from a curated Q&A base.
#[derive(Parser, Debug)]
#[command(name = "dossier", version, about, long_about = None)]
struct Cli {
    /// Explicit config file, layered over the default search path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Start the HTTP server (default).
    Serve,
    /// Validate the configuration and knowledge base, then exit.
    Check,
    /// Print the effective configuration with secrets redacted.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = dossier_config::load_or_fallback(config_path);
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("dossier: {e}");
                std::process::exit(1);
            }
        }
        Commands::Check => {
            let config = match dossier_config::load_and_validate(config_path) {
                Ok(config) => config,
                Err(errors) => {
                    dossier_config::render_errors(&errors);
                    std::process::exit(1);
                }
            };
            match check::run_check(&config) {
                Ok(report) => println!("{report}"),
                Err(e) => {
                    eprintln!("dossier check: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Config => {
            let config = dossier_config::load_or_fallback(config_path);
            match toml::to_string_pretty(&config.redacted()) {
                Ok(rendered) => print!("{rendered}"),
                Err(e) => {
                    eprintln!("dossier config: failed to render configuration: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = dossier_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["dossier"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["dossier", "check", "--config", "alt.toml"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Check));
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
    }

    #[test]
    fn redacted_config_renders_as_toml() {
        let mut config = dossier_config::load_and_validate_str("").unwrap();
        config.llm.api_key = Some("sk-secret".to_string());
        config.gateway.bearer_token = Some("tok-secret".to_string());
        let rendered = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(!rendered.contains("sk-secret"));
        assert!(!rendered.contains("tok-secret"));
        assert!(rendered.contains("[llm]"));
    }
}
