//! CLI command definitions for the `tutorly` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod taxonomy;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use tutorly_infra::filesystem::DATA_DIR_ENV;

/// Tutoring chat backend.
#[derive(Parser)]
#[command(name = "tutorly", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Directory holding config.toml and the database.
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (overrides [server].port).
        #[arg(long, short)]
        port: Option<u16>,

        /// Host address to bind to (overrides [server].host).
        #[arg(long)]
        host: Option<String>,

        /// Do not run periodic subject seeding.
        #[arg(long)]
        no_seeding: bool,
    },

    /// Generate outlines for every subject that has no topics yet.
    Seed,

    /// List stored subjects with their topic counts.
    Subjects,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl Cli {
    /// Default log filter for the chosen verbosity. `RUST_LOG` overrides it.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn,tutorly=info,tower_http=info",
            1 => "info,tutorly=debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["tutorly", "serve", "--port", "9000", "--host", "0.0.0.0"])
            .unwrap();
        match cli.command {
            Commands::Serve {
                port,
                host,
                no_seeding,
            } => {
                assert_eq!(port, Some(9000));
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert!(!no_seeding);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_log_filter_by_verbosity() {
        let quiet = Cli::try_parse_from(["tutorly", "--quiet", "seed"]).unwrap();
        assert_eq!(quiet.log_filter(), "error");
        let debug = Cli::try_parse_from(["tutorly", "-vv", "seed"]).unwrap();
        assert_eq!(debug.log_filter(), "trace");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tutorly", "subjects", "--json", "--data-dir", "/tmp/t"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/t")));
    }
}
