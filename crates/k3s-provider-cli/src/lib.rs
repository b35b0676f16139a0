//! k3s provider CLI library

pub mod commands;
pub mod error;

pub use error::{Error, Result};

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use k3s_provider_common::telemetry::{LogFormat, LoggingConfig};

/// k3s-provider - render k3s node configuration from a cluster descriptor
#[derive(Parser, Debug)]
#[command(name = "k3s-provider")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Also write every log event, as JSON, to this file
    #[arg(long, global = true, env = "K3S_PROVIDER_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Format of log events on stderr (text or json)
    #[arg(long, global = true, env = "K3S_PROVIDER_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render configuration fragments for this node
    Render(commands::render::RenderArgs),
    /// Tear down the k3s installation on this node
    Reset(commands::reset::ResetArgs),
}

impl Cli {
    /// Logging settings requested on the command line
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            format: self.log_format,
            log_file: self.log_file.clone(),
            ..Default::default()
        }
    }

    /// Run the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Render(args) => commands::render::run(args),
            Commands::Reset(args) => commands::reset::run(args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_arguments_parse() {
        let cli = Cli::try_parse_from([
            "k3s-provider",
            "--log-format",
            "json",
            "render",
            "-f",
            "descriptor.yaml",
            "--root",
            "/mnt/sysroot",
        ])
        .unwrap();

        assert_eq!(cli.log_format, LogFormat::Json);
        let Commands::Render(args) = cli.command else {
            panic!("Expected render command");
        };
        assert_eq!(args.descriptor, "descriptor.yaml");
        assert_eq!(args.root, Some(PathBuf::from("/mnt/sysroot")));
    }

    #[test]
    fn test_reset_arguments_parse() {
        let cli =
            Cli::try_parse_from(["k3s-provider", "reset", "-f", "node.yaml", "--dry-run"]).unwrap();

        let Commands::Reset(args) = cli.command else {
            panic!("Expected reset command");
        };
        assert_eq!(args.descriptor, "node.yaml");
        assert!(args.dry_run);
    }

    #[test]
    fn test_unknown_log_format_is_rejected() {
        assert!(Cli::try_parse_from(["k3s-provider", "--log-format", "xml", "render"]).is_err());
    }

    #[test]
    fn test_logging_config_keeps_default_filter() {
        let cli = Cli::try_parse_from(["k3s-provider", "render", "--log-file", "/tmp/k3s.log"])
            .unwrap();
        let config = cli.logging_config();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/k3s.log")));
        assert_eq!(config.default_filter, "info");
    }
}
