//! k3s provider CLI
//!
//! Renders k3s node configuration fragments from a cluster descriptor, or
//! resets the node's k3s installation.

use clap::Parser;
use tracing::{error, info_span};

use k3s_provider_cli::{Cli, Result};
use k3s_provider_common::telemetry::init_logging;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Held until exit so the file writer flushes.
    let _log_guard = init_logging(cli.logging_config())?;
    let _span = info_span!("k3s-provider", version = env!("CARGO_PKG_VERSION")).entered();

    let result = cli.run();
    if let Err(ref e) = result {
        error!(error = %e, "command failed");
    }
    result
}
