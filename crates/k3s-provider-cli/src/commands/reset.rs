//! Reset command
//!
//! Tears down the node's k3s installation by running the reset script that
//! ships with it, found under the cluster root when state was relocated.

use std::process::Command;

use clap::Args;
use tracing::info;

use k3s_provider_config::{reset, ResetAction};

use super::render::{parse_descriptor, read_descriptor, STDIN};
use crate::{Error, Result};

/// Shell the reset script runs under
const SHELL: &str = "/bin/sh";

#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Cluster descriptor file (YAML or JSON), or `-` for stdin
    #[arg(
        short = 'f',
        long = "descriptor",
        env = "K3S_PROVIDER_DESCRIPTOR",
        default_value = STDIN
    )]
    pub descriptor: String,

    /// Print the reset action instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: ResetArgs) -> Result<()> {
    let text = read_descriptor(&args.descriptor)?;
    let descriptor = parse_descriptor(&args.descriptor, &text)?;
    let action = reset(&descriptor);

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&action)?);
        return Ok(());
    }
    run_reset(&action)?;
    Ok(())
}

/// Run the reset script, returning its combined output.
pub fn run_reset(action: &ResetAction) -> Result<String> {
    info!(script = %action.script.display(), "resetting cluster");

    let output = Command::new(SHELL).arg(&action.script).output()?;
    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(Error::command_failed(format!(
            "{} failed: {}",
            action.script.display(),
            combined.trim_end()
        )));
    }

    info!("cluster reset complete");
    Ok(combined)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    use k3s_provider_config::plan::reset_action;

    fn install_script(root: &Path, body: &str) -> ResetAction {
        let action = reset_action(root.to_str());
        fs::create_dir_all(action.script.parent().unwrap()).unwrap();
        fs::write(&action.script, body).unwrap();
        action
    }

    // ==========================================================================
    // Story: the reset script lives under the cluster root
    // ==========================================================================

    #[test]
    fn story_reset_runs_script_under_relocated_root() {
        let root = tempfile::tempdir().unwrap();
        let action = install_script(root.path(), "echo reset done\n");

        assert!(action.script.starts_with(root.path()));
        assert!(action.script.ends_with("opt/k3s/scripts/kube-reset.sh"));
        assert_eq!(run_reset(&action).unwrap(), "reset done\n");
    }

    #[test]
    fn test_failing_script_reports_its_output() {
        let root = tempfile::tempdir().unwrap();
        let action = install_script(root.path(), "echo cannot stop k3s >&2\nexit 3\n");

        let err = run_reset(&action).unwrap_err();
        assert!(matches!(err, Error::CommandFailed { ref message } if message.contains("cannot stop k3s")));
    }

    #[test]
    fn test_missing_script_is_a_failure() {
        let root = tempfile::tempdir().unwrap();
        let action = reset_action(root.path().to_str());

        assert!(matches!(
            run_reset(&action).unwrap_err(),
            Error::CommandFailed { .. }
        ));
    }
}
