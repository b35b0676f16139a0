//! Render command
//!
//! Reads a cluster descriptor, renders the node configuration and either
//! prints the plan as JSON or writes its files under a root directory.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{debug, info};

use k3s_provider_common::yaml::parse_yaml;
use k3s_provider_config::{render, ClusterDescriptor, ConfigFile, Plan, SystemInterfaces};

use crate::{Error, Result};

/// Descriptor argument meaning "read from stdin"
pub(crate) const STDIN: &str = "-";

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Cluster descriptor file (YAML or JSON), or `-` for stdin
    #[arg(
        short = 'f',
        long = "descriptor",
        env = "K3S_PROVIDER_DESCRIPTOR",
        default_value = STDIN
    )]
    pub descriptor: String,

    /// Write the files under this root instead of printing the plan
    #[arg(long, env = "K3S_PROVIDER_ROOT")]
    pub root: Option<PathBuf>,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let text = read_descriptor(&args.descriptor)?;
    let descriptor = parse_descriptor(&args.descriptor, &text)?;

    let rendered = render(&descriptor, &SystemInterfaces)?;
    let plan = rendered.plan();

    match args.root {
        Some(root) => write_plan(&plan, &root),
        None => {
            println!("{}", serde_json::to_string_pretty(&plan)?);
            Ok(())
        }
    }
}

/// Read the descriptor text from a file, or stdin for `-`.
pub(crate) fn read_descriptor(source: &str) -> Result<String> {
    if source == STDIN {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        fs::read_to_string(source)
            .map_err(|e| Error::invalid_descriptor(source, format!("cannot read: {e}")))
    }
}

/// Parse a descriptor written in YAML or JSON.
pub fn parse_descriptor(source: &str, text: &str) -> Result<ClusterDescriptor> {
    let value = parse_yaml(text).map_err(|e| Error::invalid_descriptor(source, e.to_string()))?;
    if value.is_null() {
        return Err(Error::invalid_descriptor(source, "document is empty"));
    }
    serde_json::from_value(value).map_err(|e| Error::invalid_descriptor(source, e.to_string()))
}

/// Write every planned file under `root`, replacing earlier renders.
pub fn write_plan(plan: &Plan, root: &Path) -> Result<()> {
    for file in &plan.files {
        let target = write_file(root, file)?;
        debug!(path = %target.display(), "wrote configuration file");
    }

    for mount in &plan.mounts {
        info!(
            name = %mount.name,
            source = %mount.source.display(),
            target = %mount.target.display(),
            "state directory relocated"
        );
    }
    if let Some(import) = &plan.image_import {
        info!(
            script = %import.script.display(),
            images = %import.images_path.display(),
            "local image import requested"
        );
    }

    info!(
        service = %plan.service,
        files = plan.files.len(),
        root = %root.display(),
        "configuration written"
    );
    Ok(())
}

fn write_file(root: &Path, file: &ConfigFile) -> Result<PathBuf> {
    let relative = file.path.strip_prefix("/").unwrap_or(&file.path);
    let target = root.join(relative);

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::write_failed(parent, e.to_string()))?;
    }
    // Earlier renders leave read-only files behind.
    if target.exists() {
        fs::remove_file(&target).map_err(|e| Error::write_failed(&target, e.to_string()))?;
    }
    fs::write(&target, &file.content).map_err(|e| Error::write_failed(&target, e.to_string()))?;
    set_mode(&target, file.permissions)?;
    Ok(target)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| Error::write_failed(path, e.to_string()))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use k3s_provider_config::{InterfaceAddr, InterfaceSource, Role};

    struct NoInterfaces;

    impl InterfaceSource for NoInterfaces {
        fn interface_addrs(&self) -> std::io::Result<Vec<InterfaceAddr>> {
            Ok(Vec::new())
        }
    }

    fn worker_plan() -> Plan {
        let descriptor = ClusterDescriptor::new(Role::Worker, "10.0.0.1", "token")
            .with_options("node-name: edge-1\n")
            .with_env("HTTP_PROXY", "http://proxy:3128");
        render(&descriptor, &NoInterfaces).unwrap().plan()
    }

    // ==========================================================================
    // Story: descriptors come in as YAML or JSON
    // ==========================================================================

    #[test]
    fn test_parse_yaml_descriptor() {
        let descriptor = parse_descriptor(
            "descriptor.yaml",
            "role: worker\ncontrol_plane_host: 10.0.0.1\ncluster_token: t\n",
        )
        .unwrap();
        assert_eq!(descriptor.role, Role::Worker);
        assert_eq!(descriptor.control_plane_host, "10.0.0.1");
    }

    #[test]
    fn test_parse_json_descriptor() {
        let descriptor = parse_descriptor(
            "-",
            r#"{"role":"init","cluster_token":"t","provider_options":{"cluster-init":"no"}}"#,
        )
        .unwrap();
        assert_eq!(descriptor.role, Role::Initializer);
        assert_eq!(descriptor.provider_options["cluster-init"], "no");
    }

    #[test]
    fn test_empty_descriptor_is_rejected() {
        let err = parse_descriptor("-", "").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_unknown_role_names_the_source() {
        let err = parse_descriptor("node.yaml", "role: master\n").unwrap_err();
        assert!(matches!(err, Error::InvalidDescriptor { ref source_name, .. } if source_name == "node.yaml"));
    }

    // ==========================================================================
    // Story: the plan is written under a root directory
    // ==========================================================================

    #[test]
    fn story_plan_files_land_under_root() {
        let root = tempfile::tempdir().unwrap();
        let plan = worker_plan();

        write_plan(&plan, root.path()).unwrap();

        let merged =
            fs::read_to_string(root.path().join("etc/rancher/k3s/config.d/99_userdata.yaml"))
                .unwrap();
        assert_eq!(merged, r#"{"server":"https://10.0.0.1:6443","token":"token"}"#);

        let user =
            fs::read_to_string(root.path().join("etc/rancher/k3s/config.d/90_userdata.yaml"))
                .unwrap();
        assert_eq!(user, r#"{"node-name":"edge-1"}"#);

        let env = fs::read_to_string(root.path().join("etc/default/k3s-agent")).unwrap();
        assert!(env.starts_with("HTTP_PROXY=http://proxy:3128\n"));
    }

    #[cfg(unix)]
    #[test]
    fn test_written_files_are_read_only() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir().unwrap();
        write_plan(&worker_plan(), root.path()).unwrap();

        let meta = fs::metadata(root.path().join("etc/default/k3s-agent")).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o400);
    }

    #[test]
    fn test_rewriting_replaces_previous_render() {
        let root = tempfile::tempdir().unwrap();
        write_plan(&worker_plan(), root.path()).unwrap();
        write_plan(&worker_plan(), root.path()).unwrap();

        let user =
            fs::read_to_string(root.path().join("etc/rancher/k3s/config.d/90_userdata.yaml"))
                .unwrap();
        assert_eq!(user, r#"{"node-name":"edge-1"}"#);
    }
}
