//! Fragment plan: the files, service and boot-time actions a render produces
//!
//! The plan is pure data. Writing it to disk (or printing it) is the
//! caller's job.

use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

use crate::descriptor::Role;

/// Directory k3s reads configuration fragments from
pub const CONFIG_FRAGMENT_DIR: &str = "/etc/rancher/k3s/config.d";
/// Fragment holding the administrator's override document
pub const USER_FRAGMENT: &str = "90_userdata.yaml";
/// Fragment holding the merged defaults and provider options
pub const MERGED_FRAGMENT: &str = "99_userdata.yaml";
/// Directory the service environment files live in
pub const ENV_FILE_DIR: &str = "/etc/default";
/// Mode of every rendered file
pub const FRAGMENT_PERMISSIONS: u32 = 0o400;
/// Images imported when no path is given
pub const DEFAULT_LOCAL_IMAGES_PATH: &str = "/opt/content/images";
/// Script that imports the shipped images
pub const IMPORT_SCRIPT: &str = "/opt/k3s/scripts/import.sh";
/// Script that tears down the node's k3s installation
pub const RESET_SCRIPT: &str = "/opt/k3s/scripts/kube-reset.sh";

/// Service the node runs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ServiceName {
    /// k3s server (initializer and control-plane nodes)
    #[serde(rename = "k3s")]
    Server,
    /// k3s agent (worker nodes)
    #[serde(rename = "k3s-agent")]
    Agent,
}

impl ServiceName {
    /// Service for the given role
    pub fn for_role(role: Role) -> Self {
        if role.is_server() {
            ServiceName::Server
        } else {
            ServiceName::Agent
        }
    }

    /// Unit name of the service
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceName::Server => "k3s",
            ServiceName::Agent => "k3s-agent",
        }
    }
}

impl std::fmt::Display for ServiceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file to place on the node
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfigFile {
    /// Absolute path on the node
    pub path: PathBuf,
    /// Unix mode bits, rendered in octal ("0400")
    #[serde(serialize_with = "octal_mode")]
    pub permissions: u32,
    /// File body
    pub content: String,
}

impl ConfigFile {
    fn fragment(path: impl Into<PathBuf>, content: String) -> Self {
        Self {
            path: path.into(),
            permissions: FRAGMENT_PERMISSIONS,
            content,
        }
    }
}

fn octal_mode<S: Serializer>(mode: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{mode:04o}"))
}

/// Bind mount relocating k3s state under the cluster root path
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RootMount {
    /// Mount unit name
    pub name: String,
    /// Directory under the cluster root
    pub source: PathBuf,
    /// Path k3s expects
    pub target: PathBuf,
}

/// Request to import container images shipped with the node
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImageImport {
    /// Import script to run
    pub script: PathBuf,
    /// Directory holding the images
    pub images_path: PathBuf,
}

/// Cluster teardown: the reset script to run on the node
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResetAction {
    /// Reset script, under the cluster root when one is set
    pub script: PathBuf,
}

/// Resolve the reset script for a node whose state may live under
/// `cluster_root_path`.
pub fn reset_action(cluster_root_path: Option<&str>) -> ResetAction {
    ResetAction {
        script: under_root(effective_root(cluster_root_path), RESET_SCRIPT),
    }
}

/// Everything one render asks the node to do
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Service to enable and restart
    pub service: ServiceName,
    /// Mounts to set up before the files are written
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mounts: Vec<RootMount>,
    /// Files to write
    pub files: Vec<ConfigFile>,
    /// Image import to run before the service starts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_import: Option<ImageImport>,
}

/// Inputs to [`build`]
#[derive(Clone, Debug)]
pub struct PlanInputs<'a> {
    /// Node role
    pub role: Role,
    /// Override document fragment
    pub user_options: &'a str,
    /// Merged fragment
    pub merged_options: &'a str,
    /// Proxy environment-file body (may be empty)
    pub proxy_env: &'a str,
    /// Root directory k3s state lives under, if relocated
    pub cluster_root_path: Option<&'a str>,
    /// Whether to import shipped images
    pub import_local_images: bool,
    /// Where the shipped images are
    pub local_images_path: Option<&'a str>,
}

/// Assemble the plan.
///
/// Files are ordered user fragment, merged fragment, then the proxy
/// environment file when there is one.
pub fn build(inputs: &PlanInputs<'_>) -> Plan {
    let service = ServiceName::for_role(inputs.role);
    let root = effective_root(inputs.cluster_root_path);
    let config_dir = Path::new(CONFIG_FRAGMENT_DIR);

    let mut files = vec![
        ConfigFile::fragment(
            config_dir.join(USER_FRAGMENT),
            inputs.user_options.to_string(),
        ),
        ConfigFile::fragment(
            config_dir.join(MERGED_FRAGMENT),
            inputs.merged_options.to_string(),
        ),
    ];
    if !inputs.proxy_env.is_empty() {
        files.push(ConfigFile::fragment(
            Path::new(ENV_FILE_DIR).join(service.as_str()),
            inputs.proxy_env.to_string(),
        ));
    }

    let mounts = root.map(root_mounts).unwrap_or_default();

    let image_import = inputs.import_local_images.then(|| {
        let images = inputs
            .local_images_path
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_LOCAL_IMAGES_PATH);
        ImageImport {
            script: under_root(root, IMPORT_SCRIPT),
            images_path: under_root(root, images),
        }
    });

    Plan {
        service,
        mounts,
        files,
        image_import,
    }
}

/// Cluster root, unless unset, empty or `/`
fn effective_root(root: Option<&str>) -> Option<&str> {
    root.filter(|r| !r.is_empty() && *r != "/")
}

fn under_root(root: Option<&str>, path: &str) -> PathBuf {
    match root {
        Some(root) => Path::new(root).join(path.trim_start_matches('/')),
        None => PathBuf::from(path),
    }
}

fn root_mounts(root: &str) -> Vec<RootMount> {
    [
        ("etc-rancher", "/etc/rancher"),
        ("var-lib-rancher", "/var/lib/rancher"),
    ]
    .into_iter()
    .map(|(name, target)| RootMount {
        name: name.to_string(),
        source: under_root(Some(root), target),
        target: PathBuf::from(target),
    })
    .collect()
}
