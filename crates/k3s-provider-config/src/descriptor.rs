//! Cluster descriptor supplied by the orchestrator
//!
//! The descriptor is the only input to a render. It is owned by the caller
//! and never mutated here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use k3s_provider_common::{Error, Result};

/// Port every k3s server listens on for joining nodes
pub const SUPERVISOR_PORT: u16 = 6443;

/// Role of this node in the cluster
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// First control-plane node; initializes the cluster
    #[serde(rename = "init")]
    Initializer,
    /// Control-plane node joining an existing cluster
    #[serde(rename = "controlplane")]
    ControlPlane,
    /// Compute-only node
    #[serde(rename = "worker")]
    Worker,
}

impl Role {
    /// Whether this role runs the k3s server
    pub fn is_server(self) -> bool {
        !matches!(self, Role::Worker)
    }

    /// Wire name of the role
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Initializer => "init",
            Role::ControlPlane => "controlplane",
            Role::Worker => "worker",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the orchestrator knows about the node being configured
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterDescriptor {
    /// Role of this node
    pub role: Role,

    /// Host of an existing control-plane node (required unless initializing)
    #[serde(default)]
    pub control_plane_host: String,

    /// Shared cluster secret
    #[serde(default)]
    pub cluster_token: String,

    /// Free-form YAML override document authored by the administrator
    #[serde(default)]
    pub options: String,

    /// Highest-precedence scalar overrides, restricted to
    /// [`crate::merge::PROVIDER_OPTION_KEYS`]
    #[serde(default)]
    pub provider_options: BTreeMap<String, String>,

    /// Process environment passed through (proxy variables, topology flags)
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Import container images shipped on the node before starting k3s
    #[serde(default)]
    pub import_local_images: bool,

    /// Directory holding the images to import
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_images_path: Option<String>,
}

impl ClusterDescriptor {
    /// Create a descriptor with the topology facts every role needs
    pub fn new(
        role: Role,
        control_plane_host: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            role,
            control_plane_host: control_plane_host.into(),
            cluster_token: token.into(),
            options: String::new(),
            provider_options: BTreeMap::new(),
            env: BTreeMap::new(),
            import_local_images: false,
            local_images_path: None,
        }
    }

    /// Set the raw override document
    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = options.into();
        self
    }

    /// Add a provider option
    pub fn with_provider_option(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.provider_options.insert(key.into(), value.into());
        self
    }

    /// Add an environment variable
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Address new nodes use to join the cluster
    pub fn join_address(&self) -> String {
        format!("https://{}:{}", self.control_plane_host, SUPERVISOR_PORT)
    }

    /// Check the facts this role cannot do without
    pub fn validate(&self) -> Result<()> {
        let joins = matches!(self.role, Role::ControlPlane | Role::Worker);
        if joins && self.control_plane_host.trim().is_empty() {
            return Err(Error::descriptor_field(
                "control_plane_host",
                format!("required for {} nodes", self.role),
            ));
        }
        Ok(())
    }
}

/// Non-empty value of `key` in a descriptor environment. Empty means unset.
pub fn env_value<'a>(env: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    env.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_use_orchestrator_names() {
        let role: Role = serde_json::from_str(r#""controlplane""#).unwrap();
        assert_eq!(role, Role::ControlPlane);
        assert_eq!(Role::Initializer.to_string(), "init");
        assert_eq!(serde_json::to_string(&Role::Worker).unwrap(), r#""worker""#);
        assert!(serde_json::from_str::<Role>(r#""master""#).is_err());
    }

    #[test]
    fn test_descriptor_defaults_optional_fields() {
        let descriptor: ClusterDescriptor =
            serde_json::from_str(r#"{"role":"worker","control_plane_host":"10.0.0.1"}"#).unwrap();
        assert!(descriptor.options.is_empty());
        assert!(descriptor.provider_options.is_empty());
        assert!(!descriptor.import_local_images);
        assert_eq!(descriptor.local_images_path, None);
    }

    #[test]
    fn test_join_address_uses_supervisor_port() {
        let descriptor = ClusterDescriptor::new(Role::Worker, "cp.example.com", "t");
        assert_eq!(descriptor.join_address(), "https://cp.example.com:6443");
    }

    #[test]
    fn test_joining_roles_need_a_control_plane_host() {
        for role in [Role::ControlPlane, Role::Worker] {
            let err = ClusterDescriptor::new(role, "  ", "t").validate().unwrap_err();
            assert!(err.to_string().contains(role.as_str()));
        }
        assert!(ClusterDescriptor::new(Role::Initializer, "", "t")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_empty_env_values_are_unset() {
        let descriptor = ClusterDescriptor::new(Role::Worker, "h", "t")
            .with_env("HTTP_PROXY", "")
            .with_env("HTTPS_PROXY", "http://proxy:3128");
        assert_eq!(env_value(&descriptor.env, "HTTP_PROXY"), None);
        assert_eq!(
            env_value(&descriptor.env, "HTTPS_PROXY"),
            Some("http://proxy:3128")
        );
        assert_eq!(env_value(&descriptor.env, "NO_PROXY"), None);
    }
}
