//! Merge of role defaults and administrator provider options
//!
//! Precedence, lowest first:
//! 1. computed role defaults
//! 2. provider options
//!
//! The user override document never takes part in this merge. It is decoded
//! on its own and written as a separate, lower-priority fragment that the
//! consumer flattens underneath this one.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use k3s_provider_common::Result;

use crate::schema::NodeOptions;

/// Provider option: initialize embedded etcd (`no` disables it)
pub const CLUSTER_INIT: &str = "cluster-init";
/// Provider option: root directory k3s data and configuration live under
pub const CLUSTER_ROOT_PATH: &str = "cluster-root-path";

/// Provider option keys an administrator may set
pub const PROVIDER_OPTION_KEYS: &[&str] = &[
    CLUSTER_INIT,
    "datastore-endpoint",
    "datastore-cafile",
    "datastore-certfile",
    "datastore-keyfile",
    "bind-address",
    CLUSTER_ROOT_PATH,
];

/// Whether `key` is an accepted provider option
pub fn is_provider_option(key: &str) -> bool {
    PROVIDER_OPTION_KEYS.contains(&key)
}

/// Overlay provider options onto `options` in place.
///
/// Only allow-listed keys are considered. A present key replaces the default
/// entirely; absent keys keep it. Keys the role shape does not carry (for
/// example datastore settings on a worker) are skipped.
///
/// `cluster-init` set to a false spelling such as `no` lands as an explicit
/// false and is rendered as `"cluster-init":false`.
pub fn apply_provider_options(
    options: &mut NodeOptions,
    provider_options: &BTreeMap<String, String>,
) -> Result<()> {
    if provider_options.is_empty() {
        return Ok(());
    }

    let keys: Vec<&str> = provider_options.keys().map(String::as_str).collect();
    info!(keys = ?keys, "applying cluster provider options");

    for (key, value) in provider_options {
        if !is_provider_option(key) {
            warn!(key = %key, "ignoring unrecognized provider option");
            continue;
        }
        if !options.set(key, Value::String(value.clone()))? {
            debug!(key = %key, shape = options.shape(), "provider option not part of role shape");
        }
    }
    Ok(())
}

/// Produce the merged document: defaults with provider options on top.
pub fn merge(
    mut defaults: NodeOptions,
    provider_options: &BTreeMap<String, String>,
) -> Result<String> {
    apply_provider_options(&mut defaults, provider_options)?;
    defaults.to_json()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ClusterDescriptor, Role};
    use crate::role;
    use crate::schema::TriState;

    fn options(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn defaults_for(role: Role) -> NodeOptions {
        role::defaults(&ClusterDescriptor::new(role, "localhost", "token"))
    }

    // ==========================================================================
    // Story: two-node clusters swap etcd for an external datastore
    // ==========================================================================

    #[test]
    fn story_disabled_cluster_init_is_rendered_explicitly() {
        let merged = merge(
            defaults_for(Role::Initializer),
            &options(&[
                ("cluster-init", "no"),
                ("datastore-endpoint", "localhost:2379"),
            ]),
        )
        .unwrap();

        assert_eq!(
            merged,
            r#"{"tls-san":["localhost"],"token":"token","cluster-init":false,"datastore-endpoint":"localhost:2379"}"#
        );
    }

    #[test]
    fn test_cluster_init_can_be_forced_on_a_joining_server() {
        let mut opts = defaults_for(Role::ControlPlane);
        apply_provider_options(&mut opts, &options(&[("cluster-init", "yes")])).unwrap();
        assert_eq!(opts.as_server().unwrap().cluster_init, TriState::Enabled);
    }

    // ==========================================================================
    // Story: provider options win over computed defaults
    // ==========================================================================

    #[test]
    fn test_provider_options_override_defaults() {
        let mut opts = defaults_for(Role::ControlPlane);
        apply_provider_options(&mut opts, &options(&[("bind-address", "10.0.0.5")])).unwrap();

        let server = opts.as_server().unwrap();
        assert_eq!(server.bind_address.as_deref(), Some("10.0.0.5"));
        assert_eq!(server.server.as_deref(), Some("https://localhost:6443"));
    }

    #[test]
    fn test_empty_provider_options_keep_defaults() {
        let defaults = defaults_for(Role::ControlPlane);
        let expected = defaults.to_json().unwrap();
        assert_eq!(merge(defaults, &BTreeMap::new()).unwrap(), expected);
    }

    #[test]
    fn test_unlisted_keys_are_ignored() {
        let merged = merge(
            defaults_for(Role::Initializer),
            &options(&[("tls-san", "evil.example.com"), ("token", "other")]),
        )
        .unwrap();

        assert_eq!(
            merged,
            r#"{"tls-san":["localhost"],"token":"token","cluster-init":true}"#
        );
    }

    #[test]
    fn test_cluster_root_path_is_not_a_k3s_option() {
        let merged = merge(
            defaults_for(Role::Initializer),
            &options(&[("cluster-root-path", "/persistent")]),
        )
        .unwrap();
        assert!(!merged.contains("cluster-root-path"));
    }

    // ==========================================================================
    // Story: workers never pick up control-plane keys
    // ==========================================================================

    #[test]
    fn test_worker_drops_control_plane_provider_options() {
        let merged = merge(
            defaults_for(Role::Worker),
            &options(&[
                ("cluster-init", "no"),
                ("datastore-endpoint", "localhost:2379"),
                ("bind-address", "0.0.0.0"),
            ]),
        )
        .unwrap();

        assert_eq!(merged, r#"{"server":"https://localhost:6443","token":"token"}"#);
    }

    #[test]
    fn test_bad_cluster_init_value_is_fatal() {
        let err = merge(
            defaults_for(Role::Initializer),
            &options(&[("cluster-init", "sometimes")]),
        )
        .unwrap_err();
        assert_eq!(err.key(), Some("cluster-init"));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let provider = options(&[("cluster-init", "no"), ("datastore-endpoint", "x")]);
        let first = merge(defaults_for(Role::Initializer), &provider).unwrap();
        let second = merge(defaults_for(Role::Initializer), &provider).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
    }
}
