//! Render pipeline: descriptor in, rendered documents out
//!
//! The steps run in a fixed order and any failure aborts the render. No
//! partial result is ever returned.

use tracing::{debug, info, info_span};

use k3s_provider_common::yaml::parse_yaml_mapping;
use k3s_provider_common::{Error, Result};

use crate::descriptor::{ClusterDescriptor, Role};
use crate::merge::{self, CLUSTER_ROOT_PATH};
use crate::network::InterfaceSource;
use crate::normalize::normalize;
use crate::plan::{self, Plan, PlanInputs, ResetAction};
use crate::proxy::proxy_environment;
use crate::role;
use crate::schema::NodeOptions;

/// The three rendered artifacts plus what the plan needs to place them
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedConfig {
    /// Role the documents were rendered for
    pub role: Role,
    /// Role defaults with provider options applied (JSON)
    pub merged_options: String,
    /// Administrator's override document in the role's shape (JSON)
    pub user_options: String,
    /// Proxy environment-file body; empty when no proxy is configured
    pub proxy_env: String,
    /// Keys of the override document the role shape does not carry
    pub dropped_keys: Vec<String>,
    cluster_root_path: Option<String>,
    import_local_images: bool,
    local_images_path: Option<String>,
}

impl RenderedConfig {
    /// Fragment plan for these documents
    pub fn plan(&self) -> Plan {
        plan::build(&PlanInputs {
            role: self.role,
            user_options: &self.user_options,
            merged_options: &self.merged_options,
            proxy_env: &self.proxy_env,
            cluster_root_path: self.cluster_root_path.as_deref(),
            import_local_images: self.import_local_images,
            local_images_path: self.local_images_path.as_deref(),
        })
    }
}

/// Render every artifact for `descriptor`.
///
/// Order: validate, parse the override document once, decode it into the
/// role shape, compute role defaults, apply provider options, derive the
/// proxy environment.
pub fn render(
    descriptor: &ClusterDescriptor,
    interfaces: &dyn InterfaceSource,
) -> Result<RenderedConfig> {
    let _span = info_span!("render", role = %descriptor.role).entered();

    descriptor.validate()?;
    info!(
        provider_options = descriptor.provider_options.len(),
        "rendering node configuration"
    );

    let raw = parse_yaml_mapping(&descriptor.options)
        .map_err(|e| Error::override_document(descriptor.role.as_str(), e.to_string()))?;

    let (user, dropped_keys) = NodeOptions::from_document(descriptor.role, &normalize(&raw))?;
    if !dropped_keys.is_empty() {
        debug!(
            keys = ?dropped_keys,
            shape = user.shape(),
            "dropped override keys the role does not support"
        );
    }
    let user_options = user.to_json()?;

    let merged_options = merge::merge(role::defaults(descriptor), &descriptor.provider_options)?;
    let proxy_env = proxy_environment(&raw, &descriptor.env, interfaces)?;

    Ok(RenderedConfig {
        role: descriptor.role,
        merged_options,
        user_options,
        proxy_env,
        dropped_keys,
        cluster_root_path: descriptor.provider_options.get(CLUSTER_ROOT_PATH).cloned(),
        import_local_images: descriptor.import_local_images,
        local_images_path: descriptor.local_images_path.clone(),
    })
}

/// Resolve the cluster reset for `descriptor`.
///
/// Only the cluster root path matters here, so a descriptor that would not
/// render (a joining node without a host, say) can still be reset.
pub fn reset(descriptor: &ClusterDescriptor) -> ResetAction {
    let action = plan::reset_action(
        descriptor
            .provider_options
            .get(CLUSTER_ROOT_PATH)
            .map(String::as_str),
    );
    info!(
        role = %descriptor.role,
        script = %action.script.display(),
        "resolved cluster reset"
    );
    action
}
