//! Role classification: computed defaults per node role

use tracing::debug;

use crate::descriptor::{ClusterDescriptor, Role};
use crate::schema::{AgentOptions, NodeOptions, ServerOptions, TriState};

/// Compute the default options for the descriptor's role.
///
/// | Role         | cluster-init | server                | tls-san  |
/// |--------------|--------------|-----------------------|----------|
/// | Initializer  | true         | -                     | `[host]` |
/// | ControlPlane | unset        | `https://{host}:6443` | `[host]` |
/// | Worker       | (no field)   | `https://{host}:6443` | (no field) |
///
/// The cluster token is copied into `token` for every role. A blank host
/// leaves `tls-san` unset.
pub fn defaults(descriptor: &ClusterDescriptor) -> NodeOptions {
    let token = non_empty(&descriptor.cluster_token);
    let host = &descriptor.control_plane_host;
    let tls_san = (!host.trim().is_empty()).then(|| vec![host.clone()]);

    let options = match descriptor.role {
        Role::Initializer => NodeOptions::Server(ServerOptions {
            cluster_init: TriState::Enabled,
            tls_san,
            token,
            ..Default::default()
        }),
        Role::ControlPlane => NodeOptions::Server(ServerOptions {
            server: Some(descriptor.join_address()),
            tls_san,
            token,
            ..Default::default()
        }),
        Role::Worker => NodeOptions::Agent(AgentOptions {
            server: Some(descriptor.join_address()),
            token,
            ..Default::default()
        }),
    };

    debug!(role = %descriptor.role, shape = options.shape(), "computed role defaults");
    options
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
