//! k3s agent (worker) option schema
//!
//! A strict subset of the server keys. Decoding a mixed document into this
//! shape is how control-plane-only options are kept off workers.

option_schema! {
    /// Options for worker nodes
    pub struct AgentOptions {
        /// Server to connect to
        server: Option<String> => "server",
        /// Token to use for authentication
        token: Option<String> => "token",
        /// Labels to register the kubelet with
        node_label: Option<Vec<String>> => "node-label",
        /// Taints to register the kubelet with
        node_taint: Option<Vec<String>> => "node-taint",
        /// Private registry configuration file
        private_registry: Option<String> => "private-registry",
        kubelet_arg: Option<Vec<String>> => "kubelet-arg",
        kube_proxy_arg: Option<Vec<String>> => "kube-proxy-arg",
        node_name: Option<String> => "node-name",
        no_flannel: Option<bool> => "no-flannel",
        debug: Option<bool> => "debug",
    }
}
