//! k3s server (control-plane) option schema
//!
//! Field order matches the k3s server flag listing and is the order keys
//! appear in rendered JSON.

use super::TriState;

option_schema! {
    /// Options for initializer and control-plane nodes
    pub struct ServerOptions {
        // Logging and process
        config_file: Option<String> => "config",
        debug: Option<bool> => "debug",
        v: Option<i64> => "v",
        vmodule: Option<String> => "vmodule",
        log: Option<String> => "log",
        alsologtostderr: Option<bool> => "alsologtostderr",

        // Listener
        /// Address the supervisor and API server bind to
        bind_address: Option<String> => "bind-address",
        https_listen_port: Option<i64> => "https-listen-port",
        supervisor_port: Option<i64> => "supervisor-port",
        apiserver_port: Option<i64> => "apiserver-port",
        apiserver_bind_address: Option<String> => "apiserver-bind-address",
        advertise_address: Option<String> => "advertise-address",
        advertise_port: Option<i64> => "advertise-port",
        /// Extra subject alternative names for the serving certificate
        tls_san: Option<Vec<String>> => "tls-san",
        tls_san_security: Option<bool> => "tls-san-security",

        // Data
        data_dir: Option<String> => "data-dir",

        // Networking
        cluster_cidr: Option<Vec<String>> => "cluster-cidr",
        service_cidr: Option<Vec<String>> => "service-cidr",
        service_node_port_range: Option<String> => "service-node-port-range",
        cluster_dns: Option<Vec<String>> => "cluster-dns",
        cluster_domain: Option<String> => "cluster-domain",
        flannel_backend: Option<String> => "flannel-backend",
        flannel_ipv6_masq: Option<bool> => "flannel-ipv6-masq",
        flannel_external_ip: Option<bool> => "flannel-external-ip",
        egress_selector_mode: Option<String> => "egress-selector-mode",
        servicelb_namespace: Option<String> => "servicelb-namespace",

        // Client
        write_kubeconfig: Option<String> => "write-kubeconfig",
        write_kubeconfig_mode: Option<String> => "write-kubeconfig-mode",
        write_kubeconfig_group: Option<String> => "write-kubeconfig-group",
        helm_job_image: Option<String> => "helm-job-image",

        // Cluster
        /// Shared secret used to join the cluster
        token: Option<String> => "token",
        token_file: Option<String> => "token-file",
        agent_token: Option<String> => "agent-token",
        agent_token_file: Option<String> => "agent-token-file",
        /// Join address of an existing server
        server: Option<String> => "server",
        /// Initialize a new cluster with embedded etcd.
        ///
        /// Unlike every other boolean here, an explicit `false` is rendered.
        cluster_init: TriState => "cluster-init",
        cluster_reset: Option<bool> => "cluster-reset",
        cluster_reset_restore_path: Option<String> => "cluster-reset-restore-path",

        // Flags passed through to components
        kube_apiserver_arg: Option<Vec<String>> => "kube-apiserver-arg",
        etcd_arg: Option<Vec<String>> => "etcd-arg",
        kube_controller_manager_arg: Option<Vec<String>> => "kube-controller-manager-arg",
        kube_scheduler_arg: Option<Vec<String>> => "kube-scheduler-arg",
        kube_cloud_controller_manager_arg: Option<Vec<String>> => "kube-cloud-controller-manager-arg",

        // Database
        kine_tls: Option<bool> => "kine-tls",
        datastore_endpoint: Option<String> => "datastore-endpoint",
        datastore_cafile: Option<String> => "datastore-cafile",
        datastore_certfile: Option<String> => "datastore-certfile",
        datastore_keyfile: Option<String> => "datastore-keyfile",
        etcd_expose_metrics: Option<bool> => "etcd-expose-metrics",
        etcd_disable_snapshots: Option<bool> => "etcd-disable-snapshots",
        etcd_snapshot_name: Option<String> => "etcd-snapshot-name",
        etcd_snapshot_schedule_cron: Option<String> => "etcd-snapshot-schedule-cron",
        etcd_snapshot_retention: Option<i64> => "etcd-snapshot-retention",
        etcd_snapshot_dir: Option<String> => "etcd-snapshot-dir",
        etcd_snapshot_compress: Option<bool> => "etcd-snapshot-compress",
        etcd_s3: Option<bool> => "etcd-s3",
        etcd_s3_endpoint: Option<String> => "etcd-s3-endpoint",
        etcd_s3_endpoint_ca: Option<String> => "etcd-s3-endpoint-ca",
        etcd_s3_skip_ssl_verify: Option<bool> => "etcd-s3-skip-ssl-verify",
        etcd_s3_access_key: Option<String> => "etcd-s3-access-key",
        etcd_s3_secret_key: Option<String> => "etcd-s3-secret-key",
        etcd_s3_bucket: Option<String> => "etcd-s3-bucket",
        etcd_s3_region: Option<String> => "etcd-s3-region",
        etcd_s3_folder: Option<String> => "etcd-s3-folder",
        etcd_s3_proxy: Option<String> => "etcd-s3-proxy",
        etcd_s3_config_secret: Option<String> => "etcd-s3-config-secret",
        etcd_s3_insecure: Option<bool> => "etcd-s3-insecure",
        /// Duration string such as `5m0s`, passed through verbatim
        etcd_s3_timeout: Option<String> => "etcd-s3-timeout",

        // Storage
        default_local_storage_path: Option<String> => "default-local-storage-path",

        // Components
        disable: Option<Vec<String>> => "disable",
        disable_scheduler: Option<bool> => "disable-scheduler",
        disable_cloud_controller: Option<bool> => "disable-cloud-controller",
        disable_kube_proxy: Option<bool> => "disable-kube-proxy",
        disable_network_policy: Option<bool> => "disable-network-policy",
        disable_helm_controller: Option<bool> => "disable-helm-controller",
        disable_apiserver: Option<bool> => "disable-apiserver",
        disable_controller_manager: Option<bool> => "disable-controller-manager",
        disable_etcd: Option<bool> => "disable-etcd",
        embedded_registry: Option<bool> => "embedded-registry",
        supervisor_metrics: Option<bool> => "supervisor-metrics",

        // Agent/node
        node_name: Option<String> => "node-name",
        with_node_id: Option<bool> => "with-node-id",
        node_label: Option<Vec<String>> => "node-label",
        node_taint: Option<Vec<String>> => "node-taint",
        image_credential_provider_bin_dir: Option<String> => "image-credential-provider-bin-dir",
        image_credential_provider_config: Option<String> => "image-credential-provider-config",

        // Agent/runtime
        docker: Option<bool> => "docker",
        container_runtime_endpoint: Option<String> => "container-runtime-endpoint",
        default_runtime: Option<String> => "default-runtime",
        image_service_endpoint: Option<String> => "image-service-endpoint",
        disable_default_registry_endpoint: Option<bool> => "disable-default-registry-endpoint",
        nonroot_devices: Option<bool> => "nonroot-devices",
        pause_image: Option<String> => "pause-image",
        snapshotter: Option<String> => "snapshotter",
        private_registry: Option<String> => "private-registry",
        system_default_registry: Option<String> => "system-default-registry",
        airgap_extra_registry: Option<Vec<String>> => "airgap-extra-registry",

        // Agent/networking
        node_ip: Option<Vec<String>> => "node-ip",
        node_external_ip: Option<Vec<String>> => "node-external-ip",
        node_internal_dns: Option<Vec<String>> => "node-internal-dns",
        node_external_dns: Option<Vec<String>> => "node-external-dns",
        resolv_conf: Option<String> => "resolv-conf",
        flannel_iface: Option<String> => "flannel-iface",
        flannel_conf: Option<String> => "flannel-conf",
        flannel_cni_conf: Option<String> => "flannel-cni-conf",
        vpn_auth: Option<String> => "vpn-auth",
        vpn_auth_file: Option<String> => "vpn-auth-file",

        // Agent/flags
        kubelet_arg: Option<Vec<String>> => "kubelet-arg",
        kube_proxy_arg: Option<Vec<String>> => "kube-proxy-arg",
        protect_kernel_defaults: Option<bool> => "protect-kernel-defaults",

        // Experimental
        secrets_encryption: Option<bool> => "secrets-encryption",
        enable_pprof: Option<bool> => "enable-pprof",
        rootless: Option<bool> => "rootless",
        prefer_bundled_bin: Option<bool> => "prefer-bundled-bin",
        selinux: Option<bool> => "selinux",
        lb_server_port: Option<i64> => "lb-server-port",
        disable_agent: Option<bool> => "disable-agent",

        // Deprecated aliases still accepted by k3s
        kube_controller_arg: Option<Vec<String>> => "kube-controller-arg",
        kube_cloud_controller_arg: Option<Vec<String>> => "kube-cloud-controller-arg",
    }
}
