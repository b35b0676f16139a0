//! Proxy environment derivation
//!
//! When the node sits behind an HTTP proxy, k3s and its containerd need the
//! proxy variables plus a no-proxy list covering cluster-internal traffic:
//! pod and service CIDRs, the node's own address and the service DNS
//! suffixes.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, info};

use k3s_provider_common::{Error, Result};

use crate::descriptor::env_value;
use crate::network::{first_node_address, InterfaceSource};

/// Environment variable naming the HTTP proxy
pub const HTTP_PROXY: &str = "HTTP_PROXY";
/// Environment variable naming the HTTPS proxy
pub const HTTPS_PROXY: &str = "HTTPS_PROXY";
/// Environment variable listing proxy exclusions
pub const NO_PROXY: &str = "NO_PROXY";

/// Cluster service DNS suffixes that never go through a proxy
pub const K8S_NO_PROXY_SUFFIXES: &[&str] = &[".svc", ".svc.cluster", ".svc.cluster.local"];

const CLUSTER_CIDR: &str = "cluster-cidr";
const SERVICE_CIDR: &str = "service-cidr";

/// Build the proxy environment-file body.
///
/// `document` is the override document as parsed, before normalization. The
/// result is empty when neither `HTTP_PROXY` nor `HTTPS_PROXY` is set.
pub fn proxy_environment(
    document: &Map<String, Value>,
    env: &BTreeMap<String, String>,
    interfaces: &dyn InterfaceSource,
) -> Result<String> {
    let cluster_cidr = cidr_option(document, CLUSTER_CIDR)?;
    let service_cidr = cidr_option(document, SERVICE_CIDR)?;

    let http_proxy = env_value(env, HTTP_PROXY).unwrap_or_default();
    let https_proxy = env_value(env, HTTPS_PROXY).unwrap_or_default();
    if http_proxy.is_empty() && https_proxy.is_empty() {
        debug!("no proxy configured");
        return Ok(String::new());
    }

    let node_address = first_node_address(interfaces).unwrap_or_default();
    let no_proxy = no_proxy_list(
        &[&cluster_cidr, &service_cidr, &node_address],
        env_value(env, NO_PROXY).unwrap_or_default(),
    );

    let mut lines = Vec::new();
    push_pair(&mut lines, HTTP_PROXY, http_proxy);
    push_pair(&mut lines, HTTPS_PROXY, https_proxy);
    push_pair(&mut lines, NO_PROXY, &no_proxy);

    info!(
        http_proxy = %redact_userinfo(http_proxy),
        https_proxy = %redact_userinfo(https_proxy),
        no_proxy = %no_proxy,
        "derived proxy environment"
    );
    Ok(lines.join("\n"))
}

/// Join the cluster-internal exclusions with the administrator's own list.
fn no_proxy_list(cluster_parts: &[&str], user_no_proxy: &str) -> String {
    let mut parts: Vec<&str> = cluster_parts
        .iter()
        .copied()
        .filter(|p| !p.is_empty())
        .collect();
    parts.extend(K8S_NO_PROXY_SUFFIXES);
    if !user_no_proxy.is_empty() {
        parts.push(user_no_proxy);
    }
    parts.join(",")
}

/// Emit `KEY=value` and its `CONTAINERD_` twin, unless `value` is empty.
fn push_pair(lines: &mut Vec<String>, key: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    lines.push(format!("{key}={value}"));
    lines.push(format!("CONTAINERD_{key}={value}"));
}

/// Replace any `user:pass@` in a proxy URL with `***@` for logging.
fn redact_userinfo(url: &str) -> String {
    let authority_start = url.find("://").map_or(0, |i| i + 3);
    let rest = &url[authority_start..];
    let authority_len = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_len].rfind('@') {
        Some(at) => format!("{}***{}", &url[..authority_start], &rest[at..]),
        None => url.to_string(),
    }
}

/// Read a CIDR option as a comma-joined string. Absent means empty.
fn cidr_option(document: &Map<String, Value>, key: &str) -> Result<String> {
    match document.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.as_str()),
                _ => Err(Error::proxy_options_for_key(
                    key,
                    "expected a list of CIDR strings",
                )),
            })
            .collect::<Result<Vec<_>>>()
            .map(|parts| parts.join(",")),
        Some(_) => Err(Error::proxy_options_for_key(
            key,
            "expected a CIDR string or a list of CIDR strings",
        )),
    }
}
