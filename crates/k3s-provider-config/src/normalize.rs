//! Loose-value normalization for human-authored override documents
//!
//! Administrators write `tls-san: a,b` as often as they write a YAML list.
//! Before a document is decoded into a schema, comma-bearing strings become
//! lists and single values of list-only keys are wrapped.

use serde_json::{Map, Value};

/// Keys whose value is always a list in k3s configuration
pub const LIST_KEYS: &[&str] = &[
    "tls-san",
    "cluster-cidr",
    "service-cidr",
    "cluster-dns",
    "node-label",
    "node-taint",
    "kube-apiserver-arg",
    "etcd-arg",
    "kube-controller-manager-arg",
    "kube-scheduler-arg",
    "kube-cloud-controller-manager-arg",
    "disable",
    "airgap-extra-registry",
    "node-ip",
    "node-external-ip",
    "node-internal-dns",
    "node-external-dns",
    "kubelet-arg",
    "kube-proxy-arg",
    "kube-controller-arg",
    "kube-cloud-controller-arg",
];

/// Whether `key` always holds a list
pub fn is_list_key(key: &str) -> bool {
    LIST_KEYS.contains(&key)
}

/// Reshape loosely typed values so they fit the option schemas.
///
/// - a string containing `,` is split into a list of its verbatim pieces
///   (no trimming)
/// - any other string under a [`LIST_KEYS`] key becomes a one-element list
/// - everything else, including lists whose items contain commas, is kept
pub fn normalize(document: &Map<String, Value>) -> Map<String, Value> {
    document
        .iter()
        .map(|(key, value)| (key.clone(), normalize_value(key, value)))
        .collect()
}

fn normalize_value(key: &str, value: &Value) -> Value {
    match value {
        Value::String(s) if s.contains(',') => Value::Array(
            s.split(',')
                .map(|part| Value::String(part.to_string()))
                .collect(),
        ),
        Value::String(s) if is_list_key(key) => Value::Array(vec![Value::String(s.clone())]),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn doc(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    // ==========================================================================
    // Story: comma-separated strings become lists
    // ==========================================================================

    #[rstest]
    #[case::plain_comma(json!({"test": "xyz,zyx"}), json!({"test": ["xyz", "zyx"]}))]
    #[case::no_trimming(json!({"tls-san": "a, b"}), json!({"tls-san": ["a", " b"]}))]
    #[case::empty_pieces(json!({"disable": "traefik,"}), json!({"disable": ["traefik", ""]}))]
    #[case::scalar_key_still_split(json!({"node-name": "a,b"}), json!({"node-name": ["a", "b"]}))]
    fn test_comma_strings_are_split(#[case] input: Value, #[case] expected: Value) {
        assert_eq!(Value::Object(normalize(&doc(input))), expected);
    }

    // ==========================================================================
    // Story: list-only keys are always lists
    // ==========================================================================

    #[test]
    fn test_single_value_list_key_is_wrapped() {
        let out = normalize(&doc(json!({"cluster-cidr": "10.0.0.0/8"})));
        assert_eq!(Value::Object(out), json!({"cluster-cidr": ["10.0.0.0/8"]}));
    }

    #[test]
    fn test_single_value_scalar_key_is_kept() {
        let out = normalize(&doc(json!({"test3": "xyz", "node-name": "edge"})));
        assert_eq!(Value::Object(out), json!({"test3": "xyz", "node-name": "edge"}));
    }

    // ==========================================================================
    // Story: already-typed values pass through
    // ==========================================================================

    #[rstest]
    #[case::list(json!({"test": ["a", "b"]}))]
    #[case::list_with_commas(json!({"node-label": ["zone=a,b", "tier=edge"]}))]
    #[case::boolean(json!({"cluster-init": true}))]
    #[case::number(json!({"https-listen-port": 6443}))]
    #[case::mapping(json!({"custom": {"a": "b,c"}}))]
    fn test_typed_values_pass_through(#[case] input: Value) {
        assert_eq!(Value::Object(normalize(&doc(input.clone()))), input);
    }

    #[test]
    fn test_mixed_document() {
        let out = normalize(&doc(json!({
            "test": "xyz,zyx",
            "test2": ["abc", "cba"],
            "test3": "xyz",
            "cluster-cidr": "192.168.0.1/24",
        })));
        assert_eq!(
            Value::Object(out),
            json!({
                "test": ["xyz", "zyx"],
                "test2": ["abc", "cba"],
                "test3": "xyz",
                "cluster-cidr": ["192.168.0.1/24"],
            })
        );
    }

    #[test]
    fn test_input_is_not_modified() {
        let input = doc(json!({"tls-san": "a,b"}));
        let _ = normalize(&input);
        assert_eq!(input["tls-san"], "a,b");
    }

    #[test]
    fn test_list_keys_are_unique() {
        let mut keys = LIST_KEYS.to_vec();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), LIST_KEYS.len());
    }
}
