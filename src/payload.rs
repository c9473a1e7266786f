//! Safe nested lookup over loosely structured event payloads
//!
//! Paths are `/`-delimited field names, e.g.
//! `detail/service/action/networkConnectionAction/connectionDirection`.
//! Array nodes are indexed by decimal position.

use serde_json::Value;

/// Walk `root` along `path`.
///
/// Returns `None` as soon as a segment is missing or the current node
/// cannot be indexed. Present values are returned as found, falsy ones
/// (`0`, `false`, `""`, `null`) included.
pub fn fetch<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('/').try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// String at `path`; JSON null and non-string values count as absent.
pub fn fetch_str<'a>(root: &'a Value, path: &str) -> Option<&'a str> {
    fetch(root, path).and_then(Value::as_str)
}

/// Number at `path`, accepting numeric strings as well.
pub fn fetch_f64(root: &Value, path: &str) -> Option<f64> {
    match fetch(root, path)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// True when `path` resolves to anything other than JSON null.
pub fn is_present(root: &Value, path: &str) -> bool {
    fetch(root, path).is_some_and(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fetch_nested() {
        let event = json!({"detail": {"service": {"serviceName": "guardduty"}}});
        assert_eq!(
            fetch(&event, "detail/service/serviceName"),
            Some(&json!("guardduty"))
        );
        assert_eq!(fetch(&event, "detail"), event.get("detail"));
    }

    #[test]
    fn test_missing_segment_is_none() {
        let event = json!({"detail": {"service": {}}});
        assert_eq!(fetch(&event, "detail/service/action/networkConnectionAction"), None);
        assert_eq!(fetch(&event, "nope"), None);
    }

    #[test]
    fn test_scalar_and_null_nodes_stop_traversal() {
        let event = json!({"detail": "text", "other": null});
        assert_eq!(fetch(&event, "detail/service"), None);
        assert_eq!(fetch(&event, "other/service"), None);
    }

    #[test]
    fn test_falsy_values_are_returned() {
        let event = json!({"a": {"zero": 0, "no": false, "empty": "", "nil": null}});
        assert_eq!(fetch(&event, "a/zero"), Some(&json!(0)));
        assert_eq!(fetch(&event, "a/no"), Some(&json!(false)));
        assert_eq!(fetch(&event, "a/empty"), Some(&json!("")));
        assert_eq!(fetch(&event, "a/nil"), Some(&Value::Null));
        assert!(!is_present(&event, "a/nil"));
        assert!(is_present(&event, "a/zero"));
    }

    #[test]
    fn test_array_index_segments() {
        let event = json!({"Records": [{"eventName": "ObjectCreated"}]});
        assert_eq!(fetch_str(&event, "Records/0/eventName"), Some("ObjectCreated"));
        assert_eq!(fetch(&event, "Records/1"), None);
        assert_eq!(fetch(&event, "Records/first"), None);
    }

    #[test]
    fn test_typed_helpers() {
        let event = json!({"severity": 5.5, "text": "2", "flag": true, "nil": null});
        assert_eq!(fetch_f64(&event, "severity"), Some(5.5));
        assert_eq!(fetch_f64(&event, "text"), Some(2.0));
        assert_eq!(fetch_f64(&event, "flag"), None);
        assert_eq!(fetch_str(&event, "nil"), None);
        assert_eq!(fetch_str(&event, "severity"), None);
    }
}
