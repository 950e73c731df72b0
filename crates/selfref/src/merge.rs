//! deep merge of objects
use crate::value::{Map, Value};

/// Merge `source` into `target`
///
/// Keys that hold an object on both sides are merged recursively. Every other value in `source`
/// (including arrays and `null`) replaces the one in `target`.
pub fn deep_merge(target: &mut Map, source: &Map) {
    for (key, source_value) in source {
        match (target.get_mut(key), source_value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            (Some(existing), _) => {
                tracing::trace!(key, "replace");
                *existing = source_value.clone();
            }
            (None, _) => {
                target.insert(key.clone(), source_value.clone());
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(text: &str) -> Map {
        match Value::from(serde_json::from_str::<serde_json::Value>(text).unwrap()) {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn merged(target: &str, source: &str) -> Map {
        let mut target = map(target);
        deep_merge(&mut target, &map(source));
        target
    }

    #[test]
    fn later_scalars_win() {
        assert_eq!(
            merged(r#"{ "a": 1, "b": 2 }"#, r#"{ "b": 3, "c": "three" }"#),
            map(r#"{ "a": 1, "b": 3, "c": "three" }"#)
        );
    }

    #[test]
    fn nested_objects_merge_key_wise() {
        assert_eq!(
            merged(
                r#"{ "db": { "host": "localhost", "port": 5432 } }"#,
                r#"{ "db": { "port": 6543, "user": "app" } }"#
            ),
            map(r#"{ "db": { "host": "localhost", "port": 6543, "user": "app" } }"#)
        );
    }

    #[test]
    fn arrays_are_replaced() {
        assert_eq!(
            merged(r#"{ "a": [1, 2, 3] }"#, r#"{ "a": [9] }"#),
            map(r#"{ "a": [9] }"#)
        );
    }

    #[test]
    fn type_changes_replace() {
        assert_eq!(
            merged(r#"{ "a": { "x": 1 }, "b": 1 }"#, r#"{ "a": [1], "b": { "y": 2 } }"#),
            map(r#"{ "a": [1], "b": { "y": 2 } }"#)
        );
        assert_eq!(
            merged(r#"{ "a": { "x": 1 } }"#, r#"{ "a": null }"#),
            map(r#"{ "a": null }"#)
        );
    }

    #[test]
    fn key_order_follows_first_appearance() {
        let result = merged(r#"{ "b": 1, "a": 1 }"#, r#"{ "c": 1, "b": 2 }"#);
        let keys: Vec<_> = result.keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }
}
