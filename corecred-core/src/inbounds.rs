use serde_json::Value;
use tracing::debug;

/// Inbound tags of a core configuration document, in document order.
///
/// Only elements of a top-level `inbounds` array whose `tag` is a non-empty
/// string count. Anything unparsable yields an empty list; the editor calls
/// this on every settled edit, so it must be cheap to call redundantly and
/// must never fail.
pub fn extract_inbound_tags(document: &str) -> Vec<String> {
    let parsed: Value = match serde_json::from_str(document) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "document is not valid JSON, no inbound tags");
            return Vec::new();
        }
    };
    let Some(inbounds) = parsed.get("inbounds").and_then(Value::as_array) else {
        return Vec::new();
    };
    inbounds
        .iter()
        .filter_map(|inbound| inbound.get("tag").and_then(Value::as_str))
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_non_empty_string_tags() {
        let doc = r#"{"inbounds":[{"tag":"A"},{"tag":""},{"notag":1}]}"#;
        assert_eq!(extract_inbound_tags(doc), vec!["A".to_string()]);
    }

    #[test]
    fn preserves_document_order_and_duplicates() {
        let doc = r#"{"inbounds":[{"tag":"b"},{"tag":"a"},{"tag":"b"}]}"#;
        assert_eq!(extract_inbound_tags(doc), vec!["b", "a", "b"]);
    }

    #[test]
    fn non_string_tags_and_non_object_entries_are_skipped() {
        let doc = r#"{"inbounds":[{"tag":5},"x",null,{"tag":["A"]},{"tag":"ok"}]}"#;
        assert_eq!(extract_inbound_tags(doc), vec!["ok"]);
    }

    #[test]
    fn malformed_or_mistyped_documents_are_empty() {
        for doc in [
            "",
            "{",
            "[]",
            r#"{"inbounds":{}}"#,
            r#"{"inbounds":"A"}"#,
            r#"{"outbounds":[{"tag":"direct"}]}"#,
        ] {
            assert!(extract_inbound_tags(doc).is_empty(), "{doc}");
        }
    }

    #[test]
    fn idempotent() {
        let doc = r#"{"inbounds":[{"tag":"vless-in"}]}"#;
        assert_eq!(extract_inbound_tags(doc), extract_inbound_tags(doc));
    }
}
