//! Result normalizer / 结果规范化
//!
//! Every row retrieved is a row returned: a payload that fails to parse
//! yields a degraded record (raw payload as text, no tags) instead of being
//! dropped.

use serde_json::Value;

use super::schema::{RawRow, SearchResultRecord, StoredContent};

/// Why a payload could not be read / 内容解析失败原因
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("payload is not valid JSON: {0}")]
    Syntax(String),
    #[error("payload is not a JSON object")]
    NotObject,
    #[error("field `{0}` has the wrong type")]
    FieldType(&'static str),
}

/// Parse a structured content payload / 解析结构化内容
///
/// Missing `text` becomes `""`, missing `tags` becomes `[]`; non-string tag
/// entries are skipped.
pub fn parse_content(payload: &str) -> Result<StoredContent, ContentError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| ContentError::Syntax(e.to_string()))?;
    let obj = value.as_object().ok_or(ContentError::NotObject)?;

    let text = match obj.get("text") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(ContentError::FieldType("text")),
    };

    let tags = match obj.get("tags") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(_) => return Err(ContentError::FieldType("tags")),
    };

    Ok(StoredContent { text, tags })
}

/// Normalize one row / 规范化单行
pub fn normalize_row(row: RawRow) -> SearchResultRecord {
    let content = match parse_content(&row.content_payload) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(
                "Recovered malformed content for document {} ({}): {}",
                row.id,
                row.title,
                e
            );
            StoredContent {
                text: row.content_payload,
                tags: Vec::new(),
            }
        }
    };

    SearchResultRecord {
        id: row.id,
        title: row.title,
        text: content.text,
        tags: content.tags,
        weight: row.weight,
    }
}

/// Normalize rows, order and count preserved / 规范化所有行，保持顺序
pub fn normalize(rows: Vec<RawRow>) -> Vec<SearchResultRecord> {
    rows.into_iter().map(normalize_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, payload: &str, weight: i64) -> RawRow {
        RawRow {
            id,
            title: format!("文档{}", id),
            content_payload: payload.to_string(),
            weight,
        }
    }

    #[test]
    fn test_well_formed_payload() {
        let records = normalize(vec![row(1, r#"{"text": "T", "tags": ["a","b"]}"#, 3)]);
        assert_eq!(
            records,
            vec![SearchResultRecord {
                id: 1,
                title: "文档1".to_string(),
                text: "T".to_string(),
                tags: vec!["a".to_string(), "b".to_string()],
                weight: 3,
            }]
        );
    }

    #[test]
    fn test_truncated_payload_degrades() {
        let payload = r#"{"text": "这是一个测试文档", "tags": ["测"#;
        let records = normalize(vec![row(2, payload, 7)]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, payload);
        assert!(records[0].tags.is_empty());
        assert_eq!(records[0].id, 2);
        assert_eq!(records[0].title, "文档2");
        assert_eq!(records[0].weight, 7);
    }

    #[test]
    fn test_missing_fields_default() {
        let content = parse_content("{}").unwrap();
        assert_eq!(content, StoredContent::default());

        let content = parse_content(r#"{"text": "only text"}"#).unwrap();
        assert_eq!(content.text, "only text");
        assert!(content.tags.is_empty());

        let content = parse_content(r#"{"tags": ["x"], "text": null}"#).unwrap();
        assert_eq!(content.text, "");
        assert_eq!(content.tags, vec!["x"]);
    }

    #[test]
    fn test_non_string_tags_skipped() {
        let content = parse_content(r#"{"text": "t", "tags": ["a", 1, null, "b"]}"#).unwrap();
        assert_eq!(content.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_wrong_shapes_are_errors() {
        assert_eq!(parse_content("[1,2]"), Err(ContentError::NotObject));
        assert_eq!(
            parse_content(r#"{"text": 5}"#),
            Err(ContentError::FieldType("text"))
        );
        assert_eq!(
            parse_content(r#"{"tags": "a,b"}"#),
            Err(ContentError::FieldType("tags"))
        );
        assert!(matches!(parse_content(""), Err(ContentError::Syntax(_))));
    }

    #[test]
    fn test_order_is_not_changed() {
        let rows = vec![row(1, "{}", 5), row(2, "{}", 9), row(3, "{", 2)];
        let weights: Vec<i64> = normalize(rows).iter().map(|r| r.weight).collect();
        assert_eq!(weights, vec![5, 9, 2]);

        let rows = vec![row(2, "{}", 9), row(1, "{}", 5), row(3, "{}", 2)];
        let weights: Vec<i64> = normalize(rows).iter().map(|r| r.weight).collect();
        assert_eq!(weights, vec![9, 5, 2]);
    }

    #[test]
    fn test_one_bad_row_does_not_affect_others() {
        let rows = vec![
            row(1, r#"{"text":"ok","tags":["t"]}"#, 3),
            row(2, "\u{fffd}garbage", 2),
            row(3, r#"{"text":"ok too"}"#, 1),
        ];
        let records = normalize(rows);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].tags, vec!["t"]);
        assert_eq!(records[1].text, "\u{fffd}garbage");
        assert_eq!(records[2].text, "ok too");
    }
}
