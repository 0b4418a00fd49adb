//! Request field extraction.
//!
//! Settings arrive as query parameters, a JSON object or a form body. JSON
//! numbers and booleans are taken as their text so that type problems are
//! reported by validation rather than by the extractor.

use std::collections::HashMap;

use serde::Deserialize;

use nocron_core::TaskCandidate;

use crate::error::ApiError;

/// Query parameters shared by the worker, manager and install entries.
#[derive(Debug, Default, Deserialize)]
pub struct EntryQuery {
    pub auth: Option<String>,
    pub action: Option<String>,
    pub token: Option<String>,
    pub suffix: Option<String>,
    #[serde(rename = "taskType")]
    pub task_type: Option<String>,
    #[serde(rename = "taskCode")]
    pub task_code: Option<String>,
    pub interval: Option<String>,
    pub window: Option<String>,
}

impl EntryQuery {
    pub fn candidate(&self) -> TaskCandidate {
        TaskCandidate {
            task_type: self.task_type.clone(),
            task_code: self.task_code.clone(),
            interval: self.interval.clone(),
            window: self.window.clone(),
        }
    }
}

/// Flat text fields parsed from a request body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BodyFields(HashMap<String, String>);

impl BodyFields {
    /// Parse a JSON object or an urlencoded form. An empty body has no fields.
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let trimmed = body.trim_ascii();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        if trimmed.starts_with(b"{") {
            let value: serde_json::Map<String, serde_json::Value> =
                serde_json::from_slice(trimmed)
                    .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?;
            let fields = value
                .into_iter()
                .filter_map(|(key, value)| {
                    let text = match value {
                        serde_json::Value::Null => return None,
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    Some((key, text))
                })
                .collect();
            return Ok(Self(fields));
        }

        Ok(Self(
            url::form_urlencoded::parse(trimmed)
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        ))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn candidate(&self) -> TaskCandidate {
        let field = |key: &str| self.get(key).map(str::to_string);
        TaskCandidate {
            task_type: field("taskType"),
            task_code: field("taskCode"),
            interval: field("interval"),
            window: field("window"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_numbers_become_text() {
        let body = br#"{"taskType":"url","interval":10,"window":"60","extra":null}"#;
        let fields = BodyFields::parse(body).unwrap();
        let candidate = fields.candidate();
        assert_eq!(candidate.task_type.as_deref(), Some("url"));
        assert_eq!(candidate.interval.as_deref(), Some("10"));
        assert_eq!(candidate.window.as_deref(), Some("60"));
        assert!(candidate.task_code.is_none());
        assert!(fields.get("extra").is_none());
    }

    #[test]
    fn test_form_body() {
        let fields = BodyFields::parse(b"taskCode=https%3A%2F%2Fexample.com&interval=5").unwrap();
        assert_eq!(fields.get("taskCode"), Some("https://example.com"));
        assert_eq!(fields.get("interval"), Some("5"));
    }

    #[test]
    fn test_empty_and_invalid() {
        assert_eq!(BodyFields::parse(b"  ").unwrap(), BodyFields::default());
        assert!(matches!(
            BodyFields::parse(b"{not json"),
            Err(ApiError::BadRequest(_))
        ));
    }
}
