//! The JSON response envelope.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// `{status, message, data?}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub status: EnvelopeStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Envelope {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            message: message.into(),
            data: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Option<serde_json::Value>) -> Self {
        self.data = data;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_shape() {
        let json = serde_json::to_value(Envelope::success("ok")).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "message": "ok"}));
    }

    #[test]
    fn test_error_with_data() {
        let envelope = Envelope::error("bad").with_data(Some(serde_json::json!({"a": 1})));
        let json = serde_json::to_value(envelope).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["data"]["a"], 1);
    }
}
