//! Response types that only exist on the wire.

use serde::{Deserialize, Serialize};

/// Acknowledgement from `POST /user/upload`.
///
/// The backend answers 200 even when it refuses the file and reports the
/// reason in `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadAck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadAck {
    /// Decode an ack body. Empty and `null` bodies are a plain success.
    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Self::default());
        }
        serde_json::from_str(trimmed)
    }
}
