use serde::{Deserialize, Serialize};

// -- Outbound send --

/// Body of `POST /API/say`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    #[serde(rename = "c")]
    pub channel: String,
    #[serde(rename = "m")]
    pub message: String,
}
