use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body returned by every mutation: the affected resource id plus a human readable message.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct MessageResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub message: String,
}

impl MessageResponse {
    pub fn with_id(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            message: message.into(),
        }
    }
}
