use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Which backend the directory is talking to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum BackendMode {
    Hosted,
    Offline,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StatusResponse {
    pub backend: BackendMode,
    pub is_loading: bool,
    pub is_refreshing: bool,
    /// Last list-load or mutation failure, cleared by the next successful load.
    pub error: Option<String>,
    pub company_count: usize,
}

/// A single failed rule in the admin company form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ValidationErrorResponse {
    pub error: String,
    pub fields: Vec<FieldError>,
}
