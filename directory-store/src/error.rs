/// Failure talking to the hosted table or the logo bucket.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    #[error("Duplicate company id: {0}")]
    Duplicate(String),

    #[error("Logo upload failed: {0}")]
    Storage(String),

    #[error("Backend configuration error: {0}")]
    Config(String),
}

impl RemoteError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, RemoteError::Status { status: 401 | 403, .. })
    }
}

/// Errors surfaced by [`crate::CompanyStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Company not found: {0}")]
    NotFound(String),

    #[error("A company with id {0} already exists")]
    Conflict(String),

    #[error("A logo upload is already in progress")]
    UploadInProgress,

    #[error("Invalid logo file: {0}")]
    InvalidLogo(String),

    #[error("Failed to load bundled seed data: {0}")]
    Seed(#[from] serde_json::Error),
}
