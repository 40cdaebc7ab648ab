pub mod memory;
pub mod supabase;

pub use memory::InMemoryBackend;
pub use supabase::{SupabaseBackend, SupabaseConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::RemoteError;
use crate::mapper::{StoredCategory, StoredCompany, StoredCompanyPatch};

pub const DEFAULT_TABLE: &str = "companies";
pub const DEFAULT_LOGO_BUCKET: &str = "company-logos";

const LOGO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp"];

/// The signed-in admin behind a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Request surface of the hosted table and logo bucket.
///
/// Every call is a single round trip with no retries. Mutations are visible to
/// every other client of the same backend immediately.
#[async_trait]
pub trait CompanyBackend: Send + Sync {
    async fn get_all(&self) -> Result<Vec<StoredCompany>, RemoteError>;
    async fn get_by_category(
        &self,
        category: StoredCategory,
    ) -> Result<Vec<StoredCompany>, RemoteError>;
    async fn get_by_id(&self, id: &str) -> Result<Option<StoredCompany>, RemoteError>;

    /// Case-insensitive substring match on `name`.
    async fn search(&self, query: &str) -> Result<Vec<StoredCompany>, RemoteError>;

    /// Insert one row. The backend stamps `last_updated`.
    async fn add(&self, company: StoredCompany) -> Result<StoredCompany, RemoteError>;

    /// Patch the named fields of one row; `None` when `id` does not exist.
    async fn update(
        &self,
        id: &str,
        patch: StoredCompanyPatch,
    ) -> Result<Option<StoredCompany>, RemoteError>;

    /// Remove the row and any logo stored for it. `false` when nothing was deleted.
    async fn delete(&self, id: &str) -> Result<bool, RemoteError>;

    /// Write the logo object only and return its public URL. The caller owns
    /// persisting the URL onto the record.
    async fn upload_logo_object(
        &self,
        id: &str,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<String, RemoteError>;

    async fn session_user(&self, access_token: &str) -> Result<Option<SessionUser>, RemoteError>;

    fn is_offline(&self) -> bool {
        false
    }

    /// Write the logo object and persist its URL onto the record.
    async fn upload_logo(
        &self,
        id: &str,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<String, RemoteError> {
        let url = self.upload_logo_object(id, bytes, file_name).await?;
        let patch = StoredCompanyPatch {
            logo_url: Some(url.clone()),
            last_updated: Some(crate::mapper::format_timestamp(chrono::Utc::now())),
            ..Default::default()
        };
        self.update(id, patch).await?;
        Ok(url)
    }
}

/// Lower-cased extension of an accepted logo file name.
pub fn logo_extension(file_name: &str) -> Option<String> {
    let (_, extension) = file_name.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();
    LOGO_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}

/// Deterministic object key; re-uploads overwrite the previous object.
pub fn logo_object_key(id: &str, extension: &str) -> String {
    format!("logos/{}.{}", id, extension)
}

/// Every key a logo for `id` can live under, one per accepted extension.
pub fn logo_object_keys(id: &str) -> Vec<String> {
    LOGO_EXTENSIONS
        .iter()
        .map(|extension| logo_object_key(id, extension))
        .collect()
}

pub fn logo_content_type(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Connection parameters for the hosted backend. Both `url` and `api_key`
/// must be present to leave offline mode.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BackendSettings {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub table: Option<String>,
    pub logo_bucket: Option<String>,
}

/// Pick the hosted client when credentials are configured, otherwise an
/// in-memory backend pre-loaded with the bundled companies.
pub fn backend_from_settings(
    settings: &BackendSettings,
) -> Result<Arc<dyn CompanyBackend>, RemoteError> {
    let url = settings.url.as_deref().map(str::trim).filter(|v| !v.is_empty());
    let api_key = settings
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (url, api_key) {
        (Some(url), Some(api_key)) => {
            let config = SupabaseConfig {
                url: url.to_string(),
                api_key: api_key.to_string(),
                table: settings
                    .table
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TABLE.to_string()),
                logo_bucket: settings
                    .logo_bucket
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LOGO_BUCKET.to_string()),
            };
            tracing::info!("Using hosted backend at {}", config.url);
            Ok(Arc::new(SupabaseBackend::new(config)?))
        }
        _ => {
            tracing::warn!(
                "No backend credentials configured, serving the bundled dataset in offline mode"
            );
            let seed = crate::seed::initial_companies()
                .map_err(|e| RemoteError::Config(format!("Bundled seed data is invalid: {}", e)))?;
            Ok(Arc::new(InMemoryBackend::offline(seed)))
        }
    }
}
