use async_trait::async_trait;
use shared_types::Company;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{
    logo_extension, logo_object_key, logo_object_keys, CompanyBackend, SessionUser,
    DEFAULT_LOGO_BUCKET,
};
use crate::error::RemoteError;
use crate::mapper::{self, StoredCategory, StoredCompany, StoredCompanyPatch};

const OFFLINE_SESSION_USER: &str = "offline-admin";

/// Process-local stand-in for the hosted table and bucket.
///
/// Keeps the hosted semantics (server-stamped `last_updated`, duplicate id
/// rejection, patch-only updates) but nothing outlives the process.
pub struct InMemoryBackend {
    rows: Mutex<Vec<StoredCompany>>,
    logos: Mutex<HashMap<String, Vec<u8>>>,
    offline: bool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            logos: Mutex::new(HashMap::new()),
            offline: false,
        }
    }

    pub fn with_companies(companies: &[Company]) -> Self {
        let backend = Self::new();
        if let Ok(mut rows) = backend.rows.lock() {
            rows.extend(companies.iter().map(mapper::app_to_stored));
        }
        backend
    }

    /// Demo mode used when no hosted credentials are configured.
    pub fn offline(seed: Vec<Company>) -> Self {
        let mut backend = Self::with_companies(&seed);
        backend.offline = true;
        backend
    }

    pub fn logo_object(&self, key: &str) -> Option<Vec<u8>> {
        self.logos.lock().ok()?.get(key).cloned()
    }

    fn rows(&self) -> Result<std::sync::MutexGuard<'_, Vec<StoredCompany>>, RemoteError> {
        self.rows
            .lock()
            .map_err(|e| RemoteError::Storage(format!("In-memory table poisoned: {}", e)))
    }

    fn now() -> String {
        mapper::format_timestamp(chrono::Utc::now())
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompanyBackend for InMemoryBackend {
    async fn get_all(&self) -> Result<Vec<StoredCompany>, RemoteError> {
        Ok(self.rows()?.clone())
    }

    async fn get_by_category(
        &self,
        category: StoredCategory,
    ) -> Result<Vec<StoredCompany>, RemoteError> {
        Ok(self
            .rows()?
            .iter()
            .filter(|row| row.category == category)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<StoredCompany>, RemoteError> {
        Ok(self.rows()?.iter().find(|row| row.id == id).cloned())
    }

    async fn search(&self, query: &str) -> Result<Vec<StoredCompany>, RemoteError> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .rows()?
            .iter()
            .filter(|row| row.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn add(&self, mut company: StoredCompany) -> Result<StoredCompany, RemoteError> {
        let mut rows = self.rows()?;
        if rows.iter().any(|row| row.id == company.id) {
            return Err(RemoteError::Duplicate(company.id));
        }

        company.last_updated = Some(Self::now());
        rows.push(company.clone());
        Ok(company)
    }

    async fn update(
        &self,
        id: &str,
        patch: StoredCompanyPatch,
    ) -> Result<Option<StoredCompany>, RemoteError> {
        let mut rows = self.rows()?;
        let Some(row) = rows.iter_mut().find(|row| row.id == id) else {
            return Ok(None);
        };

        patch.apply_to(row);
        row.last_updated = Some(Self::now());
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, RemoteError> {
        let removed = {
            let mut rows = self.rows()?;
            let before = rows.len();
            rows.retain(|row| row.id != id);
            rows.len() != before
        };

        if removed {
            let keys = logo_object_keys(id);
            if let Ok(mut logos) = self.logos.lock() {
                logos.retain(|key, _| !keys.contains(key));
            }
        }

        Ok(removed)
    }

    async fn upload_logo_object(
        &self,
        id: &str,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<String, RemoteError> {
        let extension = logo_extension(file_name)
            .ok_or_else(|| RemoteError::Storage(format!("Unsupported logo file: {}", file_name)))?;
        let key = logo_object_key(id, &extension);

        self.logos
            .lock()
            .map_err(|e| RemoteError::Storage(format!("In-memory bucket poisoned: {}", e)))?
            .insert(key.clone(), bytes);

        Ok(format!("memory://{}/{}", DEFAULT_LOGO_BUCKET, key))
    }

    async fn session_user(&self, access_token: &str) -> Result<Option<SessionUser>, RemoteError> {
        if access_token.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(SessionUser {
            id: OFFLINE_SESSION_USER.to_string(),
            email: None,
        }))
    }

    fn is_offline(&self) -> bool {
        self.offline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, name: &str, category: StoredCategory) -> StoredCompany {
        StoredCompany {
            id: id.to_string(),
            name: name.to_string(),
            website: Some(format!("https://{}.ai", id)),
            category,
            description: Some("An AI marketing tool".to_string()),
            logo_url: None,
            target_audience: None,
            features: None,
            pricing: None,
            details: None,
            linkedin_url: None,
            founded_year: None,
            headquarters: None,
            employee_count: None,
            funding_stage: None,
            last_updated: None,
        }
    }

    #[tokio::test]
    async fn test_add_stamps_last_updated_and_rejects_duplicates() {
        let backend = InMemoryBackend::new();

        let saved = backend
            .add(row("a", "Alpha", StoredCategory::SocialMedia))
            .await
            .unwrap();
        assert!(mapper::parse_timestamp(saved.last_updated.as_deref()).is_some());

        let err = backend
            .add(row("a", "Alpha again", StoredCategory::SocialMedia))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Duplicate(id) if id == "a"));
    }

    #[tokio::test]
    async fn test_category_filter_is_exact() {
        let backend = InMemoryBackend::new();
        backend.add(row("a", "Alpha", StoredCategory::SocialMedia)).await.unwrap();
        backend.add(row("b", "Beta", StoredCategory::SeoSem)).await.unwrap();
        backend.add(row("c", "Gamma", StoredCategory::SocialMedia)).await.unwrap();

        let social = backend
            .get_by_category(StoredCategory::SocialMedia)
            .await
            .unwrap();
        assert_eq!(social.len(), 2);
        assert!(social.iter().all(|r| r.category == StoredCategory::SocialMedia));
    }

    #[tokio::test]
    async fn test_update_patches_named_fields_only() {
        let backend = InMemoryBackend::new();
        backend.add(row("a", "Alpha", StoredCategory::SocialMedia)).await.unwrap();

        let patch = StoredCompanyPatch {
            name: Some("Alpha AI".to_string()),
            ..Default::default()
        };
        let updated = backend.update("a", patch.clone()).await.unwrap().unwrap();
        assert_eq!(updated.name, "Alpha AI");
        assert_eq!(updated.website.as_deref(), Some("https://a.ai"));

        assert!(backend.update("missing", patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_on_name() {
        let backend = InMemoryBackend::new();
        backend.add(row("a", "CopyGenius", StoredCategory::ContentCreation)).await.unwrap();
        backend.add(row("b", "AdPilot", StoredCategory::AdvertisingPpc)).await.unwrap();

        let found = backend.search("copyg").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "a");
    }

    #[tokio::test]
    async fn test_delete_removes_logo_objects() {
        let backend = InMemoryBackend::new();
        backend.add(row("a", "Alpha", StoredCategory::SocialMedia)).await.unwrap();

        let url = backend
            .upload_logo_object("a", vec![1, 2, 3], "logo.png")
            .await
            .unwrap();
        assert_eq!(url, "memory://company-logos/logos/a.png");
        assert!(backend.logo_object("logos/a.png").is_some());

        assert!(backend.delete("a").await.unwrap());
        assert!(backend.logo_object("logos/a.png").is_none());
        assert!(!backend.delete("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_keeps_logos_of_ids_sharing_a_prefix() {
        let backend = InMemoryBackend::new();
        backend.add(row("a", "Alpha", StoredCategory::SocialMedia)).await.unwrap();
        backend.add(row("a.b", "Alpha Beta", StoredCategory::SocialMedia)).await.unwrap();

        backend.upload_logo_object("a", vec![1], "logo.png").await.unwrap();
        backend.upload_logo_object("a", vec![2], "logo.svg").await.unwrap();
        backend.upload_logo_object("a.b", vec![3], "logo.png").await.unwrap();

        assert!(backend.delete("a").await.unwrap());
        assert!(backend.logo_object("logos/a.png").is_none());
        assert!(backend.logo_object("logos/a.svg").is_none());
        assert_eq!(backend.logo_object("logos/a.b.png"), Some(vec![3]));
    }

    #[tokio::test]
    async fn test_upload_logo_persists_url() {
        let backend = InMemoryBackend::new();
        backend.add(row("a", "Alpha", StoredCategory::SocialMedia)).await.unwrap();

        let url = backend.upload_logo("a", vec![9], "mark.svg").await.unwrap();
        let saved = backend.get_by_id("a").await.unwrap().unwrap();
        assert_eq!(saved.logo_url.as_deref(), Some(url.as_str()));

        let err = backend.upload_logo("a", vec![9], "mark.bmp").await.unwrap_err();
        assert!(matches!(err, RemoteError::Storage(_)));
    }

    #[tokio::test]
    async fn test_session_requires_token() {
        let backend = InMemoryBackend::new();
        assert!(backend.session_user("").await.unwrap().is_none());
        assert!(backend.session_user("token").await.unwrap().is_some());
    }
}
