use chrono::Utc;
use serde::Serialize;
use shared_types::{
    Company, CompanyCategory, CreateCompanyRequest, LogoUploadResponse, UpdateCompanyRequest,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;

use crate::backend::{logo_extension, CompanyBackend};
use crate::error::{RemoteError, StoreError};
use crate::mapper::{self, StoredCategory, StoredCompany};
use crate::optimistic::{LocalMutation, OptimisticList};
use crate::{search, seed};

pub const MAX_LOGO_BYTES: usize = 2 * 1024 * 1024;

const NOTIFICATION_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient outcome of a mutation, for toast-style display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub companies: Vec<Company>,
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub error: Option<String>,
}

/// Resets a flag when the guarded operation finishes, however it finishes.
struct FlagGuard<'a>(&'a AtomicBool);

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct CounterGuard<'a>(&'a AtomicUsize);

impl Drop for CounterGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// In-memory view of the directory used for rendering, kept consistent with
/// the backend through optimistic mutations and refresh-on-failure.
///
/// Construct one per backend and share it behind an `Arc`; nothing here is
/// global, so tests can run independent stores side by side.
pub struct CompanyStore {
    backend: Arc<dyn CompanyBackend>,
    companies: OptimisticList<Company>,
    is_loading: AtomicBool,
    refreshes_in_flight: AtomicUsize,
    uploading_logo: AtomicBool,
    seed_on_empty: bool,
    seed_attempted: AtomicBool,
    error: Mutex<Option<String>>,
    notifications: broadcast::Sender<Notification>,
}

impl CompanyStore {
    pub fn new(backend: Arc<dyn CompanyBackend>) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            backend,
            companies: OptimisticList::new(),
            is_loading: AtomicBool::new(false),
            refreshes_in_flight: AtomicUsize::new(0),
            uploading_logo: AtomicBool::new(false),
            seed_on_empty: true,
            seed_attempted: AtomicBool::new(false),
            error: Mutex::new(None),
            notifications,
        }
    }

    /// Whether an empty backend gets bootstrapped with the bundled dataset.
    pub fn seed_on_empty(mut self, enabled: bool) -> Self {
        self.seed_on_empty = enabled;
        self
    }

    pub fn backend(&self) -> &Arc<dyn CompanyBackend> {
        &self.backend
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    pub fn companies(&self) -> Vec<Company> {
        self.companies.snapshot()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading.load(Ordering::Acquire)
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshes_in_flight.load(Ordering::Acquire) > 0
    }

    pub fn error(&self) -> Option<String> {
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            companies: self.companies(),
            is_loading: self.is_loading(),
            is_refreshing: self.is_refreshing(),
            error: self.error(),
        }
    }

    fn set_error(&self, error: Option<String>) {
        *self.error.lock().unwrap_or_else(PoisonError::into_inner) = error;
    }

    fn notify(&self, level: NotificationLevel, message: String) {
        // No subscribers is fine; the notification is still logged.
        let _ = self.notifications.send(Notification { level, message });
    }

    fn succeeded(&self, message: String) {
        tracing::info!("{}", message);
        self.notify(NotificationLevel::Success, message);
    }

    fn failed(&self, context: &str, error: &StoreError) {
        let message = format!("{}: {}", context, error);
        tracing::error!("{}", message);
        self.set_error(Some(message.clone()));
        self.notify(NotificationLevel::Error, message);
    }

    /// Replace the local list with the backend's. A non-forced call while
    /// another load or refresh is in flight does nothing.
    pub async fn load(&self, force: bool) -> Result<(), StoreError> {
        let _flag;
        let _counter;
        if force {
            self.refreshes_in_flight.fetch_add(1, Ordering::AcqRel);
            _counter = CounterGuard(&self.refreshes_in_flight);
        } else {
            if self.is_refreshing()
                || self
                    .is_loading
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
            {
                tracing::debug!("Company load already in flight, skipping");
                return Ok(());
            }
            _flag = FlagGuard(&self.is_loading);
        }

        match self.fetch_all().await {
            Ok(companies) => {
                tracing::debug!("Loaded {} companies", companies.len());
                self.companies.replace_all(companies);
                self.set_error(None);
                Ok(())
            }
            Err(e) => {
                let message = format!("Failed to load companies: {}", e);
                tracing::error!("{}", message);
                self.set_error(Some(message));
                Err(e)
            }
        }
    }

    pub async fn refresh(&self) -> Result<(), StoreError> {
        self.load(true).await
    }

    async fn resync(&self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!("Refresh after failed mutation also failed: {}", e);
        }
    }

    async fn fetch_all(&self) -> Result<Vec<Company>, StoreError> {
        let rows = self.backend.get_all().await?;
        if !rows.is_empty()
            || !self.seed_on_empty
            || self.seed_attempted.swap(true, Ordering::AcqRel)
        {
            return Ok(rows.into_iter().map(mapper::stored_to_app).collect());
        }

        self.seed_backend().await?;
        let rows = self.backend.get_all().await?;
        Ok(rows.into_iter().map(mapper::stored_to_app).collect())
    }

    /// One insert per bundled company; a failed insert is logged and the
    /// rest still go ahead. Returns how many were inserted.
    async fn seed_backend(&self) -> Result<usize, StoreError> {
        let companies = seed::initial_companies()?;
        tracing::info!(
            "Backend has no companies, seeding {} bundled records",
            companies.len()
        );

        let mut inserted = 0;
        for company in &companies {
            let now = Utc::now();
            let mut company = company.clone();
            company.last_updated = Some(now);

            match self.backend.add(mapper::app_to_stored(&company)).await {
                Ok(_) => inserted += 1,
                Err(e) => tracing::warn!("Failed to seed company {}: {}", company.id, e),
            }
        }

        tracing::info!("Seeded {}/{} companies", inserted, companies.len());
        Ok(inserted)
    }

    async fn remote_add(&self, row: StoredCompany) -> Result<StoredCompany, StoreError> {
        Ok(self.backend.add(row).await?)
    }

    async fn remote_update(
        &self,
        id: &str,
        update: &UpdateCompanyRequest,
    ) -> Result<StoredCompany, StoreError> {
        let patch = mapper::update_to_patch(update, Utc::now());
        self.backend
            .update(id, patch)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn remote_delete(&self, id: &str) -> Result<(), StoreError> {
        if self.backend.delete(id).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound(id.to_string()))
        }
    }

    /// Create a company, generating an id when none is supplied. The record
    /// is visible locally before the backend confirms it.
    pub async fn add(&self, request: CreateCompanyRequest) -> Result<Company, StoreError> {
        let id = request
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        if self.companies.contains(&id) {
            return Err(StoreError::Conflict(id));
        }

        let company = request.into_company(id, Utc::now());
        let row = mapper::app_to_stored(&company);

        let result = self
            .companies
            .apply(
                LocalMutation::Insert(company.clone()),
                self.remote_add(row),
                || self.resync(),
            )
            .await;

        match result {
            Ok(saved) => {
                let saved = mapper::stored_to_app(saved);
                self.companies.upsert(saved.clone());
                self.succeeded(format!("Added {}", saved.name));
                Ok(saved)
            }
            Err(e) => {
                self.failed(&format!("Failed to add {}", company.name), &e);
                Err(e)
            }
        }
    }

    /// Patch the named fields. The local record changes immediately; the
    /// confirmed row replaces it without a full reload.
    pub async fn update(
        &self,
        id: &str,
        update: UpdateCompanyRequest,
    ) -> Result<Company, StoreError> {
        match self.apply_update(id, update).await {
            Ok(saved) => {
                self.succeeded(format!("Updated {}", saved.name));
                Ok(saved)
            }
            Err(e) => {
                self.failed(&format!("Failed to update company {}", id), &e);
                Err(e)
            }
        }
    }

    /// Optimistic patch without notifications or the error banner.
    async fn apply_update(
        &self,
        id: &str,
        update: UpdateCompanyRequest,
    ) -> Result<Company, StoreError> {
        let local = update.clone();
        let result = self
            .companies
            .apply(
                LocalMutation::Patch {
                    key: id.to_string(),
                    apply: Box::new(move |company: &mut Company| company.apply_update(&local)),
                },
                self.remote_update(id, &update),
                || self.resync(),
            )
            .await;

        let saved = mapper::stored_to_app(result?);
        self.companies.upsert(saved.clone());
        Ok(saved)
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let name = self
            .companies
            .get(id)
            .map(|company| company.name)
            .unwrap_or_else(|| id.to_string());

        let result = self
            .companies
            .apply(
                LocalMutation::Remove(id.to_string()),
                self.remote_delete(id),
                || self.resync(),
            )
            .await;

        match result {
            Ok(()) => {
                self.succeeded(format!("Deleted {}", name));
                Ok(())
            }
            Err(e) => {
                self.failed(&format!("Failed to delete {}", name), &e);
                Err(e)
            }
        }
    }

    fn begin_upload(&self) -> Result<FlagGuard<'_>, StoreError> {
        self.uploading_logo
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| StoreError::UploadInProgress)?;
        Ok(FlagGuard(&self.uploading_logo))
    }

    async fn store_logo_object(
        &self,
        id: &str,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<String, StoreError> {
        if bytes.is_empty() {
            return Err(StoreError::InvalidLogo("file is empty".to_string()));
        }
        if bytes.len() > MAX_LOGO_BYTES {
            return Err(StoreError::InvalidLogo(format!(
                "file is larger than {} bytes",
                MAX_LOGO_BYTES
            )));
        }
        if logo_extension(file_name).is_none() {
            return Err(StoreError::InvalidLogo(format!(
                "unsupported file type: {}",
                file_name
            )));
        }

        match self.backend.upload_logo_object(id, bytes, file_name).await {
            Ok(url) => {
                let url = format!("{}?v={}", url, Utc::now().timestamp_millis());
                self.succeeded(format!("Uploaded logo for company {}", id));
                Ok(url)
            }
            Err(e) => {
                let e = StoreError::from(e);
                self.failed(&format!("Failed to upload logo for company {}", id), &e);
                Err(e)
            }
        }
    }

    /// Upload a logo without touching the record; the caller persists the
    /// URL, typically through the edit form's own submit.
    pub async fn upload_logo_file(
        &self,
        id: &str,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<String, StoreError> {
        let _guard = self.begin_upload()?;
        self.store_logo_object(id, bytes, file_name).await
    }

    /// Upload a logo and try to persist its URL onto the record. Only one
    /// upload runs per store at a time; an overlapping call is rejected.
    pub async fn upload_logo(
        &self,
        id: &str,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<LogoUploadResponse, StoreError> {
        let _guard = self.begin_upload()?;
        let url = self.store_logo_object(id, bytes, file_name).await?;

        let persisted = match self.apply_update(id, UpdateCompanyRequest::logo(url.clone())).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Logo uploaded but URL not saved for company {}: {}", id, e);
                false
            }
        };

        Ok(LogoUploadResponse { url, persisted })
    }

    /// Local record, falling back to the backend for ids not loaded yet.
    pub async fn get(&self, id: &str) -> Result<Option<Company>, StoreError> {
        if let Some(company) = self.companies.get(id) {
            return Ok(Some(company));
        }
        let row = self
            .backend
            .get_by_id(id)
            .await
            .map_err(|e| self.read_failed(&format!("Failed to load company {}", id), e))?;
        Ok(row.map(mapper::stored_to_app))
    }

    fn read_failed(&self, context: &str, error: RemoteError) -> StoreError {
        let message = format!("{}: {}", context, error);
        tracing::warn!("{}", message);
        self.set_error(Some(message));
        StoreError::from(error)
    }

    pub fn highlighted(&self) -> Vec<Company> {
        search::highlighted(&self.companies())
    }

    pub fn by_category(&self, category: CompanyCategory) -> Vec<Company> {
        search::in_category(&self.companies(), category)
    }

    /// Server-side category filter. Falls back to the local list when the
    /// backend is unreachable.
    pub async fn fetch_category(&self, category: CompanyCategory) -> Vec<Company> {
        match self
            .backend
            .get_by_category(StoredCategory::from(category))
            .await
        {
            Ok(rows) => rows.into_iter().map(mapper::stored_to_app).collect(),
            Err(e) => {
                let message = format!("Failed to load {} companies: {}", category, e);
                tracing::warn!("{}", message);
                self.set_error(Some(message));
                self.by_category(category)
            }
        }
    }

    pub fn search(&self, query: &str, limit: usize) -> Vec<Company> {
        search::filter(&self.companies(), query, limit)
    }

    pub async fn search_remote(&self, query: &str) -> Result<Vec<Company>, StoreError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let rows = self
            .backend
            .search(query)
            .await
            .map_err(|e| self.read_failed(&format!("Failed to search for {:?}", query), e))?;
        Ok(rows.into_iter().map(mapper::stored_to_app).collect())
    }
}
