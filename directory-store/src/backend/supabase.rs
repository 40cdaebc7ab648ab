use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{
    logo_content_type, logo_extension, logo_object_key, logo_object_keys, CompanyBackend,
    SessionUser,
};
use crate::error::RemoteError;
use crate::mapper::{self, StoredCategory, StoredCompany, StoredCompanyPatch};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    pub api_key: String,
    pub table: String,
    pub logo_bucket: String,
}

/// PostgREST + storage client for the hosted `companies` table.
pub struct SupabaseBackend {
    client: Client,
    config: SupabaseConfig,
}

#[derive(Serialize)]
struct RemoveObjects<'a> {
    prefixes: Vec<&'a str>,
}

impl SupabaseBackend {
    pub fn new(mut config: SupabaseConfig) -> Result<Self, RemoteError> {
        config.url = config.url.trim_end_matches('/').to_string();
        url::Url::parse(&config.url)
            .map_err(|e| RemoteError::Config(format!("Invalid backend url {}: {}", config.url, e)))?;

        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| RemoteError::Config(format!("Invalid api key: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| RemoteError::Config(format!("Invalid api key: {}", e)))?;
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self { client, config })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.config.url, self.config.table)
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.config.url, self.config.logo_bucket, key
        )
    }

    pub fn public_logo_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.url, self.config.logo_bucket, key
        )
    }

    /// Object key for a public URL in our bucket, ignoring any query string.
    fn key_from_public_url(&self, url: &str) -> Option<String> {
        let prefix = self.public_logo_url("");
        let rest = url.strip_prefix(&prefix)?;
        let key = rest.split('?').next()?;
        (!key.is_empty()).then(|| key.to_string())
    }

    async fn send(request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!("Backend returned {}: {}", status, body);
        Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn rows<T: DeserializeOwned>(request: RequestBuilder) -> Result<Vec<T>, RemoteError> {
        let response = Self::send(request).await?;
        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    fn select(&self) -> RequestBuilder {
        self.client
            .get(self.table_url())
            .query(&[("select", "*")])
    }

    /// Remove every object a logo for `row` may have been stored under: each
    /// extension's deterministic key plus whatever `logo_url` points at.
    async fn remove_logos_for(&self, row: &StoredCompany) {
        let mut keys = logo_object_keys(&row.id);
        if let Some(key) = row
            .logo_url
            .as_deref()
            .and_then(|url| self.key_from_public_url(url))
        {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        let request = self
            .client
            .delete(format!(
                "{}/storage/v1/object/{}",
                self.config.url, self.config.logo_bucket
            ))
            .json(&RemoveObjects {
                prefixes: keys.iter().map(String::as_str).collect(),
            });

        if let Err(e) = Self::send(request).await {
            tracing::warn!("Failed to remove logos for company {}: {}", row.id, e);
        }
    }
}

/// Literal substring pattern for `ilike`. `*` is PostgREST's wildcard and is
/// dropped; `%`, `_` and the escape character itself are escaped.
fn ilike_pattern(query: &str) -> String {
    let mut pattern = String::from("ilike.*");
    for c in query.trim().chars() {
        match c {
            '*' => {}
            '%' | '_' | '\\' => {
                pattern.push('\\');
                pattern.push(c);
            }
            _ => pattern.push(c),
        }
    }
    pattern.push('*');
    pattern
}

#[async_trait]
impl CompanyBackend for SupabaseBackend {
    async fn get_all(&self) -> Result<Vec<StoredCompany>, RemoteError> {
        Self::rows(self.select()).await
    }

    async fn get_by_category(
        &self,
        category: StoredCategory,
    ) -> Result<Vec<StoredCompany>, RemoteError> {
        let filter = format!("eq.{}", category.as_str());
        Self::rows(self.select().query(&[("category", filter.as_str())])).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<StoredCompany>, RemoteError> {
        let filter = format!("eq.{}", id);
        let rows: Vec<StoredCompany> =
            Self::rows(self.select().query(&[("id", filter.as_str())])).await?;
        Ok(rows.into_iter().next())
    }

    async fn search(&self, query: &str) -> Result<Vec<StoredCompany>, RemoteError> {
        let filter = ilike_pattern(query);
        Self::rows(self.select().query(&[("name", filter.as_str())])).await
    }

    async fn add(&self, mut company: StoredCompany) -> Result<StoredCompany, RemoteError> {
        company.last_updated = Some(mapper::format_timestamp(chrono::Utc::now()));
        let id = company.id.clone();

        let request = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(&company);

        let rows: Vec<StoredCompany> = match Self::rows(request).await {
            Err(RemoteError::Status { status: 409, .. }) => {
                return Err(RemoteError::Duplicate(id));
            }
            other => other?,
        };

        rows.into_iter()
            .next()
            .ok_or_else(|| RemoteError::Decode(format!("Insert of {} returned no row", id)))
    }

    async fn update(
        &self,
        id: &str,
        mut patch: StoredCompanyPatch,
    ) -> Result<Option<StoredCompany>, RemoteError> {
        patch.last_updated = Some(mapper::format_timestamp(chrono::Utc::now()));
        let filter = format!("eq.{}", id);

        let request = self
            .client
            .patch(self.table_url())
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=representation")
            .json(&patch);

        let rows: Vec<StoredCompany> = Self::rows(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, id: &str) -> Result<bool, RemoteError> {
        let filter = format!("eq.{}", id);
        let request = self
            .client
            .delete(self.table_url())
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=representation");

        let rows: Vec<StoredCompany> = Self::rows(request).await?;
        for row in &rows {
            self.remove_logos_for(row).await;
        }

        Ok(!rows.is_empty())
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

        let request = self
            .client
            .post(self.object_url(&key))
            .header(CONTENT_TYPE, logo_content_type(&extension))
            .header("x-upsert", "true")
            .body(bytes);

        Self::send(request).await.map_err(|e| match e {
            RemoteError::Status { status, body } => {
                RemoteError::Storage(format!("{} ({})", body, status))
            }
            other => other,
        })?;

        tracing::info!("Uploaded logo {} for company {}", key, id);
        Ok(self.public_logo_url(&key))
    }

    async fn session_user(&self, access_token: &str) -> Result<Option<SessionUser>, RemoteError> {
        if access_token.trim().is_empty() {
            return Ok(None);
        }

        let request = self
            .client
            .get(format!("{}/auth/v1/user", self.config.url))
            .bearer_auth(access_token);

        let response = match Self::send(request).await {
            Ok(response) => response,
            Err(e) if e.is_auth_failure() => return Ok(None),
            Err(e) => return Err(e),
        };

        response
            .json::<SessionUser>()
            .await
            .map(Some)
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}
