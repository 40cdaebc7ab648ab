//! Conversion between the `companies` table rows and [`Company`].
//!
//! Rows use snake_case columns with nullable fields; the application shape is
//! camelCase with every optional field defaulted. Both directions are pure.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{Company, CompanyCategory, CompanyDetails, UpdateCompanyRequest};

/// Values accepted by the `category` column constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredCategory {
    StrategyPlanning,
    ContentCreation,
    SocialMedia,
    SeoSem,
    EmailMarketing,
    AdvertisingPpc,
    AnalyticsInsights,
    CustomerExperience,
    SalesEnablement,
    MarketingAutomation,
}

impl StoredCategory {
    /// Column value as PostgREST filters expect it.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoredCategory::StrategyPlanning => "strategy_planning",
            StoredCategory::ContentCreation => "content_creation",
            StoredCategory::SocialMedia => "social_media",
            StoredCategory::SeoSem => "seo_sem",
            StoredCategory::EmailMarketing => "email_marketing",
            StoredCategory::AdvertisingPpc => "advertising_ppc",
            StoredCategory::AnalyticsInsights => "analytics_insights",
            StoredCategory::CustomerExperience => "customer_experience",
            StoredCategory::SalesEnablement => "sales_enablement",
            StoredCategory::MarketingAutomation => "marketing_automation",
        }
    }
}

impl From<CompanyCategory> for StoredCategory {
    fn from(category: CompanyCategory) -> Self {
        match category {
            CompanyCategory::StrategyPlanning => StoredCategory::StrategyPlanning,
            CompanyCategory::ContentCreation => StoredCategory::ContentCreation,
            CompanyCategory::SocialMedia => StoredCategory::SocialMedia,
            CompanyCategory::SeoSem => StoredCategory::SeoSem,
            CompanyCategory::EmailMarketing => StoredCategory::EmailMarketing,
            CompanyCategory::AdvertisingPpc => StoredCategory::AdvertisingPpc,
            CompanyCategory::AnalyticsInsights => StoredCategory::AnalyticsInsights,
            CompanyCategory::CustomerExperience => StoredCategory::CustomerExperience,
            CompanyCategory::SalesEnablement => StoredCategory::SalesEnablement,
            CompanyCategory::MarketingAutomation => StoredCategory::MarketingAutomation,
        }
    }
}

impl From<StoredCategory> for CompanyCategory {
    fn from(category: StoredCategory) -> Self {
        match category {
            StoredCategory::StrategyPlanning => CompanyCategory::StrategyPlanning,
            StoredCategory::ContentCreation => CompanyCategory::ContentCreation,
            StoredCategory::SocialMedia => CompanyCategory::SocialMedia,
            StoredCategory::SeoSem => CompanyCategory::SeoSem,
            StoredCategory::EmailMarketing => CompanyCategory::EmailMarketing,
            StoredCategory::AdvertisingPpc => CompanyCategory::AdvertisingPpc,
            StoredCategory::AnalyticsInsights => CompanyCategory::AnalyticsInsights,
            StoredCategory::CustomerExperience => CompanyCategory::CustomerExperience,
            StoredCategory::SalesEnablement => CompanyCategory::SalesEnablement,
            StoredCategory::MarketingAutomation => CompanyCategory::MarketingAutomation,
        }
    }
}

/// The `details` jsonb column. Keys are camelCase inside the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDetails {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub highlighted: Option<bool>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub pricing: Option<String>,
    #[serde(default)]
    pub best_for: Option<String>,
}

/// One row of the `companies` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCompany {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
    pub category: StoredCategory,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub pricing: Option<String>,
    #[serde(default)]
    pub details: Option<StoredDetails>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub headquarters: Option<String>,
    #[serde(default)]
    pub employee_count: Option<String>,
    #[serde(default)]
    pub funding_stage: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Body of a PATCH against one row. Absent fields are not serialized and
/// therefore left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredCompanyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<StoredCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<StoredDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founded_year: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl StoredCompanyPatch {
    /// Overlay the patch onto a row, as the backend does for PATCH.
    pub fn apply_to(&self, row: &mut StoredCompany) {
        if let Some(name) = &self.name {
            row.name = name.clone();
        }
        if let Some(website) = &self.website {
            row.website = Some(website.clone());
        }
        if let Some(category) = self.category {
            row.category = category;
        }
        if let Some(description) = &self.description {
            row.description = Some(description.clone());
        }
        if let Some(logo_url) = &self.logo_url {
            row.logo_url = Some(logo_url.clone());
        }
        if let Some(target_audience) = &self.target_audience {
            row.target_audience = Some(target_audience.clone());
        }
        if let Some(features) = &self.features {
            row.features = Some(features.clone());
        }
        if let Some(pricing) = &self.pricing {
            row.pricing = Some(pricing.clone());
        }
        if let Some(details) = &self.details {
            row.details = Some(details.clone());
        }
        if let Some(linkedin_url) = &self.linkedin_url {
            row.linkedin_url = Some(linkedin_url.clone());
        }
        if let Some(founded_year) = self.founded_year {
            row.founded_year = founded_year;
        }
        if let Some(headquarters) = &self.headquarters {
            row.headquarters = Some(headquarters.clone());
        }
        if let Some(employee_count) = &self.employee_count {
            row.employee_count = Some(employee_count.clone());
        }
        if let Some(funding_stage) = &self.funding_stage {
            row.funding_stage = Some(funding_stage.clone());
        }
        if let Some(last_updated) = &self.last_updated {
            row.last_updated = Some(last_updated.clone());
        }
    }
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    match DateTime::parse_from_rfc3339(value) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!("Ignoring unparseable last_updated {:?}: {}", value, e);
            None
        }
    }
}

fn non_empty(value: Option<Vec<String>>) -> Option<Vec<String>> {
    value.filter(|v| !v.is_empty())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn stored_to_app(row: StoredCompany) -> Company {
    let details = row.details.unwrap_or_default();

    // The nested copy is canonical; older rows only carry the top-level columns.
    let features = non_empty(details.features)
        .or_else(|| non_empty(row.features))
        .unwrap_or_default();
    let pricing = non_blank(details.pricing)
        .or_else(|| non_blank(row.pricing))
        .unwrap_or_default();

    Company {
        id: row.id,
        name: row.name,
        website: row.website.unwrap_or_default(),
        description: row.description.unwrap_or_default(),
        category: row.category.into(),
        logo_url: row.logo_url.unwrap_or_default(),
        target_audience: row.target_audience.unwrap_or_default(),
        details: CompanyDetails {
            summary: details.summary.unwrap_or_default(),
            highlighted: details.highlighted.unwrap_or(false),
            features,
            pricing,
            best_for: details.best_for.unwrap_or_default(),
        },
        linkedin_url: row.linkedin_url.unwrap_or_default(),
        founded_year: row.founded_year,
        headquarters: row.headquarters.unwrap_or_default(),
        employee_count: row.employee_count.unwrap_or_default(),
        funding_stage: row.funding_stage.unwrap_or_default(),
        last_updated: parse_timestamp(row.last_updated.as_deref()),
    }
}

fn details_to_stored(details: &CompanyDetails) -> StoredDetails {
    StoredDetails {
        summary: Some(details.summary.clone()),
        highlighted: Some(details.highlighted),
        features: Some(details.features.clone()),
        pricing: Some(details.pricing.clone()),
        best_for: Some(details.best_for.clone()),
    }
}

pub fn app_to_stored(company: &Company) -> StoredCompany {
    StoredCompany {
        id: company.id.clone(),
        name: company.name.clone(),
        website: Some(company.website.clone()),
        category: company.category.into(),
        description: Some(company.description.clone()),
        logo_url: Some(company.logo_url.clone()),
        target_audience: Some(company.target_audience.clone()),
        features: Some(company.features().to_vec()),
        pricing: Some(company.pricing().to_string()),
        details: Some(details_to_stored(&company.details)),
        linkedin_url: Some(company.linkedin_url.clone()),
        founded_year: company.founded_year,
        headquarters: Some(company.headquarters.clone()),
        employee_count: Some(company.employee_count.clone()),
        funding_stage: Some(company.funding_stage.clone()),
        last_updated: company.last_updated.map(format_timestamp),
    }
}

/// Translate an application-level partial update into a row patch stamped
/// with `now`.
pub fn update_to_patch(update: &UpdateCompanyRequest, now: DateTime<Utc>) -> StoredCompanyPatch {
    let details = update.details.as_ref();

    StoredCompanyPatch {
        name: update.name.clone(),
        website: update.website.clone(),
        category: update.category.map(StoredCategory::from),
        description: update.description.clone(),
        logo_url: update.logo_url.clone(),
        target_audience: update.target_audience.clone(),
        features: details.map(|d| d.features.clone()),
        pricing: details.map(|d| d.pricing.clone()),
        details: details.map(details_to_stored),
        linkedin_url: update.linkedin_url.clone(),
        founded_year: update.founded_year,
        headquarters: update.headquarters.clone(),
        employee_count: update.employee_count.clone(),
        funding_stage: update.funding_stage.clone(),
        last_updated: Some(format_timestamp(now)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn company() -> Company {
        Company {
            id: "c-1".to_string(),
            name: "Acme".to_string(),
            website: "https://acme.ai".to_string(),
            description: "Plans campaigns end to end".to_string(),
            category: CompanyCategory::StrategyPlanning,
            logo_url: String::new(),
            target_audience: "CMOs".to_string(),
            details: CompanyDetails {
                summary: "Planning copilot".to_string(),
                highlighted: true,
                features: vec!["Briefs".to_string(), "Budgets".to_string()],
                pricing: "From $99/mo".to_string(),
                best_for: String::new(),
            },
            linkedin_url: String::new(),
            founded_year: Some(2020),
            headquarters: "Berlin".to_string(),
            employee_count: "11-50".to_string(),
            funding_stage: "Seed".to_string(),
            last_updated: Some(Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap()),
        }
    }

    #[test]
    fn test_round_trip_preserves_company() {
        let original = company();
        let restored = stored_to_app(app_to_stored(&original));

        assert_eq!(restored.id, original.id);
        assert_eq!(restored.name, original.name);
        assert_eq!(restored.website, original.website);
        assert_eq!(restored.category, original.category);
        assert_eq!(restored.description, original.description);
        assert_eq!(restored, original);
    }

    #[test]
    fn test_round_trip_of_sparse_company_defaults() {
        let mut sparse = company();
        sparse.details = CompanyDetails::default();
        sparse.last_updated = None;
        sparse.founded_year = None;

        let restored = stored_to_app(app_to_stored(&sparse));
        assert_eq!(restored.details.best_for, "");
        assert!(restored.features().is_empty());
        assert!(restored.last_updated.is_none());
    }

    #[test]
    fn test_every_category_maps_both_ways() {
        for category in CompanyCategory::all() {
            let stored = StoredCategory::from(*category);
            assert_eq!(CompanyCategory::from(stored), *category);

            let json = serde_json::to_string(&stored).unwrap();
            assert_eq!(json, format!("\"{}\"", stored.as_str()));
        }
    }

    #[test]
    fn test_sparse_row_defaults_every_field() {
        let row: StoredCompany = serde_json::from_str(
            r#"{"id": "r1", "name": "Bare", "category": "seo_sem"}"#,
        )
        .unwrap();

        let company = stored_to_app(row);
        assert_eq!(company.category, CompanyCategory::SeoSem);
        assert_eq!(company.website, "");
        assert_eq!(company.description, "");
        assert!(!company.is_highlighted());
        assert!(company.features().is_empty());
        assert!(company.last_updated.is_none());
    }

    #[test]
    fn test_top_level_features_used_when_details_missing() {
        let row: StoredCompany = serde_json::from_str(
            r#"{
                "id": "r2",
                "name": "Legacy",
                "category": "email_marketing",
                "features": ["Send-time optimization"],
                "pricing": "Custom",
                "details": {"summary": "Old row", "bestFor": "Retail"}
            }"#,
        )
        .unwrap();

        let company = stored_to_app(row);
        assert_eq!(company.features(), ["Send-time optimization".to_string()]);
        assert_eq!(company.pricing(), "Custom");
        assert_eq!(company.details.best_for, "Retail");
    }

    #[test]
    fn test_bad_timestamp_reads_as_none() {
        assert!(parse_timestamp(Some("yesterday")).is_none());
        assert!(parse_timestamp(Some("")).is_none());
        assert!(parse_timestamp(None).is_none());
        assert!(parse_timestamp(Some("2024-05-01T10:00:00.123456+00:00")).is_some());
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let update = UpdateCompanyRequest {
            name: Some("Acme AI".to_string()),
            founded_year: Some(None),
            ..Default::default()
        };
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();

        let patch = update_to_patch(&update, now);
        let json = serde_json::to_value(&patch).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "name": "Acme AI",
                "founded_year": null,
                "last_updated": "2025-01-02T03:04:05.000Z"
            })
        );
    }

    #[test]
    fn test_patch_with_details_mirrors_top_level_columns() {
        let update = UpdateCompanyRequest {
            details: Some(CompanyDetails {
                features: vec!["A/B testing".to_string()],
                pricing: "Free".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };

        let patch = update_to_patch(&update, Utc::now());
        assert_eq!(patch.features, Some(vec!["A/B testing".to_string()]));
        assert_eq!(patch.pricing.as_deref(), Some("Free"));

        let mut row = app_to_stored(&company());
        patch.apply_to(&mut row);
        let company = stored_to_app(row);
        assert_eq!(company.features(), ["A/B testing".to_string()]);
        assert_eq!(company.name, "Acme");
    }
}
