use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::category::CompanyCategory;

/// A listed AI marketing tool vendor, in the shape the UI renders.
///
/// Optional text fields are empty strings rather than absent so rendering
/// never has to branch on missing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub website: String,
    pub description: String,
    pub category: CompanyCategory,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub details: CompanyDetails,
    #[serde(default)]
    pub linkedin_url: String,
    #[serde(default)]
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub headquarters: String,
    #[serde(default)]
    pub employee_count: String,
    #[serde(default)]
    pub funding_stage: String,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Nested listing details. `features` and `pricing` live here only;
/// [`Company::features`] and [`Company::pricing`] read through to them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CompanyDetails {
    pub summary: String,
    /// Drives placement in the featured sections.
    pub highlighted: bool,
    pub features: Vec<String>,
    pub pricing: String,
    pub best_for: String,
}

impl Company {
    pub fn features(&self) -> &[String] {
        &self.details.features
    }

    pub fn pricing(&self) -> &str {
        &self.details.pricing
    }

    pub fn is_highlighted(&self) -> bool {
        self.details.highlighted
    }

    /// Overlay every field present in `update`, leaving the rest untouched.
    pub fn apply_update(&mut self, update: &UpdateCompanyRequest) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(website) = &update.website {
            self.website = website.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(logo_url) = &update.logo_url {
            self.logo_url = logo_url.clone();
        }
        if let Some(target_audience) = &update.target_audience {
            self.target_audience = target_audience.clone();
        }
        if let Some(details) = &update.details {
            self.details = details.clone();
        }
        if let Some(linkedin_url) = &update.linkedin_url {
            self.linkedin_url = linkedin_url.clone();
        }
        if let Some(founded_year) = update.founded_year {
            self.founded_year = founded_year;
        }
        if let Some(headquarters) = &update.headquarters {
            self.headquarters = headquarters.clone();
        }
        if let Some(employee_count) = &update.employee_count {
            self.employee_count = employee_count.clone();
        }
        if let Some(funding_stage) = &update.funding_stage {
            self.funding_stage = funding_stage.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateCompanyRequest {
    /// Generated when absent or blank.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub website: String,
    pub description: String,
    pub category: CompanyCategory,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub details: Option<CompanyDetails>,
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
}

impl CreateCompanyRequest {
    pub fn into_company(self, id: String, last_updated: DateTime<Utc>) -> Company {
        Company {
            id,
            name: self.name,
            website: self.website,
            description: self.description,
            category: self.category,
            logo_url: self.logo_url.unwrap_or_default(),
            target_audience: self.target_audience.unwrap_or_default(),
            details: self.details.unwrap_or_default(),
            linkedin_url: self.linkedin_url.unwrap_or_default(),
            founded_year: self.founded_year,
            headquarters: self.headquarters.unwrap_or_default(),
            employee_count: self.employee_count.unwrap_or_default(),
            funding_stage: self.funding_stage.unwrap_or_default(),
            last_updated: Some(last_updated),
        }
    }
}

/// Partial update: only the fields that are `Some` are written.
///
/// `founded_year` is doubly optional so a patch can clear it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub category: Option<CompanyCategory>,
    pub logo_url: Option<String>,
    pub target_audience: Option<String>,
    pub details: Option<CompanyDetails>,
    pub linkedin_url: Option<String>,
    #[serde(
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub founded_year: Option<Option<i32>>,
    pub headquarters: Option<String>,
    pub employee_count: Option<String>,
    pub funding_stage: Option<String>,
}

// An explicit `null` means "clear", which plain `Option<Option<_>>` would
// collapse into "absent".
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateCompanyRequest {
    pub fn logo(url: impl Into<String>) -> Self {
        Self {
            logo_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CompaniesResponse {
    pub companies: Vec<Company>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategorySummary {
    pub category: CompanyCategory,
    pub label: String,
    pub slug: String,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoriesResponse {
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<Company>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LogoUploadResponse {
    pub url: String,
    /// Whether the URL was also written onto the company record.
    pub persisted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Company {
        Company {
            id: "acme".to_string(),
            name: "Acme".to_string(),
            website: "https://acme.ai".to_string(),
            description: "Campaign planning assistant".to_string(),
            category: CompanyCategory::StrategyPlanning,
            logo_url: String::new(),
            target_audience: String::new(),
            details: CompanyDetails {
                features: vec!["Briefs".to_string()],
                pricing: "From $49/mo".to_string(),
                ..Default::default()
            },
            linkedin_url: String::new(),
            founded_year: Some(2021),
            headquarters: String::new(),
            employee_count: String::new(),
            funding_stage: String::new(),
            last_updated: None,
        }
    }

    #[test]
    fn test_company_deserializes_with_defaults() {
        let json = r#"{
            "id": "x1",
            "name": "Minimal",
            "website": "https://minimal.io",
            "description": "Only the required fields",
            "category": "Social Media"
        }"#;

        let company: Company = serde_json::from_str(json).unwrap();
        assert_eq!(company.logo_url, "");
        assert!(company.features().is_empty());
        assert!(!company.is_highlighted());
        assert_eq!(company.details.best_for, "");
        assert!(company.last_updated.is_none());
    }

    #[test]
    fn test_apply_update_only_touches_present_fields() {
        let mut company = sample();
        let update = UpdateCompanyRequest {
            name: Some("Acme AI".to_string()),
            founded_year: Some(None),
            ..Default::default()
        };

        company.apply_update(&update);

        assert_eq!(company.name, "Acme AI");
        assert_eq!(company.founded_year, None);
        assert_eq!(company.website, "https://acme.ai");
        assert_eq!(company.features(), ["Briefs".to_string()]);
        assert_eq!(company.pricing(), "From $49/mo");
    }

    #[test]
    fn test_update_request_camel_case() {
        let update: UpdateCompanyRequest =
            serde_json::from_str(r#"{"logoUrl": "https://cdn/x.png"}"#).unwrap();
        assert_eq!(update, UpdateCompanyRequest::logo("https://cdn/x.png"));
        assert!(!update.is_empty());
        assert!(UpdateCompanyRequest::default().is_empty());
    }

    #[test]
    fn test_update_request_null_founded_year_clears() {
        let update: UpdateCompanyRequest =
            serde_json::from_str(r#"{"foundedYear": null}"#).unwrap();
        assert_eq!(update.founded_year, Some(None));

        let absent: UpdateCompanyRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.founded_year, None);
    }
}
