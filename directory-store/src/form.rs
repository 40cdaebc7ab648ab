//! Admin edit form: schema validation and change detection.
//!
//! Validation runs before anything reaches the store, so an invalid form never
//! produces a network call. Change detection compares the current form against
//! the snapshot taken when editing started.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use shared_types::{
    Company, CompanyCategory, CompanyDetails, CreateCompanyRequest, FieldError,
    UpdateCompanyRequest,
};

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 100;
const DESCRIPTION_MIN: usize = 10;
const FOUNDED_YEAR_MIN: i32 = 1800;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyForm {
    pub name: String,
    pub website: String,
    pub description: String,
    pub category: Option<CompanyCategory>,
    pub logo_url: String,
    pub target_audience: String,
    pub summary: String,
    pub highlighted: bool,
    pub features: Vec<String>,
    pub pricing: String,
    pub best_for: String,
    pub linkedin_url: String,
    pub founded_year: Option<i32>,
    pub headquarters: String,
    pub employee_count: String,
    pub funding_stage: String,
}

fn is_http_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}

impl CompanyForm {
    pub fn from_company(company: &Company) -> Self {
        Self {
            name: company.name.clone(),
            website: company.website.clone(),
            description: company.description.clone(),
            category: Some(company.category),
            logo_url: company.logo_url.clone(),
            target_audience: company.target_audience.clone(),
            summary: company.details.summary.clone(),
            highlighted: company.details.highlighted,
            features: company.details.features.clone(),
            pricing: company.details.pricing.clone(),
            best_for: company.details.best_for.clone(),
            linkedin_url: company.linkedin_url.clone(),
            founded_year: company.founded_year,
            headquarters: company.headquarters.clone(),
            employee_count: company.employee_count.clone(),
            funding_stage: company.funding_stage.clone(),
        }
    }

    /// Every rule violation, or `Ok` when the form may be submitted.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        let name_len = self.name.trim().chars().count();
        if name_len < NAME_MIN {
            errors.push(FieldError::new(
                "name",
                format!("Name must be at least {} characters", NAME_MIN),
            ));
        } else if name_len > NAME_MAX {
            errors.push(FieldError::new(
                "name",
                format!("Name must be at most {} characters", NAME_MAX),
            ));
        }

        if !is_http_url(self.website.trim()) {
            errors.push(FieldError::new("website", "Website must be a valid URL"));
        }

        if self.description.trim().chars().count() < DESCRIPTION_MIN {
            errors.push(FieldError::new(
                "description",
                format!("Description must be at least {} characters", DESCRIPTION_MIN),
            ));
        }

        if self.category.is_none() {
            errors.push(FieldError::new("category", "Please select a category"));
        }

        for (field, value) in [("logoUrl", &self.logo_url), ("linkedinUrl", &self.linkedin_url)] {
            if !value.trim().is_empty() && !is_http_url(value.trim()) {
                errors.push(FieldError::new(field, "Must be a valid URL"));
            }
        }

        if let Some(year) = self.founded_year {
            let current_year = chrono::Utc::now().year();
            if !(FOUNDED_YEAR_MIN..=current_year).contains(&year) {
                errors.push(FieldError::new(
                    "foundedYear",
                    format!(
                        "Founded year must be between {} and {}",
                        FOUNDED_YEAR_MIN, current_year
                    ),
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn details(&self) -> CompanyDetails {
        CompanyDetails {
            summary: self.summary.trim().to_string(),
            highlighted: self.highlighted,
            features: self
                .features
                .iter()
                .map(|feature| feature.trim())
                .filter(|feature| !feature.is_empty())
                .map(str::to_string)
                .collect(),
            pricing: self.pricing.trim().to_string(),
            best_for: self.best_for.trim().to_string(),
        }
    }

    fn normalized(&self) -> Self {
        let details = self.details();
        Self {
            name: self.name.trim().to_string(),
            website: self.website.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category,
            logo_url: self.logo_url.trim().to_string(),
            target_audience: self.target_audience.trim().to_string(),
            summary: details.summary,
            highlighted: details.highlighted,
            features: details.features,
            pricing: details.pricing,
            best_for: details.best_for,
            linkedin_url: self.linkedin_url.trim().to_string(),
            founded_year: self.founded_year,
            headquarters: self.headquarters.trim().to_string(),
            employee_count: self.employee_count.trim().to_string(),
            funding_stage: self.funding_stage.trim().to_string(),
        }
    }

    /// Fields that differ from `initial`, or `None` when there is nothing to
    /// save. Whitespace-only edits do not count as changes.
    pub fn changes(&self, initial: &CompanyForm) -> Option<UpdateCompanyRequest> {
        let current = self.normalized();
        let initial = initial.normalized();
        if current == initial {
            return None;
        }

        fn changed<T: PartialEq + Clone>(current: &T, initial: &T) -> Option<T> {
            (current != initial).then(|| current.clone())
        }

        let details = current.details();
        let update = UpdateCompanyRequest {
            name: changed(&current.name, &initial.name),
            website: changed(&current.website, &initial.website),
            description: changed(&current.description, &initial.description),
            category: changed(&current.category, &initial.category).flatten(),
            logo_url: changed(&current.logo_url, &initial.logo_url),
            target_audience: changed(&current.target_audience, &initial.target_audience),
            details: changed(&details, &initial.details()),
            linkedin_url: changed(&current.linkedin_url, &initial.linkedin_url),
            founded_year: changed(&current.founded_year, &initial.founded_year),
            headquarters: changed(&current.headquarters, &initial.headquarters),
            employee_count: changed(&current.employee_count, &initial.employee_count),
            funding_stage: changed(&current.funding_stage, &initial.funding_stage),
        };

        (!update.is_empty()).then_some(update)
    }

    /// Validate and build a create request. `id` may be left for the store
    /// to generate.
    pub fn into_create(self, id: Option<String>) -> Result<CreateCompanyRequest, Vec<FieldError>> {
        self.validate()?;
        let form = self.normalized();
        let details = form.details();

        let category = form
            .category
            .ok_or_else(|| vec![FieldError::new("category", "Please select a category")])?;

        fn optional(value: String) -> Option<String> {
            (!value.is_empty()).then_some(value)
        }

        Ok(CreateCompanyRequest {
            id,
            name: form.name,
            website: form.website,
            description: form.description,
            category,
            logo_url: optional(form.logo_url),
            target_audience: optional(form.target_audience),
            details: Some(details),
            linkedin_url: optional(form.linkedin_url),
            founded_year: form.founded_year,
            headquarters: optional(form.headquarters),
            employee_count: optional(form.employee_count),
            funding_stage: optional(form.funding_stage),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> CompanyForm {
        CompanyForm {
            name: "Acme".to_string(),
            website: "https://acme.ai".to_string(),
            description: "10 chars min".to_string(),
            category: Some(CompanyCategory::StrategyPlanning),
            features: vec!["Planning".to_string()],
            ..Default::default()
        }
    }

    fn fields(errors: Vec<FieldError>) -> Vec<String> {
        errors.into_iter().map(|e| e.field).collect()
    }

    #[test]
    fn test_valid_form_passes() {
        assert_eq!(valid_form().validate(), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let form = CompanyForm {
            name: "A".to_string(),
            website: "acme".to_string(),
            description: "short".to_string(),
            category: None,
            linkedin_url: "linkedin".to_string(),
            founded_year: Some(1700),
            ..Default::default()
        };

        let errors = fields(form.validate().unwrap_err());
        assert_eq!(
            errors,
            vec!["name", "website", "description", "category", "linkedinUrl", "foundedYear"]
        );
    }

    #[test]
    fn test_rejects_non_http_website() {
        let form = CompanyForm {
            website: "ftp://acme.ai".to_string(),
            ..valid_form()
        };
        assert_eq!(fields(form.validate().unwrap_err()), vec!["website"]);
    }

    #[test]
    fn test_unchanged_form_has_no_changes() {
        let form = valid_form();
        assert_eq!(form.changes(&form.clone()), None);

        let padded = CompanyForm {
            name: "  Acme ".to_string(),
            ..valid_form()
        };
        assert_eq!(padded.changes(&form), None);
    }

    #[test]
    fn test_changes_contain_only_edited_fields() {
        let initial = valid_form();
        let edited = CompanyForm {
            description: "A longer description".to_string(),
            highlighted: true,
            ..valid_form()
        };

        let update = edited.changes(&initial).unwrap();
        assert_eq!(update.description.as_deref(), Some("A longer description"));
        assert!(update.details.as_ref().is_some_and(|d| d.highlighted));
        assert!(update.name.is_none());
        assert!(update.website.is_none());
    }

    #[test]
    fn test_clearing_founded_year_is_a_change() {
        let initial = CompanyForm {
            founded_year: Some(2019),
            ..valid_form()
        };
        let edited = valid_form();

        let update = edited.changes(&initial).unwrap();
        assert_eq!(update.founded_year, Some(None));
    }

    #[test]
    fn test_into_create_trims_and_drops_blank_features() {
        let form = CompanyForm {
            features: vec![" Planning ".to_string(), "  ".to_string()],
            headquarters: "  ".to_string(),
            ..valid_form()
        };

        let request = form.into_create(None).unwrap();
        assert_eq!(request.category, CompanyCategory::StrategyPlanning);
        assert_eq!(
            request.details.map(|d| d.features),
            Some(vec!["Planning".to_string()])
        );
        assert_eq!(request.headquarters, None);
        assert_eq!(request.id, None);
    }

    #[test]
    fn test_into_create_rejects_invalid_form() {
        let form = CompanyForm {
            description: "tiny".to_string(),
            ..valid_form()
        };
        assert!(form.into_create(None).is_err());
    }
}
