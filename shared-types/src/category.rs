use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Marketing function a listed company belongs to.
///
/// Serialized by its display label, which is what the admin form and the
/// public pages show. Use [`CompanyCategory::slug`] for URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CompanyCategory {
    #[serde(rename = "Strategy & Planning")]
    StrategyPlanning,
    #[serde(rename = "Content Creation")]
    ContentCreation,
    #[serde(rename = "Social Media")]
    SocialMedia,
    #[serde(rename = "SEO & SEM")]
    SeoSem,
    #[serde(rename = "Email Marketing")]
    EmailMarketing,
    #[serde(rename = "Advertising & PPC")]
    AdvertisingPpc,
    #[serde(rename = "Analytics & Insights")]
    AnalyticsInsights,
    #[serde(rename = "Customer Experience")]
    CustomerExperience,
    #[serde(rename = "Sales Enablement")]
    SalesEnablement,
    #[serde(rename = "Marketing Automation")]
    MarketingAutomation,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl CompanyCategory {
    /// Every category, in the order the navigation lists them.
    pub fn all() -> &'static [CompanyCategory] {
        &[
            CompanyCategory::StrategyPlanning,
            CompanyCategory::ContentCreation,
            CompanyCategory::SocialMedia,
            CompanyCategory::SeoSem,
            CompanyCategory::EmailMarketing,
            CompanyCategory::AdvertisingPpc,
            CompanyCategory::AnalyticsInsights,
            CompanyCategory::CustomerExperience,
            CompanyCategory::SalesEnablement,
            CompanyCategory::MarketingAutomation,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompanyCategory::StrategyPlanning => "Strategy & Planning",
            CompanyCategory::ContentCreation => "Content Creation",
            CompanyCategory::SocialMedia => "Social Media",
            CompanyCategory::SeoSem => "SEO & SEM",
            CompanyCategory::EmailMarketing => "Email Marketing",
            CompanyCategory::AdvertisingPpc => "Advertising & PPC",
            CompanyCategory::AnalyticsInsights => "Analytics & Insights",
            CompanyCategory::CustomerExperience => "Customer Experience",
            CompanyCategory::SalesEnablement => "Sales Enablement",
            CompanyCategory::MarketingAutomation => "Marketing Automation",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            CompanyCategory::StrategyPlanning => "strategy-planning",
            CompanyCategory::ContentCreation => "content-creation",
            CompanyCategory::SocialMedia => "social-media",
            CompanyCategory::SeoSem => "seo-sem",
            CompanyCategory::EmailMarketing => "email-marketing",
            CompanyCategory::AdvertisingPpc => "advertising-ppc",
            CompanyCategory::AnalyticsInsights => "analytics-insights",
            CompanyCategory::CustomerExperience => "customer-experience",
            CompanyCategory::SalesEnablement => "sales-enablement",
            CompanyCategory::MarketingAutomation => "marketing-automation",
        }
    }

    pub fn from_slug(slug: &str) -> Result<Self, UnknownCategory> {
        let wanted = slug.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|category| category.slug() == wanted)
            .ok_or(UnknownCategory(slug.to_string()))
    }
}

impl std::fmt::Display for CompanyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&CompanyCategory::StrategyPlanning).unwrap();
        assert_eq!(json, "\"Strategy & Planning\"");

        let parsed: CompanyCategory = serde_json::from_str("\"SEO & SEM\"").unwrap();
        assert_eq!(parsed, CompanyCategory::SeoSem);
    }

    #[test]
    fn test_slug_lookup_covers_every_category() {
        for category in CompanyCategory::all() {
            assert_eq!(CompanyCategory::from_slug(category.slug()), Ok(*category));
        }
        assert_eq!(CompanyCategory::all().len(), 10);
    }

    #[test]
    fn test_unknown_slug() {
        assert_eq!(
            CompanyCategory::from_slug("crypto"),
            Err(UnknownCategory("crypto".to_string()))
        );
        assert_eq!(
            CompanyCategory::from_slug(" Social-Media "),
            Ok(CompanyCategory::SocialMedia)
        );
    }
}
