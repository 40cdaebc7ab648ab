use serde::{Deserialize, Serialize};

pub mod category;
pub mod company;
pub mod status;

pub use category::{CompanyCategory, UnknownCategory};
pub use company::{
    CategoriesResponse, CategorySummary, CompaniesResponse, Company, CompanyDetails,
    CreateCompanyRequest, LogoUploadResponse, SearchResponse, UpdateCompanyRequest,
};
pub use status::{BackendMode, FieldError, StatusResponse, ValidationErrorResponse};

/// Error response for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
