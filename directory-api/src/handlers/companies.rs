use actix_web::{web, HttpResponse, Result as ActixResult};
use serde::Deserialize;
use shared_types::{CompaniesResponse, CompanyCategory};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

pub async fn list_companies(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> ActixResult<HttpResponse> {
    let companies = match query.category.as_deref() {
        Some(slug) => {
            let category = CompanyCategory::from_slug(slug)
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            state.store.by_category(category)
        }
        None => state.store.companies(),
    };

    Ok(HttpResponse::Ok().json(CompaniesResponse { companies }))
}

pub async fn list_highlighted(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(CompaniesResponse {
        companies: state.store.highlighted(),
    }))
}

pub async fn get_company(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let company_id = path.into_inner();

    let company = state
        .store
        .get(&company_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound(format!("Company not found: {}", company_id)))?;

    Ok(HttpResponse::Ok().json(company))
}
