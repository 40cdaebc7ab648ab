//! Authenticated create, edit, delete and logo endpoints.

use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use directory_store::CompanyForm;
use serde::Deserialize;
use shared_types::LogoUploadResponse;

use crate::error::ApiError;
use crate::handlers::status::status_response;
use crate::helpers::session::require_admin;
use crate::AppState;

async fn authorize(req: &HttpRequest, state: &AppState) -> Result<(), ApiError> {
    require_admin(req, &**state.store.backend()).await?;
    Ok(())
}

pub async fn create_company(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Json<CompanyForm>,
) -> ActixResult<HttpResponse> {
    authorize(&req, &state).await?;

    let request = form.into_inner().into_create(None).map_err(ApiError::Validation)?;
    let company = state.store.add(request).await.map_err(ApiError::from)?;

    Ok(HttpResponse::Created().json(company))
}

/// Save only the fields that differ from the current record.
pub async fn update_company(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    form: web::Json<CompanyForm>,
) -> ActixResult<HttpResponse> {
    authorize(&req, &state).await?;
    let company_id = path.into_inner();

    let current = state
        .store
        .get(&company_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound(format!("Company not found: {}", company_id)))?;

    let form = form.into_inner();
    form.validate().map_err(ApiError::Validation)?;

    let update = form
        .changes(&CompanyForm::from_company(&current))
        .ok_or_else(|| ApiError::BadRequest("No changes to save".to_string()))?;

    let company = state
        .store
        .update(&company_id, update)
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(company))
}

pub async fn delete_company(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    authorize(&req, &state).await?;
    let company_id = path.into_inner();

    state
        .store
        .delete(&company_id)
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::NoContent().finish())
}

#[derive(Debug, Deserialize)]
pub struct LogoQuery {
    pub file_name: String,
    /// Write the URL onto the record too. Off when the edit form saves it.
    #[serde(default = "default_persist")]
    pub persist: bool,
}

fn default_persist() -> bool {
    true
}

pub async fn upload_logo(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<LogoQuery>,
    body: web::Bytes,
) -> ActixResult<HttpResponse> {
    authorize(&req, &state).await?;
    let company_id = path.into_inner();
    let LogoQuery { file_name, persist } = query.into_inner();

    let response = if persist {
        state
            .store
            .upload_logo(&company_id, body.to_vec(), &file_name)
            .await
            .map_err(ApiError::from)?
    } else {
        let url = state
            .store
            .upload_logo_file(&company_id, body.to_vec(), &file_name)
            .await
            .map_err(ApiError::from)?;
        LogoUploadResponse {
            url,
            persisted: false,
        }
    };

    Ok(HttpResponse::Ok().json(response))
}

pub async fn refresh(req: HttpRequest, state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    authorize(&req, &state).await?;
    state.store.refresh().await.map_err(ApiError::from)?;
    Ok(HttpResponse::Ok().json(status_response(&state)))
}
