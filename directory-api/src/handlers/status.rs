use actix_web::{get, web, HttpResponse, Responder, Result as ActixResult};
use shared_types::{BackendMode, StatusResponse};

use crate::AppState;

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy"
    }))
}

pub fn status_response(state: &AppState) -> StatusResponse {
    let snapshot = state.store.snapshot();
    StatusResponse {
        backend: if state.store.backend().is_offline() {
            BackendMode::Offline
        } else {
            BackendMode::Hosted
        },
        is_loading: snapshot.is_loading,
        is_refreshing: snapshot.is_refreshing,
        error: snapshot.error,
        company_count: snapshot.companies.len(),
    }
}

pub async fn get_status(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(status_response(&state)))
}
