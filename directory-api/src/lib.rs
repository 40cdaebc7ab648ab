pub mod config;
pub mod error;
pub mod handlers;
pub mod helpers;

use actix_web::web;
use directory_store::store::MAX_LOGO_BYTES;
use directory_store::CompanyStore;
use std::sync::Arc;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CompanyStore>,
    pub search_limit: usize,
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_LOGO_BYTES + 1))
        .service(handlers::status::health)
        .route("/api/status", web::get().to(handlers::status::get_status))
        .route("/api/companies", web::get().to(handlers::companies::list_companies))
        .route(
            "/api/companies/highlighted",
            web::get().to(handlers::companies::list_highlighted),
        )
        .route("/api/companies/{id}", web::get().to(handlers::companies::get_company))
        .route("/api/categories", web::get().to(handlers::categories::list_categories))
        .route(
            "/api/categories/{slug}/companies",
            web::get().to(handlers::categories::list_category_companies),
        )
        .route("/api/search", web::get().to(handlers::search::search))
        .route("/api/admin/companies", web::post().to(handlers::admin::create_company))
        .route("/api/admin/companies/{id}", web::put().to(handlers::admin::update_company))
        .route("/api/admin/companies/{id}", web::delete().to(handlers::admin::delete_company))
        .route("/api/admin/companies/{id}/logo", web::post().to(handlers::admin::upload_logo))
        .route("/api/admin/refresh", web::post().to(handlers::admin::refresh));
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use actix_web::App;
    use directory_store::{seed, InMemoryBackend};

    pub const ADMIN_TOKEN: &str = "Bearer admin-session";

    /// Store over an in-memory backend holding the bundled companies.
    pub async fn state() -> AppState {
        let companies = seed::initial_companies().unwrap();
        let backend = Arc::new(InMemoryBackend::with_companies(&companies));
        let store = Arc::new(CompanyStore::new(backend).seed_on_empty(false));
        store.load(false).await.unwrap();
        AppState {
            store,
            search_limit: 8,
        }
    }

    pub fn app(
        state: AppState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().app_data(web::Data::new(state)).configure(routes)
    }
}
