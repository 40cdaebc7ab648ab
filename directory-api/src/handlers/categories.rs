use actix_web::{web, HttpResponse, Result as ActixResult};
use directory_store::search;
use shared_types::{CategoriesResponse, CategorySummary, CompaniesResponse, CompanyCategory};

use crate::error::ApiError;
use crate::AppState;

pub async fn list_categories(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let categories = search::category_counts(&state.store.companies())
        .into_iter()
        .map(|(category, count)| CategorySummary {
            category,
            label: category.label().to_string(),
            slug: category.slug().to_string(),
            count,
        })
        .collect();

    Ok(HttpResponse::Ok().json(CategoriesResponse { categories }))
}

/// Category page listing, filtered by the backend.
pub async fn list_category_companies(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let slug = path.into_inner();
    let category =
        CompanyCategory::from_slug(&slug).map_err(|e| ApiError::NotFound(e.to_string()))?;

    let companies = state.store.fetch_category(category).await;
    Ok(HttpResponse::Ok().json(CompaniesResponse { companies }))
}

#[cfg(test)]
mod tests {
    use crate::test_support;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use shared_types::{CategoriesResponse, CompaniesResponse, CompanyCategory};

    #[actix_web::test]
    async fn test_categories_cover_every_category() {
        let app = test::init_service(test_support::app(test_support::state().await)).await;

        let req = test::TestRequest::get().uri("/api/categories").to_request();
        let body: CategoriesResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.categories.len(), CompanyCategory::all().len());
        assert!(body.categories.iter().all(|c| c.count == 1));
        assert_eq!(body.categories[0].slug, CompanyCategory::all()[0].slug());
    }

    #[actix_web::test]
    async fn test_category_page() {
        let app = test::init_service(test_support::app(test_support::state().await)).await;

        let req = test::TestRequest::get()
            .uri("/api/categories/social-media/companies")
            .to_request();
        let body: CompaniesResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.companies.len(), 1);
        assert_eq!(body.companies[0].category, CompanyCategory::SocialMedia);

        let req = test::TestRequest::get()
            .uri("/api/categories/unknown/companies")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
