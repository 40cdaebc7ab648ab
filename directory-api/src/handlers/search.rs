use actix_web::{web, HttpResponse, Result as ActixResult};
use serde::Deserialize;
use shared_types::SearchResponse;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
    /// Query the backend's name index instead of the loaded list.
    #[serde(default)]
    pub remote: bool,
}

pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> ActixResult<HttpResponse> {
    let SearchQuery { q, limit, remote } = query.into_inner();
    let limit = limit.unwrap_or(state.search_limit);

    let results = if remote {
        let mut results = state.store.search_remote(&q).await.map_err(ApiError::from)?;
        results.truncate(limit);
        results
    } else {
        state.store.search(&q, limit)
    };

    Ok(HttpResponse::Ok().json(SearchResponse { query: q, results }))
}

#[cfg(test)]
mod tests {
    use crate::test_support;
    use actix_web::test;
    use shared_types::SearchResponse;

    #[actix_web::test]
    async fn test_empty_query_returns_nothing() {
        let app = test::init_service(test_support::app(test_support::state().await)).await;

        let req = test::TestRequest::get().uri("/api/search?q=").to_request();
        let body: SearchResponse = test::call_and_read_body_json(&app, req).await;
        assert!(body.results.is_empty());

        let req = test::TestRequest::get().uri("/api/search").to_request();
        let body: SearchResponse = test::call_and_read_body_json(&app, req).await;
        assert!(body.results.is_empty());
    }

    #[actix_web::test]
    async fn test_local_and_remote_search() {
        let app = test::init_service(test_support::app(test_support::state().await)).await;

        let req = test::TestRequest::get().uri("/api/search?q=jasper").to_request();
        let body: SearchResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.results[0].id, "seed-jasper");

        let req = test::TestRequest::get()
            .uri("/api/search?q=DRIFT&remote=true")
            .to_request();
        let body: SearchResponse = test::call_and_read_body_json(&app, req).await;
        let ids: Vec<_> = body.results.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["seed-drift"]);

        let req = test::TestRequest::get()
            .uri("/api/search?q=e&limit=2")
            .to_request();
        let body: SearchResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.results.len(), 2);
    }
}
