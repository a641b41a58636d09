pub mod health;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::document::handlers as document;
use crate::profile::handlers as profile;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profiles
        .route("/api/v1/profiles", post(profile::handle_create_profile))
        .route(
            "/api/v1/profiles/:id",
            get(profile::handle_get_profile).delete(profile::handle_delete_profile),
        )
        .route(
            "/api/v1/profiles/:id/sections",
            put(profile::handle_update_sections),
        )
        .route(
            "/api/v1/profiles/:id/completeness",
            get(profile::handle_completeness),
        )
        // Records
        .route(
            "/api/v1/profiles/:id/records",
            post(profile::handle_add_record),
        )
        .route(
            "/api/v1/profiles/:id/records/:section/:record_id",
            delete(profile::handle_delete_record),
        )
        .route(
            "/api/v1/profiles/:id/records/:section/:record_id/visibility",
            patch(profile::handle_set_visibility),
        )
        // Document
        .route(
            "/api/v1/profiles/:id/cv.pdf",
            get(document::handle_download_cv),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::memory::InMemoryProfileRepository;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_reports_service_name() {
        let app = build_router(AppState::for_tests(Arc::new(InMemoryProfileRepository::new())));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["service"], "curriculum-api");
        assert_eq!(json["status"], "ok");
    }
}
