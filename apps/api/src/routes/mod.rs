pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::recommendation::handlers as recommendation;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(session::handle_session_page))
        // Session commands
        .route(
            "/api/v1/session",
            get(session::handle_get_session).delete(session::handle_reset_session),
        )
        .route("/api/v1/session/courses", post(session::handle_add_course))
        .route("/api/v1/session/predict", post(session::handle_predict))
        // Direct model access
        .route(
            "/api/v1/roles/predict",
            post(recommendation::handle_predict_roles),
        )
        .route(
            "/api/v1/recommendations",
            post(recommendation::handle_recommend),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::artifacts::fixtures;
    use crate::config::Config;
    use crate::session::pipeline::tests::StubSearch;
    use crate::session::pipeline::RecommendationPipeline;

    fn test_config() -> Config {
        Config {
            vectorizer_path: "unused".into(),
            classifier_path: "unused".into(),
            catalog_path: "unused".into(),
            github_api_url: "http://localhost".to_string(),
            repo_search_limit: 5,
            repo_search_timeout_secs: 1,
            recommendation_count: 5,
            port: 0,
            rust_log: "info".to_string(),
        }
    }

    fn app(search: StubSearch) -> Router {
        let pipeline =
            RecommendationPipeline::new(Arc::new(fixtures::store()), Arc::new(search), 5);
        build_router(AppState::new(test_config(), pipeline))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = send(app, method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn add(app: &Router, title: &str) -> Value {
        let (status, body) = send_json(
            app,
            "POST",
            "/api/v1/session/courses",
            Some(json!({ "title": title })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn test_health_reports_artifacts() {
        let app = app(StubSearch::ok());
        let (status, body) = send_json(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["artifacts"]["catalog_roles"], 3);
    }

    #[tokio::test]
    async fn test_duplicate_add_warns_without_growing() {
        let app = app(StubSearch::ok());
        let first = add(&app, "Intro to Python").await;
        assert!(first["warning"].is_null());

        let second = add(&app, "intro to python").await;
        assert_eq!(second["warning"]["code"], "DUPLICATE_TITLE");
        assert_eq!(second["session"]["courses"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_add_warns() {
        let app = app(StubSearch::ok());
        let body = add(&app, "   ").await;
        assert_eq!(body["warning"]["code"], "BLANK_TITLE");
        assert_eq!(body["session"]["can_predict"], false);
    }

    #[tokio::test]
    async fn test_predict_on_empty_session_is_conflict() {
        let app = app(StubSearch::ok());
        let (status, body) = send_json(&app, "POST", "/api/v1/session/predict", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "PREDICTION_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_reset_after_three_courses() {
        let app = app(StubSearch::ok());
        for title in ["SQL Basics", "Excel for Data", "Deep Learning"] {
            add(&app, title).await;
        }
        let (status, view) = send_json(&app, "DELETE", "/api/v1/session", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["courses"].as_array().unwrap().len(), 0);
        assert_eq!(view["can_predict"], false);

        let (status, _) = send_json(&app, "POST", "/api/v1/session/predict", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_predict_returns_report() {
        let app = app(StubSearch::ok());
        add(&app, "SQL Basics").await;
        add(&app, "Excel for Data").await;

        let (status, report) = send_json(&app, "POST", "/api/v1/session/predict", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["predicted_role"]["role"], "Data Analyst");
        assert!(report["alternative_role"]["role"].is_string());
        assert_eq!(report["recommended_courses"][0], "Excel for Data");
        assert_eq!(report["repositories"]["repositories"].as_array().unwrap().len(), 1);

        // Prediction does not change the session.
        let (_, view) = send_json(&app, "GET", "/api/v1/session", None).await;
        assert_eq!(view["courses"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rate_limited_search_keeps_prediction() {
        let app = app(StubSearch::rate_limited());
        add(&app, "SQL Basics").await;

        let (status, report) = send_json(&app, "POST", "/api/v1/session/predict", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["predicted_role"]["role"], "Data Analyst");
        assert!(!report["recommended_courses"].as_array().unwrap().is_empty());
        assert!(report["repositories"]["repositories"].as_array().unwrap().is_empty());
        assert_eq!(report["repositories"]["notice"]["kind"], "rate_limited");
    }

    #[tokio::test]
    async fn test_markdown_report_and_page() {
        let app = app(StubSearch::rate_limited());
        let (_, page) = send(&app, "GET", "/", None).await;
        assert!(String::from_utf8(page).unwrap().contains("Enter at least one course to begin."));

        add(&app, "SQL Basics").await;
        let (status, text) = send(&app, "POST", "/api/v1/session/predict?format=markdown", None).await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(text).unwrap();
        assert!(text.contains("**Predicted Role:** Data Analyst"));
        assert!(text.contains("GitHub rate limit exceeded"));
    }

    #[tokio::test]
    async fn test_predict_roles_endpoint() {
        let app = app(StubSearch::ok());
        let (status, body) = send_json(
            &app,
            "POST",
            "/api/v1/roles/predict",
            Some(json!({ "text": "javascript for the web" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let roles = body["roles"].as_array().unwrap();
        assert_eq!(roles.len(), 3);
        assert_eq!(roles[0]["role"], "Web Developer");

        let (status, body) = send_json(
            &app,
            "POST",
            "/api/v1/roles/predict",
            Some(json!({ "text": " " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_recommendations_endpoint() {
        let app = app(StubSearch::ok());
        let (status, body) = send_json(
            &app,
            "POST",
            "/api/v1/recommendations",
            Some(json!({ "query": "sql fundamentals", "role": "Data Analyst", "n": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<&str> = body["courses"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["course_title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["SQL Basics", "Excel for Data"]);

        let (status, body) = send_json(
            &app,
            "POST",
            "/api/v1/recommendations",
            Some(json!({ "query": "sql", "role": "Astronaut" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["courses"].as_array().unwrap().is_empty());

        let (status, body) = send_json(
            &app,
            "POST",
            "/api/v1/recommendations",
            Some(json!({ "query": "sql", "role": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["courses"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let app = app(StubSearch::ok());
        for (uri, body) in [
            ("/api/v1/session/courses", json!({ "name": "SQL Basics" })),
            ("/api/v1/recommendations", json!({ "query": "sql" })),
            ("/api/v1/roles/predict", json!({ "text": 42 })),
        ] {
            let (status, body) = send_json(&app, "POST", uri, Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "{uri}");
            assert!(body["error"]["message"].is_string(), "{uri}");
        }

        let (_, view) = send_json(&app, "GET", "/api/v1/session", None).await;
        assert!(view["courses"].as_array().unwrap().is_empty());
    }
}
