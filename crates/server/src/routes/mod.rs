use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod agents;
pub mod auth;
mod health;
mod meetings;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth routes
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Agent routes
        .route("/api/agents", get(agents::list).post(agents::create))
        .route("/api/agents/all", get(agents::get_all))
        .route(
            "/api/agents/:id",
            get(agents::get_by_id)
                .put(agents::update)
                .delete(agents::delete),
        )
        .route("/api/agents/:id/meetings", get(meetings::list_for_agent))
        .route(
            "/api/agents/:id/meetings/count",
            get(meetings::count_for_agent),
        )
        // Meeting routes
        .route("/api/meetings", get(meetings::list).post(meetings::create))
        .route(
            "/api/meetings/:id",
            get(meetings::get_by_id)
                .put(meetings::update)
                .delete(meetings::delete),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::{config::Config, db::test_support::test_db};

    async fn test_app() -> Router {
        let db = test_db().await;
        let state = AppState::new(db, Config::default());
        create_router(state)
    }

    fn request(
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register(app: &Router, name: &str, email: &str) -> String {
        let (status, body) = send(
            app,
            request(
                "POST",
                "/auth/register",
                None,
                Some(json!({ "name": name, "email": email, "password": "hunter22" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_agent(app: &Router, token: &str, name: &str) -> Value {
        let (status, body) = send(
            app,
            request(
                "POST",
                "/api/agents",
                Some(token),
                Some(json!({ "name": name })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn health_check_is_public() {
        let app = test_app().await;
        let (status, body) = send(&app, request("GET", "/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn resource_routes_reject_unauthenticated_callers() {
        let app = test_app().await;

        let (status, _) = send(&app, request("GET", "/api/agents", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            request("GET", "/api/meetings", Some("not-a-real-token"), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_create_and_fetch_agent() {
        let app = test_app().await;
        let token = register(&app, "Ada", "ada@example.com").await;

        let agent = create_agent(&app, &token, "Support Bot").await;
        assert_eq!(agent["status"], "active");
        assert!(agent["created_at"].is_string());
        assert_eq!(agent["created_at"], agent["updated_at"]);

        let id = agent["id"].as_str().unwrap();
        let (status, fetched) = send(
            &app,
            request("GET", &format!("/api/agents/{id}"), Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["name"], "Support Bot");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let app = test_app().await;
        register(&app, "Ada", "ada@example.com").await;

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/auth/register",
                None,
                Some(json!({ "name": "Imposter", "email": "ada@example.com", "password": "hunter22" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Email already registered");
    }

    #[tokio::test]
    async fn login_returns_token_and_rejects_wrong_password() {
        let app = test_app().await;
        register(&app, "Ada", "ada@example.com").await;

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/auth/login",
                None,
                Some(json!({ "email": "ada@example.com", "password": "hunter22" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["token"].is_string());

        let (status, _) = send(
            &app,
            request(
                "POST",
                "/auth/login",
                None,
                Some(json!({ "email": "ada@example.com", "password": "wrong" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn me_returns_profile_without_password_hash() {
        let app = test_app().await;
        let token = register(&app, "Ada", "ada@example.com").await;

        let (status, body) = send(&app, request("GET", "/auth/me", Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Ada");
        assert_eq!(body["email"], "ada@example.com");
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn foreign_records_are_not_found() {
        let app = test_app().await;
        let ada = register(&app, "Ada", "ada@example.com").await;
        let bob = register(&app, "Bob", "bob@example.com").await;

        let agent = create_agent(&app, &ada, "Private").await;
        let id = agent["id"].as_str().unwrap();

        let (status, _) = send(
            &app,
            request("GET", &format!("/api/agents/{id}"), Some(&bob), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            request(
                "PUT",
                &format!("/api/agents/{id}"),
                Some(&bob),
                Some(json!({ "name": "Hijacked" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // unchanged for the owner
        let (_, fetched) = send(
            &app,
            request("GET", &format!("/api/agents/{id}"), Some(&ada), None),
        )
        .await;
        assert_eq!(fetched["name"], "Private");
    }

    #[tokio::test]
    async fn validation_failures_report_fields() {
        let app = test_app().await;
        let token = register(&app, "Ada", "ada@example.com").await;

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/api/agents",
                Some(&token),
                Some(json!({ "name": "   " })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"][0]["field"], "name");

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/api/meetings",
                Some(&token),
                Some(json!({ "name": "x".repeat(101), "agent_id": "" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields: Vec<_> = body["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(fields, vec!["name", "agent_id"]);
    }

    #[tokio::test]
    async fn agent_listing_paginates_via_query_params() {
        let app = test_app().await;
        let token = register(&app, "Ada", "ada@example.com").await;
        for i in 0..3 {
            create_agent(&app, &token, &format!("Agent {i}")).await;
        }

        let (status, body) = send(
            &app,
            request("GET", "/api/agents?page=1&page_size=2", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
        assert_eq!(body["total"], 3);
        assert_eq!(body["total_pages"], 2);

        let (status, body) = send(
            &app,
            request("GET", "/api/agents?page=0", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"][0]["field"], "page");

        let (status, body) = send(
            &app,
            request("GET", "/api/agents?search=agent+1", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn meetings_default_to_upcoming_and_list_with_their_agent() {
        let app = test_app().await;
        let token = register(&app, "Ada", "ada@example.com").await;
        let agent = create_agent(&app, &token, "Support Bot").await;
        let agent_id = agent["id"].as_str().unwrap();

        let (status, meeting) = send(
            &app,
            request(
                "POST",
                "/api/meetings",
                Some(&token),
                Some(json!({ "name": "Standup", "agent_id": agent_id })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(meeting["status"], "upcoming");

        let (status, body) = send(&app, request("GET", "/api/meetings", Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        let listed = &body.as_array().unwrap()[0];
        assert_eq!(listed["name"], "Standup");
        assert_eq!(listed["agent"]["name"], "Support Bot");

        let (status, body) = send(
            &app,
            request(
                "GET",
                &format!("/api/agents/{agent_id}/meetings/count"),
                Some(&token),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
    }

    #[tokio::test]
    async fn delete_returns_success_flag_and_the_deleted_record() {
        let app = test_app().await;
        let token = register(&app, "Ada", "ada@example.com").await;
        let agent = create_agent(&app, &token, "Temp").await;
        let id = agent["id"].as_str().unwrap();

        let (status, body) = send(
            &app,
            request("DELETE", &format!("/api/agents/{id}"), Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["deleted_agent"]["name"], "Temp");

        let (status, _) = send(
            &app,
            request("DELETE", &format!("/api/agents/{id}"), Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
