use crate::{
    controller::{health_check_controller, websocket_controller},
    middleware::auth::require_auth,
    ws::handler::ws_handler,
    AppState,
};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Event Progress API"
        ),
        paths(
            health_check_controller::health_check,
            websocket_controller::status,
            websocket_controller::ping,
            websocket_controller::broadcast,
            websocket_controller::test_task_update,
        ),
        components(
            schemas(
                websocket_controller::ConnectionStatus,
                websocket_controller::BroadcastReport,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "event_progress", description = "Real-time event progress notifications")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines the bearer token requirement for the gated diagnostic endpoints.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(websocket_routes(app_state.clone()))
        .merge(websocket_diagnostic_routes(app_state))
        // **** FIXME: protect the OpenAPI document
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

// The upgrade route sits behind the same gate as everything else; the gate
// itself lets upgrade handshakes through unauthenticated.
fn websocket_routes(app_state: AppState) -> Router {
    let ws_path = app_state.config.ws_path().to_owned();
    Router::new()
        .route(&ws_path, get(ws_handler))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn websocket_diagnostic_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/websocket/status", get(websocket_controller::status))
        .route("/websocket/ping", get(websocket_controller::ping))
        .route("/websocket/broadcast", post(websocket_controller::broadcast))
        .route(
            "/websocket/test-task-update/{event_id}",
            post(websocket_controller::test_task_update),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use clap::Parser;
    use jsonwebtoken::{encode, get_current_timestamp, EncodingKey, Header};
    use serde_json::{json, Value};
    use service::config::Config;
    use std::sync::Arc;
    use tower::ServiceExt;
    use ::ws::ChannelConnection;

    const SECRET: &str = "test-secret";

    fn app_state() -> AppState {
        AppState::new(Config::try_parse_from(["test", "--jwt-secret", SECRET]).unwrap())
    }

    fn bearer() -> String {
        let claims = json!({"sub": "ada@example.com", "exp": get_current_timestamp() + 3600});
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        format!("Bearer {token}")
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_ungated() {
        let response = define_routes(app_state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn diagnostics_require_a_token() {
        let response = define_routes(app_state())
            .oneshot(
                Request::get("/websocket/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn status_reports_live_connections() {
        let app_state = app_state();
        let (connection, _outbound) = ChannelConnection::channel();
        app_state.ws_hub.connect(Arc::new(connection));

        let response = define_routes(app_state)
            .oneshot(
                Request::get("/websocket/status")
                    .header(header::AUTHORIZATION, bearer())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"status_code": 200, "data": {"active_connections": 1}})
        );
    }

    #[tokio::test]
    async fn broadcast_sends_system_status_with_default_message() {
        let app_state = app_state();
        let (connection, mut outbound) = ChannelConnection::channel();
        app_state.ws_hub.connect(Arc::new(connection));

        let response = define_routes(app_state)
            .oneshot(
                Request::post("/websocket/broadcast")
                    .header(header::AUTHORIZATION, bearer())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["delivered"], 1);
        assert_eq!(body["data"]["degraded"], false);

        let frame: Value = serde_json::from_str(&outbound.try_recv().unwrap()).unwrap();
        assert_eq!(frame["type"], "SYSTEM_STATUS");
        assert_eq!(frame["status"], "TEST");
        assert_eq!(frame["message"], "Hello WebSocket!");
        assert_eq!(frame["activeConnections"], 1);
    }

    #[tokio::test]
    async fn test_task_update_broadcasts_synthetic_task() {
        let app_state = app_state();
        let (connection, mut outbound) = ChannelConnection::channel();
        app_state.ws_hub.connect(Arc::new(connection));

        let response = define_routes(app_state)
            .oneshot(
                Request::post("/websocket/test-task-update/evt-1?title=Book%20venue")
                    .header(header::AUTHORIZATION, bearer())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let frame: Value = serde_json::from_str(&outbound.try_recv().unwrap()).unwrap();
        assert_eq!(frame["type"], "TASK_UPDATE");
        assert_eq!(frame["eventId"], "evt-1");
        assert_eq!(frame["data"]["title"], "Book venue");
        assert_eq!(frame["data"]["description"], "This is a test task update");
        assert_eq!(frame["data"]["completed"], false);
    }

    #[tokio::test]
    async fn upgrade_route_is_not_rejected_for_missing_token() {
        let response = define_routes(app_state())
            .oneshot(Request::get("/ws/events").body(Body::empty()).unwrap())
            .await
            .unwrap();
        // Not a real handshake, so the upgrade extractor refuses it, but the
        // gate must not.
        assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn openapi_document_lists_diagnostic_paths() {
        let response = define_routes(app_state())
            .oneshot(
                Request::get("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["paths"]["/websocket/status"].is_object());
        assert!(body["paths"]["/health"].is_object());
    }
}
