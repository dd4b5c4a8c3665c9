//! Request authentication gate.
//!
//! WebSocket upgrade handshakes are exempt: they are accepted without
//! credentials and the resulting connection is handed to the hub regardless
//! of who opened it. Every other gated request must carry a valid HS256
//! bearer token.

use crate::error::{AuthErrorKind, Error};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use log::*;
use serde::{Deserialize, Serialize};
use service::config::Config;

/// Path prefix reserved for push-channel endpoints.
const WS_PATH_PREFIX: &str = "/ws/";

/// Claims carried by bearer tokens. Inserted into request extensions once
/// validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct BearerClaims {
    /// Email of the authenticated user.
    pub(crate) sub: String,
    pub(crate) exp: usize,
}

/// Whether a request is a push-channel upgrade and must bypass authentication.
/// The `Upgrade` header only counts on GET, the one method a WebSocket
/// handshake can use.
pub(crate) fn is_upgrade_request(config: &Config, request: &Request) -> bool {
    let path = request.uri().path();
    if path.starts_with(WS_PATH_PREFIX) || path == config.ws_path() {
        return true;
    }

    request.method() == Method::GET
        && request
            .headers()
            .get(header::UPGRADE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.eq_ignore_ascii_case("websocket"))
}

/// Authentication middleware that returns 401 Unauthorized for requests
/// without a valid bearer token. Upgrade requests pass straight through.
///  Intended to be given to axum::middleware::from_fn_with_state in the router
pub(crate) async fn require_auth(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_upgrade_request(&app_state.config, &request) {
        debug!(
            "Skipping authentication for WebSocket upgrade: {}",
            request.uri().path()
        );
        return next.run(request).await;
    }

    match authenticate(&app_state.config, request.headers()) {
        Ok(claims) => {
            trace!("Authenticated request from {}", claims.sub);
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            warn!(
                "Rejecting {} {}: {e}",
                request.method(),
                request.uri().path()
            );
            e.into_response()
        }
    }
}

fn authenticate(config: &Config, headers: &HeaderMap) -> Result<BearerClaims, Error> {
    let secret = config
        .jwt_secret()
        .ok_or_else(|| Error::auth(AuthErrorKind::NotConfigured))?;

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| Error::auth(AuthErrorKind::MissingToken))?;

    let token_data = decode::<BearerClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{HeaderValue, StatusCode};
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use axum::Router;
    use clap::Parser;
    use jsonwebtoken::{encode, get_current_timestamp, EncodingKey, Header};
    use tower::ServiceExt;

    const SECRET: &str = "test-secret";

    fn config(secret: Option<&str>) -> Config {
        let config = Config::try_parse_from(["test"]).unwrap();
        match secret {
            Some(secret) => config.set_jwt_secret(secret.to_string()),
            None => config,
        }
    }

    fn token(secret: &str, exp: u64) -> String {
        let claims = BearerClaims {
            sub: "ada@example.com".to_string(),
            exp: exp as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn app(config: Config) -> Router {
        let app_state = AppState::new(config);
        Router::new()
            .route("/protected", get(|| async { "ok" }))
            .route("/ws/events", get(|| async { "upgrade" }))
            .route_layer(from_fn_with_state(app_state.clone(), require_auth))
            .with_state(app_state)
    }

    async fn status_of(app: Router, request: Request) -> StatusCode {
        app.oneshot(request).await.unwrap().status()
    }

    #[test]
    fn upgrade_detected_by_path_prefix() {
        let config = config(None);
        let request = Request::builder()
            .uri("/ws/anything")
            .body(Body::empty())
            .unwrap();
        assert!(is_upgrade_request(&config, &request));
    }

    #[test]
    fn upgrade_detected_by_header_case_insensitively() {
        let config = config(None);
        let request = Request::builder()
            .uri("/elsewhere")
            .header(header::UPGRADE, HeaderValue::from_static("WebSocket"))
            .body(Body::empty())
            .unwrap();
        assert!(is_upgrade_request(&config, &request));
    }

    #[test]
    fn upgrade_header_on_post_is_not_an_upgrade() {
        let config = config(None);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/websocket/broadcast")
            .header(header::UPGRADE, HeaderValue::from_static("websocket"))
            .body(Body::empty())
            .unwrap();
        assert!(!is_upgrade_request(&config, &request));
    }

    #[tokio::test]
    async fn test_upgrade_header_does_not_unlock_post_routes() {
        let app_state = AppState::new(config(Some(SECRET)));
        let app = Router::new()
            .route("/protected", axum::routing::post(|| async { "ok" }))
            .route_layer(from_fn_with_state(app_state.clone(), require_auth))
            .with_state(app_state);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/protected")
            .header(header::UPGRADE, HeaderValue::from_static("websocket"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(app, request).await, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn ordinary_request_is_not_an_upgrade() {
        let config = config(None);
        let request = Request::builder()
            .uri("/websocket/status")
            .body(Body::empty())
            .unwrap();
        assert!(!is_upgrade_request(&config, &request));
    }

    #[tokio::test]
    async fn test_require_auth_returns_401_without_token() {
        let request = Request::builder()
            .uri("/protected")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            status_of(app(config(Some(SECRET))), request).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_require_auth_returns_401_with_wrong_signature() {
        let request = Request::builder()
            .uri("/protected")
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", token("other", get_current_timestamp() + 600)),
            )
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            status_of(app(config(Some(SECRET))), request).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_require_auth_returns_401_with_expired_token() {
        let request = Request::builder()
            .uri("/protected")
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", token(SECRET, get_current_timestamp() - 3600)),
            )
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            status_of(app(config(Some(SECRET))), request).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_require_auth_allows_valid_token() {
        let request = Request::builder()
            .uri("/protected")
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", token(SECRET, get_current_timestamp() + 600)),
            )
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            status_of(app(config(Some(SECRET))), request).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_require_auth_rejects_everything_without_secret() {
        let request = Request::builder()
            .uri("/protected")
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", token(SECRET, get_current_timestamp() + 600)),
            )
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            status_of(app(config(None)), request).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_upgrade_path_bypasses_auth_without_token() {
        let request = Request::builder()
            .uri("/ws/events")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            status_of(app(config(None)), request).await,
            StatusCode::OK
        );
    }
}
