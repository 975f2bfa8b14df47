//! Bearer-token gate for protected routes.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use bookshelf_authz::{AuthError, Claims, TokenService};

use crate::error::AppError;

/// Validates `Authorization: Bearer <token>` and stores the [`Claims`] in the
/// request extensions. Requests without a valid token never reach the handler.
pub async fn require_bearer(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| AppError::unauthorized("Missing or malformed bearer token"))?;

    let claims = tokens.validate(token).map_err(|e| match e {
        AuthError::Expired => AppError::unauthorized("Token expired"),
        other if other.is_rejection() => AppError::unauthorized("Invalid token"),
        other => AppError::Internal(other.into()),
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Extracts the token from an `Authorization` header; the scheme is
/// matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// The authenticated caller, available behind [`require_bearer`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderValue, http::StatusCode, middleware, routing::get, Router};
    use axum_test::TestServer;

    const SECRET: &[u8] = b"guard-test-secret-guard-test-secret";

    fn server() -> (TestServer, Arc<TokenService>) {
        let tokens = Arc::new(TokenService::new(SECRET));
        let app = Router::new()
            .route(
                "/whoami",
                get(|CurrentUser(claims): CurrentUser| async move { claims.name }),
            )
            .route_layer(middleware::from_fn_with_state(
                Arc::clone(&tokens),
                require_bearer,
            ));
        (
            TestServer::new(app).expect("Failed to create test server"),
            tokens,
        )
    }

    fn headers(value: &'static str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        map
    }

    #[test]
    fn parses_bearer_scheme_case_insensitively() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let (server, _) = server();
        let response = server.get("/whoami").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "unauthorized");
    }

    #[tokio::test]
    async fn valid_token_reaches_handler_with_claims() {
        let (server, tokens) = server();
        let issued = tokens.issue(3, "ada").unwrap();

        let response = server
            .get("/whoami")
            .add_header("Authorization", format!("Bearer {}", issued.token))
            .await;

        response.assert_status_ok();
        response.assert_text("ada");
    }

    #[tokio::test]
    async fn token_from_other_key_is_unauthorized() {
        let (server, _) = server();
        let other = TokenService::new(b"some-other-secret-some-other-secret");
        let issued = other.issue(3, "ada").unwrap();

        server
            .get("/whoami")
            .add_header("Authorization", format!("Bearer {}", issued.token))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
