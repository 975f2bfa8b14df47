//! `/auth` handlers: registration and token login. Both are public.

use std::sync::Arc;

use anyhow::Context;
use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use bookshelf_authz::{AuthError, PasswordHasher, TokenService};
use bookshelf_http::AppError;

use super::models::{Credentials, MessageResponse, TokenResponse};
use super::store::{CredentialError, CredentialStore};
use crate::utils;

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::DuplicateUsername(_) => {
                AppError::bad_request_with_code("duplicate_username", "Username already exists")
            }
            CredentialError::Storage(e) => AppError::Internal(e.into()),
        }
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub store: CredentialStore,
    pub passwords: Arc<PasswordHasher>,
    pub tokens: Arc<TokenService>,
    pub min_password_length: usize,
}

pub fn router(state: AuthState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(state)
}

async fn register(
    State(state): State<AuthState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(credentials) = payload?;

    if utils::is_blank(&credentials.username) || utils::is_blank(&credentials.password) {
        return Err(AppError::bad_request_with_code(
            "missing_credentials",
            "Username and password are required",
        ));
    }
    if credentials.password.chars().count() < state.min_password_length {
        return Err(AppError::bad_request_with_code(
            "weak_password",
            format!(
                "Password must be at least {} characters",
                state.min_password_length
            ),
        ));
    }

    let passwords = Arc::clone(&state.passwords);
    let password = credentials.password;
    let hash = tokio::task::spawn_blocking(move || passwords.hash(&password))
        .await
        .context("password hashing task failed")?
        .map_err(anyhow::Error::from)?;

    let user = state.store.create(&credentials.username, &hash).await?;
    tracing::info!(user_id = user.id, username = %user.username, "user registered");

    Ok(Json(MessageResponse {
        message: "User registered successfully".to_string(),
    }))
}

async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(credentials) = payload?;
    let user = state.store.find_by_username(&credentials.username).await?;

    let passwords = Arc::clone(&state.passwords);
    let password = credentials.password;
    let stored_hash = user.as_ref().map(|user| user.password_hash.clone());
    let verified = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => passwords.verify(&password, &hash),
        None => passwords.verify_decoy(&password).map(|()| false),
    })
    .await
    .context("password verification task failed")?;

    let user = match (user, verified) {
        (Some(user), Ok(true)) => user,
        (Some(user), Err(AuthError::MalformedHash(reason))) => {
            tracing::error!(user_id = user.id, %reason, "stored password hash is unreadable");
            return Err(invalid_credentials());
        }
        (_, Err(e)) => return Err(anyhow::Error::from(e).into()),
        _ => {
            tracing::warn!(username = %credentials.username, "login rejected");
            return Err(invalid_credentials());
        }
    };

    let issued = state
        .tokens
        .issue(user.id, &user.username)
        .map_err(anyhow::Error::from)?;
    tracing::info!(user_id = user.id, expires_at = %issued.expires_at, "token issued");

    Ok(Json(TokenResponse {
        token: issued.token,
    }))
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("Invalid username or password")
}
