pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use routes::AuthState;

pub const AUTH_MIGRATIONS: &[Migration] = &[Migration {
    id: "001_init",
    up: r#"
        CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            username      TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at    TEXT NOT NULL
        );
        "#,
}];

/// Registration and login
pub struct AuthModule {
    state: AuthState,
}

impl AuthModule {
    pub fn new(state: AuthState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let passwords = Arc::clone(&self.state.passwords);
        tokio::task::spawn_blocking(move || passwords.warm_up())
            .await
            .context("decoy hash task failed")??;

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            min_password_length = self.state.min_password_length,
            "auth module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let credentials_body = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/Credentials" }
                }
            }
        });
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };

        Some(json!({
            "paths": {
                "/register": {
                    "post": {
                        "summary": "Register a user",
                        "tags": ["Auth"],
                        "requestBody": credentials_body,
                        "responses": {
                            "200": {
                                "description": "Registered",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Message" }
                                    }
                                }
                            },
                            "400": error("Blank field, short password or duplicate username")
                        }
                    }
                },
                "/login": {
                    "post": {
                        "summary": "Exchange credentials for a one-hour bearer token",
                        "tags": ["Auth"],
                        "requestBody": credentials_body,
                        "responses": {
                            "200": {
                                "description": "Token issued",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Token" }
                                    }
                                }
                            },
                            "401": error("Bad credentials")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Credentials": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string" },
                            "password": { "type": "string", "format": "password" }
                        },
                        "required": ["username", "password"]
                    },
                    "Message": {
                        "type": "object",
                        "properties": { "message": { "type": "string" } },
                        "required": ["message"]
                    },
                    "Token": {
                        "type": "object",
                        "properties": { "token": { "type": "string" } },
                        "required": ["token"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        AUTH_MIGRATIONS.to_vec()
    }
}

/// Create a new instance of the auth module
pub fn create_module(state: AuthState) -> Arc<dyn Module> {
    Arc::new(AuthModule::new(state))
}
