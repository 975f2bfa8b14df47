pub mod models;
pub mod repository;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_authz::TokenService;
use bookshelf_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use repository::BookRepository;

pub const BOOKS_MIGRATIONS: &[Migration] = &[Migration {
    id: "001_init",
    up: r#"
        CREATE TABLE IF NOT EXISTS books (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            title       TEXT NOT NULL CHECK (length(trim(title)) > 0),
            author      TEXT NOT NULL CHECK (length(trim(author)) > 0),
            description TEXT NOT NULL DEFAULT ''
        );
        "#,
}];

/// Book catalog: CRUD over a single shared collection
pub struct BooksModule {
    repo: BookRepository,
    tokens: Arc<TokenService>,
}

impl BooksModule {
    pub fn new(repo: BookRepository, tokens: Arc<TokenService>) -> Self {
        Self { repo, tokens }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let count = self.repo.count().await?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            books = count,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.repo.clone(), Arc::clone(&self.tokens))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
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
        let book = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/Book" }
                    }
                }
            })
        };
        let book_body = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/BookInput" }
                }
            }
        });
        let id_param = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        });
        let secured = json!([{ "bearerAuth": [] }]);

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "security": secured,
                        "responses": {
                            "200": {
                                "description": "All books in insertion order",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "401": error("Missing or invalid token")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "security": secured,
                        "requestBody": book_body,
                        "responses": {
                            "201": book("Created; Location points at the new book"),
                            "400": error("Blank title or author"),
                            "401": error("Missing or invalid token")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "security": secured,
                        "parameters": [id_param],
                        "responses": {
                            "200": book("The book"),
                            "401": error("Missing or invalid token"),
                            "404": error("No book with this id")
                        }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Books"],
                        "security": secured,
                        "parameters": [id_param],
                        "requestBody": book_body,
                        "responses": {
                            "204": { "description": "Replaced" },
                            "400": error("Blank title or author"),
                            "401": error("Missing or invalid token"),
                            "404": error("No book with this id")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "security": secured,
                        "parameters": [id_param],
                        "responses": {
                            "204": { "description": "Deleted" },
                            "401": error("Missing or invalid token"),
                            "404": error("No book with this id")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "description": { "type": "string" }
                        },
                        "required": ["id", "title", "author", "description"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "description": "Must not be blank" },
                            "author": { "type": "string", "description": "Must not be blank" },
                            "description": { "type": "string" }
                        },
                        "required": ["title", "author"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        BOOKS_MIGRATIONS.to_vec()
    }
}

/// Create a new instance of the books module
pub fn create_module(pool: sqlx::SqlitePool, tokens: Arc<TokenService>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(BookRepository::new(pool), tokens))
}
