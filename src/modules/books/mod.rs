pub mod models;
pub mod routes;
pub mod service;

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use axum::Router;
use once_cell::sync::OnceCell;
use serde_json::json;
use shelf_authz::JwtAuthority;
use shelf_db::Document;
use shelf_kernel::{IndexDefinition, InitCtx, Migration, Module};

use models::Book;
use routes::BooksState;
use service::BookService;

/// The books resource, mounted at `/books`
pub struct BooksModule {
    state: OnceCell<BooksState>,
}

impl BooksModule {
    pub const fn new() -> Self {
        Self {
            state: OnceCell::new(),
        }
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    fn mount_path(&self) -> String {
        "/books".to_string()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let state = BooksState {
            service: BookService::new(ctx.store.repository::<Book>()),
            auth: Arc::new(JwtAuthority::new(&ctx.settings.auth)?),
        };
        self.state
            .set(state)
            .map_err(|_| anyhow!("books module initialized twice"))?;

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.store.backend(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        match self.state.get() {
            Some(state) => routes::router(state.clone()),
            None => {
                tracing::warn!(module = self.name(), "routes requested before init");
                Router::new()
            }
        }
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
        let id_param = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "description": "Book ObjectId (24 hex characters)",
            "schema": { "type": "string" }
        });
        let body = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/CreateBook" }
                }
            }
        });
        let bearer = json!([{ "bearer": [] }]);

        Some(json!({
            "paths": {
                "": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "List of books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "security": bearer.clone(),
                        "requestBody": body.clone(),
                        "responses": {
                            "201": book("Created book"),
                            "400": error("Malformed body"),
                            "401": error("Missing or invalid bearer token"),
                            "422": error("Validation error")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": [id_param.clone()],
                        "responses": {
                            "200": book("The book"),
                            "400": error("Malformed id"),
                            "404": error("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Books"],
                        "security": bearer.clone(),
                        "parameters": [id_param.clone()],
                        "requestBody": body.clone(),
                        "responses": {
                            "200": book("The book before the update"),
                            "400": error("Malformed id or body"),
                            "401": error("Missing or invalid bearer token"),
                            "404": error("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "security": bearer.clone(),
                        "parameters": [id_param.clone()],
                        "responses": {
                            "200": book("The removed book"),
                            "400": error("Malformed id"),
                            "401": error("Missing or invalid bearer token"),
                            "404": error("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "_id": { "type": "string", "description": "Store-assigned ObjectId" },
                            "title": { "type": "string" },
                            "description": { "type": "string" },
                            "authors": { "type": "string" },
                            "favorite": { "type": "string" }
                        },
                        "required": ["_id", "title", "description", "authors", "favorite"]
                    },
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "description": { "type": "string" },
                            "authors": { "type": "string" },
                            "favorite": { "type": "string" }
                        },
                        "required": ["title", "description", "authors", "favorite"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            collection: Book::COLLECTION,
            indexes: vec![IndexDefinition {
                name: "books_title",
                keys: &["title"],
                unique: false,
            }],
        }]
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksModule::new())
}
