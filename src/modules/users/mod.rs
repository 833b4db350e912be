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

use models::User;
use routes::UsersState;
use service::UserService;

/// Sign-up, sign-in, and the current user's profile, mounted at `/api/users`
pub struct UsersModule {
    state: OnceCell<UsersState>,
}

impl UsersModule {
    pub const fn new() -> Self {
        Self {
            state: OnceCell::new(),
        }
    }
}

impl Default for UsersModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let auth = Arc::new(JwtAuthority::new(&ctx.settings.auth)?);
        let service = UserService::new(
            ctx.store.repository::<User>(),
            auth.clone(),
            ctx.settings.auth.password_cost,
        );
        self.state
            .set(UsersState { service, auth })
            .map_err(|_| anyhow!("users module initialized twice"))?;

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "users module initialized"
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
        Some(json!({
            "paths": {
                "/signup": {
                    "post": {
                        "summary": "Register a user",
                        "tags": ["Users"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/SignUp" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Registered user",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/User" }
                                    }
                                }
                            },
                            "409": {
                                "description": "Email already registered",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            },
                            "422": {
                                "description": "Validation error",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/signin": {
                    "post": {
                        "summary": "Exchange credentials for an access token",
                        "tags": ["Users"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/SignIn" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Access token",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/AccessToken" }
                                    }
                                }
                            },
                            "401": {
                                "description": "Invalid email or password",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/me": {
                    "get": {
                        "summary": "Current user profile",
                        "tags": ["Users"],
                        "security": [{ "bearer": [] }],
                        "responses": {
                            "200": {
                                "description": "User profile",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/User" }
                                    }
                                }
                            },
                            "401": {
                                "description": "Missing or invalid bearer token",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "User": {
                        "type": "object",
                        "properties": {
                            "_id": { "type": "string" },
                            "email": { "type": "string", "format": "email" },
                            "firstname": { "type": "string" },
                            "lastname": { "type": "string" }
                        },
                        "required": ["_id", "email", "firstname", "lastname"]
                    },
                    "SignUp": {
                        "type": "object",
                        "properties": {
                            "email": { "type": "string", "format": "email" },
                            "password": { "type": "string" },
                            "firstname": { "type": "string" },
                            "lastname": { "type": "string" }
                        },
                        "required": ["email", "password", "firstname", "lastname"]
                    },
                    "SignIn": {
                        "type": "object",
                        "properties": {
                            "email": { "type": "string", "format": "email" },
                            "password": { "type": "string" }
                        },
                        "required": ["email", "password"]
                    },
                    "AccessToken": {
                        "type": "object",
                        "properties": {
                            "access_token": { "type": "string" }
                        },
                        "required": ["access_token"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            collection: User::COLLECTION,
            indexes: vec![IndexDefinition {
                name: "users_email_unique",
                keys: &["email"],
                unique: true,
            }],
        }]
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "users module stopped");
        Ok(())
    }
}

/// Create a new instance of the users module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(UsersModule::new())
}
