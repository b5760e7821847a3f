pub mod handlers;
pub mod models;
pub mod store;

use async_trait::async_trait;
use axum::{routing::get, Router};
use serde_json::json;
use shelf_kernel::{InitCtx, Module};

use store::BookStore;

/// Books module: id -> title records kept in memory for the process lifetime
pub struct BooksModule {
    store: BookStore,
}

impl BooksModule {
    pub fn new() -> Self {
        Self::with_store(BookStore::new())
    }

    /// Build the module around an existing store
    pub fn with_store(store: BookStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &BookStore {
        &self.store
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

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(handlers::list_books))
            .route(
                "/{book_id}",
                get(handlers::get_book)
                    .post(handlers::create_book)
                    .put(handlers::update_book)
                    .delete(handlers::delete_book),
            )
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let book_id = json!({
            "name": "book_id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        });
        let title = json!({
            "name": "title",
            "in": "query",
            "required": true,
            "schema": { "type": "string" }
        });
        let book_response = json!({
            "description": "Book record",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/Book" }
                }
            }
        });
        let validation_error = json!({
            "description": "Validation error",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Every book keyed by id",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "additionalProperties": { "type": "string" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                "/{book_id}": {
                    "get": {
                        "summary": "Get a book; absent ids report the title \"Not Found\"",
                        "tags": ["Books"],
                        "parameters": [book_id],
                        "responses": {
                            "200": book_response,
                            "422": validation_error
                        }
                    },
                    "post": {
                        "summary": "Create or overwrite a book",
                        "tags": ["Books"],
                        "parameters": [book_id, title],
                        "responses": {
                            "200": book_response,
                            "422": validation_error
                        }
                    },
                    "put": {
                        "summary": "Update or create a book",
                        "tags": ["Books"],
                        "parameters": [book_id, title],
                        "responses": {
                            "200": book_response,
                            "422": validation_error
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [book_id],
                        "responses": {
                            "200": {
                                "description": "Always acknowledged",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Message" }
                                    }
                                }
                            },
                            "422": validation_error
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": {
                                "type": "integer",
                                "format": "int64",
                                "description": "Book identifier"
                            },
                            "title": {
                                "type": "string",
                                "description": "Title of the book"
                            }
                        },
                        "required": ["id", "title"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        match self.store.len() {
            Ok(remaining) => tracing::info!(
                module = self.name(),
                discarded = remaining,
                "books module stopped"
            ),
            Err(err) => tracing::warn!(
                module = self.name(),
                error = %err,
                "books module stopped; record count unavailable"
            ),
        }
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new())
}
