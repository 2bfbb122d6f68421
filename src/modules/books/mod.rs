pub mod models;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use bookshelf_db::SharedStore;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;

/// Books module: list, fetch with populated author, create, update, delete
pub struct BooksModule {
    store: SharedStore,
}

impl BooksModule {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

fn error_response() -> serde_json::Value {
    json!({
        "description": "Store failure",
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn book_response(description: &str, nullable: bool) -> serde_json::Value {
    let book = json!({ "$ref": "#/components/schemas/Book" });
    let schema = if nullable {
        json!({ "oneOf": [book, { "type": "null" }] })
    } else {
        book
    };

    json!({
        "description": description,
        "content": {
            "application/json": { "schema": schema }
        }
    })
}

fn id_parameter() -> serde_json::Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    })
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            backend = self.store.backend(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(routes::list_books).post(routes::create_book))
            .route(
                "/{id}",
                get(routes::get_book)
                    .put(routes::update_book)
                    .delete(routes::delete_book),
            )
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let book_input = json!({
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/BookInput" }
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
                                "description": "All books, authors as identifiers",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "500": error_response()
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": book_input.clone(),
                        "responses": {
                            "201": book_response("Created book", false),
                            "500": error_response()
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book with its author populated",
                        "tags": ["Books"],
                        "parameters": [id_parameter()],
                        "responses": {
                            "200": book_response("The book, or null when absent", true),
                            "500": error_response()
                        }
                    },
                    "put": {
                        "summary": "Update the provided fields of a book",
                        "tags": ["Books"],
                        "parameters": [id_parameter()],
                        "requestBody": book_input,
                        "responses": {
                            "200": book_response("The updated book, or null when absent", true),
                            "500": error_response()
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [id_parameter()],
                        "responses": {
                            "204": { "description": "Deleted, or nothing to delete" },
                            "500": error_response()
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "_id": { "type": "string" },
                            "title": { "type": "string" },
                            "year": { "type": "integer" },
                            "codeISBN": { "type": "string" },
                            "quantity": { "type": "integer" },
                            "genre": { "type": "string" },
                            "author": {
                                "description": "Author id, or the author document when populated",
                                "oneOf": [
                                    { "type": "string" },
                                    { "$ref": "#/components/schemas/Author" },
                                    { "type": "null" }
                                ]
                            }
                        },
                        "required": ["_id"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "year": { "type": "integer" },
                            "codeISBN": { "type": "string" },
                            "quantity": { "type": "integer" },
                            "genre": { "type": "string" },
                            "author": { "type": "string" }
                        }
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(store: SharedStore) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store))
}
