pub mod models;
pub mod routes;

use async_trait::async_trait;
use axum::{routing::get, Router};
use serde_json::json;
use shelf_kernel::{InitCtx, Migration, Module};
use shelf_store::BookStore;

/// Books module: the catalog CRUD surface of the shelf service
pub struct BooksModule {
    store: BookStore,
}

impl BooksModule {
    pub fn new(store: BookStore) -> Self {
        Self { store }
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
            .route(
                "/",
                get(routes::list_books)
                    .post(routes::create_book)
                    .delete(routes::clear_books),
            )
            .route(
                "/{id}",
                get(routes::get_book)
                    .post(routes::add_comment)
                    .delete(routes::delete_book),
            )
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "List of books, or 'cannot get books' on store failure",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": {
                                                "$ref": "#/components/schemas/BookSummary"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "$ref": "#/components/schemas/CreateBook"
                                    }
                                },
                                "application/x-www-form-urlencoded": {
                                    "schema": {
                                        "$ref": "#/components/schemas/CreateBook"
                                    }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Created book, or a plain-text validation/error message",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/CreatedBook"
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "delete": {
                        "summary": "Delete every book",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "'complete delete successful', or 'cannot delete books'",
                                "content": {
                                    "text/plain": {
                                        "schema": { "type": "string" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Fetch one book with its comments",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "string" }
                        }],
                        "responses": {
                            "200": {
                                "description": "Full book, 'no book exists', or 'cannot get book'",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/Book"
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Append a comment to a book",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "string" }
                        }],
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "$ref": "#/components/schemas/AddComment"
                                    }
                                },
                                "application/x-www-form-urlencoded": {
                                    "schema": {
                                        "$ref": "#/components/schemas/AddComment"
                                    }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Updated book, or a plain-text validation/error message",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/Book"
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "delete": {
                        "summary": "Delete one book",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "string" }
                        }],
                        "responses": {
                            "200": {
                                "description": "'delete successful', 'no book exists', or 'cannot delete book'",
                                "content": {
                                    "text/plain": {
                                        "schema": { "type": "string" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "_id": {
                                "type": "string",
                                "description": "Unique identifier for the book"
                            },
                            "title": {
                                "type": "string",
                                "description": "Sanitized title of the book"
                            },
                            "comments": {
                                "type": "array",
                                "items": { "type": "string" },
                                "description": "Comments in submission order"
                            }
                        },
                        "required": ["_id", "title", "comments"]
                    },
                    "BookSummary": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "_id": { "type": "string" },
                            "commentcount": {
                                "type": "integer",
                                "description": "Number of comments on the book"
                            }
                        },
                        "required": ["title", "_id", "commentcount"]
                    },
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "title": {
                                "type": "string",
                                "description": "Title of the book; markup is stripped"
                            }
                        },
                        "required": ["title"]
                    },
                    "AddComment": {
                        "type": "object",
                        "properties": {
                            "comment": {
                                "type": "string",
                                "description": "Comment text; markup is stripped"
                            }
                        },
                        "required": ["comment"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        shelf_store::migrations()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module backed by `store`
pub fn create_module(store: BookStore) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(store))
}
