//! Router builder for the shelf HTTP server

use axum::{http::StatusCode, routing::get, Router};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use shelf_kernel::ModuleRegistry;

/// Builder for constructing the main HTTP router
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount a module's router under `/api/{module_name}`
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        let api_path = format!("/api/{}", module_name);
        self.router = self.router.nest(&api_path, module_router);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Add request ID middleware
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
        self
    }

    /// Add timeout middleware; timed-out requests get a 408
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self.router.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_millis(timeout_ms),
        ));
        self
    }

    /// Collect OpenAPI fragments from all modules and serve them through
    /// Swagger UI plus a raw JSON endpoint.
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let mut spec = base_openapi_spec();

        for module in registry.modules() {
            if let Some(fragment) = module.openapi() {
                merge_module_spec(&mut spec, module.name(), &fragment);
            }
        }

        // Deserialize the merged JSON into a utoipa object so SwaggerUI can
        // serve it; fall back to a bare spec if a module fragment is invalid.
        let openapi_obj: utoipa::openapi::OpenApi = serde_json::from_value(spec.clone())
            .unwrap_or_else(|_| {
                utoipa::openapi::OpenApiBuilder::new()
                    .info(
                        utoipa::openapi::InfoBuilder::new()
                            .title("Shelf API")
                            .version("1.0.0")
                            .build(),
                    )
                    .build()
            });

        self.router = self.router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi_obj),
        );

        // Raw JSON spec for external consumers.
        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { axum::Json(spec.clone()) }),
        );

        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn base_openapi_spec() -> serde_json::Value {
    serde_json::json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Shelf API",
            "version": "1.0.0",
            "description": "Personal library service API"
        },
        "paths": {
            "/healthz": {
                "get": {
                    "summary": "Health check",
                    "responses": {
                        "200": {
                            "description": "OK",
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
            "schemas": {}
        }
    })
}

/// Merge one module's paths and schemas into the top-level spec, prefixing
/// paths with the module's mount point.
fn merge_module_spec(spec: &mut serde_json::Value, module_name: &str, fragment: &serde_json::Value) {
    if let Some(paths) = fragment.get("paths").and_then(|p| p.as_object()) {
        for (path, path_item) in paths {
            let suffix = if path == "/" { "" } else { path.as_str() };
            let prefixed_path = format!("/api/{}{}", module_name, suffix);
            spec["paths"][prefixed_path] = path_item.clone();
        }
    }

    if let Some(schemas) = fragment
        .pointer("/components/schemas")
        .and_then(|s| s.as_object())
    {
        for (schema_name, schema_def) in schemas {
            spec["components"]["schemas"][schema_name] = schema_def.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use std::sync::Arc;

    struct SpecModule;

    #[async_trait::async_trait]
    impl shelf_kernel::Module for SpecModule {
        fn name(&self) -> &'static str {
            "books"
        }

        fn openapi(&self) -> Option<serde_json::Value> {
            Some(serde_json::json!({
                "paths": {
                    "/": { "get": { "summary": "List" } },
                    "/{id}": { "get": { "summary": "Fetch" } }
                },
                "components": {
                    "schemas": { "Book": { "type": "object" } }
                }
            }))
        }
    }

    #[tokio::test]
    async fn router_builds_with_middleware_chain() {
        let _router = RouterBuilder::new()
            .with_tracing()
            .with_cors()
            .with_request_id()
            .with_timeout(5000)
            .route("/health", get(|| async { "ok" }))
            .build();
    }

    #[tokio::test]
    async fn module_routes_are_mounted() {
        let module_router = Router::new().route("/", get(|| async { "module" }));

        let _router = RouterBuilder::new()
            .mount_module("books", module_router)
            .build();
    }

    #[test]
    fn module_paths_are_prefixed_in_merged_spec() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(SpecModule));

        let mut spec = base_openapi_spec();
        for module in registry.modules() {
            if let Some(fragment) = module.openapi() {
                merge_module_spec(&mut spec, module.name(), &fragment);
            }
        }

        assert!(spec.pointer("/paths/~1api~1books").is_some());
        assert!(spec.pointer("/paths/~1api~1books~1{id}").is_some());
        assert!(spec.pointer("/components/schemas/Book").is_some());
    }
}
