//! Router builder for the Bookshelf HTTP server

use axum::{
    extract::Request,
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use uuid::Uuid;

use bookshelf_kernel::ModuleRegistry;

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

    /// Mount a module's router under `/{module_name}`
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        self.router = self.router.nest(&format!("/{module_name}"), module_router);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(false))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware. An empty origin list allows any origin.
    pub fn with_cors(mut self, origins: &[String]) -> Self {
        let allow_origin = if origins.is_empty() {
            AllowOrigin::from(Any)
        } else {
            let parsed: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(%origin, "ignoring unparsable CORS origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(parsed)
        };

        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(allow_origin)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers(Any),
        );
        self
    }

    /// Generate an `x-request-id` for each request and echo it on the response
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    /// Add timeout middleware
    #[allow(deprecated)]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::new(Duration::from_millis(timeout_ms)));
        self
    }

    /// Serve the merged OpenAPI document at `/docs/openapi.json`
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let spec = openapi_document(registry);

        if let Err(e) = serde_json::from_value::<utoipa::openapi::OpenApi>(spec.clone()) {
            tracing::warn!(error = %e, "merged OpenAPI document does not parse as OpenAPI 3.1");
        }

        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { axum::Json(spec) }),
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

/// Merge every module's OpenAPI fragment into one document, prefixing each
/// path with the module mount point.
pub fn openapi_document(registry: &ModuleRegistry) -> Value {
    let mut spec = json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Bookshelf API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Library catalog: books behind bearer-token authentication"
        },
        "paths": {
            "/healthz": {
                "get": {
                    "summary": "Health check",
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": {
                                "text/plain": { "schema": { "type": "string" } }
                            }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "ErrorResponse": {
                    "type": "object",
                    "properties": {
                        "code": { "type": "string" },
                        "message": { "type": "string" },
                        "details": { "type": "array", "items": {} },
                        "trace_id": { "type": "string" },
                        "timestamp": { "type": "string" }
                    },
                    "required": ["code", "message", "trace_id", "timestamp"]
                }
            },
            "securitySchemes": {
                "bearerAuth": {
                    "type": "http",
                    "scheme": "bearer",
                    "bearerFormat": "JWT"
                }
            }
        }
    });

    for module in registry.custom_modules() {
        let Some(fragment) = module.openapi() else {
            continue;
        };

        if let Some(paths) = fragment.get("paths").and_then(Value::as_object) {
            for (path, item) in paths {
                let mounted = format!("/{}{}", module.name(), path.trim_end_matches('/'));
                spec["paths"][mounted] = item.clone();
            }
        }

        if let Some(schemas) = fragment
            .pointer("/components/schemas")
            .and_then(Value::as_object)
        {
            for (name, schema) in schemas {
                spec["components"]["schemas"][name] = schema.clone();
            }
        }
    }

    spec
}

/// UUID v7 request ids, so ids sort by arrival time in logs
#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let request_id = Uuid::now_v7().to_string().parse::<HeaderValue>().ok()?;
        Some(RequestId::new(request_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use bookshelf_kernel::Module;
    use std::sync::Arc;

    struct FragmentModule;

    #[async_trait::async_trait]
    impl Module for FragmentModule {
        fn name(&self) -> &'static str {
            "shelves"
        }

        fn openapi(&self) -> Option<Value> {
            Some(json!({
                "paths": {
                    "/": { "get": { "responses": { "200": { "description": "OK" } } } },
                    "/{id}": { "get": { "responses": { "200": { "description": "OK" } } } }
                },
                "components": { "schemas": { "Shelf": { "type": "object" } } }
            }))
        }
    }

    #[tokio::test]
    async fn mounted_module_is_served_under_its_name() {
        let module_router = Router::new().route("/", get(|| async { "module" }));
        let router = RouterBuilder::new()
            .mount_module("shelves", module_router)
            .build();

        let server = TestServer::new(router).expect("Failed to create test server");
        server.get("/shelves").await.assert_text("module");
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let router = RouterBuilder::new()
            .route("/health", get(|| async { "ok" }))
            .with_tracing()
            .with_cors(&[])
            .with_request_id()
            .with_timeout(5000)
            .build();

        let server = TestServer::new(router).expect("Failed to create test server");
        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let id = response.header("x-request-id");
        assert!(Uuid::parse_str(id.to_str().unwrap()).is_ok());
    }

    #[test]
    fn openapi_paths_are_prefixed_with_module_name() {
        let mut registry = ModuleRegistry::new();
        registry.register_custom(Arc::new(FragmentModule));

        let spec = openapi_document(&registry);

        assert!(spec["paths"]["/shelves"].is_object());
        assert!(spec["paths"]["/shelves/{id}"].is_object());
        assert!(spec["paths"]["/healthz"].is_object());
        assert!(spec["components"]["schemas"]["Shelf"].is_object());
        assert!(spec["components"]["schemas"]["ErrorResponse"].is_object());
    }

    #[test]
    fn merged_document_parses_as_openapi() {
        let mut registry = ModuleRegistry::new();
        registry.register_custom(Arc::new(FragmentModule));

        let parsed = serde_json::from_value::<utoipa::openapi::OpenApi>(openapi_document(&registry));
        assert!(parsed.is_ok(), "{:?}", parsed.err());
    }
}
