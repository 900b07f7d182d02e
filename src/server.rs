//! HTTP front end.
//!
//! Hands every request to the [`RouteRegistry`] first and falls back to the
//! fixed `/` and `/mocky/*` endpoints for methods the document leaves open.

use crate::error::{MockyError, RegistryError};
use crate::handler::{handle, MockRequest};
use crate::matcher::parse_query_string;
use crate::metrics::RouteCounter;
use crate::openapi::OpenApiDocument;
use crate::registry::{RouteLookup, RouteRegistry};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{debug, info, warn};

/// Endpoints served regardless of the loaded document.
pub const FIXED_ROUTES: [&str; 4] = ["/", "/mocky/info", "/mocky/health", "/mocky/routes"];

const COMPANY: &str = "Gremlin LTD";
const DESCRIPTION: &str =
    "Mocky is a HTTP mock service, it can read OpenAPI 3.1 specification and return example data.";

/// A route as reported by `/mocky/routes`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RouteSummary {
    pub path: String,
    pub methods: Vec<String>,
}

/// The mock HTTP server.
pub struct MockServer {
    registry: Arc<RouteRegistry>,
    registered: usize,
}

impl MockServer {
    /// Create a server around an already populated registry.
    pub fn new(registry: RouteRegistry) -> Self {
        let registered = registry.len();
        info!(routes = registered, "Mock server initialized");
        Self {
            registry: Arc::new(registry),
            registered,
        }
    }

    /// Register every operation of `document` and wrap the result.
    pub fn from_document(
        document: &OpenApiDocument,
        counter: &dyn RouteCounter,
    ) -> Result<Self, RegistryError> {
        let mut registry = RouteRegistry::new();
        let registered = registry.register(document, counter)?;
        info!(operations = registered, "Registered OpenAPI operations");

        let mut server = Self::new(registry);
        server.registered = registered;
        Ok(server)
    }

    /// Number of document operations registered at startup.
    pub fn registered(&self) -> usize {
        self.registered
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Build the axum router.
    ///
    /// Every request goes through [`dispatch`], so document routes always
    /// take precedence over the fixed endpoints.
    pub fn router(&self) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(Arc::clone(&self.registry))
    }

    /// Listen on `addr` until Ctrl-C or SIGTERM.
    pub async fn serve(self, addr: SocketAddr) -> Result<(), MockyError> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(address = %addr, routes = self.registry.len(), "Mock server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Mock server stopped");
        Ok(())
    }
}

/// Every route the server answers, dynamic routes first.
pub fn route_summaries(registry: &RouteRegistry) -> Vec<RouteSummary> {
    let with_options = |method: String| {
        if method == Method::OPTIONS.as_str() {
            vec![method]
        } else {
            vec![method, Method::OPTIONS.to_string()]
        }
    };

    registry
        .entries()
        .iter()
        .map(|entry| RouteSummary {
            path: entry.pattern.as_str().to_string(),
            methods: with_options(entry.method.to_string()),
        })
        .chain(FIXED_ROUTES.iter().map(|path| RouteSummary {
            path: path.to_string(),
            methods: with_options(Method::GET.to_string()),
        }))
        .collect()
}

/// Body of the fixed endpoint at `path`, if there is one.
fn fixed_endpoint(registry: &RouteRegistry, path: &str) -> Option<Value> {
    let body = match path {
        "/" => json!({ "message": "Are you meant to be here?" }),
        "/mocky/info" => json!({
            "name": "Mocky",
            "version": env!("CARGO_PKG_VERSION"),
            "description": DESCRIPTION,
            "author": env!("CARGO_PKG_AUTHORS"),
            "company": COMPANY,
            "repository": env!("CARGO_PKG_REPOSITORY"),
        }),
        "/mocky/health" => json!({ "status": "ok" }),
        "/mocky/routes" => json!(route_summaries(registry)),
        _ => return None,
    };
    Some(body)
}

/// Answer a request from the registry, then from the fixed endpoints.
async fn dispatch(
    State(registry): State<Arc<RouteRegistry>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path();

    let mut allowed = match registry.lookup(&method, path) {
        RouteLookup::Found { entry, path_params } => {
            debug!(
                route = %entry.id,
                method = %method,
                path = %path,
                ?path_params,
                "Request matched route"
            );

            let request = MockRequest {
                query: parse_query_string(uri.query().unwrap_or("")),
                content_type: headers
                    .get(header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string),
                body,
            };
            return handle(&entry.descriptor, &request).into_response();
        }
        RouteLookup::MethodNotAllowed { allowed } => allowed,
        RouteLookup::NotFound => Vec::new(),
    };

    if FIXED_ROUTES.contains(&path) {
        if method == Method::GET || method == Method::HEAD {
            if let Some(body) = fixed_endpoint(&registry, path) {
                return Json(body).into_response();
            }
        }
        if !allowed.contains(&Method::GET) {
            allowed.push(Method::GET);
        }
    }

    if allowed.is_empty() {
        debug!(method = %method, path = %path, "No matching route");
        return StatusCode::NOT_FOUND.into_response();
    }

    let allow = allow_header(&allowed);
    if method == Method::OPTIONS {
        (StatusCode::OK, [(header::ALLOW, allow)]).into_response()
    } else {
        debug!(method = %method, path = %path, allow = %allow, "Method not allowed");
        (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, allow)]).into_response()
    }
}

fn allow_header(allowed: &[Method]) -> String {
    let mut methods: Vec<&str> = allowed.iter().map(Method::as_str).collect();
    if allowed.contains(&Method::GET) && !allowed.contains(&Method::HEAD) {
        methods.push(Method::HEAD.as_str());
    }
    if !allowed.contains(&Method::OPTIONS) {
        methods.push(Method::OPTIONS.as_str());
    }
    methods.join(", ")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping mock server");
}
