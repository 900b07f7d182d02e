//! Route registration and lookup.
//!
//! The registry is filled once at startup from an [`OpenApiDocument`] and is
//! read-only afterwards, so it can be shared between request handlers
//! without locking.

use crate::error::RegistryError;
use crate::example::resolve_example;
use crate::handler::RouteDescriptor;
use crate::matcher::{convert_path, RoutePattern};
use crate::metrics::RouteCounter;
use crate::openapi::OpenApiDocument;
use axum::http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// One registered (pattern, method) pair.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    /// `<pattern>_<method>`, with the method as written in the document
    pub id: String,
    pub pattern: RoutePattern,
    pub method: Method,
    pub descriptor: Arc<RouteDescriptor>,
}

/// Outcome of looking up a request.
#[derive(Debug)]
pub enum RouteLookup<'a> {
    Found {
        entry: &'a RouteEntry,
        path_params: HashMap<String, String>,
    },
    /// The path is known but not for this method
    MethodNotAllowed { allowed: Vec<Method> },
    NotFound,
}

/// Append-only set of mock routes.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    entries: Vec<RouteEntry>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every operation of `document`.
    ///
    /// Returns the number of operations registered. Any failure aborts the
    /// whole registration.
    pub fn register(
        &mut self,
        document: &OpenApiDocument,
        counter: &dyn RouteCounter,
    ) -> Result<usize, RegistryError> {
        let mut registered = 0;

        for item in &document.paths {
            debug!(path = %item.template, "Registering path");
            if item.operations.is_empty() {
                continue;
            }

            let pattern = RoutePattern::compile(&convert_path(&item.template))?;

            for (method, operation) in &item.operations {
                debug!(path = %item.template, method = %method, "Registering method");

                let example = resolve_example(operation);
                let descriptor = RouteDescriptor::build(operation, example, method);
                self.add_route(pattern.clone(), method, descriptor)?;

                counter.add(1);
                registered += 1;
            }
        }

        Ok(registered)
    }

    /// Add a single route under an already compiled pattern.
    pub fn add_route(
        &mut self,
        pattern: RoutePattern,
        method: &str,
        descriptor: RouteDescriptor,
    ) -> Result<(), RegistryError> {
        let http_method = Method::from_bytes(method.to_ascii_uppercase().as_bytes()).map_err(
            |_| RegistryError::InvalidMethod {
                path: pattern.as_str().to_string(),
                method: method.to_string(),
            },
        )?;

        if self
            .entries
            .iter()
            .any(|e| e.method == http_method && e.pattern.as_str() == pattern.as_str())
        {
            warn!(
                pattern = %pattern.as_str(),
                method = %http_method,
                "Route registered twice, the first registration keeps answering"
            );
        }

        self.entries.push(RouteEntry {
            id: format!("{}_{}", pattern.as_str(), method),
            pattern,
            method: http_method,
            descriptor: Arc::new(descriptor),
        });
        Ok(())
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the route answering `method` on `path`.
    ///
    /// Routes are tried in registration order. `HEAD` falls back to a `GET`
    /// route on the same path when no `HEAD` route exists.
    pub fn lookup(&self, method: &Method, path: &str) -> RouteLookup<'_> {
        let mut allowed: Vec<Method> = Vec::new();
        let mut head_fallback = None;

        for entry in &self.entries {
            let Some(path_params) = entry.pattern.captures(path) else {
                continue;
            };
            if entry.method == *method {
                return RouteLookup::Found { entry, path_params };
            }
            if *method == Method::HEAD && entry.method == Method::GET && head_fallback.is_none() {
                head_fallback = Some((entry, path_params));
                continue;
            }
            if !allowed.contains(&entry.method) {
                allowed.push(entry.method.clone());
            }
        }

        match head_fallback {
            Some((entry, path_params)) => RouteLookup::Found { entry, path_params },
            None if allowed.is_empty() => RouteLookup::NotFound,
            None => RouteLookup::MethodNotAllowed { allowed },
        }
    }
}
