//! Mocky - OpenAPI mock server
//!
//! Reads an OpenAPI document and exposes one mock endpoint per declared
//! operation. Each endpoint answers with the operation's example response,
//! merged with whatever the caller sent.
//!
//! # Behaviour per method
//!
//! - **GET**: the example, plus a `query_params` object with the declared
//!   query parameters when any are declared
//! - **POST**: `application/json` bodies are shallow-merged over the example;
//!   other content types get 415
//! - **PUT**: the body is parsed as JSON regardless of content type and merged
//! - **DELETE**: always 204
//! - anything else: 405
//!
//! # Example document
//!
//! ```yaml
//! paths:
//!   /items/{id}:
//!     get:
//!       parameters:
//!         - name: verbose
//!           in: query
//!       responses:
//!         "200":
//!           content:
//!             application/json:
//!               example:
//!                 id: 1
//!                 name: Widget
//! ```

pub mod config;
pub mod error;
pub mod example;
pub mod handler;
pub mod matcher;
pub mod metrics;
pub mod openapi;
pub mod registry;
pub mod server;

pub use config::MockyConfig;
pub use error::MockyError;
pub use openapi::OpenApiDocument;
pub use registry::RouteRegistry;
pub use server::MockServer;
