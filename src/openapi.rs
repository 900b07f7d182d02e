//! OpenAPI document model.
//!
//! Only the fields the mock server acts on are modelled: paths, the
//! operations under them, their parameters and their example responses.
//! Everything else in the document is accepted and ignored.

use crate::error::DocumentError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Media type whose `example` is served.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Path-item keys that are not operations.
const PATH_ITEM_FIELDS: [&str; 5] = ["parameters", "summary", "description", "servers", "$ref"];

/// A parsed OpenAPI document.
#[derive(Debug, Clone, Default)]
pub struct OpenApiDocument {
    /// Document metadata, when present
    pub info: Option<Info>,
    /// Path items in declaration order
    pub paths: Vec<PathItem>,
}

/// The `info` block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
}

/// All operations declared under one path template.
#[derive(Debug, Clone)]
pub struct PathItem {
    /// Path template as written, e.g. `/items/{id}`
    pub template: String,
    /// (method, operation) pairs in declaration order; method case is kept verbatim
    pub operations: Vec<(String, Operation)>,
}

/// One method's definition under one path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub parameters: Vec<Parameter>,

    /// Response definitions keyed by status code string
    #[serde(default)]
    pub responses: HashMap<String, ResponseDef>,
}

impl Operation {
    /// Names of the parameters declared `in: query`, in declaration order.
    pub fn query_parameter_names(&self) -> Vec<String> {
        self.parameters
            .iter()
            .filter(|p| p.is_query())
            .map(|p| p.name.clone())
            .collect()
    }
}

/// Parameter descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: String,

    /// Parameter location (`query`, `path`, `header`, `cookie`)
    #[serde(default, rename = "in")]
    pub location: String,
}

impl Parameter {
    pub fn is_query(&self) -> bool {
        self.location == "query"
    }
}

/// A single response definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseDef {
    /// Media type entries keyed by media type string
    #[serde(default)]
    pub content: Option<HashMap<String, MediaType>>,
}

/// A media type entry of a response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaType {
    /// `Some(Value::Null)` when the document says `example: null`
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub example: Option<Arc<Value>>,
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Arc<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| Some(Arc::new(v)))
}

impl OpenApiDocument {
    /// Load a document from a `.yaml`, `.yml` or `.json` file.
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let is_yaml = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => true,
            Some("json") => false,
            _ => {
                return Err(DocumentError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };

        let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_yaml::from_str(content)?;
        Self::from_value(value)
    }

    /// Parse a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    /// Build the model from an already parsed document tree.
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let Value::Object(mut root) = value else {
            return Err(DocumentError::InvalidStructure("root must be a mapping"));
        };

        // info is informational only, a malformed block is not worth failing over
        let info = root
            .remove("info")
            .and_then(|v| serde_json::from_value::<Info>(v).ok());

        let paths = match root.remove("paths") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(paths)) => paths
                .into_iter()
                .map(|(template, item)| parse_path_item(template, item))
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(DocumentError::InvalidStructure("`paths` must be a mapping"));
            }
        };

        Ok(Self { info, paths })
    }

    /// Total number of operations across all paths.
    pub fn operation_count(&self) -> usize {
        self.paths.iter().map(|p| p.operations.len()).sum()
    }
}

fn parse_path_item(template: String, item: Value) -> Result<PathItem, DocumentError> {
    let Value::Object(methods) = item else {
        return Err(DocumentError::InvalidPathItem {
            path: template,
            reason: "expected a mapping of methods".to_string(),
        });
    };

    let mut operations = Vec::with_capacity(methods.len());
    for (method, op) in methods {
        if is_path_item_field(&method) {
            continue;
        }
        let operation: Operation =
            serde_json::from_value(op).map_err(|source| DocumentError::InvalidOperation {
                path: template.clone(),
                method: method.clone(),
                source,
            })?;
        operations.push((method, operation));
    }

    Ok(PathItem {
        template,
        operations,
    })
}

fn is_path_item_field(key: &str) -> bool {
    PATH_ITEM_FIELDS.contains(&key) || key.starts_with("x-")
}
