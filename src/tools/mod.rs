//! Tool-call boundary
//!
//! Every catalog operation is exposed as a named tool taking a loosely typed
//! JSON object. A call answers with a text summary or a JSON rendering of the
//! affected records; failures carry the protocol error code a transport shell
//! reports to its client.

mod machines;
mod queries;
mod taxonomy;

use miette::Diagnostic;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::core::entity::Entity;
use crate::core::error::{Result, TaxonomyError, Violation};
use crate::core::identity::{EntityKind, Uid};
use crate::schema::SchemaRegistry;

/// Result of a successful tool call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolOutput {
    /// Text shown to the caller
    pub text: String,
    /// Structured payload, when the tool produced records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: None,
        }
    }

    /// A summary line backed by structured data
    pub fn with_data(text: impl Into<String>, data: Value) -> Self {
        Self {
            text: text.into(),
            data: Some(data),
        }
    }

    /// Pretty JSON as the text, the value as data
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        let data = to_value(value)?;
        let text = serde_json::to_string_pretty(&data).map_err(|e| {
            TaxonomyError::InvalidOperation(format!("tool output could not be rendered: {}", e))
        })?;
        Ok(Self {
            text,
            data: Some(data),
        })
    }

    /// Content envelope as sent over the tool protocol
    pub fn to_content(&self) -> Value {
        json!({ "content": [{ "type": "text", "text": self.text }] })
    }
}

/// Tool failure, mapped to a protocol error code
#[derive(Debug, Error, Diagnostic)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    #[diagnostic(
        code(taxo::tool::method_not_found),
        help("run `taxo tool list` to see the available tools")
    )]
    MethodNotFound(String),

    #[error("Validation error: {message}")]
    #[diagnostic(code(taxo::tool::invalid_params))]
    InvalidParams {
        message: String,
        violations: Vec<Violation>,
    },

    #[error("Error executing tool: {0}")]
    #[diagnostic(code(taxo::tool::internal_error))]
    Internal(String),
}

impl ToolError {
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    pub fn code(&self) -> i32 {
        match self {
            ToolError::MethodNotFound(_) => Self::METHOD_NOT_FOUND,
            ToolError::InvalidParams { .. } => Self::INVALID_PARAMS,
            ToolError::Internal(_) => Self::INTERNAL_ERROR,
        }
    }

    /// Error object as sent over the tool protocol
    pub fn to_error_object(&self) -> Value {
        match self {
            ToolError::InvalidParams { violations, .. } => json!({
                "code": self.code(),
                "message": self.to_string(),
                "data": violations,
            }),
            _ => json!({ "code": self.code(), "message": self.to_string() }),
        }
    }
}

impl From<TaxonomyError> for ToolError {
    fn from(err: TaxonomyError) -> Self {
        match err {
            TaxonomyError::Validation { violations } => {
                let message = TaxonomyError::Validation {
                    violations: violations.clone(),
                }
                .to_string();
                ToolError::InvalidParams {
                    message,
                    violations,
                }
            }
            other => ToolError::Internal(other.to_string()),
        }
    }
}

type Handler = fn(&Catalog, &Value) -> Result<ToolOutput>;

/// Name, description and input schema of a tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

struct Tool {
    spec: ToolSpec,
    handler: Handler,
}

/// All tools, in registration order
pub struct ToolRegistry {
    tools: Vec<Tool>,
    schemas: SchemaRegistry,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        let mut registry = Self {
            tools: Vec::new(),
            schemas: SchemaRegistry,
        };
        taxonomy::register(&mut registry);
        machines::register(&mut registry);
        queries::register(&mut registry);
        registry
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(
        &mut self,
        name: &'static str,
        description: &'static str,
        input_schema: Value,
        handler: Handler,
    ) {
        self.tools.push(Tool {
            spec: ToolSpec {
                name,
                description,
                input_schema,
            },
            handler,
        });
    }

    /// Creation schema of a collection, used as the input schema of its
    /// create tool
    fn create_schema(&self, kind: EntityKind) -> Value {
        self.schemas
            .create_schema(kind)
            .unwrap_or_else(|| json!({ "type": "object" }))
    }

    fn update_schema(&self, kind: EntityKind) -> Value {
        self.schemas
            .update_schema(kind)
            .unwrap_or_else(|| json!({ "type": "object", "required": ["uid"] }))
    }

    pub fn list(&self) -> Vec<&ToolSpec> {
        self.tools.iter().map(|t| &t.spec).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|t| t.spec.name == name).map(|t| &t.spec)
    }

    /// Dispatch a call by tool name
    pub fn call(
        &self,
        catalog: &Catalog,
        name: &str,
        input: &Value,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.spec.name == name)
            .ok_or_else(|| ToolError::MethodNotFound(name.to_string()))?;
        let empty = json!({});
        let input = if input.is_null() { &empty } else { input };
        tracing::debug!(tool = name, "tool call");
        (tool.handler)(catalog, input).map_err(|err| {
            tracing::warn!(tool = name, error = %err, "tool call failed");
            ToolError::from(err)
        })
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| {
        TaxonomyError::InvalidOperation(format!("tool output could not be rendered: {}", e))
    })
}

/// Input schema of a tool taking only optional string filters
fn filter_schema(fields: &[(&str, &str)]) -> Value {
    let properties: serde_json::Map<String, Value> = fields
        .iter()
        .map(|(name, description)| {
            (
                name.to_string(),
                json!({ "type": "string", "description": description }),
            )
        })
        .collect();
    json!({ "type": "object", "properties": properties })
}

/// Input schema of a tool taking one required UID
fn uid_schema(field: &str, description: &str) -> Value {
    json!({
        "type": "object",
        "properties": { field: { "type": "string", "description": description } },
        "required": [field]
    })
}

/// A required string argument
fn str_arg<'a>(input: &'a Value, field: &str) -> Result<&'a str> {
    match input.get(field) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(TaxonomyError::validation(vec![Violation::new(
            format!("/{}", field),
            "must be a string",
        )])),
        None => Err(TaxonomyError::validation(vec![Violation::new(
            format!("/{}", field),
            "is required",
        )])),
    }
}

/// An optional UID filter
fn uid_filter(input: &Value, field: &str) -> Result<Option<Uid>> {
    match input.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Uid::parse(s).map(Some).map_err(|_| {
            TaxonomyError::validation(vec![Violation::new(
                format!("/{}", field),
                "must be a ULID or UUID",
            )])
        }),
        Some(_) => Err(TaxonomyError::validation(vec![Violation::new(
            format!("/{}", field),
            "must be a string",
        )])),
    }
}

/// An optional argument parsed with `FromStr`
fn parsed_filter<T: std::str::FromStr<Err = String>>(
    input: &Value,
    field: &str,
) -> Result<Option<T>> {
    match input.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => s.parse().map(Some).map_err(|e: String| {
            TaxonomyError::validation(vec![Violation::new(format!("/{}", field), e)])
        }),
        Some(_) => Err(TaxonomyError::validation(vec![Violation::new(
            format!("/{}", field),
            "must be a string",
        )])),
    }
}

fn title(kind: EntityKind) -> String {
    let noun = kind.noun();
    let mut chars = noun.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// "<Kind> created successfully!" with the record's UID and name
fn created<E: Entity>(entity: &E) -> Result<ToolOutput> {
    Ok(ToolOutput::with_data(
        format!(
            "{} created successfully!\nUID: {}\nName: {}",
            title(E::KIND),
            entity.uid(),
            entity.name()
        ),
        to_value(entity)?,
    ))
}

fn updated<E: Entity>(entity: &E) -> Result<ToolOutput> {
    Ok(ToolOutput::with_data(
        format!(
            "{} updated successfully!\nUID: {}\nName: {}",
            title(E::KIND),
            entity.uid(),
            entity.name()
        ),
        to_value(entity)?,
    ))
}

fn deleted(kind: EntityKind, uid: &str) -> ToolOutput {
    ToolOutput::with_data(
        format!("{} deleted successfully (UID: {})", title(kind), uid),
        json!({ "uid": uid }),
    )
}

/// One block per record: label and name, then the UID
fn listed<E: Entity>(kind: EntityKind, items: &[E]) -> Result<ToolOutput> {
    let data = to_value(&items)?;
    if items.is_empty() {
        return Ok(ToolOutput::with_data(
            format!("No {} found", kind.collection().replace('-', " ")),
            data,
        ));
    }
    let blocks: Vec<String> = items
        .iter()
        .map(|item| match item.label() {
            Some(label) => format!("- {} ({})\n  UID: {}", label.en, item.name(), item.uid()),
            None => format!("- {}\n  UID: {}", item.name(), item.uid()),
        })
        .collect();
    Ok(ToolOutput::with_data(
        format!(
            "Found {} {}:\n\n{}",
            items.len(),
            kind.collection().replace('-', " "),
            blocks.join("\n\n")
        ),
        data,
    ))
}

/// Generic `get_<kind>` handler
fn get_entity<E: Entity>(catalog: &Catalog, input: &Value) -> Result<ToolOutput> {
    let uid = str_arg(input, "uid")?;
    let entity: E = catalog.get(uid)?;
    ToolOutput::json(&entity)
}
