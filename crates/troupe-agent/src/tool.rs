//! Tool framework for prompt-based function calling.
//!
//! A tool is a callable with a typed signature. Models see the signatures as
//! JSON inside the system prompt and answer with `<tool_call>` blocks; each
//! block is decoded into a [`RawToolCall`], checked against the signature by
//! [`validate`] and dispatched through the [`ToolRegistry`].
//!
//! # Example
//!
//! ```rust,ignore
//! use troupe_agent::{ArgType, FnTool, ToolRegistry, ToolResult};
//!
//! let sum = FnTool::builder("sum_two_elements")
//!     .description("Add two integers")
//!     .param("a", ArgType::Int)
//!     .param("b", ArgType::Int)
//!     .handler(|args| Ok(ToolResult::from(args.int("a")? + args.int("b")?)))
//!     .build()?;
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(sum)?;
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AgentError, ArgumentError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Argument Types
// ─────────────────────────────────────────────────────────────────────────────

/// Primitive type a tool parameter may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    Int,
    Str,
    Bool,
    Float,
}

impl ArgType {
    /// Type tag as it appears in a signature.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgType::Int => "int",
            ArgType::Str => "str",
            ArgType::Bool => "bool",
            ArgType::Float => "float",
        }
    }

    /// Convert a raw JSON value to this type.
    ///
    /// Values already of the right type are kept. Returns `None` when no
    /// sensible conversion exists; null, arrays and objects never convert.
    pub fn coerce(self, value: &Value) -> Option<ArgValue> {
        match self {
            ArgType::Int => coerce_int(value).map(ArgValue::Int),
            ArgType::Str => coerce_str(value).map(ArgValue::Str),
            ArgType::Bool => coerce_bool(value).map(ArgValue::Bool),
            ArgType::Float => coerce_float(value).map(ArgValue::Float),
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArgType {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "int" | "integer" => Ok(ArgType::Int),
            "str" | "string" => Ok(ArgType::Str),
            "bool" | "boolean" => Ok(ArgType::Bool),
            "float" | "number" => Ok(ArgType::Float),
            other => Err(AgentError::invalid_signature(format!(
                "unsupported parameter type '{other}'"
            ))),
        }
    }
}

fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn coerce_float(value: &Value) -> Option<f64> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => return None,
    };
    f.is_finite().then_some(f)
}

fn coerce_str(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// A typed argument value after validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Int(i64),
    Str(String),
    Bool(bool),
    Float(f64),
}

impl ArgValue {
    /// The type of this value.
    pub fn arg_type(&self) -> ArgType {
        match self {
            ArgValue::Int(_) => ArgType::Int,
            ArgValue::Str(_) => ArgType::Str,
            ArgValue::Bool(_) => ArgType::Bool,
            ArgValue::Float(_) => ArgType::Float,
        }
    }

    /// Render back to JSON.
    pub fn to_json(&self) -> Value {
        match self {
            ArgValue::Int(i) => Value::from(*i),
            ArgValue::Str(s) => Value::from(s.as_str()),
            ArgValue::Bool(b) => Value::from(*b),
            ArgValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Int(i) => write!(f, "{i}"),
            ArgValue::Str(s) => f.write_str(s),
            ArgValue::Bool(b) => write!(f, "{b}"),
            ArgValue::Float(x) => write!(f, "{x}"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Signatures
// ─────────────────────────────────────────────────────────────────────────────

/// A declared tool parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolParameter {
    pub name: String,
    pub ty: ArgType,
}

/// Name, description and typed parameters of a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSignature {
    pub name: String,
    pub description: String,
    /// Parameters in declaration order.
    pub parameters: Vec<ToolParameter>,
}

impl ToolSignature {
    /// Create a signature with no parameters.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Add a parameter.
    pub fn with_param(mut self, name: impl Into<String>, ty: ArgType) -> Self {
        self.parameters.push(ToolParameter {
            name: name.into(),
            ty,
        });
        self
    }

    /// Declared type of a parameter.
    pub fn param_type(&self, name: &str) -> Option<ArgType> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.ty)
    }

    /// Reject empty names and duplicate parameters.
    pub fn check(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AgentError::invalid_signature("tool name cannot be empty"));
        }
        for (i, param) in self.parameters.iter().enumerate() {
            if param.name.trim().is_empty() {
                return Err(AgentError::invalid_signature(format!(
                    "tool '{}' has a parameter with an empty name",
                    self.name
                )));
            }
            if self.parameters[..i].iter().any(|p| p.name == param.name) {
                return Err(AgentError::invalid_signature(format!(
                    "tool '{}' declares parameter '{}' twice",
                    self.name, param.name
                )));
            }
        }
        Ok(())
    }

    /// Parse a signature from its JSON form.
    ///
    /// ```json
    /// {"name": "f", "description": "…", "parameters": {"properties": {"a": {"type": "int"}}}}
    /// ```
    ///
    /// Every property must carry a supported `type` tag.
    pub fn from_json(value: &Value) -> Result<Self> {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| AgentError::invalid_signature("signature has no 'name'"))?;
        let description = value
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let mut signature = Self::new(name, description);

        let properties = value
            .get("parameters")
            .and_then(|p| p.get("properties"))
            .and_then(Value::as_object);
        if let Some(properties) = properties {
            for (param, schema) in properties {
                let tag = schema.get("type").and_then(Value::as_str).ok_or_else(|| {
                    AgentError::invalid_signature(format!(
                        "tool '{name}' parameter '{param}' has no type"
                    ))
                })?;
                signature = signature.with_param(param.clone(), tag.parse()?);
            }
        }

        signature.check()?;
        Ok(signature)
    }

    /// Render the signature as JSON for the tool catalog.
    pub fn to_json(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), serde_json::json!({ "type": p.ty.as_str() })))
            .collect();

        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "parameters": { "properties": properties },
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool Calls
// ─────────────────────────────────────────────────────────────────────────────

/// A tool call as emitted by the model, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
    /// Model-supplied identifier, kept for logging only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl RawToolCall {
    /// Create a call with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Map::new(),
            id: None,
        }
    }

    /// Add an argument.
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// Set the model-supplied id.
    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Decode the JSON body of a `<tool_call>` block.
    pub fn parse(block: &str) -> Result<Self> {
        serde_json::from_str(block)
            .map_err(|e| AgentError::malformed(format!("{e} in {block:?}")))
    }
}

/// Validated, typed arguments in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    values: Vec<(String, ArgValue)>,
}

impl ToolArgs {
    /// Look up an argument.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get an integer argument.
    pub fn int(&self, name: &str) -> Result<i64> {
        match self.get(name) {
            Some(ArgValue::Int(i)) => Ok(*i),
            _ => Err(self.wrong_type(name, ArgType::Int)),
        }
    }

    /// Get a float argument.
    pub fn float(&self, name: &str) -> Result<f64> {
        match self.get(name) {
            Some(ArgValue::Float(f)) => Ok(*f),
            _ => Err(self.wrong_type(name, ArgType::Float)),
        }
    }

    /// Get a string argument.
    pub fn str(&self, name: &str) -> Result<&str> {
        match self.get(name) {
            Some(ArgValue::Str(s)) => Ok(s),
            _ => Err(self.wrong_type(name, ArgType::Str)),
        }
    }

    /// Get a boolean argument.
    pub fn bool(&self, name: &str) -> Result<bool> {
        match self.get(name) {
            Some(ArgValue::Bool(b)) => Ok(*b),
            _ => Err(self.wrong_type(name, ArgType::Bool)),
        }
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn wrong_type(&self, name: &str, expected: ArgType) -> AgentError {
        AgentError::tool(format!("argument '{name}' is not a validated {expected}"))
    }
}

/// A tool call whose arguments match the tool's signature.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCall {
    pub name: String,
    pub args: ToolArgs,
    pub id: Option<Value>,
}

impl ValidatedCall {
    /// Convert back to the raw form.
    pub fn to_raw(&self) -> RawToolCall {
        RawToolCall {
            name: self.name.clone(),
            arguments: self
                .args
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_json()))
                .collect(),
            id: self.id.clone(),
        }
    }
}

/// Check a raw call against a signature and coerce its arguments.
///
/// Undeclared arguments, missing arguments and values that cannot be
/// coerced are errors. The raw call is left untouched.
pub fn validate(
    call: &RawToolCall,
    signature: &ToolSignature,
) -> std::result::Result<ValidatedCall, ArgumentError> {
    if let Some(unknown) = call
        .arguments
        .keys()
        .find(|name| signature.param_type(name).is_none())
    {
        return Err(ArgumentError::Unknown {
            tool: signature.name.clone(),
            argument: unknown.clone(),
        });
    }

    let mut values = Vec::with_capacity(signature.parameters.len());
    for param in &signature.parameters {
        let raw = call
            .arguments
            .get(&param.name)
            .ok_or_else(|| ArgumentError::Missing {
                tool: signature.name.clone(),
                argument: param.name.clone(),
            })?;

        let value = param.ty.coerce(raw).ok_or_else(|| ArgumentError::Type {
            tool: signature.name.clone(),
            argument: param.name.clone(),
            expected: param.ty,
            value: raw.to_string(),
        })?;
        values.push((param.name.clone(), value));
    }

    Ok(ValidatedCall {
        name: call.name.clone(),
        args: ToolArgs { values },
        id: call.id.clone(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool Result
// ─────────────────────────────────────────────────────────────────────────────

/// Result of a tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolResult {
    /// Text output.
    Text {
        /// The text content.
        content: String,
    },
    /// JSON output.
    Json {
        /// The JSON content.
        content: Value,
    },
}

impl ToolResult {
    /// Create a text result.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Create a JSON result.
    pub fn json(content: Value) -> Self {
        Self::Json { content }
    }

    /// The result as a JSON value, for observation messages.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Text { content } => Value::from(content.as_str()),
            Self::Json { content } => content.clone(),
        }
    }

    /// Get the content as a string for LLM consumption.
    pub fn to_llm_content(&self) -> String {
        match self {
            Self::Text { content } => content.clone(),
            Self::Json { content } => content.to_string(),
        }
    }
}

impl From<i64> for ToolResult {
    fn from(n: i64) -> Self {
        Self::json(Value::from(n))
    }
}

impl From<f64> for ToolResult {
    fn from(x: f64) -> Self {
        Self::json(Value::from(x))
    }
}

impl From<String> for ToolResult {
    fn from(s: String) -> Self {
        Self::text(s)
    }
}

impl From<&str> for ToolResult {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl fmt::Display for ToolResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_llm_content())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for tools callable by an agent.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The typed signature shown to the model.
    fn signature(&self) -> &ToolSignature;

    /// Get the unique name of this tool.
    fn name(&self) -> &str {
        &self.signature().name
    }

    /// Name, description and parameters as JSON.
    fn describe(&self) -> Value {
        self.signature().to_json()
    }

    /// Run the tool with validated arguments.
    ///
    /// Errors are returned to the caller unchanged.
    async fn invoke(&self, args: &ToolArgs) -> Result<ToolResult>;
}

type Handler = Arc<dyn Fn(&ToolArgs) -> Result<ToolResult> + Send + Sync>;

/// A tool backed by a synchronous closure.
#[derive(Clone)]
pub struct FnTool {
    signature: ToolSignature,
    handler: Handler,
}

impl FnTool {
    /// Start building a tool.
    pub fn builder(name: impl Into<String>) -> FnToolBuilder {
        FnToolBuilder {
            signature: ToolSignature::new(name, ""),
            handler: None,
        }
    }

    /// Wrap a closure with an existing signature.
    pub fn from_signature<F>(signature: ToolSignature, handler: F) -> Result<Self>
    where
        F: Fn(&ToolArgs) -> Result<ToolResult> + Send + Sync + 'static,
    {
        signature.check()?;
        Ok(Self {
            signature,
            handler: Arc::new(handler),
        })
    }
}

impl fmt::Debug for FnTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTool")
            .field("signature", &self.signature)
            .finish()
    }
}

#[async_trait]
impl Tool for FnTool {
    fn signature(&self) -> &ToolSignature {
        &self.signature
    }

    async fn invoke(&self, args: &ToolArgs) -> Result<ToolResult> {
        (self.handler)(args)
    }
}

/// Builder for [`FnTool`].
pub struct FnToolBuilder {
    signature: ToolSignature,
    handler: Option<Handler>,
}

impl FnToolBuilder {
    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.signature.description = description.into();
        self
    }

    /// Declare a parameter.
    pub fn param(mut self, name: impl Into<String>, ty: ArgType) -> Self {
        self.signature = self.signature.with_param(name, ty);
        self
    }

    /// Set the callable.
    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ToolArgs) -> Result<ToolResult> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Build the tool, checking the signature.
    pub fn build(self) -> Result<FnTool> {
        self.signature.check()?;
        let handler = self.handler.ok_or_else(|| {
            AgentError::invalid_signature(format!("tool '{}' has no handler", self.signature.name))
        })?;
        Ok(FnTool {
            signature: self.signature,
            handler,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Registry for managing available tools.
///
/// Tools keep their registration order, which is also the order of the
/// catalog shown to the model.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool.
    ///
    /// The signature is checked first. A tool with the same name is
    /// replaced in place.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    /// Register a tool from an Arc.
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        tool.signature().check()?;
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(i) => self.tools[i] = tool,
            None => self.tools.push(tool),
        }
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Check if a tool exists.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    /// Get all tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Render every signature as JSON, one per line.
    pub fn catalog(&self) -> String {
        self.tools
            .iter()
            .map(|t| t.describe().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Create a new registry containing only tools whose names are in the allowlist.
    ///
    /// Names not matching any registered tool are silently ignored.
    pub fn filtered_by_names(&self, names: &[&str]) -> ToolRegistry {
        ToolRegistry {
            tools: self
                .tools
                .iter()
                .filter(|t| names.contains(&t.name()))
                .cloned()
                .collect(),
        }
    }

    /// Look up, validate and invoke a call.
    pub async fn dispatch(&self, call: &RawToolCall) -> Result<(ValidatedCall, ToolResult)> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        let validated = validate(call, tool.signature())?;
        let result = tool.invoke(&validated.args).await?;
        Ok((validated, result))
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
