// Dispatch layer
//
// Validates one invocation request against the active tool set and executes
// the registered handler, normalizing success and failure into a structured
// result:
// - Resolution distinguishes disabled tools from unknown ones
// - Validation applies defaults and type checks before anything runs
// - Execution is timeout-bounded and panic-contained
//
// No retries happen here; retry policy belongs to the calling agent.

mod error;
mod handler;
mod validate;

pub use error::DispatchError;
pub use handler::{Arguments, FnHandler, HandlerTable, ToolHandler};
pub use validate::validate_arguments;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::selection::ActiveToolSet;

/// One incoming call: a tool name and its argument mapping.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InvocationRequest {
	pub tool_name: String,
	#[serde(default)]
	pub arguments: Arguments,
}

impl InvocationRequest {
	pub fn new(tool_name: impl Into<String>, arguments: Arguments) -> Self {
		Self {
			tool_name: tool_name.into(),
			arguments,
		}
	}
}

/// Outcome of one invocation: the tool's complete payload, or a structured
/// error with a stable kind tag.
#[derive(Debug, Clone)]
pub enum InvocationResult {
	Success { payload: Value },
	Error { kind: &'static str, message: String },
}

impl InvocationResult {
	pub fn is_success(&self) -> bool {
		matches!(self, InvocationResult::Success { .. })
	}

	pub fn payload(&self) -> Option<&Value> {
		match self {
			InvocationResult::Success { payload } => Some(payload),
			InvocationResult::Error { .. } => None,
		}
	}

	pub fn error_kind(&self) -> Option<&'static str> {
		match self {
			InvocationResult::Success { .. } => None,
			InvocationResult::Error { kind, .. } => Some(kind),
		}
	}
}

impl From<DispatchError> for InvocationResult {
	fn from(err: DispatchError) -> Self {
		InvocationResult::Error {
			kind: err.kind(),
			message: err.to_string(),
		}
	}
}

/// Per-call execution settings.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
	/// Budget for one tool execution
	pub timeout: Duration,
	/// Value injected for a declared-but-absent `data_path` parameter
	pub data_path: Option<String>,
}

impl Default for DispatchConfig {
	fn default() -> Self {
		Self {
			timeout: Duration::from_secs(300),
			data_path: None,
		}
	}
}

/// Validates and executes invocation requests against an immutable active
/// set snapshot.
///
/// The dispatcher holds no mutable state: the active set and handler table
/// are frozen at startup and any number of invocations may run concurrently,
/// including invocations of the same tool.
#[derive(Clone)]
pub struct Dispatcher {
	active: ActiveToolSet,
	handlers: Arc<HandlerTable>,
	config: DispatchConfig,
}

impl Dispatcher {
	pub fn new(active: ActiveToolSet, handlers: HandlerTable, config: DispatchConfig) -> Self {
		Self {
			active,
			handlers: Arc::new(handlers),
			config,
		}
	}

	/// The active set this dispatcher serves.
	pub fn active(&self) -> &ActiveToolSet {
		&self.active
	}

	/// Run one request to completion. Always returns a result; per-call
	/// failures never escape the dispatch boundary.
	pub async fn invoke(&self, request: InvocationRequest) -> InvocationResult {
		match self.try_invoke(&request).await {
			Ok(payload) => {
				debug!(
					target: "dispatch",
					tool = %request.tool_name,
					result = %summarize(&payload),
					"tool call succeeded"
				);
				InvocationResult::Success { payload }
			},
			Err(err) => {
				warn!(
					target: "dispatch",
					tool = %request.tool_name,
					kind = err.kind(),
					"tool call failed: {err}"
				);
				InvocationResult::from(err)
			},
		}
	}

	/// Resolve, validate, and execute, with the typed error.
	pub async fn try_invoke(&self, request: &InvocationRequest) -> Result<Value, DispatchError> {
		let descriptor = match self.active.get(&request.tool_name) {
			Some(descriptor) => Arc::clone(descriptor),
			None if self.active.in_registry(&request.tool_name) => {
				return Err(DispatchError::ToolUnavailable(request.tool_name.clone()));
			},
			None => return Err(DispatchError::NotFound(request.tool_name.clone())),
		};

		let mut supplied = request.arguments.clone();
		if let Some(ref data_path) = self.config.data_path {
			validate::inject_data_path(&descriptor, &mut supplied, data_path);
		}
		let args = validate::validate_arguments(&descriptor, &supplied)?;

		// Startup handler-coverage filtering keeps this lookup from failing
		// for any advertised tool
		let handler = self
			.handlers
			.get(&descriptor.name)
			.ok_or_else(|| DispatchError::ExecutionFailed {
				tool: descriptor.name.clone(),
				message: "no handler registered".to_string(),
			})?;

		self.execute(&descriptor.name, Arc::clone(handler), args).await
	}

	/// Run the handler on its own task under the configured timeout. The
	/// task boundary contains panics; on timeout the task is abandoned, not
	/// killed.
	async fn execute(
		&self,
		tool: &str,
		handler: Arc<dyn ToolHandler>,
		args: Arguments,
	) -> Result<Value, DispatchError> {
		let task = tokio::spawn(async move { handler.call(args).await });
		match tokio::time::timeout(self.config.timeout, task).await {
			Ok(Ok(Ok(payload))) => Ok(payload),
			Ok(Ok(Err(err))) => Err(DispatchError::ExecutionFailed {
				tool: tool.to_string(),
				message: err.to_string(),
			}),
			Ok(Err(join_err)) => Err(DispatchError::ExecutionFailed {
				tool: tool.to_string(),
				message: join_err.to_string(),
			}),
			Err(_elapsed) => Err(DispatchError::Timeout {
				tool: tool.to_string(),
				timeout: self.config.timeout,
			}),
		}
	}
}

/// Short preview of a payload for log lines; the caller still receives the
/// full value.
fn summarize(value: &Value) -> String {
	let rendered = value.to_string();
	if rendered.chars().count() > 200 {
		let head: String = rendered.chars().take(200).collect();
		format!("{head}... ({} bytes total)", rendered.len())
	} else {
		rendered
	}
}
