// Dispatch error taxonomy
//
// Every variant is contained at the dispatch boundary and surfaced to the
// caller as a structured response; none of these abort the process. The
// messages distinguish fix-your-configuration (ToolUnavailable) from
// fix-your-request (NotFound, parameter errors) from the-tool-failed
// (ExecutionFailed, Timeout).

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced to a caller for one invocation.
#[derive(Error, Debug)]
pub enum DispatchError {
	/// The tool exists in the registry but is not enabled in this
	/// deployment; the fix is a configuration change, not a different name.
	#[error(
		"tool '{0}' exists in the registry but is not enabled in this deployment; \
		 add it to the selection configuration and restart"
	)]
	ToolUnavailable(String),

	/// The name is not in the registry at all.
	#[error("tool '{0}' is not in the registry; check the tool name")]
	NotFound(String),

	#[error("tool '{tool}' requires parameter '{param}'")]
	MissingParameter { tool: String, param: String },

	#[error("tool '{tool}' has no parameter '{param}'")]
	UnknownParameter { tool: String, param: String },

	#[error("parameter '{param}' of tool '{tool}' expects {expected}, got {actual}")]
	TypeMismatch {
		tool: String,
		param: String,
		expected: &'static str,
		actual: String,
	},

	/// The handler returned an error or panicked; the original message is
	/// preserved.
	#[error("tool '{tool}' failed: {message}")]
	ExecutionFailed { tool: String, message: String },

	#[error("tool '{tool}' timed out after {}s", timeout.as_secs())]
	Timeout { tool: String, timeout: Duration },
}

impl DispatchError {
	/// Stable kind tag carried on protocol error payloads.
	pub fn kind(&self) -> &'static str {
		match self {
			DispatchError::ToolUnavailable(_) => "tool_unavailable",
			DispatchError::NotFound(_) => "not_found",
			DispatchError::MissingParameter { .. } => "missing_parameter",
			DispatchError::UnknownParameter { .. } => "unknown_parameter",
			DispatchError::TypeMismatch { .. } => "type_mismatch",
			DispatchError::ExecutionFailed { .. } => "execution_error",
			DispatchError::Timeout { .. } => "timeout",
		}
	}

	/// Whether the failure happened while running the tool, as opposed to
	/// the request being rejected before execution.
	pub fn is_execution(&self) -> bool {
		matches!(
			self,
			DispatchError::ExecutionFailed { .. } | DispatchError::Timeout { .. }
		)
	}
}
