// Registry error types

use thiserror::Error;

/// Errors raised while loading or building the tool registry.
///
/// All of these are fatal at startup: a gateway with a malformed manifest
/// must not begin serving.
#[derive(Error, Debug)]
pub enum ManifestError {
	#[error("failed to read manifest: {0}")]
	Io(#[from] std::io::Error),

	#[error("failed to parse manifest: {0}")]
	Parse(#[from] serde_json::Error),

	#[error("unsupported manifest schema version {0}")]
	UnsupportedSchemaVersion(u32),

	#[error("duplicate tool name: '{0}'")]
	DuplicateToolName(String),

	#[error("tool '{tool}' declares parameter '{param}' more than once")]
	DuplicateParameter { tool: String, param: String },

	#[error("tool '{tool}' declares a default on required parameter '{param}'")]
	DefaultOnRequired { tool: String, param: String },
}

/// Lookup failure for [`crate::registry::Registry::get`]: the name is not in
/// the full catalog at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("tool '{0}' is not in the registry")]
pub struct ToolNotFound(pub String);
