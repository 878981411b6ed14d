// Support tool handlers
//
// The bundled minimal configuration exposes the interpreter support tools;
// both bridge to a Python subprocess in the deployment's tool environment.
// Every other catalog tool is opaque to the gateway and gets its handler
// registered by the embedding deployment.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::process::Command;

use crate::dispatch::{Arguments, HandlerTable, ToolHandler};

/// Executes a snippet of Python and returns captured stdout/stderr.
pub struct RunPythonRepl {
	python: String,
}

impl RunPythonRepl {
	pub fn new(python: impl Into<String>) -> Self {
		Self {
			python: python.into(),
		}
	}
}

#[async_trait]
impl ToolHandler for RunPythonRepl {
	async fn call(&self, args: Arguments) -> anyhow::Result<Value> {
		let command = args
			.get("command")
			.and_then(Value::as_str)
			.unwrap_or_default();

		let output = Command::new(&self.python)
			.arg("-c")
			.arg(command)
			.output()
			.await?;

		let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
		let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
		if !output.status.success() {
			anyhow::bail!("python exited with {}: {}", output.status, stderr.trim());
		}
		Ok(json!({ "stdout": stdout, "stderr": stderr }))
	}
}

/// Reads the source of a catalog function via `inspect.getsource`.
///
/// Accepts a fully qualified `module.function` name; the name travels as an
/// argv entry, never interpolated into the script.
pub struct ReadFunctionSourceCode {
	python: String,
}

impl ReadFunctionSourceCode {
	pub fn new(python: impl Into<String>) -> Self {
		Self {
			python: python.into(),
		}
	}
}

const READ_SOURCE_SCRIPT: &str = r#"
import importlib, inspect, sys
name = sys.argv[1]
module_name, _, func_name = name.rpartition(".")
if not module_name:
    raise SystemExit(f"expected module.function, got {name!r}")
fn = getattr(importlib.import_module(module_name), func_name)
print(inspect.getsource(fn))
"#;

#[async_trait]
impl ToolHandler for ReadFunctionSourceCode {
	async fn call(&self, args: Arguments) -> anyhow::Result<Value> {
		let function_name = args
			.get("function_name")
			.and_then(Value::as_str)
			.unwrap_or_default();

		let output = Command::new(&self.python)
			.arg("-c")
			.arg(READ_SOURCE_SCRIPT)
			.arg(function_name)
			.output()
			.await?;

		if !output.status.success() {
			let stderr = String::from_utf8_lossy(&output.stderr);
			anyhow::bail!(
				"failed to read source of '{}': {}",
				function_name,
				stderr.trim()
			);
		}
		Ok(Value::String(
			String::from_utf8_lossy(&output.stdout).into_owned(),
		))
	}
}

/// Handler table covering the bundled minimal configuration.
pub fn support_handlers(python: &str) -> HandlerTable {
	HandlerTable::new()
		.with("run_python_repl", Arc::new(RunPythonRepl::new(python)))
		.with(
			"read_function_source_code",
			Arc::new(ReadFunctionSourceCode::new(python)),
		)
}
