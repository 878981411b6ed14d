// Tool handler table
//
// Handlers are registered once at startup and looked up by tool name at
// dispatch time: a static capability table rather than call-time name
// resolution over implementation modules.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Argument object passed to handlers: parameter name -> validated value.
pub type Arguments = Map<String, Value>;

/// One registered tool implementation.
///
/// Implementations are opaque to the gateway: they receive the validated,
/// defaulted argument mapping and return an arbitrary JSON payload. A
/// returned error is wrapped by the dispatcher; it never tears down the
/// process.
#[async_trait]
pub trait ToolHandler: Send + Sync {
	async fn call(&self, args: Arguments) -> anyhow::Result<Value>;
}

/// Handler backed by a plain function; convenient for small tools and test
/// doubles.
pub struct FnHandler<F>(F);

impl<F> FnHandler<F>
where
	F: Fn(Arguments) -> anyhow::Result<Value> + Send + Sync,
{
	pub fn new(f: F) -> Self {
		Self(f)
	}
}

#[async_trait]
impl<F> ToolHandler for FnHandler<F>
where
	F: Fn(Arguments) -> anyhow::Result<Value> + Send + Sync,
{
	async fn call(&self, args: Arguments) -> anyhow::Result<Value> {
		(self.0)(args)
	}
}

/// Static tool name -> handler mapping, built once at startup.
#[derive(Default, Clone)]
pub struct HandlerTable {
	handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl HandlerTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a handler under a tool name. A later registration for the
	/// same name replaces the earlier one.
	pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn ToolHandler>) {
		self.handlers.insert(name.into(), handler);
	}

	/// Builder method to register a handler
	pub fn with(mut self, name: impl Into<String>, handler: Arc<dyn ToolHandler>) -> Self {
		self.register(name, handler);
		self
	}

	/// Look up the handler for a tool name.
	pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolHandler>> {
		self.handlers.get(name)
	}

	/// Whether a handler is registered for `name`.
	pub fn contains(&self, name: &str) -> bool {
		self.handlers.contains_key(name)
	}

	/// Number of registered handlers
	pub fn len(&self) -> usize {
		self.handlers.len()
	}

	/// Check if the table is empty
	pub fn is_empty(&self) -> bool {
		self.handlers.is_empty()
	}
}

impl fmt::Debug for HandlerTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HandlerTable")
			.field("tools", &self.handlers.keys().collect::<Vec<_>>())
			.finish()
	}
}
