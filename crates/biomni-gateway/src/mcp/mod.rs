// MCP exposure surface
//
// Translates the active tool set into MCP tool listings and routes
// `tools/call` requests through the dispatcher. Error mapping:
// - resolution and request-shape failures become invalid_params protocol
//   errors (the caller can repair the call)
// - execution failures and timeouts become is_error tool results carrying
//   the kind tag (the call was well-formed; the tool itself failed)
// Either way, every dispatcher error reaches the caller.

mod schema;

pub use schema::input_schema;

use std::borrow::Cow;
use std::sync::Arc;

use itertools::Itertools;
use rmcp::ErrorData;
use rmcp::ServerHandler;
use rmcp::model::{
	Annotated, CallToolRequestParam, CallToolResult, Implementation, ListToolsResult,
	PaginatedRequestParam, RawContent, RawTextContent, ServerCapabilities, ServerInfo, Tool,
	ToolsCapability,
};
use rmcp::service::{RequestContext, RoleServer};
use serde_json::{json, Value};
use tracing::debug;

use crate::dispatch::{Dispatcher, InvocationRequest, InvocationResult};

/// MCP server handler backed by the dispatcher's active set.
#[derive(Clone)]
pub struct McpGateway {
	dispatcher: Arc<Dispatcher>,
}

impl McpGateway {
	pub fn new(dispatcher: Dispatcher) -> Self {
		Self {
			dispatcher: Arc::new(dispatcher),
		}
	}

	/// The advertised tool list for the active set, in manifest order.
	pub fn tool_listing(&self) -> Vec<Tool> {
		self
			.dispatcher
			.active()
			.iter()
			.map(|descriptor| Tool {
				name: Cow::Owned(descriptor.name.clone()),
				title: None,
				description: Some(Cow::Owned(descriptor.description.clone())),
				input_schema: Arc::new(schema::input_schema(descriptor)),
				output_schema: None,
				annotations: None,
				icons: None,
				meta: None,
			})
			.collect_vec()
	}
}

impl ServerHandler for McpGateway {
	fn get_info(&self) -> ServerInfo {
		ServerInfo {
			capabilities: ServerCapabilities {
				tools: Some(ToolsCapability::default()),
				..Default::default()
			},
			server_info: Implementation::from_build_env(),
			instructions: Some(
				"This server exposes the biomedical analysis tools enabled for this deployment. \
				 List tools to see the active set; disabled catalog tools are not callable."
					.to_string(),
			),
			..Default::default()
		}
	}

	async fn list_tools(
		&self,
		_request: Option<PaginatedRequestParam>,
		_context: RequestContext<RoleServer>,
	) -> Result<ListToolsResult, ErrorData> {
		let tools = self.tool_listing();
		debug!(target: "mcp", count = tools.len(), "listing tools");
		Ok(ListToolsResult {
			tools,
			next_cursor: None,
			meta: None,
		})
	}

	async fn call_tool(
		&self,
		request: CallToolRequestParam,
		_context: RequestContext<RoleServer>,
	) -> Result<CallToolResult, ErrorData> {
		let invocation = InvocationRequest::new(
			request.name.to_string(),
			request.arguments.unwrap_or_default(),
		);

		match self.dispatcher.invoke(invocation).await {
			InvocationResult::Success { payload } => Ok(success_result(&payload)),
			InvocationResult::Error {
				kind: kind @ ("execution_error" | "timeout"),
				message,
			} => Ok(error_result(kind, &message)),
			InvocationResult::Error { kind, message } => Err(ErrorData::invalid_params(
				format!("{kind}: {message}"),
				None,
			)),
		}
	}
}

/// Wrap a successful payload: full JSON as text, plus structured content
/// when the payload is object-shaped.
fn success_result(payload: &Value) -> CallToolResult {
	let text = match payload {
		Value::String(s) => s.clone(),
		other => serde_json::to_string_pretty(other).unwrap_or_default(),
	};
	let structured = matches!(payload, Value::Object(_) | Value::Array(_));
	CallToolResult {
		content: vec![text_content(text)],
		structured_content: structured.then(|| payload.clone()),
		is_error: Some(false),
		meta: None,
	}
}

/// Wrap an execution failure as an is_error tool result with the kind tag.
fn error_result(kind: &str, message: &str) -> CallToolResult {
	CallToolResult {
		content: vec![text_content(format!("{kind}: {message}"))],
		structured_content: Some(json!({
			"error": { "kind": kind, "message": message }
		})),
		is_error: Some(true),
		meta: None,
	}
}

fn text_content(text: String) -> Annotated<RawContent> {
	Annotated {
		raw: RawContent::Text(RawTextContent { text, meta: None }),
		annotations: None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dispatch::{Arguments, DispatchConfig, FnHandler, HandlerTable};
	use crate::registry::{ParamType, ParameterSpec, Registry, ToolDescriptor};
	use crate::selection::{SelectionConfig, SelectionPolicy};
	use serde_json::json;

	fn gateway() -> McpGateway {
		let registry = Arc::new(
			Registry::from_descriptors(vec![
				ToolDescriptor::new("predict_admet_properties", "biomni.tool.pharmacology")
					.with_description("Predict ADMET properties from a SMILES string")
					.require(ParameterSpec::new("smiles", ParamType::String)),
				ToolDescriptor::new("run_diffdock_with_smiles", "biomni.tool.pharmacology")
					.require(ParameterSpec::new("smiles", ParamType::String)),
			])
			.unwrap(),
		);

		let mut config = SelectionConfig::default();
		config.selected_tools.insert(
			"biomni.tool.pharmacology".to_string(),
			vec!["predict_admet_properties".to_string()],
		);
		let resolution = SelectionPolicy::resolve(&config, registry);

		let handlers = HandlerTable::new().with(
			"predict_admet_properties",
			Arc::new(FnHandler::new(|args: Arguments| {
				Ok(json!({ "smiles": args["smiles"] }))
			})),
		);

		McpGateway::new(Dispatcher::new(
			resolution.active,
			handlers,
			DispatchConfig::default(),
		))
	}

	#[test]
	fn test_listing_covers_only_active_tools() {
		let listing = gateway().tool_listing();

		assert_eq!(listing.len(), 1);
		assert_eq!(listing[0].name, "predict_admet_properties");
		assert_eq!(
			listing[0].description.as_deref(),
			Some("Predict ADMET properties from a SMILES string")
		);
		let schema = &listing[0].input_schema;
		assert_eq!(schema["properties"]["smiles"]["type"], "string");
	}

	#[test]
	fn test_listing_is_idempotent() {
		let gateway = gateway();
		let first = gateway.tool_listing();
		let second = gateway.tool_listing();

		let names = |tools: &[Tool]| {
			tools
				.iter()
				.map(|t| t.name.to_string())
				.collect::<Vec<_>>()
		};
		assert_eq!(names(&first), names(&second));
	}

	#[test]
	fn test_success_result_keeps_full_payload() {
		let payload = json!({ "rows": (0..100).collect::<Vec<_>>() });
		let result = success_result(&payload);

		assert_eq!(result.is_error, Some(false));
		assert_eq!(result.structured_content, Some(payload));
		// Text content carries the complete rendering, not a summary
		let RawContent::Text(ref text) = result.content[0].raw else {
			panic!("expected text content");
		};
		assert!(text.text.contains("99"));
	}

	#[test]
	fn test_error_result_carries_kind_tag() {
		let result = error_result("timeout", "tool 'x' timed out after 300s");

		assert_eq!(result.is_error, Some(true));
		let structured = result.structured_content.unwrap();
		assert_eq!(structured["error"]["kind"], "timeout");
		assert_eq!(
			structured["error"]["message"],
			"tool 'x' timed out after 300s"
		);
	}
}
