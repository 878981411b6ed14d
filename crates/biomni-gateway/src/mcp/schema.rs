// Tool listing schema derivation

use serde_json::{json, Map, Value};

use crate::registry::ToolDescriptor;

/// Derive the MCP `inputSchema` object for a descriptor.
///
/// Required and optional parameters become `properties`, required names go
/// into `required`, and optional defaults are surfaced on the property so a
/// caller can construct a valid request from the listing alone.
pub fn input_schema(descriptor: &ToolDescriptor) -> Map<String, Value> {
	let mut properties = Map::new();
	for spec in descriptor.parameters() {
		let mut prop = Map::new();
		prop.insert(
			"type".to_string(),
			json!(spec.param_type.json_schema_type()),
		);
		if !spec.description.is_empty() {
			prop.insert("description".to_string(), json!(spec.description));
		}
		if let Some(default) = &spec.default {
			prop.insert("default".to_string(), default.clone());
		}
		properties.insert(spec.name.clone(), Value::Object(prop));
	}

	let required: Vec<Value> = descriptor
		.required_parameters
		.iter()
		.map(|p| json!(p.name))
		.collect();

	let mut schema = Map::new();
	schema.insert("type".to_string(), json!("object"));
	schema.insert("properties".to_string(), Value::Object(properties));
	if !required.is_empty() {
		schema.insert("required".to_string(), Value::Array(required));
	}
	schema
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::registry::{ParamType, ParameterSpec};
	use serde_json::json;

	#[test]
	fn test_schema_shape() {
		let descriptor = ToolDescriptor::new("predict_admet_properties", "biomni.tool.pharmacology")
			.require(
				ParameterSpec::new("smiles", ParamType::String)
					.with_description("Query structure as SMILES"),
			)
			.optional(
				ParameterSpec::new("num_conformers", ParamType::Integer).with_default(json!(10)),
			);

		let schema = input_schema(&descriptor);

		assert_eq!(schema["type"], "object");
		assert_eq!(schema["properties"]["smiles"]["type"], "string");
		assert_eq!(
			schema["properties"]["smiles"]["description"],
			"Query structure as SMILES"
		);
		assert_eq!(schema["properties"]["num_conformers"]["type"], "integer");
		assert_eq!(schema["properties"]["num_conformers"]["default"], 10);
		assert_eq!(schema["required"], json!(["smiles"]));
	}

	#[test]
	fn test_no_required_key_when_all_optional() {
		let descriptor = ToolDescriptor::new("t", "m")
			.optional(ParameterSpec::new("verbose", ParamType::Boolean));

		let schema = input_schema(&descriptor);
		assert!(!schema.contains_key("required"));
	}

	#[test]
	fn test_path_and_list_map_to_json_schema_types() {
		let descriptor = ToolDescriptor::new("t", "m")
			.require(ParameterSpec::new("input_file", ParamType::Path))
			.require(ParameterSpec::new("genes", ParamType::List))
			.require(ParameterSpec::new("options", ParamType::Object))
			.require(ParameterSpec::new("rate", ParamType::Float));

		let schema = input_schema(&descriptor);
		assert_eq!(schema["properties"]["input_file"]["type"], "string");
		assert_eq!(schema["properties"]["genes"]["type"], "array");
		assert_eq!(schema["properties"]["options"]["type"], "object");
		assert_eq!(schema["properties"]["rate"]["type"], "number");
	}
}
