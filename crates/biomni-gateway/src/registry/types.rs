// Tool descriptor types and the registry catalog
//
// The manifest is the registry's source of truth: a JSON document keyed by
// tool name, generated from the upstream tool description catalog:
//
// {
//   "schema_version": 1,
//   "generated_at": "2025-07-14T03:12:09Z",
//   "tools": {
//     "predict_admet_properties": {
//       "module": "biomni.tool.pharmacology",
//       "description": "...",
//       "required_parameters": [{"name": "smiles", "type": "string", ...}],
//       "optional_parameters": [...]
//     }
//   }
// }

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{ManifestError, ToolNotFound};

/// Highest manifest schema version this build understands.
pub const SUPPORTED_SCHEMA_VERSION: u32 = 1;

/// Declared type of a tool parameter.
///
/// The upstream catalog spells these as Python type names (`str`, `int`,
/// `bool`, ...); both spellings parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
	#[serde(alias = "str")]
	String,
	#[serde(alias = "int")]
	Integer,
	#[serde(alias = "number")]
	Float,
	#[serde(alias = "bool")]
	Boolean,
	Path,
	#[serde(alias = "array")]
	List,
	#[serde(alias = "dict")]
	Object,
}

impl ParamType {
	/// Canonical spelling, as used in error messages.
	pub fn as_str(&self) -> &'static str {
		match self {
			ParamType::String => "string",
			ParamType::Integer => "integer",
			ParamType::Float => "float",
			ParamType::Boolean => "boolean",
			ParamType::Path => "path",
			ParamType::List => "list",
			ParamType::Object => "object",
		}
	}

	/// JSON Schema `type` keyword used in tool listings.
	pub fn json_schema_type(&self) -> &'static str {
		match self {
			ParamType::String | ParamType::Path => "string",
			ParamType::Integer => "integer",
			ParamType::Float => "number",
			ParamType::Boolean => "boolean",
			ParamType::List => "array",
			ParamType::Object => "object",
		}
	}
}

impl fmt::Display for ParamType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One declared parameter of a tool.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParameterSpec {
	/// Parameter name, unique within the owning descriptor
	pub name: String,

	/// Declared type
	#[serde(rename = "type")]
	pub param_type: ParamType,

	/// Human-readable description
	#[serde(default)]
	pub description: String,

	/// Default value; a JSON `null` in the manifest means no default
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default: Option<Value>,
}

impl ParameterSpec {
	pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
		Self {
			name: name.into(),
			param_type,
			description: String::new(),
			default: None,
		}
	}

	/// Builder method to set the description
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = description.into();
		self
	}

	/// Builder method to set the default value
	pub fn with_default(mut self, default: Value) -> Self {
		self.default = Some(default);
		self
	}
}

/// Immutable description of one tool: identity, owning module, and the
/// parameter schema invocations are validated against.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolDescriptor {
	/// Tool name, unique across the registry. The manifest keys entries by
	/// name, so the field may be omitted inside the entry body.
	#[serde(default)]
	pub name: String,

	/// Owning module namespace (e.g. `biomni.tool.pharmacology`)
	pub module: String,

	/// Human-readable description shown in tool listings
	#[serde(default)]
	pub description: String,

	/// Parameters a caller must supply
	#[serde(default)]
	pub required_parameters: Vec<ParameterSpec>,

	/// Parameters a caller may supply; each may carry a default
	#[serde(default)]
	pub optional_parameters: Vec<ParameterSpec>,
}

impl ToolDescriptor {
	pub fn new(name: impl Into<String>, module: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			module: module.into(),
			description: String::new(),
			required_parameters: Vec::new(),
			optional_parameters: Vec::new(),
		}
	}

	/// Builder method to set the description
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = description.into();
		self
	}

	/// Builder method to append a required parameter
	pub fn require(mut self, spec: ParameterSpec) -> Self {
		self.required_parameters.push(spec);
		self
	}

	/// Builder method to append an optional parameter
	pub fn optional(mut self, spec: ParameterSpec) -> Self {
		self.optional_parameters.push(spec);
		self
	}

	/// All parameters, required first, in declaration order.
	pub fn parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
		self
			.required_parameters
			.iter()
			.chain(self.optional_parameters.iter())
	}

	/// Look up a declared parameter by name.
	pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
		self.parameters().find(|p| p.name == name)
	}

	/// Whether `name` is a required parameter.
	pub fn is_required(&self, name: &str) -> bool {
		self.required_parameters.iter().any(|p| p.name == name)
	}

	/// Check descriptor invariants: parameter names unique across the
	/// combined required+optional set, defaults only on optional parameters.
	pub fn validate(&self) -> Result<(), ManifestError> {
		let mut seen = std::collections::HashSet::new();
		for spec in self.parameters() {
			if !seen.insert(spec.name.as_str()) {
				return Err(ManifestError::DuplicateParameter {
					tool: self.name.clone(),
					param: spec.name.clone(),
				});
			}
		}
		for spec in &self.required_parameters {
			if spec.default.is_some() {
				return Err(ManifestError::DefaultOnRequired {
					tool: self.name.clone(),
					param: spec.name.clone(),
				});
			}
		}
		Ok(())
	}
}

/// Parsed manifest document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Manifest {
	/// Schema version for compatibility
	#[serde(default = "default_schema_version")]
	pub schema_version: u32,

	/// Generation timestamp recorded by the index builder
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub generated_at: Option<String>,

	/// Tool count recorded by the index builder; informational only
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tool_count: Option<usize>,

	/// Descriptors keyed by tool name, in catalog order
	#[serde(default)]
	pub tools: IndexMap<String, ToolDescriptor>,
}

fn default_schema_version() -> u32 {
	1
}

/// The complete catalog of tools known to the gateway, independent of
/// deployment selection.
///
/// Built once at process start and read-only afterward; share it behind an
/// `Arc` and read it from any number of concurrent handlers.
#[derive(Debug, Default)]
pub struct Registry {
	/// Descriptors in manifest order, indexed by name
	tools: IndexMap<String, Arc<ToolDescriptor>>,
	schema_version: u32,
}

impl Registry {
	/// Build a registry from a parsed manifest.
	pub fn from_manifest(manifest: Manifest) -> Result<Self, ManifestError> {
		if manifest.schema_version > SUPPORTED_SCHEMA_VERSION {
			return Err(ManifestError::UnsupportedSchemaVersion(
				manifest.schema_version,
			));
		}

		let mut tools = IndexMap::with_capacity(manifest.tools.len());
		for (name, mut descriptor) in manifest.tools {
			// The map key is authoritative; the entry body need not repeat it
			descriptor.name = name.clone();
			descriptor.validate()?;
			if tools.insert(name.clone(), Arc::new(descriptor)).is_some() {
				return Err(ManifestError::DuplicateToolName(name));
			}
		}

		Ok(Self {
			tools,
			schema_version: manifest.schema_version,
		})
	}

	/// Build a registry from descriptors directly (tests, embedders).
	pub fn from_descriptors(
		descriptors: impl IntoIterator<Item = ToolDescriptor>,
	) -> Result<Self, ManifestError> {
		let mut tools = IndexMap::new();
		for descriptor in descriptors {
			descriptor.validate()?;
			let name = descriptor.name.clone();
			if tools.insert(name.clone(), Arc::new(descriptor)).is_some() {
				return Err(ManifestError::DuplicateToolName(name));
			}
		}
		Ok(Self {
			tools,
			schema_version: SUPPORTED_SCHEMA_VERSION,
		})
	}

	/// Number of tools in the catalog
	pub fn len(&self) -> usize {
		self.tools.len()
	}

	/// Check if the catalog is empty
	pub fn is_empty(&self) -> bool {
		self.tools.is_empty()
	}

	/// Manifest schema version this registry was built from
	pub fn schema_version(&self) -> u32 {
		self.schema_version
	}

	/// Look up a descriptor by name.
	pub fn lookup(&self, name: &str) -> Option<&Arc<ToolDescriptor>> {
		self.tools.get(name)
	}

	/// Look up a descriptor by name, failing if absent.
	pub fn get(&self, name: &str) -> Result<&Arc<ToolDescriptor>, ToolNotFound> {
		self
			.tools
			.get(name)
			.ok_or_else(|| ToolNotFound(name.to_string()))
	}

	/// Whether the catalog contains `name`.
	pub fn contains(&self, name: &str) -> bool {
		self.tools.contains_key(name)
	}

	/// All descriptors in manifest order.
	pub fn iter(&self) -> impl Iterator<Item = &Arc<ToolDescriptor>> {
		self.tools.values()
	}

	/// Descriptors matching a caller-supplied predicate, lazily, in manifest
	/// order. The iterator borrows the registry; call again to restart.
	pub fn search_by<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a Arc<ToolDescriptor>>
	where
		P: Fn(&ToolDescriptor) -> bool + 'a,
	{
		self.tools.values().filter(move |d| predicate(d))
	}

	/// Case-insensitive substring search over name and description.
	pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a Arc<ToolDescriptor>> {
		let query = query.to_lowercase();
		self.search_by(move |d| {
			d.name.to_lowercase().contains(&query) || d.description.to_lowercase().contains(&query)
		})
	}

	/// Regex search over name and description.
	pub fn search_regex<'a>(
		&'a self,
		pattern: &'a Regex,
	) -> impl Iterator<Item = &'a Arc<ToolDescriptor>> {
		self.search_by(move |d| pattern.is_match(&d.name) || pattern.is_match(&d.description))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_parse_minimal_manifest() {
		let json = r#"{
            "tools": {}
        }"#;

		let manifest: Manifest = serde_json::from_str(json).unwrap();
		assert_eq!(manifest.schema_version, 1);
		assert!(manifest.tools.is_empty());
	}

	#[test]
	fn test_parse_descriptor() {
		let json = r#"{
            "schema_version": 1,
            "generated_at": "2025-07-14T03:12:09Z",
            "tools": {
                "predict_admet_properties": {
                    "module": "biomni.tool.pharmacology",
                    "description": "Predict ADMET properties from a SMILES string",
                    "required_parameters": [
                        {"name": "smiles", "type": "string", "description": "Query structure"}
                    ],
                    "optional_parameters": [
                        {"name": "model", "type": "string", "default": "ensemble"}
                    ]
                }
            }
        }"#;

		let manifest: Manifest = serde_json::from_str(json).unwrap();
		let registry = Registry::from_manifest(manifest).unwrap();
		assert_eq!(registry.len(), 1);

		let tool = registry.get("predict_admet_properties").unwrap();
		assert_eq!(tool.name, "predict_admet_properties");
		assert_eq!(tool.module, "biomni.tool.pharmacology");
		assert_eq!(tool.required_parameters.len(), 1);
		assert_eq!(tool.required_parameters[0].param_type, ParamType::String);
		assert_eq!(
			tool.optional_parameters[0].default,
			Some(json!("ensemble"))
		);
	}

	#[test]
	fn test_parse_python_type_spellings() {
		let json = r#"{
            "name": "run_simulation",
            "module": "biomni.tool.systems_biology",
            "required_parameters": [
                {"name": "steps", "type": "int"},
                {"name": "rate", "type": "float"},
                {"name": "verbose", "type": "bool"},
                {"name": "species", "type": "list"},
                {"name": "params", "type": "dict"}
            ]
        }"#;

		let tool: ToolDescriptor = serde_json::from_str(json).unwrap();
		let types: Vec<ParamType> = tool
			.required_parameters
			.iter()
			.map(|p| p.param_type)
			.collect();
		assert_eq!(
			types,
			vec![
				ParamType::Integer,
				ParamType::Float,
				ParamType::Boolean,
				ParamType::List,
				ParamType::Object
			]
		);
	}

	#[test]
	fn test_null_default_means_no_default() {
		let json = r#"{
            "name": "align_sequences",
            "module": "biomni.tool.genomics",
            "optional_parameters": [
                {"name": "gap_penalty", "type": "float", "default": null}
            ]
        }"#;

		let tool: ToolDescriptor = serde_json::from_str(json).unwrap();
		assert_eq!(tool.optional_parameters[0].default, None);
	}

	#[test]
	fn test_unknown_parameter_type_rejected() {
		let json = r#"{
            "name": "bad_tool",
            "module": "biomni.tool.genomics",
            "required_parameters": [{"name": "x", "type": "complex"}]
        }"#;

		let parsed: Result<ToolDescriptor, _> = serde_json::from_str(json);
		assert!(parsed.is_err());
	}

	#[test]
	fn test_duplicate_parameter_rejected() {
		let tool = ToolDescriptor::new("dup_tool", "biomni.tool.genomics")
			.require(ParameterSpec::new("query", ParamType::String))
			.optional(ParameterSpec::new("query", ParamType::String));

		let err = Registry::from_descriptors(vec![tool]).unwrap_err();
		assert!(matches!(
			err,
			ManifestError::DuplicateParameter { ref tool, ref param }
				if tool == "dup_tool" && param == "query"
		));
	}

	#[test]
	fn test_default_on_required_rejected() {
		let tool = ToolDescriptor::new("bad_tool", "biomni.tool.genomics").require(
			ParameterSpec::new("query", ParamType::String).with_default(json!("x")),
		);

		let err = Registry::from_descriptors(vec![tool]).unwrap_err();
		assert!(matches!(err, ManifestError::DefaultOnRequired { .. }));
	}

	#[test]
	fn test_duplicate_tool_name_rejected() {
		let tools = vec![
			ToolDescriptor::new("same_name", "biomni.tool.genomics"),
			ToolDescriptor::new("same_name", "biomni.tool.pharmacology"),
		];

		let err = Registry::from_descriptors(tools).unwrap_err();
		assert!(matches!(err, ManifestError::DuplicateToolName(name) if name == "same_name"));
	}

	#[test]
	fn test_unsupported_schema_version() {
		let manifest = Manifest {
			schema_version: 2,
			..Default::default()
		};

		let err = Registry::from_manifest(manifest).unwrap_err();
		assert!(matches!(err, ManifestError::UnsupportedSchemaVersion(2)));
	}

	#[test]
	fn test_get_vs_lookup() {
		let registry =
			Registry::from_descriptors(vec![ToolDescriptor::new("t1", "biomni.tool.genomics")])
				.unwrap();

		assert!(registry.lookup("t1").is_some());
		assert!(registry.lookup("t2").is_none());
		assert!(registry.get("t1").is_ok());
		assert_eq!(
			registry.get("t2").unwrap_err(),
			ToolNotFound("t2".to_string())
		);
	}

	#[test]
	fn test_search_substring() {
		let registry = Registry::from_descriptors(vec![
			ToolDescriptor::new("predict_admet_properties", "biomni.tool.pharmacology")
				.with_description("Predict ADMET properties"),
			ToolDescriptor::new("run_diffdock_with_smiles", "biomni.tool.pharmacology")
				.with_description("Docking with DiffDock"),
			ToolDescriptor::new("align_sequences", "biomni.tool.genomics")
				.with_description("Pairwise alignment"),
		])
		.unwrap();

		let hits: Vec<&str> = registry.search("ADMET").map(|d| d.name.as_str()).collect();
		assert_eq!(hits, vec!["predict_admet_properties"]);

		// Restartable: a second pass yields the same hits
		let again: Vec<&str> = registry.search("ADMET").map(|d| d.name.as_str()).collect();
		assert_eq!(hits, again);

		// Matches description text too
		let docking: Vec<&str> = registry
			.search("diffdock")
			.map(|d| d.name.as_str())
			.collect();
		assert_eq!(docking, vec!["run_diffdock_with_smiles"]);
	}

	#[test]
	fn test_search_regex_manifest_order() {
		let registry = Registry::from_descriptors(vec![
			ToolDescriptor::new("query_uniprot", "biomni.tool.database"),
			ToolDescriptor::new("align_sequences", "biomni.tool.genomics"),
			ToolDescriptor::new("query_kegg", "biomni.tool.database"),
		])
		.unwrap();

		let pattern = Regex::new(r"^query_").unwrap();
		let hits: Vec<&str> = registry
			.search_regex(&pattern)
			.map(|d| d.name.as_str())
			.collect();
		assert_eq!(hits, vec!["query_uniprot", "query_kegg"]);
	}

	#[test]
	fn test_search_by_predicate() {
		let registry = Registry::from_descriptors(vec![
			ToolDescriptor::new("t1", "biomni.tool.genomics"),
			ToolDescriptor::new("t2", "biomni.tool.pharmacology"),
			ToolDescriptor::new("t3", "biomni.tool.genomics"),
		])
		.unwrap();

		let genomics = registry
			.search_by(|d| d.module == "biomni.tool.genomics")
			.count();
		assert_eq!(genomics, 2);
	}

	#[test]
	fn test_parameter_lookup() {
		let tool = ToolDescriptor::new("t", "m")
			.require(ParameterSpec::new("a", ParamType::String))
			.optional(ParameterSpec::new("b", ParamType::Integer));

		assert!(tool.parameter("a").is_some());
		assert!(tool.parameter("b").is_some());
		assert!(tool.parameter("c").is_none());
		assert!(tool.is_required("a"));
		assert!(!tool.is_required("b"));
	}
}
