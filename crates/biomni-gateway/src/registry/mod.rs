// Tool registry module
//
// The full catalog of tools known to the gateway:
// - Descriptor data model parsed from the manifest
// - Name lookup and predicate/substring/regex search in manifest order
// - One-shot file loading; the catalog is immutable afterward

mod error;
mod loader;
mod types;

pub use error::{ManifestError, ToolNotFound};
pub use types::{
	Manifest, ParamType, ParameterSpec, Registry, ToolDescriptor, SUPPORTED_SCHEMA_VERSION,
};
