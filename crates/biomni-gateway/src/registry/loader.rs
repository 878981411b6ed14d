// Manifest loading

use std::path::Path;

use tracing::info;

use super::error::ManifestError;
use super::types::{Manifest, Registry};

impl Registry {
	/// Load the registry from a manifest file.
	///
	/// Read once at startup; any failure here is fatal to the process.
	pub fn load(path: impl AsRef<Path>) -> Result<Registry, ManifestError> {
		let path = path.as_ref();
		let content = fs_err::read_to_string(path)?;
		let manifest: Manifest = serde_json::from_str(&content)?;
		let registry = Registry::from_manifest(manifest)?;
		info!(
			target: "registry",
			tools = registry.len(),
			"loaded registry from {}",
			path.display()
		);
		Ok(registry)
	}
}
