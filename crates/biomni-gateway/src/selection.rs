// Deployment-time tool selection
//
// A selection configuration names, per module, which catalog tools are
// reachable in this deployment. The resolved active set is computed once at
// startup and never mutated; switching configurations requires a restart.
//
// Resolution is deliberately forgiving: a stale or misspelled name in the
// configuration is a warning and the tool is omitted, and the process starts
// with whatever valid subset remains.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::registry::{Registry, ToolDescriptor};

/// Selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
	/// Only tools named in `selected_tools` are enabled
	#[default]
	Partial,
	/// Every catalog tool is enabled; `selected_tools` is ignored
	Complete,
}

/// Errors loading a selection configuration file.
///
/// Unlike manifest errors these are not fatal: the caller falls back to the
/// bundled minimal configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("failed to read selection configuration: {0}")]
	Io(#[from] std::io::Error),

	#[error("failed to parse selection configuration: {0}")]
	Parse(#[from] serde_json::Error),
}

/// Parsed selection configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SelectionConfig {
	#[serde(default)]
	pub mode: SelectionMode,

	/// Module name -> tool names to enable from that module
	#[serde(default)]
	pub selected_tools: IndexMap<String, Vec<String>>,
}

impl SelectionConfig {
	/// A configuration enabling every catalog tool.
	pub fn complete() -> Self {
		Self {
			mode: SelectionMode::Complete,
			selected_tools: IndexMap::new(),
		}
	}

	/// The bundled fallback: just the interpreter support tools.
	pub fn minimal() -> Self {
		let mut selected_tools = IndexMap::new();
		selected_tools.insert(
			"biomni.tool.support_tools".to_string(),
			vec![
				"run_python_repl".to_string(),
				"read_function_source_code".to_string(),
			],
		);
		Self {
			mode: SelectionMode::Partial,
			selected_tools,
		}
	}

	/// Load a selection configuration file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = fs_err::read_to_string(path)?;
		let config: SelectionConfig = serde_json::from_str(&content)?;
		info!(
			target: "selection",
			modules = config.selected_tools.len(),
			tools = config.tool_count(),
			mode = ?config.mode,
			"loaded selection configuration from {}",
			path.display()
		);
		Ok(config)
	}

	/// Total number of tool names enumerated in the configuration.
	pub fn tool_count(&self) -> usize {
		self.selected_tools.values().map(Vec::len).sum()
	}
}

/// A non-fatal problem found while resolving the selection against the
/// registry. The offending entry is skipped; startup continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
	/// Configured module has no tools in the registry at all
	UnknownModule { module: String },
	/// Configured tool name is not in the registry
	UnknownTool { module: String, name: String },
	/// Tool exists but belongs to a different module than configured
	WrongModule {
		name: String,
		configured: String,
		actual: String,
	},
	/// Tool is enabled but no handler is registered for it
	MissingHandler { name: String },
	/// Nothing ended up enabled
	EmptyActiveSet,
}

impl fmt::Display for ConfigWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigWarning::UnknownModule { module } => {
				write!(f, "configured module '{module}' has no tools in the registry")
			},
			ConfigWarning::UnknownTool { module, name } => {
				write!(
					f,
					"configured tool '{name}' (module '{module}') is not in the registry; skipping"
				)
			},
			ConfigWarning::WrongModule {
				name,
				configured,
				actual,
			} => {
				write!(
					f,
					"configured tool '{name}' belongs to module '{actual}', not '{configured}'; skipping"
				)
			},
			ConfigWarning::MissingHandler { name } => {
				write!(f, "tool '{name}' is enabled but has no registered handler; skipping")
			},
			ConfigWarning::EmptyActiveSet => {
				write!(f, "selection resolved to an empty active tool set")
			},
		}
	}
}

/// The subset of the registry reachable in this deployment.
///
/// Shares descriptors with the full catalog and keeps a handle to it so
/// dispatch can distinguish "not enabled here" from "no such tool".
/// Immutable after startup; safe to read from concurrent request tasks
/// without synchronization.
#[derive(Debug, Clone)]
pub struct ActiveToolSet {
	registry: Arc<Registry>,
	active: IndexMap<String, Arc<ToolDescriptor>>,
}

impl ActiveToolSet {
	/// Number of enabled tools
	pub fn len(&self) -> usize {
		self.active.len()
	}

	/// Check if nothing is enabled
	pub fn is_empty(&self) -> bool {
		self.active.is_empty()
	}

	/// Whether `name` is enabled in this deployment.
	pub fn contains(&self, name: &str) -> bool {
		self.active.contains_key(name)
	}

	/// Look up an enabled descriptor by name.
	pub fn get(&self, name: &str) -> Option<&Arc<ToolDescriptor>> {
		self.active.get(name)
	}

	/// Enabled descriptors, in manifest order.
	pub fn iter(&self) -> impl Iterator<Item = &Arc<ToolDescriptor>> {
		self.active.values()
	}

	/// Whether `name` exists anywhere in the full catalog.
	pub fn in_registry(&self, name: &str) -> bool {
		self.registry.contains(name)
	}

	/// The full catalog this set was resolved from.
	pub fn registry(&self) -> &Arc<Registry> {
		&self.registry
	}
}

/// Result of resolving a selection configuration.
#[derive(Debug)]
pub struct Resolution {
	pub active: ActiveToolSet,
	pub warnings: Vec<ConfigWarning>,
}

impl Resolution {
	/// Drop enabled tools for which `has_handler` returns false, warning per
	/// drop.
	///
	/// Coverage is checked once here, at startup, so a listed tool is always
	/// resolvable at call time.
	pub fn retain_resolvable(&mut self, has_handler: impl Fn(&str) -> bool) {
		let dropped: Vec<String> = self
			.active
			.active
			.keys()
			.filter(|name| !has_handler(name))
			.cloned()
			.collect();
		for name in dropped {
			self.active.active.shift_remove(&name);
			self.warnings.push(ConfigWarning::MissingHandler { name });
		}
		if self.active.is_empty() && !self.warnings.contains(&ConfigWarning::EmptyActiveSet) {
			self.warnings.push(ConfigWarning::EmptyActiveSet);
		}
	}

	/// Log every warning through the selection target.
	pub fn log_warnings(&self) {
		for warning in &self.warnings {
			warn!(target: "selection", "{warning}");
		}
	}
}

/// Computes the active tool set for a deployment.
pub struct SelectionPolicy;

impl SelectionPolicy {
	/// Resolve `config` against `registry`.
	///
	/// Names that do not resolve are reported as warnings and omitted. An
	/// empty result is allowed, surfaced as a warning rather than an error.
	/// Re-resolution only happens on process restart.
	pub fn resolve(config: &SelectionConfig, registry: Arc<Registry>) -> Resolution {
		let mut active = IndexMap::new();
		let mut warnings = Vec::new();

		match config.mode {
			SelectionMode::Complete => {
				for descriptor in registry.iter() {
					active.insert(descriptor.name.clone(), Arc::clone(descriptor));
				}
			},
			SelectionMode::Partial => {
				for (module, names) in &config.selected_tools {
					if !registry.iter().any(|d| d.module == *module) {
						warnings.push(ConfigWarning::UnknownModule {
							module: module.clone(),
						});
						continue;
					}
					for name in names {
						match registry.lookup(name) {
							None => warnings.push(ConfigWarning::UnknownTool {
								module: module.clone(),
								name: name.clone(),
							}),
							Some(descriptor) if descriptor.module != *module => {
								warnings.push(ConfigWarning::WrongModule {
									name: name.clone(),
									configured: module.clone(),
									actual: descriptor.module.clone(),
								});
							},
							Some(descriptor) => {
								active.insert(name.clone(), Arc::clone(descriptor));
							},
						}
					}
				}
			},
		}

		if active.is_empty() {
			warnings.push(ConfigWarning::EmptyActiveSet);
		}

		Resolution {
			active: ActiveToolSet { registry, active },
			warnings,
		}
	}
}
