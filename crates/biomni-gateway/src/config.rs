// Gateway configuration
//
// The environment is read in exactly one place: `GatewayConfig::from_env`,
// called from the binary's startup path. Everything downstream receives the
// resolved struct explicitly.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use secrecy::SecretString;

/// Selection configuration path override
pub const TOOLS_CONFIG_ENV: &str = "BIOMNI_TOOLS_CONFIG";
/// Manifest path override
pub const TOOLS_INDEX_ENV: &str = "BIOMNI_TOOLS_INDEX";
/// Data lake root for tools that declare a `data_path` parameter
pub const DATA_PATH_ENV: &str = "BIOMNI_DATA_PATH";
/// Pass-through credential; required before any tool becomes reachable
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Command-line arguments. Every path can also come from the environment;
/// flags win.
#[derive(Debug, Parser)]
#[command(
	name = "biomni-gateway",
	version,
	about = "MCP gateway exposing a configured subset of the biomedical tool catalog"
)]
pub struct Args {
	/// Tool manifest path (falls back to $BIOMNI_TOOLS_INDEX)
	#[arg(long)]
	pub manifest: Option<PathBuf>,

	/// Selection configuration path (falls back to $BIOMNI_TOOLS_CONFIG)
	#[arg(long)]
	pub config: Option<PathBuf>,

	/// Data lake root passed to tools declaring a data_path parameter
	/// (falls back to $BIOMNI_DATA_PATH)
	#[arg(long)]
	pub data_path: Option<String>,

	/// Per-call execution budget in seconds
	#[arg(long, default_value_t = 300)]
	pub timeout_secs: u64,

	/// Python interpreter used by the bundled support tools
	#[arg(long, default_value = "python3")]
	pub python: String,
}

/// Resolved startup configuration.
#[derive(Debug)]
pub struct GatewayConfig {
	pub manifest_path: PathBuf,
	pub config_path: PathBuf,
	pub data_path: Option<String>,
	pub timeout: Duration,
	pub python: String,
	/// Pass-through credential for tool backends; never logged
	pub api_key: Option<SecretString>,
}

impl GatewayConfig {
	/// Merge CLI arguments with the environment.
	pub fn from_env(args: Args) -> Self {
		let manifest_path = args
			.manifest
			.or_else(|| std::env::var_os(TOOLS_INDEX_ENV).map(PathBuf::from))
			.unwrap_or_else(|| PathBuf::from("tools_index.json"));
		let config_path = args
			.config
			.or_else(|| std::env::var_os(TOOLS_CONFIG_ENV).map(PathBuf::from))
			.unwrap_or_else(|| PathBuf::from("tools_config.json"));
		let data_path = args.data_path.or_else(|| std::env::var(DATA_PATH_ENV).ok());
		let api_key = std::env::var(API_KEY_ENV).ok().map(SecretString::from);

		Self {
			manifest_path,
			config_path,
			data_path,
			timeout: Duration::from_secs(args.timeout_secs),
			python: args.python,
			api_key,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let args = Args::parse_from(["biomni-gateway"]);
		assert_eq!(args.timeout_secs, 300);
		assert_eq!(args.python, "python3");
		assert!(args.manifest.is_none());
	}

	#[test]
	fn test_flag_overrides() {
		let args = Args::parse_from([
			"biomni-gateway",
			"--manifest",
			"/etc/biomni/tools_index.json",
			"--config",
			"/etc/biomni/tools_config.json",
			"--timeout-secs",
			"30",
		]);
		assert_eq!(
			args.manifest.as_deref(),
			Some(std::path::Path::new("/etc/biomni/tools_index.json"))
		);
		assert_eq!(args.timeout_secs, 30);
	}
}
