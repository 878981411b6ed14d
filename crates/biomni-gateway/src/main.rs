// Gateway binary: resolve configuration, build the active set, serve MCP
// over stdio.
//
// Startup failure policy: an unreadable or malformed manifest and a missing
// credential are fatal (non-zero exit); selection problems are warnings and
// the process starts with whatever valid subset remains, even if empty.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use biomni_gateway::config::{Args, GatewayConfig, API_KEY_ENV};
use biomni_gateway::dispatch::{DispatchConfig, Dispatcher};
use biomni_gateway::mcp::McpGateway;
use biomni_gateway::registry::Registry;
use biomni_gateway::selection::{SelectionConfig, SelectionPolicy};
use biomni_gateway::tools::support_handlers;

#[tokio::main]
async fn main() -> ExitCode {
	// stdout carries the MCP transport; all logging goes to stderr
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.with_writer(std::io::stderr)
		.init();

	let config = GatewayConfig::from_env(Args::parse());
	match run(config).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!(target: "startup", "{err:#}");
			ExitCode::FAILURE
		},
	}
}

async fn run(config: GatewayConfig) -> anyhow::Result<()> {
	if config.api_key.is_none() {
		anyhow::bail!("{API_KEY_ENV} is not set; refusing to start without a credential");
	}

	let registry = Arc::new(Registry::load(&config.manifest_path)?);

	let selection = load_selection(&config);
	let handlers = support_handlers(&config.python);

	let mut resolution = SelectionPolicy::resolve(&selection, registry);
	resolution.retain_resolvable(|name| handlers.contains(name));
	resolution.log_warnings();
	info!(
		target: "selection",
		active = resolution.active.len(),
		"active tool set resolved"
	);

	let dispatcher = Dispatcher::new(
		resolution.active,
		handlers,
		DispatchConfig {
			timeout: config.timeout,
			data_path: config.data_path.clone(),
		},
	);

	info!(target: "startup", "serving MCP over stdio");
	let service = McpGateway::new(dispatcher).serve(stdio()).await?;
	service.waiting().await?;
	Ok(())
}

/// Load the selection configuration, falling back to the bundled minimal
/// default when the file is absent or unreadable.
fn load_selection(config: &GatewayConfig) -> SelectionConfig {
	if !config.config_path.exists() {
		info!(
			target: "selection",
			"selection configuration {} not found; using minimal default",
			config.config_path.display()
		);
		return SelectionConfig::minimal();
	}
	match SelectionConfig::load(&config.config_path) {
		Ok(selection) => selection,
		Err(err) => {
			warn!(
				target: "selection",
				"failed to load {}: {err}; using minimal default",
				config.config_path.display()
			);
			SelectionConfig::minimal()
		},
	}
}
