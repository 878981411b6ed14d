// biomni-gateway: selective MCP exposure over a biomedical tool catalog
//
// A manifest describes every tool in the catalog; a deployment-time
// selection configuration narrows that to an active set; the dispatcher
// validates and executes calls against a static handler table; the MCP
// layer advertises and routes for the active set only.

pub mod config;
pub mod dispatch;
pub mod mcp;
pub mod registry;
pub mod selection;
pub mod tools;
