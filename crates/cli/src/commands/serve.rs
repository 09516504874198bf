//! The `serve` subcommand: MCP server over stdio.

use std::sync::Arc;

use hackmd_client::HackMdClient;
use hackmd_config::AppConfig;
use hackmd_mcp::McpServer;
use hackmd_tools::NoteToolbox;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // The model key is not needed here: MCP clients bring their own model.
    let Some(api_token) = config.hackmd.api_token.clone() else {
        return Err(
            "No HackMD API token found. Set HACKMD_API_TOKEN or add it to the config file.".into(),
        );
    };

    let client = HackMdClient::new(api_token).with_base_url(config.hackmd.api_url.clone());
    let server = McpServer::new(NoteToolbox::new(Arc::new(client)));

    server.run().await?;
    Ok(())
}
