use std::sync::Arc;
use tracing_subscriber::{self, EnvFilter};
use zoekt_mcp::backend::ZoektClient;
use zoekt_mcp::config::Config;
use zoekt_mcp::guide::GuideBuilder;
use zoekt_mcp::tools::{ShapingLimits, ToolAdapter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting Zoekt MCP server...");

    let config = Config::from_env()?;
    config.log_summary();

    let client = ZoektClient::from_config(&config)?;
    let guide = GuideBuilder::with_org_guide(config.load_org_guide()?);
    let adapter = ToolAdapter::new(Arc::new(client))
        .with_guide(guide)
        .with_limits(ShapingLimits::from_config(&config));

    tracing::info!("Registered tools: search, search_prompt_guide, fetch_content");

    let result = zoekt_mcp::mcp::serve(&config, adapter).await;
    if let Err(e) = &result {
        tracing::error!("Server error: {:#}", e);
    }
    tracing::info!("Server has shut down.");
    result
}
