//! MCP transport wiring
//!
//! Serves the tool router over stdio, or over streamable HTTP on the two
//! configured listeners (`/zoekt/mcp` and `/zoekt/sse`). Every HTTP session
//! gets its own router over the same shared, stateless adapter.

use anyhow::{Context, Result};
use axum::Router;
use rmcp::{
    ServiceExt,
    transport::{
        StreamableHttpService, stdio, streamable_http_server::session::local::LocalSessionManager,
    },
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::config::{Config, TransportMode};
use crate::tools::{ToolAdapter, ZoektToolRouter};

/// Path of the MCP endpoint on the streamable HTTP port
pub const MCP_PATH: &str = "/zoekt/mcp";
/// Path of the MCP endpoint on the SSE port
pub const SSE_PATH: &str = "/zoekt/sse";

/// Serve the tools with the configured transport until shutdown
pub async fn serve(config: &Config, adapter: ToolAdapter) -> Result<()> {
    let adapter = Arc::new(adapter);
    match config.transport {
        TransportMode::Stdio => serve_stdio(adapter).await,
        TransportMode::Http => serve_http(config, adapter).await,
    }
}

async fn serve_stdio(adapter: Arc<ToolAdapter>) -> Result<()> {
    tracing::info!("Serving MCP over stdio");

    let service = ZoektToolRouter::from_shared(adapter)
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("serving error: {:?}", e);
        })?;

    tokio::select! {
        quit = service.waiting() => {
            let reason = quit?;
            tracing::info!("stdio session ended: {:?}", reason);
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown requested, closing stdio session");
        }
    }

    Ok(())
}

async fn serve_http(config: &Config, adapter: Arc<ToolAdapter>) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown requested, draining HTTP listeners");
        let _ = shutdown_tx.send(true);
    });

    if config.sse_port == config.streamable_http_port {
        let addr = format!("{}:{}", config.bind_host, config.streamable_http_port);
        let router = http_router(adapter, &[MCP_PATH, SSE_PATH]);
        return listen(addr, router, shutdown_rx).await;
    }

    let mcp = listen(
        format!("{}:{}", config.bind_host, config.streamable_http_port),
        http_router(Arc::clone(&adapter), &[MCP_PATH]),
        shutdown_rx.clone(),
    );
    let sse = listen(
        format!("{}:{}", config.bind_host, config.sse_port),
        http_router(adapter, &[SSE_PATH]),
        shutdown_rx,
    );

    tokio::try_join!(mcp, sse)?;
    Ok(())
}

/// Build an axum router exposing the MCP service at each of `paths`
pub fn http_router(adapter: Arc<ToolAdapter>, paths: &[&str]) -> Router {
    let mut router = Router::new().route("/health", axum::routing::get(health_check));

    for path in paths {
        let adapter = Arc::clone(&adapter);
        let service = StreamableHttpService::new(
            move || Ok(ZoektToolRouter::from_shared(Arc::clone(&adapter))),
            LocalSessionManager::default().into(),
            Default::default(),
        );
        router = router.nest_service(path, service);
    }

    router
}

async fn listen(addr: String, router: Router, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!("MCP HTTP listener ready on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await
        .with_context(|| format!("HTTP listener on {} failed", addr))?;

    tracing::info!("MCP HTTP listener on {} stopped", addr);
    Ok(())
}

/// Health check handler for the /health endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Resolve on SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
