//! screen-capture-mcp: Screenshot and OCR MCP server

use std::sync::Arc;

use anyhow::Result;
use rmcp::{ServiceExt, transport::stdio};
use screen_capture_mcp::{
    capture::{CaptureInvoker, SystemCommandRunner},
    mcp::ScreenCaptureServer,
    model::Platform,
    ocr::{EngineHandle, TesseractBuilder, TextExtractor},
    tools::ToolDispatcher,
    util::paths::ServerPaths,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    // Respects RUST_LOG; stdout carries the protocol, so logs go to stderr
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("screen_capture_mcp=info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();

    let platform = Platform::current();
    info!(%platform, "screen-capture-mcp server starting");

    let paths = ServerPaths::from_env();
    let invoker = CaptureInvoker::new(platform, paths.clone(), Arc::new(SystemCommandRunner));

    // The OCR engine is constructed lazily, on the first extraction call
    let engine = EngineHandle::new(Box::new(TesseractBuilder));
    let extractor = TextExtractor::new(paths, engine);

    let dispatcher = Arc::new(ToolDispatcher::new(invoker, extractor));
    let server = ScreenCaptureServer::new(dispatcher);

    info!("initializing stdio transport");
    let service = server.serve(stdio()).await?;

    info!("waiting for MCP requests");
    service.waiting().await?;

    info!("screen-capture-mcp server shutting down");
    Ok(())
}
