//! MCP service implementation with tool routing
//!
//! This module adapts the dispatcher to the Model Context Protocol: the
//! declared definitions become protocol `Tool`s, and every dispatch result
//! is rendered as one pretty-printed JSON text payload in a successful
//! protocol response. Tool failures ride inside that payload; a protocol
//! error is reserved for transport-level faults like an unserializable
//! envelope.

use std::sync::Arc;

use rmcp::{
    RoleServer, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, ErrorData as McpError, Implementation,
        ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
};

use crate::{
    model::ToolResult,
    tools::{ToolDefinition, ToolDispatcher, definitions},
};

/// Screen capture MCP server
///
/// Exposes the snapshot and OCR extraction tools over stdio. The server
/// itself is stateless; the dispatcher carries everything the tools need.
#[derive(Clone)]
pub struct ScreenCaptureServer {
    dispatcher: Arc<ToolDispatcher>,
}

impl ScreenCaptureServer {
    pub fn new(dispatcher: Arc<ToolDispatcher>) -> Self {
        Self { dispatcher }
    }
}

/// Converts a declared definition into the protocol tool shape
fn to_protocol_tool(definition: &ToolDefinition) -> Tool {
    let schema = definition
        .input_schema
        .as_object()
        .cloned()
        .unwrap_or_default();
    Tool::new(definition.name, definition.description, Arc::new(schema))
}

/// Renders a dispatch result as the single text payload of the response
fn render(result: &ToolResult) -> Result<CallToolResult, McpError> {
    let json = result
        .to_pretty_json()
        .map_err(|e| McpError::internal_error(format!("Failed to serialize tool result: {e}"), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

impl ServerHandler for ScreenCaptureServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Take desktop screenshots and extract text from them with OCR. Use \
                 snapshot-tool to capture the screen into the snapshots folder, then \
                 ocr-extract-tool to read text out of a captured image."
                    .to_string(),
            ),
            ..ServerInfo::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools = definitions().iter().map(to_protocol_tool).collect();
        Ok(ListToolsResult {
            tools,
            next_cursor: None,
            ..ListToolsResult::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = request.arguments.unwrap_or_default();
        let result = self.dispatcher.call_tool(&request.name, &arguments).await;
        render(&result)
    }
}
