//! Tool contract layer
//!
//! The dispatcher owns the boundary between the protocol surface and the
//! operations: it validates arguments against the declared schemas, runs
//! the matching operation, and converts every outcome (including errors)
//! into the uniform response envelope. Nothing below this layer knows
//! about the envelope; nothing above it sees a `ToolError`.

pub mod definitions;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::{
    capture::CaptureInvoker,
    error::{OpResult, ToolError},
    model::{CaptureReport, ExtractionReport, ToolResult},
    ocr::TextExtractor,
};

pub use definitions::{OCR_EXTRACT_TOOL, SNAPSHOT_TOOL, ToolDefinition, definitions};

/// Output filename used when the caller omits `outputFilename`
pub const DEFAULT_OUTPUT_FILENAME: &str = "text.txt";

/// Operation-level failure context for the snapshot tool
const CAPTURE_CONTEXT: &str = "Failed to take screenshot";
/// Operation-level failure context for the extraction tool
const EXTRACT_CONTEXT: &str = "Failed to extract text from image";

/// Routes tool calls by name and shields the transport from errors
///
/// Every call, whatever happens inside it, produces exactly one
/// [`ToolResult`]; the server process never dies because a tool failed.
pub struct ToolDispatcher {
    invoker:   CaptureInvoker,
    extractor: TextExtractor,
}

impl ToolDispatcher {
    pub fn new(invoker: CaptureInvoker, extractor: TextExtractor) -> Self {
        Self { invoker, extractor }
    }

    /// Dispatches one tool call to its operation
    ///
    /// An unrecognized name is an ordinary failure envelope, not a
    /// protocol error; listing and calling stay consistent because both
    /// consult the same registered names.
    pub async fn call_tool(&self, name: &str, arguments: &Map<String, Value>) -> ToolResult {
        info!(tool = name, "tool call received");
        match name {
            SNAPSHOT_TOOL => self
                .snapshot(arguments)
                .await
                .map(ToolResult::Capture)
                .unwrap_or_else(|e| {
                    warn!(tool = name, error = %e, "tool call failed");
                    e.into_failure(CAPTURE_CONTEXT).into()
                }),
            OCR_EXTRACT_TOOL => self
                .ocr_extract(arguments)
                .await
                .map(ToolResult::Extraction)
                .unwrap_or_else(|e| {
                    warn!(tool = name, error = %e, "tool call failed");
                    e.into_failure(EXTRACT_CONTEXT).into()
                }),
            other => {
                warn!(tool = other, "unknown tool requested");
                let error = ToolError::UnknownTool {
                    name: other.to_string(),
                };
                error
                    .into_failure("No tool is registered with this name")
                    .into()
            }
        }
    }

    async fn snapshot(&self, arguments: &Map<String, Value>) -> OpResult<CaptureReport> {
        let filename = require_string(arguments, "filename")?;
        self.invoker.capture(filename).await
    }

    async fn ocr_extract(
        &self,
        arguments: &Map<String, Value>,
    ) -> OpResult<ExtractionReport> {
        let image_path = require_string(arguments, "imagePath")?;
        let output_filename =
            optional_string(arguments, "outputFilename").unwrap_or(DEFAULT_OUTPUT_FILENAME);
        self.extractor.extract(image_path, output_filename).await
    }
}

/// Extracts a required non-empty string argument
fn require_string<'a>(
    arguments: &'a Map<String, Value>,
    name: &'static str,
) -> OpResult<&'a str> {
    match arguments.get(name).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ToolError::MissingRequiredArgument { name }),
    }
}

/// Extracts an optional string argument; absent, null, or non-string all
/// fall back to the default
fn optional_string<'a>(arguments: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    arguments
        .get(name)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::{
        capture::MockRunner,
        model::Platform,
        ocr::{EngineHandle, MockBuilder, MockEngine},
        util::paths::ServerPaths,
    };

    fn dispatcher(tmp: &TempDir, words: &[(&str, f32)]) -> ToolDispatcher {
        let paths = ServerPaths::from_root(tmp.path());
        let invoker = CaptureInvoker::new(
            Platform::Linux,
            paths.clone(),
            Arc::new(MockRunner::writing(12345)),
        );
        let engine = Arc::new(MockEngine::with_words(words));
        let extractor =
            TextExtractor::new(paths, EngineHandle::new(Box::new(MockBuilder::ready(engine))));
        ToolDispatcher::new(invoker, extractor)
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_unknown_tool_is_failure_envelope() {
        let tmp = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&tmp, &[]);

        let result = dispatcher.call_tool("bogus-tool", &Map::new()).await;

        assert!(!result.is_success());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Unknown tool: bogus-tool");
    }

    #[tokio::test]
    async fn test_snapshot_requires_filename() {
        let tmp = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&tmp, &[]);

        let result = dispatcher.call_tool(SNAPSHOT_TOOL, &Map::new()).await;
        assert!(!result.is_success());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["error"], "Missing required argument: filename");
        assert_eq!(json["message"], "Failed to take screenshot");

        // An empty string is as missing as an absent key
        let result = dispatcher
            .call_tool(SNAPSHOT_TOOL, &args(json!({"filename": ""})))
            .await;
        assert!(!result.is_success());

        // A non-string value does not pass either
        let result = dispatcher
            .call_tool(SNAPSHOT_TOOL, &args(json!({"filename": 42})))
            .await;
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn test_snapshot_happy_path() {
        let tmp = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&tmp, &[]);

        let result = dispatcher
            .call_tool(SNAPSHOT_TOOL, &args(json!({"filename": "shot.png"})))
            .await;

        assert!(result.is_success());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["fileSize"], 12345);
        assert!(json["filePath"].as_str().unwrap().ends_with("shot.png"));
    }

    #[tokio::test]
    async fn test_ocr_extract_defaults_output_filename() {
        let tmp = tempfile::tempdir().unwrap();
        let image = tmp.path().join("shot.png");
        std::fs::write(&image, b"png").unwrap();
        let dispatcher = dispatcher(&tmp, &[("Hello", 0.9), ("World", 0.8)]);

        let result = dispatcher
            .call_tool(
                OCR_EXTRACT_TOOL,
                &args(json!({"imagePath": image.to_str().unwrap()})),
            )
            .await;

        assert!(result.is_success());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["text"], "Hello\nWorld");
        assert_eq!(json["confidence"], 85.0);
        assert!(
            json["outputPath"]
                .as_str()
                .unwrap()
                .ends_with(DEFAULT_OUTPUT_FILENAME)
        );
    }

    #[tokio::test]
    async fn test_ocr_extract_requires_image_path() {
        let tmp = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&tmp, &[]);

        let result = dispatcher.call_tool(OCR_EXTRACT_TOOL, &Map::new()).await;

        assert!(!result.is_success());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["error"], "Missing required argument: imagePath");
        assert_eq!(json["message"], "Failed to extract text from image");
    }

    #[tokio::test]
    async fn test_ocr_extract_missing_image_names_path() {
        let tmp = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&tmp, &[]);

        let result = dispatcher
            .call_tool(
                OCR_EXTRACT_TOOL,
                &args(json!({"imagePath": "does/not/exist.png"})),
            )
            .await;

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["error"], "Image file not found");
        assert_eq!(json["message"], "Could not find image at: does/not/exist.png");
    }

    #[test]
    fn test_optional_string_handles_null_and_wrong_type() {
        let map = args(json!({"a": null, "b": 7, "c": "", "d": "ok"}));
        assert_eq!(optional_string(&map, "a"), None);
        assert_eq!(optional_string(&map, "b"), None);
        assert_eq!(optional_string(&map, "c"), None);
        assert_eq!(optional_string(&map, "d"), Some("ok"));
        assert_eq!(optional_string(&map, "missing"), None);
    }
}
