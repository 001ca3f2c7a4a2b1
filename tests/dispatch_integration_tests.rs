//! Tool Dispatch Integration Tests
//!
//! Exercises the dispatch layer end-to-end with mock collaborators,
//! verifying the JSON envelopes a calling agent would observe: success
//! payloads with their camelCase fields, and failure payloads with the
//! operation context messages.
//!
//! All tests are headless; the external screenshot command and the OCR
//! engine are substituted by the in-tree mocks.

use std::sync::Arc;

use screen_capture_mcp::{
    capture::{CaptureInvoker, MockRunner},
    model::{Platform, ToolResult},
    ocr::{EngineHandle, MockBuilder, MockEngine, TextExtractor},
    tools::{OCR_EXTRACT_TOOL, SNAPSHOT_TOOL, ToolDispatcher},
    util::paths::ServerPaths,
};
use serde_json::{Map, Value, json};
use tempfile::TempDir;

struct Harness {
    root:       TempDir,
    runner:     Arc<MockRunner>,
    engine:     Arc<MockEngine>,
    dispatcher: ToolDispatcher,
}

impl Harness {
    fn new(runner: MockRunner, words: &[(&str, f32)]) -> Self {
        Self::on_platform(Platform::Linux, runner, words)
    }

    fn on_platform(platform: Platform, runner: MockRunner, words: &[(&str, f32)]) -> Self {
        let root = tempfile::tempdir().unwrap();
        let paths = ServerPaths::from_root(root.path());

        let runner = Arc::new(runner);
        let invoker = CaptureInvoker::new(platform, paths.clone(), Arc::clone(&runner) as _);

        let engine = Arc::new(MockEngine::with_words(words));
        let builder = MockBuilder::ready(Arc::clone(&engine) as _);
        let extractor = TextExtractor::new(paths, EngineHandle::new(Box::new(builder)));

        Self {
            root,
            runner,
            engine,
            dispatcher: ToolDispatcher::new(invoker, extractor),
        }
    }

    /// Creates an image file under the temp root and returns its path
    fn stage_image(&self, name: &str) -> String {
        let path = self.root.path().join(name);
        std::fs::write(&path, b"png bytes").unwrap();
        path.to_str().unwrap().to_string()
    }

    /// Calls a tool and returns the envelope as a JSON value
    async fn call(&self, name: &str, arguments: Value) -> Value {
        let arguments: Map<String, Value> = arguments.as_object().cloned().unwrap_or_default();
        let result = self.dispatcher.call_tool(name, &arguments).await;
        envelope(&result)
    }
}

fn envelope(result: &ToolResult) -> Value {
    serde_json::from_str(&result.to_pretty_json().unwrap()).unwrap()
}

#[tokio::test]
async fn test_unknown_tool_returns_failure_envelope() {
    let harness = Harness::new(MockRunner::writing(1), &[]);

    let json = harness.call("window-list-tool", json!({})).await;

    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Unknown tool: window-list-tool");
    assert_eq!(json["message"], "No tool is registered with this name");
}

#[tokio::test]
async fn test_snapshot_reports_path_and_size() {
    let harness = Harness::new(MockRunner::writing(12345), &[]);

    let json = harness
        .call(SNAPSHOT_TOOL, json!({"filename": "desktop.png"}))
        .await;

    assert_eq!(json["success"], true);
    assert_eq!(json["fileSize"], 12345);
    let file_path = json["filePath"].as_str().unwrap();
    assert!(file_path.ends_with("snapshots/desktop.png"));
    assert_eq!(
        json["message"],
        format!("Screenshot saved to {file_path}")
    );
    assert_eq!(harness.runner.call_count(), 1);
}

#[tokio::test]
async fn test_snapshot_missing_filename() {
    let harness = Harness::new(MockRunner::writing(1), &[]);

    let json = harness.call(SNAPSHOT_TOOL, json!({})).await;

    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Missing required argument: filename");
    assert_eq!(json["message"], "Failed to take screenshot");
    assert_eq!(harness.runner.call_count(), 0);
}

#[tokio::test]
async fn test_snapshot_unsupported_platform_spawns_nothing() {
    let harness = Harness::on_platform(
        Platform::Unsupported("freebsd".into()),
        MockRunner::writing(1),
        &[],
    );

    let json = harness
        .call(SNAPSHOT_TOOL, json!({"filename": "desktop.png"}))
        .await;

    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Unsupported platform: freebsd");
    assert_eq!(json["message"], "Failed to take screenshot");
    assert_eq!(harness.runner.call_count(), 0);
}

#[tokio::test]
async fn test_snapshot_rejects_traversal_filename() {
    let harness = Harness::new(MockRunner::writing(1), &[]);

    let json = harness
        .call(SNAPSHOT_TOOL, json!({"filename": "../evil.png"}))
        .await;

    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("Invalid filename"));
    assert_eq!(harness.runner.call_count(), 0);
    assert!(!harness.root.path().join("evil.png").exists());
}

#[tokio::test]
async fn test_snapshot_command_failure_carries_stderr() {
    let harness = Harness::new(MockRunner::failing("unable to open X server `:0'"), &[]);

    let json = harness
        .call(SNAPSHOT_TOOL, json!({"filename": "desktop.png"}))
        .await;

    assert_eq!(json["success"], false);
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .contains("unable to open X server")
    );
    assert_eq!(json["message"], "Failed to take screenshot");
}

#[tokio::test]
async fn test_ocr_extract_aggregates_regions() {
    let harness = Harness::new(MockRunner::writing(1), &[("Hello", 0.90), ("World", 0.80)]);
    let image = harness.stage_image("shot.png");

    let json = harness
        .call(OCR_EXTRACT_TOOL, json!({"imagePath": image}))
        .await;

    assert_eq!(json["success"], true);
    assert_eq!(json["imagePath"], image.as_str());
    assert_eq!(json["text"], "Hello\nWorld");
    assert_eq!(json["textLength"], 11);
    assert_eq!(json["confidence"], 85.0);

    // Defaulted output filename, file actually written
    let output_path = json["outputPath"].as_str().unwrap();
    assert!(output_path.ends_with("output/text.txt"));
    assert_eq!(
        json["message"],
        format!("Text extracted and saved to {output_path}")
    );
    assert_eq!(std::fs::read_to_string(output_path).unwrap(), "Hello\nWorld");
}

#[tokio::test]
async fn test_ocr_extract_honors_output_filename() {
    let harness = Harness::new(MockRunner::writing(1), &[("Hi", 1.0)]);
    let image = harness.stage_image("shot.png");

    let json = harness
        .call(
            OCR_EXTRACT_TOOL,
            json!({"imagePath": image, "outputFilename": "extracted.txt"}),
        )
        .await;

    assert_eq!(json["success"], true);
    assert!(
        json["outputPath"]
            .as_str()
            .unwrap()
            .ends_with("output/extracted.txt")
    );
}

#[tokio::test]
async fn test_ocr_extract_zero_regions() {
    let harness = Harness::new(MockRunner::writing(1), &[]);
    let image = harness.stage_image("blank.png");

    let json = harness
        .call(OCR_EXTRACT_TOOL, json!({"imagePath": image}))
        .await;

    assert_eq!(json["success"], true);
    assert_eq!(json["text"], "");
    assert_eq!(json["textLength"], 0);
    assert_eq!(json["confidence"], 0.0);
}

#[tokio::test]
async fn test_ocr_extract_missing_image_never_touches_engine() {
    let harness = Harness::new(MockRunner::writing(1), &[("Hi", 1.0)]);
    let missing = harness.root.path().join("nope.png");

    let json = harness
        .call(
            OCR_EXTRACT_TOOL,
            json!({"imagePath": missing.to_str().unwrap()}),
        )
        .await;

    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Image file not found");
    assert_eq!(
        json["message"],
        format!("Could not find image at: {}", missing.display())
    );
    assert_eq!(harness.engine.call_count(), 0);
}

#[tokio::test]
async fn test_ocr_extract_engine_init_failure_carries_guidance() {
    let root = tempfile::tempdir().unwrap();
    let paths = ServerPaths::from_root(root.path());
    let invoker = CaptureInvoker::new(
        Platform::Linux,
        paths.clone(),
        Arc::new(MockRunner::writing(1)),
    );
    let builder = MockBuilder::failing("binary not found");
    let extractor = TextExtractor::new(paths, EngineHandle::new(Box::new(builder)));
    let dispatcher = ToolDispatcher::new(invoker, extractor);

    let image = root.path().join("shot.png");
    std::fs::write(&image, b"png").unwrap();

    let mut arguments = Map::new();
    arguments.insert(
        "imagePath".to_string(),
        Value::String(image.to_str().unwrap().to_string()),
    );
    let json = envelope(&dispatcher.call_tool(OCR_EXTRACT_TOOL, &arguments).await);

    assert_eq!(json["success"], false);
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .contains("initialization failed")
    );
    let message = json["message"].as_str().unwrap();
    assert!(message.contains("binary not found"));
    assert!(message.contains("Install Tesseract"));
}

#[tokio::test]
async fn test_ocr_extract_is_deterministic_across_reruns() {
    let harness = Harness::new(MockRunner::writing(1), &[("Same", 0.5)]);
    let image = harness.stage_image("shot.png");

    let first = harness
        .call(OCR_EXTRACT_TOOL, json!({"imagePath": image}))
        .await;
    let second = harness
        .call(OCR_EXTRACT_TOOL, json!({"imagePath": image}))
        .await;

    assert_eq!(first, second);
    assert_eq!(harness.engine.call_count(), 2);
}

#[tokio::test]
async fn test_success_envelopes_use_camel_case_fields_only() {
    let harness = Harness::new(MockRunner::writing(1), &[("Hi", 1.0)]);

    let json = harness
        .call(SNAPSHOT_TOOL, json!({"filename": "a.png"}))
        .await;
    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["filePath", "fileSize", "message", "success"]);

    let image = harness.stage_image("shot.png");
    let json = harness
        .call(OCR_EXTRACT_TOOL, json!({"imagePath": image}))
        .await;
    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "confidence",
            "imagePath",
            "message",
            "outputPath",
            "success",
            "text",
            "textLength"
        ]
    );
}
