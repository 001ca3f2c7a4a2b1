//! Declared tool definitions
//!
//! Both tools are defined once, with JSON Schemas generated from their
//! parameter structs, and listed in a fixed order. The schemas are the
//! external contract; parameter names are camelCase on the wire and doc
//! comments become the parameter descriptions.

use schemars::{JsonSchema, schema_for};
use serde_json::Value;

/// Name of the screenshot tool
pub const SNAPSHOT_TOOL: &str = "snapshot-tool";
/// Name of the OCR extraction tool
pub const OCR_EXTRACT_TOOL: &str = "ocr-extract-tool";

/// Parameters for the snapshot tool
#[derive(Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotParams {
    /// Filename for the screenshot (e.g. 'screenshot.png')
    pub filename: String,
}

/// Parameters for the OCR extraction tool
#[derive(Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OcrExtractParams {
    /// Path to the screenshot image file
    pub image_path: String,
    /// Output filename for extracted text (default: text.txt)
    pub output_filename: Option<String>,
}

/// A named, schema-declared operation exposed to the calling agent
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name:         &'static str,
    pub description:  &'static str,
    /// JSON Schema object describing the tool's parameters
    pub input_schema: Value,
}

impl ToolDefinition {
    fn new(name: &'static str, description: &'static str, input_schema: Value) -> Self {
        Self {
            name,
            description,
            input_schema,
        }
    }
}

fn input_schema<T: JsonSchema>() -> Value {
    schema_for!(T).to_value()
}

/// Returns both tool definitions, in fixed order. Pure; safe to call on
/// every listing request.
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            SNAPSHOT_TOOL,
            "Take a screenshot of the desktop and save it to the snapshots folder",
            input_schema::<SnapshotParams>(),
        ),
        ToolDefinition::new(
            OCR_EXTRACT_TOOL,
            "Extract text from a screenshot using OCR and save it to a text file",
            input_schema::<OcrExtractParams>(),
        ),
    ]
}
