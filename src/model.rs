//! Data models and type definitions for screen-capture-mcp
//!
//! This module defines the core types used throughout the application:
//! - Platform detection for capture command dispatch
//! - The uniform tool response envelope and its success payloads
//! - Intermediate OCR region data produced by the engine

use serde::{Deserialize, Serialize};

/// The operating system the server is running on
///
/// Capture command selection is a pure function of this value. Anything
/// outside the three supported systems is carried verbatim so error
/// messages can name it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    /// macOS (`screencapture`)
    MacOS,
    /// Linux with an X11 display (`import` from ImageMagick)
    Linux,
    /// Windows (PowerShell bitmap capture)
    Windows,
    /// Anything else; capture requests fail without spawning a process
    Unsupported(String),
}

impl Platform {
    /// Detects the platform the process was compiled for
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Maps an OS name (as in `std::env::consts::OS`) to a platform
    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Platform::MacOS,
            "linux" => Platform::Linux,
            "windows" => Platform::Windows,
            other => Platform::Unsupported(other.to_string()),
        }
    }

    /// Returns the platform as a lowercase string
    pub fn as_str(&self) -> &str {
        match self {
            Platform::MacOS => "macos",
            Platform::Linux => "linux",
            Platform::Windows => "windows",
            Platform::Unsupported(os) => os,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Successful result of the snapshot tool
///
/// `success` is always `true`; the explicit flag is part of the wire
/// format consumed by calling agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureReport {
    /// Always `true` for this payload
    pub success:   bool,
    /// Path of the written screenshot
    pub file_path: String,
    /// Byte length of the written file, read after the command completed
    pub file_size: u64,
    /// Human-oriented summary
    pub message:   String,
}

impl CaptureReport {
    /// Creates a successful capture report for a written file
    pub fn new(file_path: impl Into<String>, file_size: u64) -> Self {
        let file_path = file_path.into();
        let message = format!("Screenshot saved to {file_path}");
        Self {
            success: true,
            file_path,
            file_size,
            message,
        }
    }
}

/// Successful result of the OCR extraction tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    /// Always `true` for this payload
    pub success:     bool,
    /// The image that was read
    pub image_path:  String,
    /// Where the assembled text was written
    pub output_path: String,
    /// Character count of `text`
    pub text_length: usize,
    /// All region texts joined with single newlines, in engine order
    pub text:        String,
    /// Mean region confidence as a percentage (0-100)
    pub confidence:  f64,
    /// Human-oriented summary
    pub message:     String,
}

impl ExtractionReport {
    /// Creates a successful extraction report; `text_length` is derived
    /// from the assembled text
    pub fn new(
        image_path: impl Into<String>,
        output_path: impl Into<String>,
        text: String,
        confidence: f64,
    ) -> Self {
        let output_path = output_path.into();
        let message = format!("Text extracted and saved to {output_path}");
        Self {
            success: true,
            image_path: image_path.into(),
            output_path,
            text_length: text.chars().count(),
            text,
            confidence,
            message,
        }
    }
}

/// Failure envelope returned for any unsuccessful tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    /// Always `false` for this payload
    pub success: bool,
    /// Machine-oriented error string
    pub error:   String,
    /// Human-oriented context ("Failed to take screenshot", remediation
    /// guidance, ...)
    pub message: String,
}

impl FailureReport {
    /// Creates a failure report
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error:   error.into(),
            message: message.into(),
        }
    }
}

/// Uniform response envelope for every tool invocation
///
/// Exactly one of these is produced per call; partial success is not
/// representable. Serialization is untagged: the payload's own fields
/// (including the `success` flag) are the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResult {
    /// Screenshot written
    Capture(CaptureReport),
    /// Text extracted and written
    Extraction(ExtractionReport),
    /// The operation failed; the server keeps running
    Failure(FailureReport),
}

impl ToolResult {
    /// Whether this is a success payload
    pub fn is_success(&self) -> bool {
        !matches!(self, ToolResult::Failure(_))
    }

    /// Serializes the envelope as pretty-printed JSON, the single text
    /// payload carried in the MCP response
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl From<FailureReport> for ToolResult {
    fn from(report: FailureReport) -> Self {
        ToolResult::Failure(report)
    }
}

/// Pixel rectangle of a detected text region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left:   i32,
    pub top:    i32,
    pub width:  i32,
    pub height: i32,
}

/// One detected text region, as returned by the OCR engine
///
/// Confidence is in the engine-neutral 0-1 range; scaling to a percentage
/// happens during aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrRegion {
    pub bounding_box: BoundingBox,
    pub text:         String,
    pub confidence:   f32,
}

impl OcrRegion {
    pub fn new(bounding_box: BoundingBox, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            bounding_box,
            text: text.into(),
            confidence,
        }
    }
}
