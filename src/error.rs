//! Error types for tool operations
//!
//! One taxonomy covers both tools. Every error is converted exactly once,
//! at the contract layer, into the `FailureReport` envelope; nothing below
//! that layer panics or escapes past it.

use crate::model::FailureReport;

/// Result type alias for tool operations
pub type OpResult<T> = Result<T, ToolError>;

/// Error taxonomy for the tool-dispatch server
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The request named a tool that is not registered
    #[error("Unknown tool: {name}")]
    UnknownTool {
        /// The name the caller sent
        name: String,
    },

    /// A required argument was absent, empty, or not a string
    #[error("Missing required argument: {name}")]
    MissingRequiredArgument {
        /// The declared parameter name
        name: &'static str,
    },

    /// A user-supplied filename was not a bare file name
    #[error("Invalid filename '{name}': {reason}")]
    InvalidFilename {
        /// The rejected input
        name:   String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// The extraction source image does not exist
    #[error("Image file not found")]
    ImageNotFound {
        /// The path that was checked
        path: String,
    },

    /// No capture command exists for the running operating system
    #[error("Unsupported platform: {os}")]
    UnsupportedPlatform {
        /// OS name as reported by the runtime
        os: String,
    },

    /// The capture command could not be spawned or exited non-zero
    #[error("Capture command '{command}' failed: {detail}")]
    ExternalCommandFailed {
        /// Program that was invoked
        command: String,
        /// Captured stderr, or the spawn error
        detail:  String,
    },

    /// The OCR engine could not be constructed
    #[error("OCR engine initialization failed: {reason}")]
    EngineInitializationFailed {
        /// What went wrong during construction
        reason: String,
    },

    /// The OCR engine raised during inference
    #[error("OCR inference failed: {reason}")]
    InferenceFailed {
        /// Engine-reported cause
        reason: String,
    },

    /// A filesystem write (or post-write read-back) failed
    #[error("Filesystem write failed for {path}: {source}")]
    FilesystemWriteFailed {
        /// Path involved
        path:   String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    /// Converts the error into the failure envelope
    ///
    /// `fallback` is the operation-level context message ("Failed to take
    /// screenshot" / "Failed to extract text from image"). Two variants
    /// override it: a missing image names the path that was checked, and an
    /// engine initialization failure carries remediation guidance so the
    /// caller can distinguish a broken runtime dependency from a bad image.
    pub fn into_failure(self, fallback: &str) -> FailureReport {
        let message = match &self {
            ToolError::ImageNotFound { path } => format!("Could not find image at: {path}"),
            ToolError::EngineInitializationFailed { reason } => format!(
                "OCR engine unavailable: {reason}. Install Tesseract (e.g. `apt install \
                 tesseract-ocr` or `brew install tesseract`) and make sure the `tesseract` \
                 binary is on PATH."
            ),
            _ => fallback.to_string(),
        };
        FailureReport::new(self.to_string(), message)
    }
}
