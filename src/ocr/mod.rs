//! OCR engine handle and extraction pipeline
//!
//! The engine lives behind the [`OcrEngine`] trait and is constructed at
//! most once per process through [`EngineHandle`]. Construction failure is
//! its own error class, distinct from inference failure, because a missing
//! runtime dependency (the `tesseract` binary) needs different guidance
//! than an unreadable image. A failed construction leaves the handle empty
//! so a later call retries; a successful one is cached for the process
//! lifetime, including under concurrent first use.

pub mod aggregate;
pub mod mock;
pub mod tesseract;

use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::{
    error::{OpResult, ToolError},
    model::{ExtractionReport, OcrRegion},
    util::paths::ServerPaths,
};

pub use mock::{MockBuilder, MockEngine};
pub use tesseract::{TesseractBuilder, TesseractEngine};

/// External OCR inference collaborator boundary
///
/// Detects and recognizes text regions over the full image, in the
/// engine's own order (typically reading order). Region confidences are
/// in the 0-1 range.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &Path) -> OpResult<Vec<OcrRegion>>;
}

/// Constructs an engine instance; injected so tests can supply fakes
#[async_trait]
pub trait EngineBuilder: Send + Sync {
    async fn build(&self) -> OpResult<Arc<dyn OcrEngine>>;
}

/// Process-wide lazily-initialized engine singleton
///
/// `OnceCell` guarantees single construction under racing first uses:
/// one caller builds, the others wait and observe the result. The cell is
/// only populated on success, so construction is retried on the next call
/// after a failure.
pub struct EngineHandle {
    cell:    OnceCell<Arc<dyn OcrEngine>>,
    builder: Box<dyn EngineBuilder>,
}

impl EngineHandle {
    pub fn new(builder: Box<dyn EngineBuilder>) -> Self {
        Self {
            cell: OnceCell::new(),
            builder,
        }
    }

    /// Returns the cached engine, constructing it on first use
    pub async fn get(&self) -> OpResult<Arc<dyn OcrEngine>> {
        let engine = self
            .cell
            .get_or_try_init(|| self.builder.build())
            .await?;
        Ok(Arc::clone(engine))
    }

    /// Whether an engine has been successfully constructed
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

/// Runs the OCR pipeline: existence check, inference, aggregation, write
pub struct TextExtractor {
    paths:  ServerPaths,
    engine: EngineHandle,
}

impl TextExtractor {
    pub fn new(paths: ServerPaths, engine: EngineHandle) -> Self {
        Self { paths, engine }
    }

    /// Extracts text from `image_path` into `output/<output_filename>`
    ///
    /// The image existence check runs before the engine is touched, so a
    /// bad path neither constructs nor invokes the engine. The output file
    /// is overwritten if present; re-running on the same image is
    /// deterministic for a fixed engine.
    pub async fn extract(
        &self,
        image_path: &str,
        output_filename: &str,
    ) -> OpResult<ExtractionReport> {
        let image = Path::new(image_path);
        // An unreadable path is as missing as an absent one
        if !tokio::fs::try_exists(image).await.unwrap_or(false) {
            return Err(ToolError::ImageNotFound {
                path: image_path.to_string(),
            });
        }

        let output_path = self.paths.output_path(output_filename)?;

        let engine = self.engine.get().await?;
        info!(image = image_path, "running OCR");
        let regions = engine.recognize(image).await?;

        let text = aggregate::assemble_text(&regions);
        let confidence = aggregate::mean_confidence(&regions);
        debug!(regions = regions.len(), confidence, "aggregated OCR output");

        self.paths.ensure_output().await?;
        tokio::fs::write(&output_path, text.as_bytes())
            .await
            .map_err(|source| ToolError::FilesystemWriteFailed {
                path: output_path.display().to_string(),
                source,
            })?;

        Ok(ExtractionReport::new(
            image_path,
            output_path.display().to_string(),
            text,
            confidence,
        ))
    }
}
