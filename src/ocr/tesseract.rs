//! Tesseract-backed OCR engine
//!
//! Recognition shells out to the `tesseract` binary through the
//! `rusty-tesseract` crate and maps its word-level TSV rows to
//! [`OcrRegion`]s. The builder probes `tesseract --version` first so a
//! missing binary surfaces as an initialization failure with its own
//! guidance rather than as a confusing inference error later.

use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use rusty_tesseract::{Args, Image};
use tokio::process::Command;
use tracing::{debug, info};

use super::{EngineBuilder, OcrEngine};
use crate::{
    error::{OpResult, ToolError},
    model::{BoundingBox, OcrRegion},
};

/// Fixed recognition language; the server performs English-only extraction
const OCR_LANG: &str = "eng";

/// OCR engine shelling out to Tesseract
pub struct TesseractEngine {
    lang: String,
}

impl TesseractEngine {
    /// Verifies the `tesseract` binary is runnable, then hands out an engine
    pub async fn probe() -> OpResult<Self> {
        let output = Command::new("tesseract")
            .arg("--version")
            .output()
            .await
            .map_err(|e| ToolError::EngineInitializationFailed {
                reason: format!("could not run `tesseract --version`: {e}"),
            })?;

        if !output.status.success() {
            return Err(ToolError::EngineInitializationFailed {
                reason: format!("`tesseract --version` exited with {}", output.status),
            });
        }

        // Older tesseract releases print the version banner to stderr
        let banner = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };
        let version = banner.lines().next().unwrap_or("tesseract").to_string();
        info!(%version, "OCR engine initialized");

        Ok(Self {
            lang: OCR_LANG.to_string(),
        })
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn recognize(&self, image: &Path) -> OpResult<Vec<OcrRegion>> {
        let path = image.to_path_buf();
        let lang = self.lang.clone();

        // Inference blocks on the external process; keep it off the runtime
        let regions = tokio::task::spawn_blocking(move || recognize_blocking(&path, &lang))
            .await
            .map_err(|e| ToolError::InferenceFailed {
                reason: format!("OCR task failed: {e}"),
            })??;

        debug!(regions = regions.len(), "tesseract recognition complete");
        Ok(regions)
    }
}

fn recognize_blocking(path: &Path, lang: &str) -> OpResult<Vec<OcrRegion>> {
    let image = Image::from_path(path).map_err(|e| ToolError::InferenceFailed {
        reason: e.to_string(),
    })?;
    let args = Args {
        lang: lang.to_string(),
        ..Args::default()
    };
    let data = rusty_tesseract::image_to_data(&image, &args).map_err(|e| {
        ToolError::InferenceFailed {
            reason: e.to_string(),
        }
    })?;

    // Word rows carry a real confidence; structural rows (page, block,
    // paragraph, line) report -1 and are skipped
    let regions = data
        .data
        .into_iter()
        .filter(|entry| entry.conf >= 0.0)
        .map(|entry| {
            let bounding_box = BoundingBox {
                left:   entry.left,
                top:    entry.top,
                width:  entry.width,
                height: entry.height,
            };
            OcrRegion::new(bounding_box, entry.text, normalize_confidence(entry.conf))
        })
        .collect();
    Ok(regions)
}

/// Maps Tesseract's native 0-100 word confidence into the engine-neutral
/// 0-1 range
fn normalize_confidence(conf: f32) -> f32 {
    (conf / 100.0).clamp(0.0, 1.0)
}

/// Production [`EngineBuilder`] probing the Tesseract installation
#[derive(Debug, Default)]
pub struct TesseractBuilder;

#[async_trait]
impl EngineBuilder for TesseractBuilder {
    async fn build(&self) -> OpResult<Arc<dyn OcrEngine>> {
        let engine = TesseractEngine::probe().await?;
        Ok(Arc::new(engine))
    }
}
