//! Mock OCR engine and builder for testing
//!
//! The engine returns a fixed region list and counts invocations so tests
//! can assert the engine was (or was not) reached. The builder can hand
//! out a prepared engine, fail every time, or fail a set number of times
//! before succeeding, which exercises the handle's retry-after-failure
//! behavior.

use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use super::{EngineBuilder, OcrEngine};
use crate::{
    error::{OpResult, ToolError},
    model::{BoundingBox, OcrRegion},
};

/// OCR engine returning canned regions
#[derive(Debug)]
pub struct MockEngine {
    regions: Vec<OcrRegion>,
    calls:   AtomicUsize,
}

impl MockEngine {
    pub fn new(regions: Vec<OcrRegion>) -> Self {
        Self {
            regions,
            calls: AtomicUsize::new(0),
        }
    }

    /// Builds an engine from `(text, confidence)` pairs, one region per
    /// pair, stacked top to bottom
    pub fn with_words(words: &[(&str, f32)]) -> Self {
        let regions = words
            .iter()
            .enumerate()
            .map(|(i, (text, confidence))| {
                let bounding_box = BoundingBox {
                    left:   0,
                    top:    20 * i as i32,
                    width:  100,
                    height: 18,
                };
                OcrRegion::new(bounding_box, *text, *confidence)
            })
            .collect();
        Self::new(regions)
    }

    /// Number of times `recognize` was invoked
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for MockEngine {
    async fn recognize(&self, _image: &Path) -> OpResult<Vec<OcrRegion>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.regions.clone())
    }
}

/// OCR engine that always fails inference
#[derive(Debug)]
pub struct FailingEngine {
    reason: String,
}

impl FailingEngine {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl OcrEngine for FailingEngine {
    async fn recognize(&self, _image: &Path) -> OpResult<Vec<OcrRegion>> {
        Err(ToolError::InferenceFailed {
            reason: self.reason.clone(),
        })
    }
}

/// Mock implementation of [`EngineBuilder`]
pub struct MockBuilder {
    engine:             Option<Arc<dyn OcrEngine>>,
    failures_remaining: AtomicUsize,
    reason:             String,
}

impl MockBuilder {
    /// Builder that hands out the given engine on every build
    pub fn ready(engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            engine:             Some(engine),
            failures_remaining: AtomicUsize::new(0),
            reason:             String::new(),
        }
    }

    /// Builder that fails construction every time
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            engine:             None,
            failures_remaining: AtomicUsize::new(usize::MAX),
            reason:             reason.into(),
        }
    }

    /// Builder that fails `failures` times, then hands out the engine
    pub fn flaky(failures: usize, engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            engine:             Some(engine),
            failures_remaining: AtomicUsize::new(failures),
            reason:             "transient construction failure".to_string(),
        }
    }
}

#[async_trait]
impl EngineBuilder for MockBuilder {
    async fn build(&self) -> OpResult<Arc<dyn OcrEngine>> {
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != usize::MAX {
                self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            }
            return Err(ToolError::EngineInitializationFailed {
                reason: self.reason.clone(),
            });
        }
        match &self.engine {
            Some(engine) => Ok(Arc::clone(engine)),
            None => Err(ToolError::EngineInitializationFailed {
                reason: self.reason.clone(),
            }),
        }
    }
}
