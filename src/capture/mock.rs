//! Mock command runner for testing
//!
//! Stands in for the external screenshot process: either pretends the
//! command wrote a file of a given size, fails with canned stderr, or
//! claims success without writing anything (the "command lied" case).
//! Invocations are counted so tests can assert that no process would have
//! been spawned.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{CaptureCommand, CommandRunner};
use crate::error::{OpResult, ToolError};

/// What the mock does when run
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Write a file of this many zero bytes at the command's target
    WriteBytes(u64),
    /// Fail with this stderr content
    Fail(String),
    /// Report success without writing the target file
    WriteNothing,
}

/// Counting mock implementation of [`CommandRunner`]
#[derive(Debug)]
pub struct MockRunner {
    behavior: MockBehavior,
    calls:    AtomicUsize,
}

impl MockRunner {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    /// Mock that writes `size` bytes to the target
    pub fn writing(size: u64) -> Self {
        Self::new(MockBehavior::WriteBytes(size))
    }

    /// Mock that fails with the given stderr content
    pub fn failing(stderr: impl Into<String>) -> Self {
        Self::new(MockBehavior::Fail(stderr.into()))
    }

    /// Mock that succeeds without writing anything
    pub fn writing_nothing() -> Self {
        Self::new(MockBehavior::WriteNothing)
    }

    /// Number of times `run` was invoked
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, command: &CaptureCommand) -> OpResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            MockBehavior::WriteBytes(size) => {
                tokio::fs::write(command.target(), vec![0u8; *size as usize])
                    .await
                    .map_err(|source| ToolError::FilesystemWriteFailed {
                        path: command.target().display().to_string(),
                        source,
                    })
            }
            MockBehavior::Fail(stderr) => Err(ToolError::ExternalCommandFailed {
                command: command.program().to_string(),
                detail:  stderr.clone(),
            }),
            MockBehavior::WriteNothing => Ok(()),
        }
    }
}
