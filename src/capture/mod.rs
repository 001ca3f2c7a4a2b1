//! Screenshot capture via the platform screenshot command
//!
//! Command selection is a closed variant resolved purely from the declared
//! platform; running the resolved command sits behind the [`CommandRunner`]
//! trait so tests can substitute the external process. Adding a platform
//! means adding a variant, not scattering conditionals.

pub mod mock;

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::{
    error::{OpResult, ToolError},
    model::{CaptureReport, Platform},
    util::paths::ServerPaths,
};

pub use mock::MockRunner;

/// A resolved platform screenshot command
///
/// Each variant produces a structured program + argument list; nothing is
/// shell-interpolated except the PowerShell script body, whose only
/// variable part is the sanitized target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureCommand {
    /// macOS: `screencapture -x <target>` (`-x` mutes the shutter sound)
    Screencapture { target: PathBuf },
    /// X11: ImageMagick `import -window root <target>`
    ImportRootWindow { target: PathBuf },
    /// Windows: PowerShell `System.Drawing` primary-screen bitmap capture
    PowershellBitmap { target: PathBuf },
}

impl CaptureCommand {
    /// Resolves the command for a platform; pure, spawns nothing
    pub fn for_platform(platform: &Platform, target: &Path) -> OpResult<Self> {
        let target = target.to_path_buf();
        match platform {
            Platform::MacOS => Ok(CaptureCommand::Screencapture { target }),
            Platform::Linux => Ok(CaptureCommand::ImportRootWindow { target }),
            Platform::Windows => Ok(CaptureCommand::PowershellBitmap { target }),
            Platform::Unsupported(os) => Err(ToolError::UnsupportedPlatform { os: os.clone() }),
        }
    }

    /// Program to invoke
    pub fn program(&self) -> &'static str {
        match self {
            CaptureCommand::Screencapture { .. } => "screencapture",
            CaptureCommand::ImportRootWindow { .. } => "import",
            CaptureCommand::PowershellBitmap { .. } => "powershell",
        }
    }

    /// Argument list for the program
    pub fn args(&self) -> Vec<OsString> {
        match self {
            CaptureCommand::Screencapture { target } => {
                vec![OsString::from("-x"), target.clone().into_os_string()]
            }
            CaptureCommand::ImportRootWindow { target } => vec![
                OsString::from("-window"),
                OsString::from("root"),
                target.clone().into_os_string(),
            ],
            CaptureCommand::PowershellBitmap { target } => vec![
                OsString::from("-Command"),
                OsString::from(powershell_capture_script(target)),
            ],
        }
    }

    /// File the command is expected to write
    pub fn target(&self) -> &Path {
        match self {
            CaptureCommand::Screencapture { target }
            | CaptureCommand::ImportRootWindow { target }
            | CaptureCommand::PowershellBitmap { target } => target,
        }
    }
}

/// PowerShell one-liner capturing the primary screen into a bitmap file
fn powershell_capture_script(target: &Path) -> String {
    format!(
        "Add-Type -AssemblyName System.Windows.Forms; \
         [System.Windows.Forms.Screen]::PrimaryScreen | ForEach-Object {{ \
         $bitmap = New-Object System.Drawing.Bitmap($_.Bounds.Width, $_.Bounds.Height); \
         $graphics = [System.Drawing.Graphics]::FromImage($bitmap); \
         $graphics.CopyFromScreen($_.Bounds.Location, [System.Drawing.Point]::Empty, \
         $_.Bounds.Size); $bitmap.Save('{}'); $graphics.Dispose(); $bitmap.Dispose() }}",
        target.display()
    )
}

/// External process collaborator boundary
///
/// Runs a resolved capture command synchronously to completion. A non-zero
/// exit or spawn failure is an error carrying the command's stderr (or the
/// spawn error) as detail.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &CaptureCommand) -> OpResult<()>;
}

/// Production runner backed by `tokio::process`
#[derive(Debug, Default)]
pub struct SystemCommandRunner;

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, command: &CaptureCommand) -> OpResult<()> {
        let output = Command::new(command.program())
            .args(command.args())
            .output()
            .await
            .map_err(|e| ToolError::ExternalCommandFailed {
                command: command.program().to_string(),
                detail:  e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let detail = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            };
            return Err(ToolError::ExternalCommandFailed {
                command: command.program().to_string(),
                detail,
            });
        }
        Ok(())
    }
}

/// Produces a screenshot file under `snapshots/` via the platform command
pub struct CaptureInvoker {
    platform: Platform,
    paths:    ServerPaths,
    runner:   Arc<dyn CommandRunner>,
}

impl CaptureInvoker {
    pub fn new(platform: Platform, paths: ServerPaths, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            platform,
            paths,
            runner,
        }
    }

    /// Captures the desktop into `snapshots/<filename>`
    ///
    /// Filename validation and platform resolution happen before anything
    /// touches the filesystem or spawns a process; an unsupported platform
    /// therefore never runs a command. The file size is read back after
    /// the command completes, so a command that claims success without
    /// writing still surfaces as a failure.
    pub async fn capture(&self, filename: &str) -> OpResult<CaptureReport> {
        let target = self.paths.snapshot_path(filename)?;
        let command = CaptureCommand::for_platform(&self.platform, &target)?;

        self.paths.ensure_snapshots().await?;

        debug!(program = command.program(), target = %target.display(), "running capture command");
        self.runner.run(&command).await?;

        let metadata = tokio::fs::metadata(&target).await.map_err(|source| {
            ToolError::FilesystemWriteFailed {
                path: target.display().to_string(),
                source,
            }
        })?;

        info!(path = %target.display(), size = metadata.len(), "screenshot captured");
        Ok(CaptureReport::new(target.display().to_string(), metadata.len()))
    }
}
