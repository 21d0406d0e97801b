//! Viewer error type

use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Diagnostic printed when a cube map naming key cannot be resolved.
pub const INVALID_CUBEMAP_KEY_MESSAGE: &str = "ReadCubeMap(): invalid key, unable to continue.";

/// Diagnostic printed when the graphics adapter is below the minimum requirements.
pub const UNSUPPORTED_PLATFORM_MESSAGE: &str =
    "You need a GPU with filterable half-float cube map support to run this program.";

/// Viewer error type
#[derive(Error, Debug)]
pub enum ViewerError {
    /// Missing or malformed command line arguments; carries the usage text.
    #[error("{0}")]
    Usage(String),
    #[error("{}", INVALID_CUBEMAP_KEY_MESSAGE)]
    InvalidCubemapKey,
    #[error("{}", UNSUPPORTED_PLATFORM_MESSAGE)]
    UnsupportedPlatform,
    #[error("Failed to create window: {0}")]
    Window(String),
    #[error("Failed to create surface: {0}")]
    SurfaceCreation(String),
    #[error("No suitable graphics adapter found")]
    AdapterNotFound,
    #[error("Failed to create device: {0}")]
    DeviceCreation(String),
    #[error("Unable to read the file: {}: {message}", path.display())]
    Image { path: PathBuf, message: String },
    #[error("Surface lost")]
    SurfaceLost,
    #[error("Out of memory")]
    OutOfMemory,
}

impl ViewerError {
    pub(crate) fn image(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Image {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Usage errors go to standard output, everything else to standard error.
    pub fn prints_to_stdout(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    /// Print the error on its stream and return the failing exit status.
    pub fn report(&self) -> ExitCode {
        if self.prints_to_stdout() {
            println!("{}", self);
        } else {
            eprintln!("{}", self);
        }
        ExitCode::FAILURE
    }
}

pub type ViewerResult<T> = Result<T, ViewerError>;
