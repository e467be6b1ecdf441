//! The CLI-facing unified error type.
//!
//! `NexemaError` bridges `nexema_core::error::CoreError`, manifest load
//! failures and generator failures into one type with a stable exit code per
//! variant, following the `TugError`/`OutputErrorCode` split in
//! `nexema_core`'s sibling crate.

use std::path::PathBuf;

use thiserror::Error;

/// Stable exit codes, one per failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Could not read or parse `nexema.yaml`.
    InvalidManifest = 2,
    /// Propagated from `nexema_core::error::CoreError`.
    Core = 3,
    /// The build produced diagnostics; lowering and generation did not run.
    Diagnostics = 4,
    /// A requested generator is not registered, or a generator itself failed.
    Generator = 5,
}

impl ExitCode {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Error)]
pub enum NexemaError {
    #[error("failed to read manifest '{path}': {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest '{path}': {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Core(#[from] nexema_core::error::CoreError),

    #[error("build produced {count} diagnostic(s); see above")]
    Diagnostics { count: usize },

    #[error("no generator named '{name}' is registered")]
    UnknownGenerator { name: String },

    #[error("generator '{name}' failed: {message}")]
    GeneratorFailed { name: String, message: String },

    #[error("failed to write snapshot '{path}': {source}")]
    SnapshotWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read snapshot '{path}': {source}")]
    SnapshotRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse snapshot '{path}': {source}")]
    SnapshotParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to walk '{path}' while clearing snapshots: {source}")]
    ClearSnapshots {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to determine the current directory: {source}")]
    CurrentDir {
        #[source]
        source: std::io::Error,
    },
}

impl NexemaError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            NexemaError::ManifestRead { .. } | NexemaError::ManifestParse { .. } => ExitCode::InvalidManifest,
            NexemaError::Core(_) => ExitCode::Core,
            NexemaError::Diagnostics { .. } => ExitCode::Diagnostics,
            NexemaError::UnknownGenerator { .. } | NexemaError::GeneratorFailed { .. } => ExitCode::Generator,
            NexemaError::SnapshotWrite { .. }
            | NexemaError::SnapshotRead { .. }
            | NexemaError::SnapshotParse { .. }
            | NexemaError::ClearSnapshots { .. }
            | NexemaError::CurrentDir { .. } => ExitCode::Core,
        }
    }
}

impl From<&NexemaError> for ExitCode {
    fn from(err: &NexemaError) -> Self {
        err.exit_code()
    }
}

pub type NexemaResult<T> = Result<T, NexemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_propagate_their_own_code_bucket() {
        let core_err = nexema_core::error::CoreError::ReadFile {
            path: PathBuf::from("x.nex"),
            source: std::io::Error::other("boom"),
        };
        let err = NexemaError::from(core_err);
        assert_eq!(err.exit_code(), ExitCode::Core);
        assert_eq!(err.exit_code().code(), 3);
    }

    #[test]
    fn diagnostics_map_to_their_own_exit_code() {
        let err = NexemaError::Diagnostics { count: 3 };
        assert_eq!(err.exit_code(), ExitCode::Diagnostics);
        assert_eq!(err.to_string(), "build produced 3 diagnostic(s); see above");
    }

    #[test]
    fn unknown_generator_maps_to_generator_code() {
        let err = NexemaError::UnknownGenerator { name: "rust".to_string() };
        assert_eq!(err.exit_code(), ExitCode::Generator);
        assert_eq!(err.exit_code().code(), 5);
    }

    #[test]
    fn current_dir_failure_maps_to_the_core_code_bucket() {
        let err = NexemaError::CurrentDir {
            source: std::io::Error::other("permission denied"),
        };
        assert_eq!(err.exit_code(), ExitCode::Core);
        assert_eq!(err.exit_code().code(), 3);
    }
}
