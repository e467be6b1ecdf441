//! The core crate's unified error type.
//!
//! `CoreError` covers only the failure modes the pipeline itself cannot turn
//! into a diagnostic: I/O failures reading source files or walking the
//! project tree, and malformed skip-glob patterns. Everything else —
//! lexical, syntax and semantic problems — is data (a
//! [`crate::diagnostic::Diagnostic`]), never an error return. An invariant
//! the pipeline assumes (a precondition no well-formed input can violate)
//! is a programmer error, not a `Result`: it panics.

use std::path::PathBuf;

use thiserror::Error;

/// Stable numeric codes, mirrored by the CLI crate's exit-code mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CoreErrorCode {
    /// Could not read a source file or walk the project tree.
    Io = 2,
    /// A skip-glob pattern failed to compile.
    InvalidConfig = 3,
}

impl CoreErrorCode {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl std::fmt::Display for CoreErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk project tree at '{path}': {source}")]
    WalkDir {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("invalid skip pattern '{pattern}': {source}")]
    InvalidSkipGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

impl CoreError {
    pub fn code(&self) -> CoreErrorCode {
        match self {
            CoreError::ReadFile { .. } | CoreError::WalkDir { .. } => CoreErrorCode::Io,
            CoreError::InvalidSkipGlob { .. } => CoreErrorCode::InvalidConfig,
        }
    }
}

impl From<&CoreError> for CoreErrorCode {
    fn from(err: &CoreError) -> Self {
        err.code()
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_mapping() {
        let read_err = CoreError::ReadFile {
            path: PathBuf::from("x.nex"),
            source: std::io::Error::other("boom"),
        };
        assert_eq!(read_err.code(), CoreErrorCode::Io);
        assert_eq!(read_err.code().code(), 2);

        let glob_err = CoreError::InvalidSkipGlob {
            pattern: "[".to_string(),
            source: globset::Glob::new("[").unwrap_err(),
        };
        assert_eq!(glob_err.code(), CoreErrorCode::InvalidConfig);
        assert_eq!(glob_err.code().code(), 3);
    }

    #[test]
    fn error_display_includes_path() {
        let err = CoreError::ReadFile {
            path: PathBuf::from("schema/foo.nex"),
            source: std::io::Error::other("permission denied"),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("schema/foo.nex"));
    }
}
