//! Error types for raw2parquet
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The main error type for raw2parquet
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Duplicate dataset name: {name}")]
    DuplicateDataset { name: String },

    #[error("Failed to parse batch file: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // Input Errors
    // ============================================================================
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse JSON at {path}:{line}: {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Arrow/Parquet Errors
    // ============================================================================
    #[error("Unsupported compression codec '{codec}'. Valid options: {valid}")]
    UnsupportedCodec { codec: String, valid: &'static str },

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of an [`Error`], reported alongside failed datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input path does not exist
    FileNotFound,
    /// Malformed JSON in strict mode
    Parse,
    /// Compression codec the Parquet writer cannot produce
    UnsupportedCodec,
    /// Failure while persisting output
    Write,
    /// Invalid configuration
    Config,
    /// Any other I/O failure
    Io,
    /// Everything else
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::FileNotFound => "file_not_found",
            Self::Parse => "parse",
            Self::UnsupportedCodec => "unsupported_codec",
            Self::Write => "write",
            Self::Config => "config",
            Self::Io => "io",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a file-not-found error
    pub fn file_not_found(path: impl fmt::Display) -> Self {
        Self::FileNotFound {
            path: path.to_string(),
        }
    }

    /// Create a parse error for a line of an input file
    pub fn parse(path: impl fmt::Display, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.to_string(),
            line,
            message: message.into(),
        }
    }

    /// Create an unsupported codec error
    pub fn unsupported_codec(codec: impl Into<String>) -> Self {
        Self::UnsupportedCodec {
            codec: codec.into(),
            valid: crate::output::VALID_CODECS,
        }
    }

    /// Create a write error
    pub fn write(path: impl fmt::Display, message: impl Into<String>) -> Self {
        Self::Write {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::FileNotFound { .. } => ErrorKind::FileNotFound,
            Error::Parse { .. } | Error::JsonParse(_) => ErrorKind::Parse,
            Error::UnsupportedCodec { .. } => ErrorKind::UnsupportedCodec,
            Error::Write { .. } | Error::Parquet(_) | Error::Output { .. } => ErrorKind::Write,
            Error::Config { .. } | Error::DuplicateDataset { .. } | Error::YamlParse(_) => {
                ErrorKind::Config
            }
            Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            Error::Io(_) => ErrorKind::Io,
            Error::Arrow(_) | Error::Other(_) => ErrorKind::Other,
        }
    }
}

/// Result type alias for raw2parquet
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::file_not_found("data/absent.jsonl");
        assert_eq!(err.to_string(), "File not found: data/absent.jsonl");

        let err = Error::parse("data/bad.jsonl", 3, "expected value");
        assert_eq!(
            err.to_string(),
            "Failed to parse JSON at data/bad.jsonl:3: expected value"
        );
    }

    #[test]
    fn test_unsupported_codec_lists_options() {
        let err = Error::unsupported_codec("lzo");
        let message = err.to_string();
        assert!(message.contains("'lzo'"));
        assert!(message.contains("snappy"));
    }

    #[test]
    fn test_kind() {
        assert_eq!(Error::file_not_found("x").kind(), ErrorKind::FileNotFound);
        assert_eq!(Error::parse("x", 1, "bad").kind(), ErrorKind::Parse);
        assert_eq!(
            Error::unsupported_codec("lzo").kind(),
            ErrorKind::UnsupportedCodec
        );
        assert_eq!(Error::write("x", "denied").kind(), ErrorKind::Write);
        assert_eq!(Error::config("bad").kind(), ErrorKind::Config);

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(Error::Io(io).kind(), ErrorKind::FileNotFound);

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(Error::Io(io).kind(), ErrorKind::Io);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::UnsupportedCodec.to_string(), "unsupported_codec");
        assert_eq!(ErrorKind::FileNotFound.to_string(), "file_not_found");
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
