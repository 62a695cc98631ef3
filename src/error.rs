//! Error kinds for the LogCop pipeline.
//!
//! Hand-rolled rather than `thiserror`-derived: the teacher crate never
//! reaches for `thiserror` even though its workspace lists it as a
//! dependency for other members, preferring explicit enums with manual
//! `Display`/`Error` impls and `io::Result` at the boundaries.

use std::fmt;
use std::path::PathBuf;

/// One entry per §7 error-kind table in the spec. `Diagnostic` (in
/// [`crate::types`]) covers the non-fatal NOT_PRESENT/INVALID cases; this
/// enum is reserved for conditions that abort processing of a package or
/// file.
#[derive(Debug)]
pub enum LogCopError {
    /// A pattern expanded to zero packages, or its directory could not be
    /// located.
    Resolve { pattern: String, reason: String },
    /// Syntax error while parsing a source file.
    Parse {
        file: PathBuf,
        line: usize,
        col: usize,
        message: String,
    },
    /// A referenced type/identifier could not be resolved.
    TypeCheck {
        file: PathBuf,
        site: String,
        message: String,
    },
    /// A dependency package could not be located or loaded.
    Import { path: String, message: String },
    /// An import cycle was detected while resolving dependencies.
    Cycle { path: String, chain: Vec<String> },
    /// A file read/write failed.
    Io { path: PathBuf, source: std::io::Error },
    /// The external formatter failed; non-fatal, surfaced as a warning by
    /// callers rather than propagated as this variant in most code paths.
    Format { message: String },
}

impl fmt::Display for LogCopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogCopError::Resolve { pattern, reason } => {
                write!(f, "RESOLVE_ERROR: pattern {pattern:?}: {reason}")
            }
            LogCopError::Parse {
                file,
                line,
                col,
                message,
            } => {
                write!(
                    f,
                    "PARSE_ERROR: {}:{}:{}: {}",
                    file.display(),
                    line,
                    col,
                    message
                )
            }
            LogCopError::TypeCheck {
                file,
                site,
                message,
            } => {
                write!(
                    f,
                    "TYPECHECK_ERROR: {}: {} ({})",
                    file.display(),
                    message,
                    site
                )
            }
            LogCopError::Import { path, message } => {
                write!(f, "IMPORT_ERROR: {path}: {message}")
            }
            LogCopError::Cycle { path, chain } => {
                write!(f, "CYCLE_ERROR: {path} (via {})", chain.join(" -> "))
            }
            LogCopError::Io { path, source } => {
                write!(f, "IO_ERROR: {}: {}", path.display(), source)
            }
            LogCopError::Format { message } => {
                write!(f, "FORMAT_ERROR: {message}")
            }
        }
    }
}

impl std::error::Error for LogCopError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LogCopError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LogCopError>;
