//! Core data types shared across the pipeline, mirroring §3 of the spec.
//!
//! Centralizing the domain vocabulary here (rather than scattering it
//! across components) follows the teacher crate's own `types.rs`, which
//! plays the same role for `FileAnalysis`/`ImportEntry`/`Mode`.

use std::path::PathBuf;

use serde::Serialize;

/// Byte offset into a source file's original bytes.
pub type Pos = usize;

/// A resolved package: canonical import path, short name, directory, and
/// its ordered primary (non-test) source files. Immutable once built by
/// the [`crate::resolver`].
#[derive(Debug, Clone)]
pub struct PackageDescriptor {
    pub import_path: String,
    pub name: String,
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// A non-empty exported interface type from an interface package.
#[derive(Debug, Clone)]
pub struct InterfaceSetEntry {
    pub package_path: String,
    pub name: String,
    pub methods: Vec<String>,
    pub pos: Pos,
}

/// A (concrete type, method name) pair obligated to carry a logging
/// construct, keyed by the method-name identifier's source position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MethodObligation {
    pub type_name: String,
    pub method_name: String,
    /// Position of the method-name identifier token, unique within the
    /// file set (spec §3: "not the `func` keyword").
    pub name_pos: Pos,
}

/// One of the two forms of the well-known deferred logging call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogCallForm {
    /// `<LOG>.Call(args...)(rets...)`
    Positional,
    /// `<LOG>.Callf(fmt, args...)(fmt, rets...)`
    Format,
}

/// Classification outcome for one obligated method, per §4.4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Classification {
    Compliant(LogCallForm),
    NotPresent,
    Invalid(String),
    Suppressed,
}

/// A single violation or warning surfaced to the caller, distinct from
/// [`crate::error::LogCopError`]: diagnostics drive check/inject control
/// flow rather than aborting a package.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub file: PathBuf,
    pub type_name: String,
    pub method_name: String,
    pub pos: Pos,
    pub classification: Classification,
}

impl Diagnostic {
    /// True for the diagnostics that make `check` exit non-zero.
    pub fn is_violation(&self) -> bool {
        matches!(
            self.classification,
            Classification::NotPresent | Classification::Invalid(_)
        )
    }

    /// True for diagnostics `inject` treats as rewrite targets.
    pub fn is_rewrite_target(&self) -> bool {
        matches!(self.classification, Classification::NotPresent)
    }
}

/// A (byte offset, inserted text) record applied to one source file.
/// Offsets refer to the *original* file bytes (spec §3).
#[derive(Debug, Clone)]
pub struct Patch {
    pub offset: Pos,
    pub insert: String,
}

/// The canonical payload LogCop injects at the start of a method body.
/// `remove` deletes only text byte-identical to this.
pub const INJECTION_PAYLOAD: &str = "\ndefer <LOG>.Call()(); ";

/// The sentinel token recognized inside a suppression comment.
pub const SUPPRESSION_SENTINEL: &str = "nologcall";

/// Result of running `check` or `inject` over one implementation package.
#[derive(Debug, Default)]
pub struct PackageReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl PackageReport {
    pub fn has_violations(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_violation)
    }
}

/// Translate a byte offset into 1-based (line, column) for diagnostics,
/// matching how compilers and linters usually report positions.
pub fn line_col(src: &str, offset: Pos) -> (usize, usize) {
    let mut line = 1usize;
    let mut col = 1usize;
    for (i, ch) in src.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_tracks_newlines() {
        let src = "abc\ndef\nghi";
        assert_eq!(line_col(src, 0), (1, 1));
        assert_eq!(line_col(src, 4), (2, 1));
        assert_eq!(line_col(src, 9), (3, 2));
    }

    #[test]
    fn diagnostic_violation_classification() {
        let d = Diagnostic {
            file: PathBuf::from("a.go"),
            type_name: "A".into(),
            method_name: "M".into(),
            pos: 0,
            classification: Classification::NotPresent,
        };
        assert!(d.is_violation());
        assert!(d.is_rewrite_target());

        let d2 = Diagnostic {
            classification: Classification::Suppressed,
            ..d
        };
        assert!(!d2.is_violation());
        assert!(!d2.is_rewrite_target());
    }
}
