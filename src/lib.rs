//! LogCop: a static-analysis and source-rewriting engine that verifies
//! every exported method of every concrete type structurally satisfying
//! an exported interface begins with a well-formed logging construct,
//! and can rewrite offending files in place.
//!
//! The pipeline (spec §2) is a straight line through these modules:
//!
//! 1. [`resolver`] — expand package patterns into [`types::PackageDescriptor`]s.
//! 2. [`parser`] — parse each package's primary source files, minimally
//!    type-checking the import table along the way.
//! 3. [`checker`] — resolve method sets (value/pointer, embedding
//!    promotion, depth-based shadowing), consulting [`importer`] whenever
//!    an embedded field's type lives in another package.
//! 4. [`analyzer`] — turn interface satisfaction into
//!    [`types::MethodObligation`]s.
//! 5. [`validator`] — classify each obligated method's first statement.
//! 6. [`patcher`] — compute and apply byte-offset patches for `inject`
//!    and `remove`.
//!
//! [`pipeline`] wires these into the three operations [`cli`] exposes.

pub mod analyzer;
pub mod checker;
pub mod cli;
pub mod collab;
pub mod config;
pub mod error;
pub mod importer;
pub mod parser;
pub mod patcher;
pub mod pipeline;
pub mod resolver;
pub mod types;
pub mod validator;
