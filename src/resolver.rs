//! Package Resolver (spec §4.1).
//!
//! Expands user-supplied package patterns into [`PackageDescriptor`]s via
//! an injected [`PackageLister`], with no source parsing of its own —
//! the same separation of concerns the teacher keeps between `detect.rs`
//! (stack discovery) and the analyzers that actually read file contents.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::collab::PackageLister;
use crate::error::{LogCopError, Result};
use crate::types::PackageDescriptor;

/// Expand `patterns` into descriptors, preserving first-seen order within
/// this single list (spec: "duplicate expansions within a single list
/// are preserved in first-seen order").
pub fn resolve(lister: &dyn PackageLister, patterns: &[String]) -> Result<Vec<PackageDescriptor>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for pattern in patterns {
        let expanded = lister.list(pattern)?;
        if expanded.is_empty() {
            return Err(LogCopError::Resolve {
                pattern: pattern.clone(),
                reason: "pattern expanded to zero packages".to_string(),
            });
        }
        for import_path in expanded {
            if !seen.insert(import_path.clone()) {
                continue;
            }
            let dir = lister.locate(&import_path).ok_or_else(|| LogCopError::Resolve {
                pattern: pattern.clone(),
                reason: format!("could not locate directory for {import_path:?}"),
            })?;
            let files = primary_source_files(&dir)?;
            let name = package_short_name(&import_path);
            out.push(PackageDescriptor {
                import_path,
                name,
                dir,
                files,
            });
        }
    }

    Ok(out)
}

/// The last path segment is the package's short name absent an explicit
/// `package` clause override (applied later once the file is parsed).
fn package_short_name(import_path: &str) -> String {
    import_path
        .rsplit('/')
        .next()
        .unwrap_or(import_path)
        .to_string()
}

/// Primary source files: `.go` files directly in `dir`, excluding
/// `_test.go` files (spec §4.2: "parses only the primary (non-test)
/// source files").
fn primary_source_files(dir: &std::path::Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| LogCopError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| LogCopError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("go") {
            continue;
        }
        let is_test = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.ends_with("_test"));
        if is_test {
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}
