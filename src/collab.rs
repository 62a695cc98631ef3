//! Collaborator interfaces (spec §6): the package lister, the workspace
//! environment, and the external formatter. LogCop treats all three as
//! external tools it calls out to, never reimplements — the same spirit
//! as the teacher's `git.rs`/`fs_utils.rs`, which shell out to `git`
//! rather than reimplementing a gitignore matcher from scratch.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{LogCopError, Result};

/// Given pattern strings, returns canonical import paths in lexicographic
/// order. Implementations may expand trailing `/...` wildcards however
/// their workspace layout tool does; LogCop does not care how.
pub trait PackageLister {
    fn list(&self, pattern: &str) -> Result<Vec<String>>;

    /// Resolve a canonical import path to an on-disk directory.
    fn locate(&self, import_path: &str) -> Option<PathBuf>;
}

/// Invoked with a list of modified file paths after a successful inject.
/// LogCop does not parse its output, only its exit status (spec §6).
pub trait Formatter {
    fn format(&self, files: &[PathBuf]) -> Result<()>;
}

/// A no-op formatter for `--gofmt=false` or test harnesses that don't
/// want to depend on an external binary being installed.
pub struct NullFormatter;

impl Formatter for NullFormatter {
    fn format(&self, _files: &[PathBuf]) -> Result<()> {
        Ok(())
    }
}

/// Shells out to a configured formatter binary (e.g. `gofmt -w`). Failure
/// is non-fatal at the call site (spec §7: FORMAT_ERROR is a warning),
/// but this returns the error so the caller can decide how to surface it.
pub struct ExternalFormatter {
    pub binary: String,
    pub extra_args: Vec<String>,
}

impl ExternalFormatter {
    pub fn new(binary: impl Into<String>) -> Self {
        ExternalFormatter {
            binary: binary.into(),
            extra_args: vec!["-w".to_string()],
        }
    }
}

impl Formatter for ExternalFormatter {
    fn format(&self, files: &[PathBuf]) -> Result<()> {
        if files.is_empty() {
            return Ok(());
        }
        let output = Command::new(&self.binary)
            .args(&self.extra_args)
            .args(files)
            .output()
            .map_err(|e| LogCopError::Format {
                message: format!("failed to invoke {}: {e}", self.binary),
            })?;
        if !output.status.success() {
            return Err(LogCopError::Format {
                message: format!(
                    "{} exited with {}: {}",
                    self.binary,
                    output.status,
                    String::from_utf8_lossy(&output.stderr)
                ),
            });
        }
        Ok(())
    }
}

/// Filesystem-backed package lister used when no host-provided workspace
/// tool is wired up (e.g. the `logcop` CLI binary pointed directly at a
/// tree of import-path-named directories rooted at `search_roots`).
/// Production hosts with a real workspace/module system should supply
/// their own [`PackageLister`] instead.
pub struct FsPackageLister {
    pub search_roots: Vec<PathBuf>,
}

impl FsPackageLister {
    pub fn new(search_roots: Vec<PathBuf>) -> Self {
        FsPackageLister { search_roots }
    }
}

impl PackageLister for FsPackageLister {
    fn list(&self, pattern: &str) -> Result<Vec<String>> {
        let mut out = Vec::new();
        if let Some(prefix) = pattern.strip_suffix("/...") {
            for root in &self.search_roots {
                let base = root.join(prefix);
                if !base.is_dir() {
                    continue;
                }
                for entry in walkdir::WalkDir::new(&base)
                    .into_iter()
                    .filter_map(|e| e.ok())
                {
                    if !entry.file_type().is_dir() {
                        continue;
                    }
                    if !dir_has_source_files(entry.path()) {
                        continue;
                    }
                    let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
                    out.push(normalize_import_path(rel));
                }
            }
            out.sort();
            out.dedup();
        } else if self.locate(pattern).is_some() {
            out.push(pattern.to_string());
        }

        if out.is_empty() {
            return Err(LogCopError::Resolve {
                pattern: pattern.to_string(),
                reason: "pattern expanded to zero packages".to_string(),
            });
        }
        Ok(out)
    }

    fn locate(&self, import_path: &str) -> Option<PathBuf> {
        for root in &self.search_roots {
            let candidate = root.join(import_path);
            if candidate.is_dir() {
                return Some(candidate);
            }
        }
        None
    }
}

fn dir_has_source_files(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries.filter_map(|e| e.ok()).any(|e| {
                e.path().extension().and_then(|s| s.to_str()) == Some("go")
                    && !e
                        .file_name()
                        .to_string_lossy()
                        .ends_with("_test.go")
            })
        })
        .unwrap_or(false)
}

fn normalize_import_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn fs_lister_locates_literal_path() {
        let tmp = TempDir::new().unwrap();
        let pkg = tmp.path().join("widget");
        std::fs::create_dir_all(&pkg).unwrap();
        std::fs::write(pkg.join("widget.go"), "package widget\n").unwrap();

        let lister = FsPackageLister::new(vec![tmp.path().to_path_buf()]);
        assert_eq!(lister.list("widget").unwrap(), vec!["widget".to_string()]);
        assert!(lister.locate("widget").is_some());
        assert!(lister.locate("missing").is_none());
    }

    #[test]
    fn fs_lister_expands_wildcard() {
        let tmp = TempDir::new().unwrap();
        for name in ["a", "a/b"] {
            let dir = tmp.path().join("root").join(name);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("f.go"), "package p\n").unwrap();
        }

        let lister = FsPackageLister::new(vec![tmp.path().to_path_buf()]);
        let mut paths = lister.list("root/...").unwrap();
        paths.sort();
        assert_eq!(paths, vec!["root/a".to_string(), "root/a/b".to_string()]);
    }

    #[test]
    fn fs_lister_errors_on_empty_expansion() {
        let tmp = TempDir::new().unwrap();
        let lister = FsPackageLister::new(vec![tmp.path().to_path_buf()]);
        assert!(lister.list("nowhere").is_err());
    }

    #[test]
    fn null_formatter_always_succeeds() {
        assert!(NullFormatter.format(&[PathBuf::from("x.go")]).is_ok());
    }
}
