//! Parser + Type-Checker (spec §4.2).
//!
//! LogCop's "type-checking" is narrower than a full compiler front end:
//! function bodies are never evaluated (spec.md Non-goals), so what's
//! checked is package-name consistency across a descriptor's files and
//! the frozen `<LOG>` import ABI (spec §6) — the facts the downstream
//! Analyzer and Validator actually depend on. Method-set resolution
//! itself lives in [`crate::checker`], since it needs the whole
//! implementation package plus every interface package at once.

pub mod ast;
mod lexer;
mod parse;

pub use ast::*;
pub use parse::parse_file;

use std::path::PathBuf;

use crate::config::BuildConfig;
use crate::error::{LogCopError, Result};
use crate::types::PackageDescriptor;

/// One parsed file: its path, original source (kept for the Validator's
/// suppression-comment scan and the Patcher's byte-offset patches), and
/// syntax tree.
pub struct ParsedFile {
    pub path: PathBuf,
    pub src: String,
    pub ast: File,
}

/// A [`PackageDescriptor`] plus its type-checked contents. Retained only
/// for the duration of processing one implementation package (spec §3).
pub struct ParsedPackage {
    pub descriptor: PackageDescriptor,
    pub name: String,
    pub files: Vec<ParsedFile>,
}

/// Parse every primary source file in `descriptor`, verify package-name
/// consistency, and — when `build` is given — enforce the frozen
/// `<LOG>` import ABI (spec §6: aliasing it to another name is treated
/// as a hard error here, per the Open Question resolution in
/// SPEC_FULL.md, rather than a silent skip).
pub fn parse_package(
    descriptor: &PackageDescriptor,
    build: Option<&BuildConfig>,
) -> Result<ParsedPackage> {
    let mut files = Vec::new();
    let mut package_name: Option<String> = None;

    for path in &descriptor.files {
        let src = std::fs::read_to_string(path).map_err(|e| LogCopError::Io {
            path: path.clone(),
            source: e,
        })?;
        let ast = parse_file(&src, path)?;

        match &package_name {
            None => package_name = Some(ast.package_name.clone()),
            Some(existing) if existing != &ast.package_name => {
                return Err(LogCopError::TypeCheck {
                    file: path.clone(),
                    site: ast.package_name.clone(),
                    message: format!(
                        "package name {:?} does not match {:?} established earlier in {}",
                        ast.package_name, existing, descriptor.import_path
                    ),
                });
            }
            _ => {}
        }

        if let Some(build) = build {
            check_log_alias(&ast, path, build)?;
        }

        files.push(ParsedFile {
            path: path.clone(),
            src,
            ast,
        });
    }

    let name = package_name.unwrap_or_else(|| descriptor.name.clone());

    Ok(ParsedPackage {
        descriptor: descriptor.clone(),
        name,
        files,
    })
}

/// Reject a file that imports the logging package's canonical path under
/// any alias other than the one the whole pipeline expects.
fn check_log_alias(ast: &File, path: &std::path::Path, build: &BuildConfig) -> Result<()> {
    for import in &ast.imports {
        for spec in &import.specs {
            if spec.path != build.log_import_path {
                continue;
            }
            let effective_alias = spec.alias.clone().unwrap_or_else(|| {
                spec.path
                    .rsplit('/')
                    .next()
                    .unwrap_or(&spec.path)
                    .to_string()
            });
            if effective_alias != build.log_alias {
                return Err(LogCopError::Import {
                    path: build.log_import_path.clone(),
                    message: format!(
                        "{} imports the logging package as {:?}, expected alias {:?}",
                        path.display(),
                        effective_alias,
                        build.log_alias
                    ),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PackageDescriptor;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn descriptor_for(dir: &std::path::Path, files: &[(&str, &str)]) -> PackageDescriptor {
        let mut paths = Vec::new();
        for (name, content) in files {
            let p = dir.join(name);
            std::fs::write(&p, content).unwrap();
            paths.push(p);
        }
        PackageDescriptor {
            import_path: "widget".to_string(),
            name: "widget".to_string(),
            dir: dir.to_path_buf(),
            files: paths,
        }
    }

    #[test]
    fn parses_all_files_and_checks_package_consistency() {
        let tmp = TempDir::new().unwrap();
        let descriptor = descriptor_for(
            tmp.path(),
            &[
                ("a.go", "package widget\n\nfunc (a A) M() {}\n"),
                ("b.go", "package widget\n\nfunc (a A) N() {}\n"),
            ],
        );
        let parsed = parse_package(&descriptor, None).unwrap();
        assert_eq!(parsed.name, "widget");
        assert_eq!(parsed.files.len(), 2);
    }

    #[test]
    fn mismatched_package_names_is_typecheck_error() {
        let tmp = TempDir::new().unwrap();
        let descriptor = descriptor_for(
            tmp.path(),
            &[
                ("a.go", "package widget\n"),
                ("b.go", "package other\n"),
            ],
        );
        let err = parse_package(&descriptor, None).unwrap_err();
        assert!(matches!(err, LogCopError::TypeCheck { .. }));
    }

    #[test]
    fn aliasing_log_import_is_hard_error() {
        let tmp = TempDir::new().unwrap();
        let descriptor = descriptor_for(
            tmp.path(),
            &[(
                "a.go",
                "package widget\n\nimport l \"example.com/log\"\n\nfunc (a A) M() {}\n",
            )],
        );
        let build = BuildConfig::new("example.com/log");
        let err = parse_package(&descriptor, Some(&build)).unwrap_err();
        assert!(matches!(err, LogCopError::Import { .. }));
    }

    #[test]
    fn default_alias_matching_package_last_segment_is_ok() {
        let tmp = TempDir::new().unwrap();
        let descriptor = descriptor_for(
            tmp.path(),
            &[(
                "a.go",
                "package widget\n\nimport \"example.com/log\"\n\nfunc (a A) M() {}\n",
            )],
        );
        let build = BuildConfig::new("example.com/log");
        let parsed = parse_package(&descriptor, Some(&build)).unwrap();
        assert_eq!(parsed.files.len(), 1);
        let _ = PathBuf::new();
    }
}
