//! Top-level orchestration: wires Resolver → Parser/Type-Checker →
//! Analyzer → Validator → Patcher into the three operations the CLI
//! exposes (spec §2's pipeline, §4.5's inject/remove).

use std::path::PathBuf;

use crate::analyzer;
use crate::collab::{Formatter, PackageLister};
use crate::config::BuildConfig;
use crate::error::{LogCopError, Result};
use crate::importer::Importer;
use crate::parser::{self, ParsedPackage};
use crate::patcher;
use crate::resolver;
use crate::types::PackageReport;
use crate::validator;

/// One implementation package together with its validation report.
pub struct Analyzed {
    pub package: ParsedPackage,
    pub report: PackageReport,
}

/// Resolve and parse the interface packages, compute obligations and
/// validate every implementation package named by `impl_patterns`
/// against them (spec §4.1 through §4.4, chained). Cross-package
/// embedded fields are resolved through an [`Importer`] scoped to this
/// one call.
pub fn analyze(
    lister: &dyn PackageLister,
    impl_patterns: &[String],
    iface_patterns: &[String],
    build: &BuildConfig,
    sentinel: &str,
) -> Result<Vec<Analyzed>> {
    let iface_descriptors = resolver::resolve(lister, iface_patterns)?;
    let mut iface_packages = Vec::with_capacity(iface_descriptors.len());
    for descriptor in &iface_descriptors {
        iface_packages.push(parser::parse_package(descriptor, None)?);
    }
    let interfaces = analyzer::collect_interfaces(&iface_packages);

    let importer = Importer::new(lister);

    let impl_descriptors = resolver::resolve(lister, impl_patterns)?;
    let mut out = Vec::with_capacity(impl_descriptors.len());
    for descriptor in &impl_descriptors {
        let package = parser::parse_package(descriptor, Some(build))?;
        let obligations = analyzer::compute_obligations(&package, &interfaces, &importer)?;
        let foreign = importer.parsed_packages();
        let report = validator::validate_package(&package, &obligations, &build.log_alias, sentinel, &foreign)?;
        out.push(Analyzed { package, report });
    }
    Ok(out)
}

/// Apply injection patches for every `NotPresent` diagnostic across
/// `analyzed`, writing modified files in place and running `formatter`
/// over whatever it touched. Returns the set of rewritten file paths.
pub fn inject(analyzed: &[Analyzed], build: &BuildConfig, formatter: &dyn Formatter) -> Result<Vec<PathBuf>> {
    let mut touched = Vec::new();

    for entry in analyzed {
        for file in &entry.package.files {
            let patches = patcher::plan_patches(file, &entry.report.diagnostics, build);
            if patches.is_empty() {
                continue;
            }
            let patched = patcher::apply_patches(&file.src, &patches)?;
            write_file(&file.path, &patched)?;
            touched.push(file.path.clone());
        }
    }

    if !touched.is_empty() {
        formatter.format(&touched)?;
    }
    Ok(touched)
}

/// Compute the same patches `inject` would apply, but perform no writes
/// and no formatting — instead render a diff-ish preview of what each
/// touched file would gain. One string per touched file, in package
/// order.
pub fn inject_preview(analyzed: &[Analyzed], build: &BuildConfig) -> Vec<String> {
    let mut previews = Vec::new();

    for entry in analyzed {
        for file in &entry.package.files {
            let patches = patcher::plan_patches(file, &entry.report.diagnostics, build);
            if patches.is_empty() {
                continue;
            }
            previews.push(patcher::render_diff_preview(file, &patches));
        }
    }

    previews
}

/// Strip byte-identical canonical injections for every
/// `Compliant(Positional)` diagnostic across `analyzed`.
pub fn remove(analyzed: &[Analyzed], build: &BuildConfig, formatter: &dyn Formatter) -> Result<Vec<PathBuf>> {
    let mut touched = Vec::new();

    for entry in analyzed {
        for file in &entry.package.files {
            let spans = patcher::plan_removals(file, &entry.report.diagnostics, build);
            if spans.is_empty() {
                continue;
            }
            let new_src = patcher::apply_removals(&file.src, &spans);
            write_file(&file.path, &new_src)?;
            touched.push(file.path.clone());
        }
    }

    if !touched.is_empty() {
        formatter.format(&touched)?;
    }
    Ok(touched)
}

fn write_file(path: &std::path::Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| LogCopError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{FsPackageLister, NullFormatter};
    use tempfile::TempDir;

    fn write(dir: &std::path::Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn end_to_end_check_and_inject() {
        let tmp = TempDir::new().unwrap();
        let iface_dir = tmp.path().join("iface");
        std::fs::create_dir_all(&iface_dir).unwrap();
        write(
            &iface_dir,
            "iface.go",
            "package iface\n\ntype Doer interface {\n\tDo()\n}\n",
        );

        let impl_dir = tmp.path().join("widget");
        std::fs::create_dir_all(&impl_dir).unwrap();
        write(
            &impl_dir,
            "widget.go",
            "package widget\n\nimport \"example.com/log\"\n\ntype Worker struct {}\n\nfunc (w Worker) Do() {\n\tfmt.Println()\n}\n",
        );

        let lister = FsPackageLister::new(vec![tmp.path().to_path_buf()]);
        let build = BuildConfig::new("example.com/log");

        let analyzed = analyze(
            &lister,
            &["widget".to_string()],
            &["iface".to_string()],
            &build,
            "nologcall",
        )
        .unwrap();

        assert_eq!(analyzed.len(), 1);
        assert!(analyzed[0].report.has_violations());

        let touched = inject(&analyzed, &build, &NullFormatter).unwrap();
        assert_eq!(touched.len(), 1);

        let rewritten = std::fs::read_to_string(&touched[0]).unwrap();
        assert!(rewritten.contains("defer log.Call()();"));

        // Re-running analysis should now find the method compliant.
        let reanalyzed = analyze(
            &lister,
            &["widget".to_string()],
            &["iface".to_string()],
            &build,
            "nologcall",
        )
        .unwrap();
        assert!(!reanalyzed[0].report.has_violations());
    }

    #[test]
    fn inject_preview_does_not_touch_disk() {
        let tmp = TempDir::new().unwrap();
        let iface_dir = tmp.path().join("iface");
        std::fs::create_dir_all(&iface_dir).unwrap();
        write(&iface_dir, "iface.go", "package iface\n\ntype Doer interface {\n\tDo()\n}\n");

        let impl_dir = tmp.path().join("widget");
        std::fs::create_dir_all(&impl_dir).unwrap();
        let source = "package widget\n\ntype Worker struct {}\n\nfunc (w Worker) Do() {\n\tfmt.Println()\n}\n";
        write(&impl_dir, "widget.go", source);

        let lister = FsPackageLister::new(vec![tmp.path().to_path_buf()]);
        let build = BuildConfig::new("example.com/log");

        let analyzed = analyze(
            &lister,
            &["widget".to_string()],
            &["iface".to_string()],
            &build,
            "nologcall",
        )
        .unwrap();

        let previews = inject_preview(&analyzed, &build);
        assert_eq!(previews.len(), 1);
        assert!(previews[0].contains("+defer log.Call()();"));

        let after = std::fs::read_to_string(impl_dir.join("widget.go")).unwrap();
        assert_eq!(source, after);
    }
}
