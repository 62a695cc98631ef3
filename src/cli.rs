//! Command-line surface: hand-rolled argument parsing matching the
//! teacher's own `args.rs` style (no `clap` — the teacher's CLI crates
//! parse `std::env::args()` directly and build a small options struct).

use std::path::PathBuf;

use crate::collab::{ExternalFormatter, Formatter, FsPackageLister, NullFormatter};
use crate::config::{BuildConfig, LogCopConfig};
use crate::pipeline;
use crate::types::Classification;

/// A malformed invocation — missing flag, unknown subcommand, stray
/// argument. Distinct from [`crate::error::LogCopError`]: this is a CLI
/// concern raised before any package is ever resolved, not one of the
/// spec's named pipeline error kinds.
#[derive(Debug)]
pub struct UsageError(pub String);

impl std::fmt::Display for UsageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "usage error: {}", self.0)
    }
}

impl std::error::Error for UsageError {}

#[derive(Debug, PartialEq, Eq)]
pub enum Subcommand {
    Check,
    Inject,
    Remove,
}

#[derive(Debug)]
pub struct RunArgs {
    pub subcommand: Subcommand,
    pub log_import_path: String,
    pub log_alias: String,
    pub interfaces: Vec<String>,
    pub packages: Vec<String>,
    pub search_roots: Vec<PathBuf>,
    pub gofmt: Option<bool>,
    pub gofmt_binary: String,
    pub json: bool,
    /// Inject a preview of the patches to stdout instead of writing them.
    pub diff_only: bool,
}

/// Parse `argv` (excluding the program name) into a [`RunArgs`].
pub fn parse_args(argv: &[String]) -> std::result::Result<RunArgs, UsageError> {
    let mut iter = argv.iter();

    let subcommand = match iter.next().map(String::as_str) {
        Some("check") => Subcommand::Check,
        Some("inject") => Subcommand::Inject,
        Some("remove") => Subcommand::Remove,
        Some(other) => {
            return Err(usage_error(format!(
                "unknown subcommand {other:?}, expected one of: check, inject, remove"
            )))
        }
        None => return Err(usage_error("missing subcommand: check, inject, or remove")),
    };

    let mut log_import_path = None;
    let mut log_alias = "log".to_string();
    let mut interfaces = Vec::new();
    let mut packages = Vec::new();
    let mut search_roots = Vec::new();
    let mut gofmt = None;
    let mut gofmt_binary = "gofmt".to_string();
    let mut json = false;
    let mut diff_only = false;

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--log-import-path" => {
                log_import_path = Some(take_value(&mut iter, "--log-import-path")?);
            }
            "--log-alias" => {
                log_alias = take_value(&mut iter, "--log-alias")?;
            }
            "--interface" => {
                interfaces.push(take_value(&mut iter, "--interface")?);
            }
            "--search-root" => {
                search_roots.push(PathBuf::from(take_value(&mut iter, "--search-root")?));
            }
            "--json" => json = true,
            "--diff-only" => diff_only = true,
            "--gofmt" => gofmt = Some(true),
            "--no-gofmt" => gofmt = Some(false),
            "--gofmt-binary" => {
                gofmt_binary = take_value(&mut iter, "--gofmt-binary")?;
            }
            other if other.starts_with("--") => {
                return Err(usage_error(format!("unrecognized flag {other:?}")));
            }
            positional => packages.push(positional.to_string()),
        }
    }

    let log_import_path = log_import_path
        .ok_or_else(|| usage_error("--log-import-path is required"))?;
    if packages.is_empty() {
        return Err(usage_error("at least one package pattern is required"));
    }
    if interfaces.is_empty() {
        return Err(usage_error("at least one --interface pattern is required"));
    }

    Ok(RunArgs {
        subcommand,
        log_import_path,
        log_alias,
        interfaces,
        packages,
        search_roots,
        gofmt,
        gofmt_binary,
        json,
        diff_only,
    })
}

fn take_value(iter: &mut std::slice::Iter<String>, flag: &str) -> std::result::Result<String, UsageError> {
    iter.next()
        .cloned()
        .ok_or_else(|| usage_error(format!("{flag} requires a value")))
}

fn usage_error(message: impl Into<String>) -> UsageError {
    UsageError(message.into())
}

/// Run the parsed command against `root` (the directory `.logcop/`
/// configuration and search roots are relative to). Returns the process
/// exit code: `0` clean, `1` violations remain (check) or were found
/// pre-removal (remove), `2` on a pipeline error.
pub fn run(args: &RunArgs, root: &std::path::Path) -> i32 {
    let config = LogCopConfig::load(root);

    let mut build = BuildConfig::new(args.log_import_path.clone());
    build.log_alias = args.log_alias.clone();

    let mut roots = args.search_roots.clone();
    if roots.is_empty() {
        roots.push(root.to_path_buf());
    }
    roots.extend(config.extra_search_roots.iter().cloned());
    let lister = FsPackageLister::new(roots);

    let sentinel = config.sentinel().to_string();

    let analyzed = match pipeline::analyze(&lister, &args.packages, &args.interfaces, &build, &sentinel) {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(%e, "analysis failed");
            return 2;
        }
    };

    let violations: Vec<&crate::types::Diagnostic> = analyzed
        .iter()
        .flat_map(|entry| entry.report.diagnostics.iter())
        .filter(|d| d.is_violation())
        .collect();

    if args.json {
        match serde_json::to_string_pretty(&violations) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!(%e, "failed to serialize diagnostics"),
        }
    } else {
        for entry in &analyzed {
            for diag in &entry.report.diagnostics {
                if !diag.is_violation() {
                    continue;
                }
                let (line, _) = crate::types::line_col(
                    entry
                        .package
                        .files
                        .iter()
                        .find(|f| f.path == diag.file)
                        .map(|f| f.src.as_str())
                        .unwrap_or(""),
                    diag.pos,
                );
                let reason = match &diag.classification {
                    Classification::Invalid(reason) => reason.as_str(),
                    _ => "missing deferred logging call",
                };
                println!(
                    "{}:{}: {}.{}: {}",
                    diag.file.display(),
                    line,
                    diag.type_name,
                    diag.method_name,
                    reason
                );
            }
        }
    }

    let run_formatter = args.gofmt.unwrap_or(config.run_formatter_by_default);
    let formatter: Box<dyn Formatter> = if run_formatter {
        Box::new(ExternalFormatter::new(args.gofmt_binary.clone()))
    } else {
        Box::new(NullFormatter)
    };

    match args.subcommand {
        Subcommand::Check => {
            if analyzed.iter().any(|a| a.report.has_violations()) {
                1
            } else {
                0
            }
        }
        Subcommand::Inject if args.diff_only => {
            for preview in pipeline::inject_preview(&analyzed, &build) {
                println!("{preview}");
            }
            0
        }
        Subcommand::Inject => match pipeline::inject(&analyzed, &build, formatter.as_ref()) {
            Ok(touched) => {
                for path in &touched {
                    println!("injected: {}", path.display());
                }
                0
            }
            Err(e) => {
                tracing::error!(%e, "inject failed");
                2
            }
        },
        Subcommand::Remove => {
            let had_violations = analyzed.iter().any(|a| a.report.has_violations());
            match pipeline::remove(&analyzed, &build, formatter.as_ref()) {
                Ok(touched) => {
                    for path in &touched {
                        println!("removed from: {}", path.display());
                    }
                    i32::from(had_violations)
                }
                Err(e) => {
                    tracing::error!(%e, "remove failed");
                    2
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_check_with_required_flags() {
        let parsed = parse_args(&args(&[
            "check",
            "--log-import-path",
            "example.com/log",
            "--interface",
            "example.com/iface",
            "widget",
        ]))
        .unwrap();
        assert_eq!(parsed.subcommand, Subcommand::Check);
        assert_eq!(parsed.log_import_path, "example.com/log");
        assert_eq!(parsed.interfaces, vec!["example.com/iface".to_string()]);
        assert_eq!(parsed.packages, vec!["widget".to_string()]);
        assert_eq!(parsed.log_alias, "log");
    }

    #[test]
    fn missing_subcommand_is_usage_error() {
        assert!(parse_args(&args(&[])).is_err());
    }

    #[test]
    fn missing_log_import_path_is_usage_error() {
        assert!(parse_args(&args(&["check", "--interface", "x", "widget"])).is_err());
    }

    #[test]
    fn missing_interface_is_usage_error() {
        assert!(parse_args(&args(&[
            "check",
            "--log-import-path",
            "example.com/log",
            "widget"
        ]))
        .is_err());
    }

    #[test]
    fn diff_only_flag_is_parsed() {
        let parsed = parse_args(&args(&[
            "inject",
            "--log-import-path",
            "example.com/log",
            "--interface",
            "example.com/iface",
            "--diff-only",
            "widget",
        ]))
        .unwrap();
        assert!(parsed.diff_only);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(parse_args(&args(&[
            "check",
            "--log-import-path",
            "x",
            "--interface",
            "y",
            "--bogus",
            "widget"
        ]))
        .is_err());
    }
}
