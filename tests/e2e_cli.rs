//! End-to-end CLI tests: drives the `logcop` binary as a subprocess
//! against on-disk fixture packages, mirroring scenarios S1-S6.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn logcop() -> Command {
    cargo_bin_cmd!("logcop")
}

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

fn base_args<'a>() -> Vec<&'a str> {
    vec!["--log-import-path", "example.com/log", "--interface", "iface"]
}

mod s1_simple_missing_log {
    use super::*;

    #[test]
    fn check_reports_violation_and_inject_adds_construct() {
        let tmp = TempDir::new().unwrap();
        let iface = tmp.path().join("iface");
        let impl_pkg = tmp.path().join("impl");
        std::fs::create_dir_all(&iface).unwrap();
        std::fs::create_dir_all(&impl_pkg).unwrap();

        write(&iface, "iface.go", "package iface\n\ntype I interface {\n\tM()\n}\n");
        write(
            &impl_pkg,
            "impl.go",
            "package impl\n\ntype A struct{}\n\nfunc (a A) M() {}\n",
        );

        let mut args = base_args();
        args.insert(0, "check");
        args.push("impl");
        logcop()
            .current_dir(tmp.path())
            .args(&args)
            .assert()
            .failure()
            .code(1)
            .stdout(predicate::str::contains("A.M"));

        let mut inject_args = base_args();
        inject_args.insert(0, "inject");
        inject_args.push("--no-gofmt");
        inject_args.push("impl");
        logcop()
            .current_dir(tmp.path())
            .args(&inject_args)
            .assert()
            .success();

        let rewritten = std::fs::read_to_string(impl_pkg.join("impl.go")).unwrap();
        assert!(rewritten.contains("defer log.Call()(); "));
        assert!(rewritten.contains("example.com/log"));

        let mut recheck = base_args();
        recheck.insert(0, "check");
        recheck.push("impl");
        logcop()
            .current_dir(tmp.path())
            .args(&recheck)
            .assert()
            .success();
    }
}

mod s2_already_correct {
    use super::*;

    #[test]
    fn inject_leaves_compliant_method_byte_identical() {
        let tmp = TempDir::new().unwrap();
        let iface = tmp.path().join("iface");
        let impl_pkg = tmp.path().join("impl");
        std::fs::create_dir_all(&iface).unwrap();
        std::fs::create_dir_all(&impl_pkg).unwrap();

        write(&iface, "iface.go", "package iface\n\ntype I interface {\n\tM()\n}\n");
        let source = "package impl\n\nimport log \"example.com/log\"\n\ntype A struct{}\n\nfunc (a A) M() {\n\tdefer log.Call()()\n}\n";
        write(&impl_pkg, "impl.go", source);

        let mut args = base_args();
        args.insert(0, "inject");
        args.push("--no-gofmt");
        args.push("impl");
        logcop().current_dir(tmp.path()).args(&args).assert().success();

        let after = std::fs::read_to_string(impl_pkg.join("impl.go")).unwrap();
        assert_eq!(source, after);
    }
}

mod s3_return_values_by_value {
    use super::*;

    #[test]
    fn check_flags_invalid_and_inject_does_not_rewrite() {
        let tmp = TempDir::new().unwrap();
        let iface = tmp.path().join("iface");
        let impl_pkg = tmp.path().join("impl");
        std::fs::create_dir_all(&iface).unwrap();
        std::fs::create_dir_all(&impl_pkg).unwrap();

        write(&iface, "iface.go", "package iface\n\ntype I interface {\n\tF(a int) (b int)\n}\n");
        let source = "package impl\n\nimport log \"example.com/log\"\n\ntype T struct{}\n\nfunc (t T) F(a int) (b int) {\n\tdefer log.Call(a)(b)\n\treturn 42\n}\n";
        write(&impl_pkg, "impl.go", source);

        let mut check_args = base_args();
        check_args.insert(0, "check");
        check_args.push("impl");
        logcop()
            .current_dir(tmp.path())
            .args(&check_args)
            .assert()
            .failure()
            .code(1)
            .stdout(predicate::str::contains("output arguments should be passed by address"));

        let mut inject_args = base_args();
        inject_args.insert(0, "inject");
        inject_args.push("--no-gofmt");
        inject_args.push("impl");
        logcop().current_dir(tmp.path()).args(&inject_args).assert().success();

        let after = std::fs::read_to_string(impl_pkg.join("impl.go")).unwrap();
        assert_eq!(source, after);
    }
}

mod s4_callf_missing_format {
    use super::*;

    #[test]
    fn check_flags_invalid() {
        let tmp = TempDir::new().unwrap();
        let iface = tmp.path().join("iface");
        let impl_pkg = tmp.path().join("impl");
        std::fs::create_dir_all(&iface).unwrap();
        std::fs::create_dir_all(&impl_pkg).unwrap();

        write(&iface, "iface.go", "package iface\n\ntype I interface {\n\tF(b int)\n}\n");
        let source = "package impl\n\nimport log \"example.com/log\"\n\ntype T struct{}\n\nfunc (t T) F(b int) {\n\tdefer log.Callf()(&b)\n}\n";
        write(&impl_pkg, "impl.go", source);

        let mut args = base_args();
        args.insert(0, "check");
        args.push("impl");
        logcop()
            .current_dir(tmp.path())
            .args(&args)
            .assert()
            .failure()
            .code(1)
            .stdout(predicate::str::contains("no format specifier specified"));
    }
}

mod s5_suppression_comment {
    use super::*;

    #[test]
    fn check_reports_no_violation_and_inject_leaves_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let iface = tmp.path().join("iface");
        let impl_pkg = tmp.path().join("impl");
        std::fs::create_dir_all(&iface).unwrap();
        std::fs::create_dir_all(&impl_pkg).unwrap();

        write(&iface, "iface.go", "package iface\n\ntype I interface {\n\tM()\n}\n");
        let source = "package impl\n\ntype A struct{}\n\nfunc (a A) M() {\n\t// nologcall\n\tfmt.Println(\"x\")\n}\n";
        write(&impl_pkg, "impl.go", source);

        let mut args = base_args();
        args.insert(0, "check");
        args.push("impl");
        logcop().current_dir(tmp.path()).args(&args).assert().success();

        let mut inject_args = base_args();
        inject_args.insert(0, "inject");
        inject_args.push("--no-gofmt");
        inject_args.push("impl");
        logcop().current_dir(tmp.path()).args(&inject_args).assert().success();

        let after = std::fs::read_to_string(impl_pkg.join("impl.go")).unwrap();
        assert_eq!(source, after);
    }
}

mod s6_embedded_promotion {
    use super::*;

    #[test]
    fn obligation_lands_on_parent_declaration() {
        let tmp = TempDir::new().unwrap();
        let iface = tmp.path().join("iface");
        let impl_pkg = tmp.path().join("impl");
        std::fs::create_dir_all(&iface).unwrap();
        std::fs::create_dir_all(&impl_pkg).unwrap();

        write(&iface, "iface.go", "package iface\n\ntype I interface {\n\tM()\n}\n");
        write(
            &impl_pkg,
            "impl.go",
            "package impl\n\ntype Parent struct{}\n\nfunc (p Parent) M() {}\n\ntype Child struct {\n\tParent\n}\n",
        );

        let mut args = base_args();
        args.insert(0, "check");
        args.push("impl");
        logcop()
            .current_dir(tmp.path())
            .args(&args)
            .assert()
            .failure()
            .code(1)
            .stdout(predicate::str::contains("Parent.M"))
            .stdout(predicate::str::contains("Child.M").not());
    }
}

mod json_output {
    use super::*;

    #[test]
    fn check_with_json_flag_emits_an_array() {
        let tmp = TempDir::new().unwrap();
        let iface = tmp.path().join("iface");
        let impl_pkg = tmp.path().join("impl");
        std::fs::create_dir_all(&iface).unwrap();
        std::fs::create_dir_all(&impl_pkg).unwrap();

        write(&iface, "iface.go", "package iface\n\ntype I interface {\n\tM()\n}\n");
        write(
            &impl_pkg,
            "impl.go",
            "package impl\n\ntype A struct{}\n\nfunc (a A) M() {}\n",
        );

        let mut args = base_args();
        args.insert(0, "check");
        args.push("--json");
        args.push("impl");
        logcop()
            .current_dir(tmp.path())
            .args(&args)
            .assert()
            .failure()
            .code(1)
            .stdout(predicate::str::contains("\"type_name\": \"A\""));
    }
}

mod diff_only {
    use super::*;

    #[test]
    fn inject_diff_only_previews_without_writing() {
        let tmp = TempDir::new().unwrap();
        let iface = tmp.path().join("iface");
        let impl_pkg = tmp.path().join("impl");
        std::fs::create_dir_all(&iface).unwrap();
        std::fs::create_dir_all(&impl_pkg).unwrap();

        write(&iface, "iface.go", "package iface\n\ntype I interface {\n\tM()\n}\n");
        let source = "package impl\n\ntype A struct{}\n\nfunc (a A) M() {}\n";
        write(&impl_pkg, "impl.go", source);

        let mut args = base_args();
        args.insert(0, "inject");
        args.push("--diff-only");
        args.push("impl");
        logcop()
            .current_dir(tmp.path())
            .args(&args)
            .assert()
            .success()
            .stdout(predicate::str::contains("+defer log.Call()();"));

        let after = std::fs::read_to_string(impl_pkg.join("impl.go")).unwrap();
        assert_eq!(source, after);
    }
}

mod usage_errors {
    use super::*;

    #[test]
    fn missing_log_import_path_exits_two() {
        let tmp = TempDir::new().unwrap();
        logcop()
            .current_dir(tmp.path())
            .args(["check", "--interface", "iface", "impl"])
            .assert()
            .failure()
            .code(2);
    }
}
