//! Integration tests for ysh
//!
//! This test harness:
//! 1. Discovers all .ysh test scripts
//! 2. Runs each script through a fresh shell
//! 3. Compares output with the expected .out file (and .err when present)
//! 4. Reports differences

use std::fs;
use std::path::{Path, PathBuf};

use ysh::Shell;

/// Discover all .ysh test scripts
fn discover_test_scripts() -> Vec<PathBuf> {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let scripts_dir = manifest_dir.join("tests/scripts");

    let mut scripts = Vec::new();
    if let Ok(entries) = fs::read_dir(&scripts_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "ysh") {
                scripts.push(path);
            }
        }
    }

    scripts.sort();
    scripts
}

/// Run a single test script and compare output
fn run_test_script(script_path: &Path) -> Result<TestResult, Box<dyn std::error::Error>> {
    let expected_path = script_path.with_extension("out");
    if !expected_path.exists() {
        return Ok(TestResult::Skipped {
            reason: format!("Missing expected output file: {expected_path:?}"),
        });
    }
    let expected = fs::read_to_string(&expected_path)?;

    let expected_err_path = script_path.with_extension("err");
    let expected_err = if expected_err_path.exists() {
        Some(fs::read_to_string(&expected_err_path)?)
    } else {
        None
    };

    let script = fs::read_to_string(script_path)?;
    let mut shell = Shell::default();
    let mut out = Vec::new();
    let mut err = Vec::new();
    let status = shell.run(script.as_bytes(), &mut out, &mut err)?;

    let actual = String::from_utf8(out)?;
    let stderr = String::from_utf8(err)?;

    let err_ok = expected_err.as_ref().map_or(true, |e| *e == stderr);
    if expected == actual && err_ok {
        Ok(TestResult::Passed)
    } else {
        Ok(TestResult::Failed {
            expected,
            actual,
            stderr,
            status,
        })
    }
}

#[derive(Debug)]
enum TestResult {
    Passed,
    Failed {
        expected: String,
        actual: String,
        stderr: String,
        status: i32,
    },
    Skipped {
        reason: String,
    },
}

#[test]
fn integration_tests() {
    let scripts = discover_test_scripts();
    assert!(!scripts.is_empty(), "no test scripts found in tests/scripts/");

    let mut passed = 0;
    let mut failed = 0;
    let mut skipped = 0;

    for script in &scripts {
        let name = script
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        print!("Running {name}... ");

        match run_test_script(script) {
            Ok(TestResult::Passed) => {
                println!("PASSED");
                passed += 1;
            }
            Ok(TestResult::Failed {
                expected,
                actual,
                stderr,
                status,
            }) => {
                println!("FAILED");
                println!("  Status: {status}");
                println!("  Expected:\n{}", indent(&expected, "    "));
                println!("  Actual:\n{}", indent(&actual, "    "));
                if !stderr.is_empty() {
                    println!("  Stderr:\n{}", indent(&stderr, "    "));
                }
                failed += 1;
            }
            Ok(TestResult::Skipped { reason }) => {
                println!("SKIPPED: {reason}");
                skipped += 1;
            }
            Err(e) => {
                println!("ERROR: {e}");
                failed += 1;
            }
        }
    }

    println!();
    println!("Results: {passed} passed, {failed} failed, {skipped} skipped");

    assert_eq!(failed, 0, "{failed} tests failed");
}

#[test]
fn exit_status_is_last_line_status() {
    let mut shell = Shell::default();
    let mut out = Vec::new();
    let mut err = Vec::new();
    let status = shell
        .run("(1)\nexit 3\n(2)\n".as_bytes(), &mut out, &mut err)
        .unwrap();
    assert_eq!(status, 3);
    assert_eq!(String::from_utf8(out).unwrap(), "1\n");
    assert!(!shell.is_running());
}

#[test]
fn error_value_sets_failure_status() {
    let mut shell = Shell::default();
    let mut out = Vec::new();
    let mut err = Vec::new();
    let status = shell.run("(5 / 0)\n".as_bytes(), &mut out, &mut err).unwrap();
    assert_eq!(status, 1);
    assert_eq!(String::from_utf8(out).unwrap(), "Division by zero.\n");
}

fn indent(s: &str, prefix: &str) -> String {
    s.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
