//! Integration tests for concatenator
//!
//! These tests build real source directories in temporary locations and check
//! both the library API and the compiled binary against them.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

use concatenator::source::{list_source_files, sort_by_size};
use concatenator::{Concatenator, Threshold, ThresholdOrigin};

/// Helper function to create a temporary directory for testing
fn create_test_directory() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Helper function to create a file filled with `size` copies of `byte`
fn create_file(dir: &Path, name: &str, byte: u8, size: usize) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, vec![byte; size]).expect("Failed to write file");
    path
}

/// Run the compiled binary with the given arguments, isolated from any user config
fn run_binary(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_concatenator"))
        .args(args)
        .current_dir(cwd)
        .env("CONCATENATOR_LOG", "off")
        .env("XDG_CONFIG_HOME", cwd.join(".no-config"))
        .output()
        .expect("Failed to run concatenator binary")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temporary paths are valid UTF-8")
}

#[test]
fn test_scenario_threshold_100() {
    let source = create_test_directory();
    let out_dir = create_test_directory();
    let output = out_dir.path().join("result.bin");

    create_file(source.path(), "c", b'c', 30);
    create_file(source.path(), "d", b'd', 40);
    create_file(source.path(), "e", b'e', 50);
    create_file(source.path(), "a", b'a', 10);

    let report = Concatenator::new(Threshold::fixed(100))
        .with_quiet(true)
        .run(&output, source.path(), false)
        .unwrap();

    let order: Vec<_> = report
        .appended
        .iter()
        .map(|r| r.input_path.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(order, vec!["a", "c", "d", "e"]);
    assert_eq!(report.final_size, 130);

    let mut expected = vec![b'a'; 10];
    expected.extend(vec![b'c'; 30]);
    expected.extend(vec![b'd'; 40]);
    expected.extend(vec![b'e'; 50]);
    assert_eq!(fs::read(&output).unwrap(), expected);
}

#[test]
fn test_final_size_is_sum_of_appended_files() {
    let source = create_test_directory();
    let out_dir = create_test_directory();
    let output = out_dir.path().join("result.bin");

    for (i, size) in [3, 17, 1, 64, 8, 250, 33].into_iter().enumerate() {
        create_file(source.path(), &format!("f{i}"), b'0' + u8::try_from(i).unwrap(), size);
    }

    let report = Concatenator::new(Threshold::fixed(60))
        .with_quiet(true)
        .run(&output, source.path(), false)
        .unwrap();

    assert_eq!(report.appended_bytes(), report.final_size);
    assert_eq!(fs::metadata(&output).unwrap().len(), report.final_size);

    for pair in report.appended.windows(2) {
        assert!(pair[0].input_size <= pair[1].input_size);
        assert_eq!(pair[0].output_size_after, pair[1].output_size_before);
    }

    // 1 + 3 + 8 + 17 = 29, + 33 = 62 > 60
    let sizes: Vec<u64> = report.appended.iter().map(|r| r.input_size).collect();
    assert_eq!(sizes, vec![1, 3, 8, 17, 33]);
    assert!(report.threshold_exceeded);
}

#[test]
fn test_only_last_append_exceeds_threshold() {
    let source = create_test_directory();
    let out_dir = create_test_directory();
    let output = out_dir.path().join("result.bin");

    for (i, size) in [20, 20, 20, 20, 20, 20, 20].into_iter().enumerate() {
        create_file(source.path(), &format!("f{i}"), b'x', size);
    }

    let report = Concatenator::new(Threshold::fixed(50))
        .with_quiet(true)
        .run(&output, source.path(), false)
        .unwrap();

    let (last, earlier) = report.appended.split_last().unwrap();
    assert!(last.output_size_after > 50);
    assert!(earlier.iter().all(|r| r.output_size_after <= 50));
    assert_eq!(report.final_size, 60);
}

#[test]
fn test_listing_and_sorting_skip_directories() {
    let source = create_test_directory();
    create_file(source.path(), "big", b'b', 9);
    create_file(source.path(), "small", b's', 2);
    fs::create_dir(source.path().join("subdir")).unwrap();
    create_file(&source.path().join("subdir"), "tiny", b't', 1);

    let mut files = list_source_files(source.path()).unwrap();
    sort_by_size(&mut files);

    let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
    assert_eq!(
        paths,
        vec![source.path().join("small"), source.path().join("big")]
    );
}

#[test]
fn test_clear_deletes_output() {
    let source = create_test_directory();
    let out_dir = create_test_directory();
    let output = out_dir.path().join("result.bin");
    create_file(source.path(), "a", b'a', 10);

    let report = Concatenator::new(Threshold::fixed(100))
        .with_quiet(true)
        .run(&output, source.path(), true)
        .unwrap();

    assert!(report.cleared);
    assert!(!output.exists());
}

#[cfg(unix)]
#[test]
fn test_root_block_size_concatenator() {
    let source = create_test_directory();
    let out_dir = create_test_directory();
    let output = out_dir.path().join("result.bin");
    create_file(source.path(), "a", b'a', 1);

    let concatenator = Concatenator::from_root_block_size().unwrap().with_quiet(true);
    assert_eq!(
        concatenator.threshold().origin,
        ThresholdOrigin::RootBlockSize
    );

    let report = concatenator.run(&output, source.path(), false).unwrap();
    assert_eq!(report.final_size, 1);
}

#[test]
fn test_binary_prints_progress_lines() {
    let source = create_test_directory();
    let out_dir = create_test_directory();
    let output = out_dir.path().join("result.bin");
    let small = create_file(source.path(), "small", b's', 10);
    let large = create_file(source.path(), "large", b'l', 95);

    let result = run_binary(
        &[
            "--path",
            path_arg(&output),
            "--source-path",
            path_arg(source.path()),
            "--threshold",
            "100",
        ],
        out_dir.path(),
    );

    assert!(result.status.success());
    let stdout = String::from_utf8(result.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(
        lines,
        vec![
            format!(
                "Added {} 10B, {}: 0 -> 10",
                small.display(),
                output.display()
            ),
            format!(
                "Added {} 95B, {}: 10 -> 105",
                large.display(),
                output.display()
            ),
        ]
    );
    assert_eq!(fs::metadata(&output).unwrap().len(), 105);
}

#[test]
fn test_binary_clear_prints_delete_line() {
    let source = create_test_directory();
    let out_dir = create_test_directory();
    let output = out_dir.path().join("result.bin");
    create_file(source.path(), "a", b'a', 12);

    let result = run_binary(
        &[
            "-p",
            path_arg(&output),
            "-s",
            path_arg(source.path()),
            "-c",
            "--threshold",
            "100",
        ],
        out_dir.path(),
    );

    assert!(result.status.success());
    let stdout = String::from_utf8(result.stdout).unwrap();
    assert!(stdout.contains(&format!("Delete file {} of size 12...", output.display())));
    assert!(!output.exists());
}

#[test]
fn test_binary_missing_source_dir_touches_nothing() {
    let out_dir = create_test_directory();
    let output = out_dir.path().join("result.bin");
    let missing = out_dir.path().join("no-such-dir");

    let result = run_binary(
        &["-p", path_arg(&output), "-s", path_arg(&missing)],
        out_dir.path(),
    );

    assert!(result.status.success());
    assert!(!output.exists());
    assert!(!result.stdout.is_empty());
}

#[test]
fn test_binary_without_path_prints_usage() {
    let cwd = create_test_directory();

    let result = run_binary(&[], cwd.path());

    assert!(result.status.success());
    let stdout = String::from_utf8(result.stdout).unwrap();
    assert!(stdout.contains("--path"));
    assert!(fs::read_dir(cwd.path()).unwrap().next().is_none());
}

#[test]
fn test_binary_defaults_to_current_directory() {
    let cwd = create_test_directory();
    create_file(cwd.path(), "a", b'a', 4);
    create_file(cwd.path(), "b", b'b', 6);

    let result = run_binary(&["-p", "out.bin", "--threshold", "1KiB"], cwd.path());

    assert!(result.status.success());
    assert_eq!(fs::read(cwd.path().join("out.bin")).unwrap(), b"aaaabbbbbb");

    let stdout = String::from_utf8(result.stdout).unwrap();
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec![
            "Added ./out.bin 0B, out.bin: 0 -> 0",
            "Added ./a 4B, out.bin: 0 -> 4",
            "Added ./b 6B, out.bin: 4 -> 10",
        ]
    );
}

#[test]
fn test_binary_source_path_is_a_file() {
    let out_dir = create_test_directory();
    let output = out_dir.path().join("result.bin");
    let not_a_dir = create_file(out_dir.path(), "plain", b'p', 3);

    let result = run_binary(
        &["-p", path_arg(&output), "-s", path_arg(&not_a_dir)],
        out_dir.path(),
    );

    assert!(result.status.success());
    assert!(String::from_utf8(result.stdout).unwrap().contains("is not a directory"));
    assert!(!output.exists());
}

#[cfg(target_os = "linux")]
#[test]
fn test_binary_invalid_log_level_still_prints_usage() {
    let cwd = create_test_directory();
    let config_dir = cwd.path().join(".no-config").join("concatenator");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[logging]\nlevel = \"concatenator=loudest\"\n",
    )
    .unwrap();

    let result = Command::new(env!("CARGO_BIN_EXE_concatenator"))
        .current_dir(cwd.path())
        .env_remove("CONCATENATOR_LOG")
        .env("XDG_CONFIG_HOME", cwd.path().join(".no-config"))
        .output()
        .expect("Failed to run concatenator binary");

    assert!(result.status.success());
    assert!(String::from_utf8(result.stdout).unwrap().contains("--path"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_binary_json_report_with_non_utf8_file_name() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let source = create_test_directory();
    let out_dir = create_test_directory();
    let output = out_dir.path().join("result.bin");
    fs::write(source.path().join(OsStr::from_bytes(b"bad\xff")), b"abc").unwrap();

    let result = run_binary(
        &[
            "-p",
            path_arg(&output),
            "-s",
            path_arg(source.path()),
            "--threshold",
            "100",
            "--json",
        ],
        out_dir.path(),
    );

    assert!(result.status.success());
    let value: serde_json::Value = serde_json::from_slice(&result.stdout).unwrap();
    let input_path = value["appended"][0]["input_path"].as_str().unwrap();

    assert!(input_path.ends_with("bad\u{fffd}"));
    assert_eq!(value["summary"]["final_size"], 3);
}

#[test]
fn test_binary_json_report() {
    let source = create_test_directory();
    let out_dir = create_test_directory();
    let output = out_dir.path().join("result.bin");
    create_file(source.path(), "a", b'a', 30);
    create_file(source.path(), "b", b'b', 80);

    let result = run_binary(
        &[
            "-p",
            path_arg(&output),
            "-s",
            path_arg(source.path()),
            "--threshold",
            "100B",
            "--json",
        ],
        out_dir.path(),
    );

    assert!(result.status.success());
    let value: serde_json::Value = serde_json::from_slice(&result.stdout).unwrap();

    assert_eq!(value["threshold"]["bytes"], 100);
    assert_eq!(value["threshold"]["origin"], "override");
    assert_eq!(value["summary"]["files_appended"], 2);
    assert_eq!(value["summary"]["final_size"], 110);
    assert_eq!(value["summary"]["threshold_exceeded"], true);
}

#[test]
fn test_binary_invalid_threshold_fails() {
    let source = create_test_directory();
    let out_dir = create_test_directory();
    let output = out_dir.path().join("result.bin");

    let result = run_binary(
        &[
            "-p",
            path_arg(&output),
            "-s",
            path_arg(source.path()),
            "--threshold",
            "plenty",
        ],
        out_dir.path(),
    );

    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("Error:"));
    assert!(!output.exists());
}
