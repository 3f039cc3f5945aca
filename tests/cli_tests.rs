// End-to-end tests for the conjecture binary
//
// Each test points the binary at a cache file inside its own temp
// directory and checks stdout, stderr, the exit status and the cache
// left behind.

use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

use conjecture::seen_store;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tempfile::TempDir;

fn binary() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_conjecture"));
    cmd.env_remove("CONJECTURE_SEEN_FILE").env_remove("RUST_LOG");
    cmd
}

fn cache_in(dir: &TempDir) -> PathBuf {
    dir.path().join("seen.json")
}

fn run_with_cache(cache: &Path, args: &[&str]) -> Output {
    binary()
        .arg("--persist-file")
        .arg(cache)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("Failed to launch conjecture")
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_default_run_walks_two_starts() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);

    let output = run_with_cache(&cache, &["6"]);

    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec![
            "Start=6: 6 -> 3 -> 10 -> 5 -> 16 -> 8 -> 4 -> 2 -> 1",
            "Start=7: 7 -> 22 -> 11 -> 34 -> 17 -> 52 -> 26 -> 13 -> 40 -> 20",
            "Stopped early for Start=7 because 10 was already in the seen cache",
            "Done.",
        ]
    );
}

#[test]
fn test_cache_file_is_sorted_array() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);

    let output = run_with_cache(&cache, &["8", "-r", "1"]);
    assert!(output.status.success());

    let text = std::fs::read_to_string(&cache).unwrap();
    assert_eq!(text, "[1, 2, 4, 8]");
}

#[test]
fn test_second_invocation_skips_cached_start() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);

    assert!(run_with_cache(&cache, &["6", "-r", "1"]).status.success());
    let second = run_with_cache(&cache, &["6", "-r", "1"]);

    assert!(second.status.success());
    assert_eq!(
        stdout_lines(&second),
        vec!["Skipping Start=6: already in seen cache", "Done."]
    );
}

#[test]
fn test_zero_start_is_rejected() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);

    let output = run_with_cache(&cache, &["0"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Please enter a positive integer greater than 0"));
    assert!(!cache.exists());
}

#[test]
fn test_non_numeric_start_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = run_with_cache(&cache_in(&dir), &["twelve"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid input"));
}

#[test]
fn test_zero_repeats_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = run_with_cache(&cache_in(&dir), &["5", "-r", "0"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Repeats must be >= 1"));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_prompted_start_runs_once() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);

    let mut child = binary()
        .arg("--persist-file")
        .arg(&cache)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"4\n").unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Enter the starting number: "));
    assert!(stdout.contains("Start=4: 4 -> 2 -> 1"));
    assert!(!stdout.contains("Start=5"));
}

#[test]
fn test_prompt_at_eof_is_invalid_input() {
    let dir = TempDir::new().unwrap();
    let output = binary()
        .arg("--persist-file")
        .arg(cache_in(&dir))
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid input"));
}

#[test]
fn test_counts_prints_frequency_table() {
    let dir = TempDir::new().unwrap();
    let output = run_with_cache(&cache_in(&dir), &["6", "-r", "3", "--counts"]);

    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert!(lines.contains(&"--- Number Frequencies (>= 2 occurrences) ---".to_string()));
    assert_eq!(lines.last().map(String::as_str), Some("Done."));
}

#[test]
fn test_corrupt_cache_recovers() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);
    std::fs::write(&cache, "{ not json").unwrap();

    let output = run_with_cache(&cache, &["1", "-r", "1"]);

    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec!["Start=1: 1", "Done."]);
    assert_eq!(std::fs::read_to_string(&cache).unwrap(), "[1]");
}

#[test]
fn test_range_down_to_one() {
    let dir = TempDir::new().unwrap();
    let output = run_with_cache(&cache_in(&dir), &["3", "--to", "1"]);

    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec![
            "Start=3: 3 -> 10 -> 5 -> 16 -> 8 -> 4 -> 2 -> 1",
            "Skipping Start=2: already in seen cache",
            "Skipping Start=1: already in seen cache",
            "Done.",
        ]
    );
}

#[test]
fn test_seen_file_from_environment() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);

    let output = binary()
        .env("CONJECTURE_SEEN_FILE", &cache)
        .args(["2", "-r", "1"])
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(std::fs::read_to_string(&cache).unwrap(), "[1, 2]");
}

#[test]
fn test_piped_stderr_has_no_colour_codes() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);
    std::fs::write(&cache, "[1, 2, -4]").unwrap();

    let output = run_with_cache(&cache, &["2", "-r", "1"]);

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("WARN"), "stderr: {}", stderr);
    assert!(!stderr.contains('\x1b'), "stderr: {:?}", stderr);
}

// =============================================================================
// Interruption
// =============================================================================

/// Start a long session, wait for its first run line, send SIGINT and
/// collect everything it printed.
fn interrupt_session(cache: &Path, args: &[&str]) -> (ExitStatus, Vec<String>) {
    let mut child = binary()
        .arg("--persist-file")
        .arg(cache)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to launch conjecture");

    let mut stdout = BufReader::new(child.stdout.take().unwrap());
    let mut first = String::new();
    stdout.read_line(&mut first).unwrap();
    assert!(first.starts_with("Start="), "first line: {:?}", first);

    // The first run line is printed after the handlers are installed
    kill(Pid::from_raw(child.id() as i32), Signal::SIGINT).unwrap();

    let mut rest = String::new();
    stdout.read_to_string(&mut rest).unwrap();
    let status = child.wait().unwrap();

    let lines = std::iter::once(first.trim_end().to_string())
        .chain(rest.lines().map(str::to_string))
        .collect();
    (status, lines)
}

fn assert_cache_is_canonical(cache: &Path) {
    let bytes = std::fs::read(cache).unwrap();
    let set = seen_store::decode(&bytes).expect("cache should stay parseable");
    assert!(!set.is_empty());
    assert_eq!(seen_store::encode(&set).unwrap(), bytes);
}

#[test]
fn test_interrupted_auto_run_exits_cleanly() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);

    let (status, lines) = interrupt_session(&cache, &["1", "--auto"]);

    assert_eq!(status.code(), Some(0));
    assert_eq!(
        lines.last().map(String::as_str),
        Some("Interrupted by user. Exiting.")
    );
    assert!(!lines.iter().any(|line| line == "Done."));
    assert_cache_is_canonical(&cache);
}

#[test]
fn test_interrupted_batch_exits_130_without_report() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);

    let (status, lines) = interrupt_session(&cache, &["1", "-r", "100000000", "--counts"]);

    assert_eq!(status.code(), Some(130));
    assert_eq!(
        lines.last().map(String::as_str),
        Some("Interrupted by user. Exiting.")
    );
    assert!(!lines.iter().any(|line| line == "Done."));
    assert!(!lines.iter().any(|line| line.starts_with("--- Number Frequencies")));
    assert_cache_is_canonical(&cache);
}
