//! Integration tests for CLI argument handling
//!
//! Runs the binary for paths that exit before any terminal or network use.

use std::path::Path;
use std::process::Command;

use cachedfetch::cache::{cache_key, CacheEntry, KEY_PREFIX};
use cachedfetch::{DirStore, SessionStore};
use serde_json::json;
use tempfile::TempDir;

/// Nothing listens for HTTP on the loopback discard port
const UNREACHABLE_URL: &str = "http://127.0.0.1:9/todos/1";

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_cachedfetch"))
        .args(args)
        .output()
        .expect("Failed to execute cachedfetch")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cachedfetch"), "Help should mention cachedfetch");
    assert!(stdout.contains("--ttl-secs"), "Help should mention --ttl-secs");
    assert!(stdout.contains("--once"), "Help should mention --once");
}

#[test]
fn test_invalid_header_prints_error_and_exits() {
    let output = run_cli(&["--once", "-H", "missing-colon"]);
    assert!(!output.status.success(), "Expected invalid header to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid header"),
        "Should print error message about the header: {}",
        stderr
    );
}

#[test]
fn test_invalid_method_prints_error_and_exits() {
    let output = run_cli(&["--once", "-X", "NOT VALID"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid method"), "{}", stderr);
}

#[test]
fn test_once_reports_connection_failure() {
    let output = run_cli(&["--once", UNREACHABLE_URL]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "{}", stderr);
}

/// Writes a fresh entry for `url` into the session under `root`
fn seed_session(root: &Path, url: &str) {
    let entry = CacheEntry::new(json!({"id": 1}), chrono::Utc::now().timestamp_millis());
    DirStore::with_dir(root.to_path_buf())
        .set(&cache_key(KEY_PREFIX, url), &entry.encode().unwrap())
        .unwrap();
}

#[test]
fn test_once_with_cache_dir_reads_session_then_clears_it() {
    let temp_dir = TempDir::new().unwrap();
    seed_session(temp_dir.path(), UNREACHABLE_URL);
    let root = temp_dir.path().to_str().unwrap();

    let output = run_cli(&["--once", UNREACHABLE_URL, "--cache-dir", root]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("\"id\": 1"));
    assert!(
        !temp_dir.path().join("session").exists(),
        "Session directory should be removed on exit"
    );
}

#[test]
fn test_once_clears_session_after_failure() {
    let temp_dir = TempDir::new().unwrap();
    seed_session(temp_dir.path(), "http://127.0.0.1:9/other");
    let root = temp_dir.path().to_str().unwrap();

    let output = run_cli(&["--once", UNREACHABLE_URL, "--cache-dir", root]);

    assert!(!output.status.success());
    assert!(!temp_dir.path().join("session").exists());
}

#[test]
fn test_keep_session_leaves_entries_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    seed_session(temp_dir.path(), UNREACHABLE_URL);
    let root = temp_dir.path().to_str().unwrap();

    let output = run_cli(&["--once", UNREACHABLE_URL, "--keep-session", "--cache-dir", root]);

    assert!(output.status.success());
    let store = DirStore::with_dir(temp_dir.path().to_path_buf());
    assert!(store.get(&cache_key(KEY_PREFIX, UNREACHABLE_URL)).is_some());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use cachedfetch::cli::{parse_header_arg, Cli, StartupConfig, StoreChoice, DEFAULT_URL};
    use clap::Parser;
    use std::time::Duration;

    #[test]
    fn test_cli_defaults_to_todo_endpoint() {
        let cli = Cli::parse_from(["cachedfetch"]);
        assert_eq!(cli.url, DEFAULT_URL);
    }

    #[test]
    fn test_cli_repeated_headers_are_kept_in_order() {
        let cli = Cli::parse_from(["cachedfetch", "-H", "A: 1", "--header", "B: 2"]);
        assert_eq!(cli.headers, vec!["A: 1".to_string(), "B: 2".to_string()]);
    }

    #[test]
    fn test_parse_header_arg_trims() {
        let (name, value) = parse_header_arg("  Accept :  text/plain ").unwrap();
        assert_eq!(name, "Accept");
        assert_eq!(value, "text/plain");
    }

    #[test]
    fn test_startup_config_cache_dir_selects_dir_store() {
        let cli = Cli::parse_from(["cachedfetch", "--cache-dir", "cache"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(
            config.store,
            StoreChoice::Dir {
                root: "cache".into(),
                keep: false
            }
        );
    }

    #[test]
    fn test_startup_config_ttl() {
        let cli = Cli::parse_from(["cachedfetch", "--ttl-secs", "5"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.fetcher.ttl, Duration::from_secs(5));
        assert_eq!(config.fetcher.key_prefix, "useFetch:");
    }
}
