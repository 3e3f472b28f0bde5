//! Command-line interface parsing for cachedfetch
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! the request options, fetcher settings and store choice used at startup.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::cache::DirStore;
use crate::fetcher::FetcherConfig;
use crate::http::{parse_method, FetchOptions};

/// URL fetched when none is given
pub const DEFAULT_URL: &str = "https://jsonplaceholder.typicode.com/todos/1";

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// A header argument was not of the form `Name: value`
    #[error("Invalid header: '{0}'. Expected 'Name: value'")]
    InvalidHeader(String),

    /// The method is not a valid HTTP method token
    #[error("Invalid method: '{0}'")]
    InvalidMethod(String),

    /// A TTL of zero would make every entry stale on write
    #[error("TTL must be at least one second")]
    ZeroTtl,

    /// `--cache-dir` was given without a directory and there is no home directory
    #[error("Could not determine a cache directory; pass one to --cache-dir")]
    NoCacheDir,
}

/// cachedfetch - fetch JSON through a session cache and show the result
#[derive(Parser, Debug)]
#[command(name = "cachedfetch")]
#[command(about = "Fetch JSON through a session cache and show the result")]
#[command(version)]
pub struct Cli {
    /// URL to fetch
    #[arg(default_value = DEFAULT_URL)]
    pub url: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Request header, repeatable
    ///
    /// Example: -H 'Accept: application/json'
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// Request body
    #[arg(short = 'd', long)]
    pub data: Option<String>,

    /// Seconds a cached response stays fresh
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    pub ttl_secs: u64,

    /// Keep the session cache on disk instead of in memory
    ///
    /// Entries go to DIR/session, or to the user cache directory when no DIR
    /// is given. The session directory is removed on exit.
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<Option<PathBuf>>,

    /// Leave the on-disk session in place on exit so a later run can reuse it
    #[arg(long, requires = "cache_dir")]
    pub keep_session: bool,

    /// Resolve once, print the result and exit instead of opening the viewer
    #[arg(long)]
    pub once: bool,

    /// Write logs to this file (viewer mode logs to the cache directory by default)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Where the session cache lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChoice {
    /// In memory, for the lifetime of the process
    Memory,
    /// In files under `root/session`
    Dir {
        root: PathBuf,
        /// Leave the entries on disk when the session ends
        keep: bool,
    },
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub url: String,
    pub options: FetchOptions,
    pub fetcher: FetcherConfig,
    pub store: StoreChoice,
    /// Print once instead of running the viewer
    pub once: bool,
    pub log_file: Option<PathBuf>,
}

/// Parses a `Name: value` header argument.
///
/// Whitespace around the name and value is trimmed; the value may be empty.
pub fn parse_header_arg(s: &str) -> Result<(String, String), CliError> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| CliError::InvalidHeader(s.to_string()))?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(CliError::InvalidHeader(s.to_string()));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if a header, method or TTL is invalid, or no
    ///   default cache directory exists for a bare `--cache-dir`
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let method =
            parse_method(&cli.method).map_err(|_| CliError::InvalidMethod(cli.method.clone()))?;

        let mut options = FetchOptions::new().with_method(method);
        for header in &cli.headers {
            let (name, value) = parse_header_arg(header)?;
            options = options.with_header(name, value);
        }
        if let Some(body) = &cli.data {
            options = options.with_body(body.clone());
        }

        if cli.ttl_secs == 0 {
            return Err(CliError::ZeroTtl);
        }

        Ok(StartupConfig {
            url: cli.url.clone(),
            options,
            fetcher: FetcherConfig {
                ttl: Duration::from_secs(cli.ttl_secs),
                ..FetcherConfig::default()
            },
            store: match &cli.cache_dir {
                Some(Some(root)) => StoreChoice::Dir {
                    root: root.clone(),
                    keep: cli.keep_session,
                },
                Some(None) => StoreChoice::Dir {
                    root: DirStore::default_root().ok_or(CliError::NoCacheDir)?,
                    keep: cli.keep_session,
                },
                None => StoreChoice::Memory,
            },
            once: cli.once,
            log_file: cli.log_file.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    #[test]
    fn test_parse_header_arg() {
        assert_eq!(
            parse_header_arg("Accept: application/json").unwrap(),
            ("Accept".to_string(), "application/json".to_string())
        );
        assert_eq!(
            parse_header_arg("X-Empty:").unwrap(),
            ("X-Empty".to_string(), String::new())
        );
    }

    #[test]
    fn test_parse_header_arg_keeps_colons_in_value() {
        let (name, value) = parse_header_arg("Referer: https://example.com/a").unwrap();
        assert_eq!(name, "Referer");
        assert_eq!(value, "https://example.com/a");
    }

    #[test]
    fn test_parse_header_arg_invalid() {
        for bad in ["no-colon", ": value", "Bad Name: x"] {
            let err = parse_header_arg(bad).unwrap_err();
            assert!(err.to_string().contains("Invalid header"), "{}", bad);
        }
    }

    #[test]
    fn test_cli_parse_no_args_uses_defaults() {
        let cli = Cli::parse_from(["cachedfetch"]);
        assert_eq!(cli.url, DEFAULT_URL);
        assert_eq!(cli.method, "GET");
        assert_eq!(cli.ttl_secs, 300);
        assert!(cli.headers.is_empty());
        assert!(!cli.once);
    }

    #[test]
    fn test_startup_config_defaults() {
        let cli = Cli::parse_from(["cachedfetch"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.url, DEFAULT_URL);
        assert_eq!(config.options, FetchOptions::default());
        assert_eq!(config.fetcher, FetcherConfig::default());
        assert_eq!(config.store, StoreChoice::Memory);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_startup_config_with_request_options() {
        let cli = Cli::parse_from([
            "cachedfetch",
            "https://example.com/api",
            "-X",
            "post",
            "-H",
            "Content-Type: application/json",
            "-H",
            "X-Trace: 1",
            "-d",
            "{\"a\":1}",
            "--ttl-secs",
            "60",
            "--cache-dir",
            "/tmp/cf",
            "--once",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert_eq!(config.url, "https://example.com/api");
        assert_eq!(config.options.method, Method::POST);
        assert_eq!(config.options.headers.len(), 2);
        assert_eq!(config.options.headers[1], ("X-Trace".to_string(), "1".to_string()));
        assert_eq!(config.options.body.as_deref(), Some("{\"a\":1}"));
        assert_eq!(config.fetcher.ttl, Duration::from_secs(60));
        assert_eq!(
            config.store,
            StoreChoice::Dir {
                root: PathBuf::from("/tmp/cf"),
                keep: false
            }
        );
        assert!(config.once);
    }

    #[test]
    fn test_bare_cache_dir_uses_user_cache_directory() {
        let cli = Cli::parse_from(["cachedfetch", "--cache-dir", "--keep-session"]);
        assert_eq!(cli.cache_dir, Some(None));

        match (StartupConfig::from_cli(&cli), DirStore::default_root()) {
            (Ok(config), Some(root)) => {
                assert_eq!(config.store, StoreChoice::Dir { root, keep: true });
            }
            (Err(err), None) => assert!(matches!(err, CliError::NoCacheDir)),
            (result, root) => panic!("unexpected {:?} for root {:?}", result, root),
        }
    }

    #[test]
    fn test_keep_session_requires_cache_dir() {
        assert!(Cli::try_parse_from(["cachedfetch", "--keep-session"]).is_err());
    }

    #[test]
    fn test_startup_config_invalid_method() {
        let cli = Cli::parse_from(["cachedfetch", "-X", "NOT VALID"]);
        let err = StartupConfig::from_cli(&cli).unwrap_err();
        assert!(matches!(err, CliError::InvalidMethod(_)));
    }

    #[test]
    fn test_startup_config_zero_ttl() {
        let cli = Cli::parse_from(["cachedfetch", "--ttl-secs", "0"]);
        assert!(matches!(
            StartupConfig::from_cli(&cli),
            Err(CliError::ZeroTtl)
        ));
    }
}
