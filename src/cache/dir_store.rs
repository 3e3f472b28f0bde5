//! Directory-backed session store
//!
//! Provides a `DirStore` that keeps one file per key inside a `session/`
//! directory under a root. The session ends when that directory is cleared.

use directories::ProjectDirs;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::SessionStore;

/// Longest escaped key used verbatim as a file name.
/// Leaves room for the `.json`/`.tmp` suffix under the usual 255-byte limit.
const MAX_ESCAPED_LEN: usize = 200;

/// Escaped characters kept in front of the digest for long keys
const DIGEST_PREFIX_LEN: usize = 64;

/// Stores session entries as files in a directory
///
/// The default root is `~/.cache/cachedfetch/` on Linux (or the equivalent
/// XDG path elsewhere), giving a session directory of
/// `~/.cache/cachedfetch/session/`. Keys are escaped into file names so that
/// distinct keys never share a file.
#[derive(Debug, Clone)]
pub struct DirStore {
    /// Directory holding this session's entries
    session_dir: PathBuf,
}

impl DirStore {
    /// The XDG-compliant cache directory used as the default root
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn default_root() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "cachedfetch")?;
        Some(project_dirs.cache_dir().to_path_buf())
    }

    /// Creates a DirStore whose session lives in `root/session`
    ///
    /// Only the `session` subdirectory is ever written or removed.
    pub fn with_dir(root: PathBuf) -> Self {
        Self {
            session_dir: root.join("session"),
        }
    }

    /// The directory this session writes to
    pub fn dir(&self) -> &Path {
        &self.session_dir
    }

    /// Returns the path to the file backing `key`
    fn entry_path(&self, key: &str) -> PathBuf {
        self.session_dir.join(format!("{}.json", file_stem(key)))
    }

    /// Ends the session by deleting every stored entry
    pub fn clear(&self) -> io::Result<()> {
        if self.session_dir.exists() {
            fs::remove_dir_all(&self.session_dir)?;
        }
        Ok(())
    }
}

impl SessionStore for DirStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.entry_path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.session_dir)?;

        // Write via temp file so readers never see a partial entry
        let path = self.entry_path(key);
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, value)?;
        fs::rename(&temp_path, &path)
    }
}

/// File name (without extension) for a key.
///
/// Short keys are escaped verbatim. Long keys keep a readable escaped prefix
/// followed by `~` and the SHA-256 of the whole key; `~` never appears in an
/// escaped key, so the two forms cannot collide.
fn file_stem(key: &str) -> String {
    let escaped = escape_key(key);
    if escaped.len() <= MAX_ESCAPED_LEN {
        return escaped;
    }

    let digest = hex::encode(Sha256::digest(key.as_bytes()));
    format!("{}~{}", &escaped[..DIGEST_PREFIX_LEN], digest)
}

/// Escapes a key into a file name.
/// Alphanumerics, `-`, `_` and `.` are kept; every other byte becomes `%XX`.
fn escape_key(key: &str) -> String {
    let mut escaped = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' => {
                escaped.push(byte as char)
            }
            _ => escaped.push_str(&format!("%{:02X}", byte)),
        }
    }
    escaped
}
