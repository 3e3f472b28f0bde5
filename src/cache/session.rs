//! Lifetime of one cache session
//!
//! A [`Session`] owns the store handed to the fetcher and decides what
//! happens to it when the process is done with it.

use std::io;
use std::sync::Arc;

use tracing::debug;

use super::{DirStore, MemoryStore, SessionStore};

/// The session store plus what to do with it on exit
pub struct Session {
    store: Arc<dyn SessionStore>,
    dir: Option<DirStore>,
    keep: bool,
}

impl Session {
    /// A session held in memory; it ends with the process
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            dir: None,
            keep: false,
        }
    }

    /// A session stored in files under `dir`.
    ///
    /// With `keep` set the entries survive [`Session::end`] and can be
    /// reused by a later run within their TTL.
    pub fn in_dir(dir: DirStore, keep: bool) -> Self {
        Self {
            store: Arc::new(dir.clone()),
            dir: Some(dir),
            keep,
        }
    }

    /// Store to hand to the fetcher
    pub fn store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.store)
    }

    /// Ends the session, removing on-disk entries unless they are kept
    pub fn end(self) -> io::Result<()> {
        match (&self.dir, self.keep) {
            (Some(dir), false) => {
                debug!(dir = %dir.dir().display(), "clearing session");
                dir.clear()
            }
            (Some(dir), true) => {
                debug!(dir = %dir.dir().display(), "keeping session");
                Ok(())
            }
            (None, _) => Ok(()),
        }
    }
}
