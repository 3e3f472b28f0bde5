//! Session-scoped response cache
//!
//! Successful JSON responses are stored as timestamped entries under a key
//! derived from the request URL. Storage sits behind the narrow
//! [`SessionStore`] interface so it can live in memory for the lifetime of the
//! process or in a per-session directory on disk.

mod dir_store;
mod entry;
mod session;
mod store;

pub use dir_store::DirStore;
pub use entry::{cache_key, CacheEntry, Clock, ManualClock, SystemClock, DEFAULT_TTL, KEY_PREFIX};
pub use session::Session;
pub use store::{MemoryStore, SessionStore};
