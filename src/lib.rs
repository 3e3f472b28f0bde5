//! cachedfetch library
//!
//! Fetches JSON from a URL through a session-scoped TTL cache, with
//! cancellation of superseded requests and an observable request state.
//! The binary wraps this in a small terminal viewer.

pub mod app;
pub mod cache;
pub mod cli;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod logging;
pub mod ui;

pub use cache::{DirStore, MemoryStore, Session, SessionStore};
pub use error::FetchError;
pub use fetcher::{CachedFetcher, FetcherConfig, RequestState};
pub use http::{FetchOptions, HttpTransport, Transport};
