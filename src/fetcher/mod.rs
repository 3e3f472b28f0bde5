//! Cached JSON fetching with cancellation
//!
//! `CachedFetcher` resolves a URL to JSON, serving fresh cache entries
//! without touching the network and writing every successful response back
//! to the session store. State is published on a watch channel so a
//! presentation layer can follow every transition.
//!
//! Each mount or URL change starts a new URL epoch with its own cancellation
//! token. Starting an epoch cancels the previous one, and results belonging to
//! a superseded epoch are discarded when they settle.

mod state;

pub use state::{DataSource, Phase, RequestState, Transition};

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{cache_key, CacheEntry, Clock, SessionStore, SystemClock, DEFAULT_TTL, KEY_PREFIX};
use crate::error::FetchError;
use crate::http::{FetchOptions, Transport};

/// Tunables for a fetcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// How long a cached response stays fresh
    pub ttl: Duration,
    /// Prefix of every cache key
    pub key_prefix: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            key_prefix: KEY_PREFIX.to_string(),
        }
    }
}

/// The URL currently being resolved and the token of its requests
#[derive(Debug)]
struct Epoch {
    id: u64,
    url: String,
    /// `None` while unmounted
    token: Option<CancellationToken>,
}

/// What a single resolution needs to know about the epoch it belongs to
#[derive(Debug, Clone)]
struct Ticket {
    id: u64,
    url: String,
    token: CancellationToken,
}

/// Resolves one URL at a time to JSON through a session cache
pub struct CachedFetcher {
    options: FetchOptions,
    config: FetcherConfig,
    store: Arc<dyn SessionStore>,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    epoch: Mutex<Epoch>,
    state: watch::Sender<RequestState>,
}

impl CachedFetcher {
    /// Creates an unmounted fetcher for `url`
    pub fn new(
        url: impl Into<String>,
        options: FetchOptions,
        store: Arc<dyn SessionStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let (state, _) = watch::channel(RequestState::initial());
        Self {
            options,
            config: FetcherConfig::default(),
            store,
            transport,
            clock: Arc::new(SystemClock),
            epoch: Mutex::new(Epoch {
                id: 0,
                url: url.into(),
                token: None,
            }),
            state,
        }
    }

    /// Replaces the TTL and key prefix
    pub fn with_config(mut self, config: FetcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the time source used for TTL checks and entry timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Snapshot of the current state
    pub fn state(&self) -> RequestState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state.subscribe()
    }

    /// The URL of the current epoch
    pub fn url(&self) -> String {
        self.lock_epoch().url.clone()
    }

    /// Whether the fetcher has been mounted and not yet unmounted
    pub fn is_mounted(&self) -> bool {
        self.lock_epoch().token.is_some()
    }

    /// Starts resolving the current URL through the cache
    pub async fn mount(&self) {
        let ticket = self.begin_epoch(None);
        self.resolve(false, ticket).await;
    }

    /// Switches to a new URL, cancelling anything still in flight for the old one.
    ///
    /// Setting the URL the fetcher is already mounted on does nothing.
    pub async fn set_url(&self, url: impl Into<String>) {
        let url = url.into();
        {
            let epoch = self.lock_epoch();
            if epoch.token.is_some() && epoch.url == url {
                return;
            }
        }
        let ticket = self.begin_epoch(Some(url));
        self.resolve(false, ticket).await;
    }

    /// Resolves the current URL again, skipping the cache.
    ///
    /// A request already in flight is not cancelled; whichever settles last
    /// determines the state. Does nothing while unmounted.
    pub async fn refetch(&self) {
        let ticket = {
            let epoch = self.lock_epoch();
            let Some(token) = epoch.token.as_ref() else {
                debug!(url = %epoch.url, "refetch ignored while unmounted");
                return;
            };
            let ticket = Ticket {
                id: epoch.id,
                url: epoch.url.clone(),
                token: token.clone(),
            };
            self.state
                .send_modify(|state| state.apply(Transition::RefetchRequested));
            ticket
        };
        self.resolve(true, ticket).await;
    }

    /// Cancels anything in flight and stops accepting results
    pub fn unmount(&self) {
        let mut epoch = self.lock_epoch();
        if let Some(token) = epoch.token.take() {
            debug!(url = %epoch.url, "unmounting, cancelling outstanding requests");
            token.cancel();
        }
    }

    fn lock_epoch(&self) -> MutexGuard<'_, Epoch> {
        // Epoch updates never leave the struct half-written
        self.epoch.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Cancels the previous epoch, starts a new one and marks the state as loading
    fn begin_epoch(&self, url: Option<String>) -> Ticket {
        let mut epoch = self.lock_epoch();
        if let Some(previous) = epoch.token.take() {
            previous.cancel();
        }
        if let Some(url) = url {
            epoch.url = url;
        }
        epoch.id += 1;

        let token = CancellationToken::new();
        epoch.token = Some(token.clone());
        self.state
            .send_modify(|state| state.apply(Transition::UrlChanged));

        Ticket {
            id: epoch.id,
            url: epoch.url.clone(),
            token,
        }
    }

    async fn resolve(&self, bypass_cache: bool, ticket: Ticket) {
        let transition = self.outcome(bypass_cache, &ticket).await;
        self.settle(&ticket, transition);
    }

    async fn outcome(&self, bypass_cache: bool, ticket: &Ticket) -> Transition {
        let key = cache_key(&self.config.key_prefix, &ticket.url);

        if !bypass_cache {
            if let Some(entry) = self.read_fresh(&key) {
                debug!(url = %ticket.url, "cache hit");
                return Transition::CacheHit(entry.data);
            }
        }

        info!(url = %ticket.url, bypass_cache, "fetching from network");
        match self.fetch_network(&ticket.url, &key, ticket.token.child_token()).await {
            Ok(value) => Transition::NetworkSettled(Ok(value)),
            Err(err) if err.is_cancelled() => {
                debug!(url = %ticket.url, "request cancelled");
                Transition::Cancelled
            }
            Err(err) => {
                warn!(url = %ticket.url, error = %err, "fetch failed");
                Transition::NetworkSettled(Err(err.to_string()))
            }
        }
    }

    async fn fetch_network(
        &self,
        url: &str,
        key: &str,
        cancel: CancellationToken,
    ) -> Result<Value, FetchError> {
        let response = self.transport.send(url, &self.options, cancel).await?;
        if !response.is_ok() {
            return Err(FetchError::HttpError {
                status: response.status,
            });
        }

        let value: Value = serde_json::from_str(&response.body)?;
        self.write_entry(key, CacheEntry::new(value.clone(), self.clock.now_millis()));
        Ok(value)
    }

    /// Returns the cached entry for `key` if it exists and is fresh.
    ///
    /// Corrupt entries are treated as missing.
    fn read_fresh(&self, key: &str) -> Option<CacheEntry> {
        let raw = self.store.get(key)?;
        match CacheEntry::decode(&raw) {
            Ok(entry) if entry.is_fresh(self.clock.now_millis(), self.config.ttl) => Some(entry),
            Ok(entry) => {
                debug!(key, timestamp = entry.timestamp, "ignoring stale cache entry");
                None
            }
            Err(err) => {
                warn!(key, error = %err, "ignoring corrupt cache entry");
                None
            }
        }
    }

    /// Stores an entry; failures are logged since the data itself was fetched fine
    fn write_entry(&self, key: &str, entry: CacheEntry) {
        let result = entry
            .encode()
            .map_err(FetchError::from)
            .and_then(|encoded| self.store.set(key, &encoded).map_err(FetchError::from));
        if let Err(err) = result {
            warn!(key, error = %err, "failed to write cache entry");
        }
    }

    /// Applies the outcome unless its epoch has been superseded
    fn settle(&self, ticket: &Ticket, transition: Transition) {
        let epoch = self.lock_epoch();
        if epoch.id != ticket.id {
            debug!(url = %ticket.url, "discarding result of superseded request");
            return;
        }
        self.state.send_modify(|state| state.apply(transition));
    }
}

impl Drop for CachedFetcher {
    fn drop(&mut self) {
        self.unmount();
    }
}
