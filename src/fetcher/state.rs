//! Request state and its transitions
//!
//! `RequestState` is what the presentation layer sees. It only changes
//! through [`RequestState::apply`], which makes the fetch lifecycle an
//! explicit state machine over [`Phase`].

use serde_json::Value;

/// Where a resolution currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Not started, or last resolution was cancelled
    #[default]
    Idle,
    /// A resolution is running
    Loading,
    /// Data was resolved from cache or network
    Success,
    /// The last resolution failed
    Failure,
}

/// Where the current data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Cache,
    Network,
}

/// Events that drive [`RequestState`]
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Mounted, or the URL changed
    UrlChanged,
    /// `refetch` was called
    RefetchRequested,
    /// A fresh cache entry satisfied the resolution
    CacheHit(Value),
    /// The network request finished with parsed data or an error message
    NetworkSettled(Result<Value, String>),
    /// The request was aborted; nothing is surfaced
    Cancelled,
}

/// Data, loading flag and error message exposed to the presentation layer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestState {
    /// Last successfully resolved value
    pub data: Option<Value>,
    /// Whether a resolution is in progress
    pub loading: bool,
    /// Message of the last failure
    pub error: Option<String>,
    /// Lifecycle position of the current resolution
    pub phase: Phase,
    /// Origin of `data`
    pub source: Option<DataSource>,
}

impl RequestState {
    /// State of a fetcher that has been created but has not settled yet.
    ///
    /// Starts out loading so nothing is shown as data before the first
    /// resolution completes.
    pub fn initial() -> Self {
        Self {
            loading: true,
            phase: Phase::Loading,
            ..Self::default()
        }
    }

    /// Applies a transition in place.
    ///
    /// Failures keep the previous `data`. Every settling transition clears
    /// `loading`.
    pub fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::UrlChanged | Transition::RefetchRequested => {
                self.loading = true;
                self.error = None;
                self.phase = Phase::Loading;
            }
            Transition::CacheHit(value) => {
                self.data = Some(value);
                self.source = Some(DataSource::Cache);
                self.loading = false;
                self.phase = Phase::Success;
            }
            Transition::NetworkSettled(Ok(value)) => {
                self.data = Some(value);
                self.source = Some(DataSource::Network);
                self.loading = false;
                self.phase = Phase::Success;
            }
            Transition::NetworkSettled(Err(message)) => {
                self.error = Some(message);
                self.loading = false;
                self.phase = Phase::Failure;
            }
            Transition::Cancelled => {
                self.loading = false;
                self.phase = Phase::Idle;
            }
        }
    }

    /// Whether data is present and no error is set
    pub fn is_ready(&self) -> bool {
        !self.loading && self.error.is_none() && self.data.is_some()
    }
}
