//! Application state for the cachedfetch viewer
//!
//! This module holds the viewer's state, handles keyboard input and drives the
//! fetcher: mounting it on start, issuing refetches on request and unmounting
//! it on quit.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use serde_json::Value;

use crate::fetcher::{CachedFetcher, RequestState};

/// Main application struct for the viewer
pub struct App {
    /// Fetcher shared with spawned resolution tasks
    fetcher: Arc<CachedFetcher>,
    /// Last state snapshot taken from the fetcher
    pub state: RequestState,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag indicating a refetch has been requested
    pub refetch_requested: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Scroll offset for the data view
    pub scroll_offset: u16,
}

impl App {
    pub fn new(fetcher: Arc<CachedFetcher>) -> Self {
        let state = fetcher.state();
        Self {
            fetcher,
            state,
            should_quit: false,
            refetch_requested: false,
            show_help: false,
            scroll_offset: 0,
        }
    }

    pub fn fetcher(&self) -> &Arc<CachedFetcher> {
        &self.fetcher
    }

    pub fn url(&self) -> String {
        self.fetcher.url()
    }

    /// Starts the initial resolution in the background
    pub fn mount(&self) {
        let fetcher = self.fetcher.clone();
        tokio::spawn(async move { fetcher.mount().await });
    }

    /// Issues a refetch if one was requested since the last call
    pub fn process_refetch(&mut self) {
        if !std::mem::take(&mut self.refetch_requested) {
            return;
        }
        let fetcher = self.fetcher.clone();
        tokio::spawn(async move { fetcher.refetch().await });
    }

    /// Pulls the latest state from the fetcher
    pub fn sync_state(&mut self) {
        self.state = self.fetcher.state();
    }

    /// Stops the fetcher, cancelling anything in flight
    pub fn shutdown(&self) {
        self.fetcher.unmount();
    }

    /// Handles a key press
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        if self.show_help {
            if matches!(key_event.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.show_help = false;
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('r') => {
                self.refetch_requested = true;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.scroll_offset = 0;
            }
            _ => {}
        }
    }
}

/// Resolves the fetcher once and formats the outcome for printing.
///
/// # Returns
/// * `Ok(String)` - pretty-printed JSON
/// * `Err(String)` - `Error: <message>`
pub async fn run_once(fetcher: &CachedFetcher) -> Result<String, String> {
    fetcher.mount().await;
    let state = fetcher.state();
    fetcher.unmount();

    if let Some(error) = state.error {
        return Err(format!("Error: {}", error));
    }
    Ok(pretty_json(state.data.as_ref().unwrap_or(&Value::Null)))
}

/// Formats a JSON value with two-space indentation
pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
