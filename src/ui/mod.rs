//! UI rendering for the cachedfetch viewer
//!
//! Rendering uses ratatui; all state comes from the app and fetcher.

pub mod help_overlay;
pub mod server_checker;

pub use help_overlay::render as render_help_overlay;
pub use server_checker::render as render_server_checker;
