//! cachedfetch - fetch JSON through a session cache
//!
//! Opens a terminal view of the response for the given URL, or with `--once`
//! prints it and exits.

use std::io;
use std::panic;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use cachedfetch::app::{self, App};
use cachedfetch::cli::{Cli, StartupConfig, StoreChoice};
use cachedfetch::logging::{self, LogTarget};
use cachedfetch::{ui, CachedFetcher, DirStore, HttpTransport, Session};

/// Sets up a panic hook that restores the terminal before printing the panic message.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

fn open_session(choice: &StoreChoice) -> Session {
    match choice {
        StoreChoice::Memory => Session::in_memory(),
        StoreChoice::Dir { root, keep } => Session::in_dir(DirStore::with_dir(root.clone()), *keep),
    }
}

fn build_fetcher(config: &StartupConfig, session: &Session) -> CachedFetcher {
    CachedFetcher::new(
        config.url.clone(),
        config.options.clone(),
        session.store(),
        Arc::new(HttpTransport::new()),
    )
    .with_config(config.fetcher.clone())
}

/// Ends the session; a failure to clean up does not change the exit status
fn end_session(session: Session) {
    if let Err(err) = session.end() {
        warn!(error = %err, "failed to clear session cache");
    }
}

/// Renders the checker and, when open, the help overlay
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    ui::render_server_checker(frame, &app.state, &app.url(), app.scroll_offset);
    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

async fn run_viewer(fetcher: CachedFetcher) -> Result<(), Box<dyn std::error::Error>> {
    setup_panic_hook();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(Arc::new(fetcher));
    app.mount();

    loop {
        app.process_refetch();
        app.sync_state();
        terminal.draw(|f| render_ui(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    app.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            return Ok(ExitCode::from(2));
        }
    };

    let log_target = match (&config.log_file, config.once) {
        (Some(path), _) => Some(LogTarget::File(path.clone())),
        (None, true) => Some(LogTarget::Stderr),
        (None, false) => logging::default_log_file().map(LogTarget::File),
    };
    let _log_guard = match &log_target {
        Some(target) => logging::init(target)?,
        None => None,
    };

    info!(url = %config.url, method = %config.options.method, once = config.once, "starting");
    let session = open_session(&config.store);
    let fetcher = build_fetcher(&config, &session);

    if config.once {
        let result = app::run_once(&fetcher).await;
        drop(fetcher);
        end_session(session);
        return match result {
            Ok(output) => {
                println!("{}", output);
                Ok(ExitCode::SUCCESS)
            }
            Err(message) => {
                warn!(%message, "resolution failed");
                eprintln!("{}", message);
                Ok(ExitCode::FAILURE)
            }
        };
    }

    let result = run_viewer(fetcher).await;
    end_session(session);
    result?;
    Ok(ExitCode::SUCCESS)
}
