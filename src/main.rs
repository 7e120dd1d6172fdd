//! teq - browse registered SQL queries in the terminal
//!
//! Queries, connections, and display configuration live in an embedded local
//! store and are selected by name. A session token printed to the log lets a
//! later invocation resume the same filter and selected row.

mod action;
mod app;
mod component;
mod components;
mod db;
mod error;
mod model;
mod services;
mod tui;

use crate::action::Action;
use crate::app::{prepare_session, App, SessionContext, ViewMode};
use crate::component::Component;
use crate::db::DriverRegistry;
use crate::services::{substitute_args, Store};
use crate::tui::Tui;
use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::event::Event;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Browse a registered query interactively, with saved display config and
/// resumable filter/selection sessions
#[derive(Parser, Debug)]
#[command(name = "teq", version)]
struct Cli {
    /// Item name owning saved column configuration
    #[arg(long)]
    item: Option<String>,

    /// Query definition name
    #[arg(long)]
    sql: Option<String>,

    /// Connection name
    #[arg(long)]
    db: Option<String>,

    /// Initial filter predicate
    #[arg(long, default_value = "")]
    filter: String,

    /// Path to a JSON object substituted into `:name` placeholders
    #[arg(long)]
    args: Option<PathBuf>,

    /// Session token to resume
    #[arg(long, default_value = "")]
    uid: String,

    /// Presentation mode: "t" (table) or "c" (card, first row pivoted)
    #[arg(long, default_value = "t")]
    view: String,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let _log_guard = init_logging()?;
    info!("=== application started ===");

    // All selectors are required; missing ones are a fatal diagnostic, not a
    // usage error
    let item_name = cli.item.context("--item is required")?;
    let sql_name = cli.sql.context("--sql is required")?;
    let db_name = cli.db.context("--db is required")?;
    let view = match cli.view.as_str() {
        "c" | "card" => ViewMode::Card,
        _ => ViewMode::Table,
    };

    let store = Store::open_default()?;
    let connection = store.connection_by_name(&db_name)?;
    let query = store.query_by_name(&sql_name)?;
    info!(
        db = %db_name, driver = %connection.driver, query = %sql_name,
        "catalog resolved"
    );

    let mut base_query = query.text.clone();
    if let Some(path) = &cli.args {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading args file {}", path.display()))?;
        let args: HashMap<String, Value> = serde_json::from_str(&contents)
            .with_context(|| format!("parsing args file {}", path.display()))?;
        base_query = substitute_args(&base_query, &args);
        info!(sql = %base_query, "placeholders substituted");
    }

    let registry = DriverRegistry::with_builtin_drivers();
    let mut backend = registry.connect(&connection.driver, &connection.connect)?;
    info!("backend connected");

    let start = prepare_session(
        &store,
        backend.as_mut(),
        query.id,
        &sql_name,
        &base_query,
        &cli.filter,
        &cli.uid,
        view,
    )?;
    if start.grid.is_empty() {
        bail!("query '{}' returned no data", sql_name);
    }

    let ctx = SessionContext {
        item_name,
        sql_name,
        base_query,
        connection_id: connection.id,
        query_id: query.id,
        view,
        table_height: start.height,
    };
    let mut app = App::new(store, backend, ctx, start.grid, &start.filter, &cli.uid);
    if let Some(digest) = &start.resume_digest {
        app.select_row_by_digest(digest);
    }

    let mut tui = Tui::new()?;
    tui.enter()?;
    let result = run_app(&mut tui, &mut app);
    tui.exit()?;

    info!("=== application exited ===");
    result
}

/// Run the main event loop: one event is fully processed (including any
/// blocking query execution or store I/O) before the next is accepted.
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        tui.draw(|frame| {
            let area = frame.area();
            if let Err(e) = app.draw(frame, area) {
                warn!(error = %e, "draw failed");
            }
        })?;

        if let Some(event) = tui.next_event()? {
            let action = match event {
                Event::Key(key) => app.handle_key_event(key)?,
                Event::Resize(w, h) => Some(Action::Resize(w, h)),
                _ => None,
            };

            // An action may produce a follow-up action
            if let Some(action) = action {
                let mut current = Some(action);
                while let Some(a) = current {
                    current = app.update(a)?;
                }
            }
        } else {
            app.update(Action::Tick)?;
        }
    }
    Ok(())
}

/// Log to `~/.teq/teq.log`; the TUI owns the terminal, so nothing may write
/// to stdout or stderr while it runs.
fn init_logging() -> Result<WorkerGuard> {
    let dir = Store::store_dir()?;
    let appender = tracing_appender::rolling::never(dir, "teq.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}
