//! Kitchen display terminal
//!
//! Run with: cargo run -p kds-tui
//!
//! Without `KDS_FIRESTORE_PROJECT` the screen runs against a seeded in-memory
//! store that places a new order every 45 seconds.

mod app;
mod config;
mod demo;
mod ui;
mod widgets;

use anyhow::{Context, Result};
use app::App;
use config::Settings;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use kds_client::{EventReceiver, KitchenClient};
use kds_feed::{DocumentStore, FirestoreStore, MemoryStore};
use ratatui::prelude::*;
use std::fs::File;
use std::io::{stdout, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

const TICK_RATE: Duration = Duration::from_millis(100);
const DEMO_ORDER_EVERY: Duration = Duration::from_secs(45);

fn init_logging(path: &str) -> Result<()> {
    let file = File::create(path).with_context(|| format!("cannot open log file {}", path))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_env();
    init_logging(&settings.log_file)?;

    let store: Arc<dyn DocumentStore> = match settings.firestore() {
        Some(config) => {
            info!("Using Firestore project {}", config.project_id);
            Arc::new(FirestoreStore::new(config)?)
        }
        None => {
            info!("No Firestore project configured, running demo store");
            let memory = MemoryStore::new();
            demo::seed(&memory)?;
            demo::spawn_rush(memory.clone(), DEMO_ORDER_EVERY);
            Arc::new(memory)
        }
    };

    let mut client = KitchenClient::builder()
        .with_baseline_policy(settings.baseline)
        .connect(store)
        .await?;
    let events = client
        .events()
        .context("event receiver already taken")?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client, settings.is_demo());
    let result = run_app(&mut terminal, &mut app, events).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.client.shutdown();

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

async fn run_app<B: Backend + Write>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut events: EventReceiver,
) -> Result<()> {
    let mut last_tick = Instant::now();
    app.tick();

    loop {
        while let Ok(event) = events.try_recv() {
            app.on_event(event);
        }

        // Render
        terminal.draw(|f| ui::render(f, app))?;

        if app.bell_due() {
            let backend = terminal.backend_mut();
            backend.write_all(b"\x07")?;
            Write::flush(backend)?;
        }

        // Handle input
        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let action = app.handle_key(key.code);
                    if !app.perform(action).await {
                        return Ok(());
                    }
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.tick();
            last_tick = Instant::now();
        }
    }
}
