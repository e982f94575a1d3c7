// nettopo - interactive 3D network topology in the terminal
//
// Renders a small network as node proxies and links under an orbiting
// perspective camera. Nodes pulse by security status and can be picked
// with the mouse or walked with the arrow keys.

mod app;
mod camera;
mod error;
mod picking;
mod render;
mod scene;
mod scheduler;
mod theme;
mod topology;
mod ui;
mod viewport;

use anyhow::{Context, Result};
use app::{
    event::{handle_key_event, handle_mouse_event},
    AppState,
};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use viewport::TerminalSurface;

/// Longest the loop waits for input when no frame is pending
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Install a file logger when NETTOPO_LOG names a path
///
/// The terminal owns stdout and stderr, so there is no logging otherwise.
/// The filter comes from RUST_LOG and defaults to `info`.
fn init_logging() -> Result<()> {
    let Some(path) = std::env::var_os("NETTOPO_LOG") else {
        return Ok(());
    };
    let file = std::fs::File::create(&path)
        .with_context(|| format!("cannot open log file {}", path.to_string_lossy()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    tracing::info!("Starting nettopo");
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = run_app(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Exited with error");
        println!("Error: {:?}", err);
    }
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>) -> Result<()> {
    let size = terminal.size()?;
    let map_area = ui::map_canvas_area(Rect::new(0, 0, size.width, size.height));

    let mut app = AppState::new(TerminalSurface::new(map_area), Instant::now()).map_err(|e| {
        tracing::error!(error = %e, "Rejected network snapshot");
        e
    })?;

    loop {
        let now = Instant::now();
        app.on_tick(now);
        terminal.draw(|f| ui::draw(f, &mut app, now))?;

        if !app.running {
            return Ok(());
        }

        let timeout = app.next_wakeup(Instant::now()).unwrap_or(IDLE_POLL);
        if event::poll(timeout)? {
            let now = Instant::now();
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key_event(&mut app, key.code, now);
                }
                Event::Mouse(mouse) => handle_mouse_event(&mut app, mouse, now),
                Event::Resize(width, height) => {
                    let area = ui::map_canvas_area(Rect::new(0, 0, width, height));
                    app.resize_map(area, now);
                }
                _ => {}
            }
        }
    }
}
