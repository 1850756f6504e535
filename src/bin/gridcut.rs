//! gridcut - interactive cuts on binned 2D grids
//!
//! ## Usage
//!
//! ```bash
//! # Cut a single grid, saving the mask to cuts.mask
//! gridcut signal.csv -o cuts.mask
//!
//! # Several grids sharing one binning, starting from earlier cuts
//! gridcut signal.csv background.csv -o cuts.mask -m previous.mask
//! ```
//!
//! Log output goes to stderr; redirect it (`2> gridcut.log`) to keep the
//! screen clean when `RUST_LOG` is set.

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::path::PathBuf;

use gridcut::tui::{App, Event, EventHandler};
use gridcut::{CutEngine, CutMode, Grid};

#[derive(Parser, Debug)]
#[command(
    name = "gridcut",
    author,
    about = "Interactively cut regions out of binned 2D grids",
    long_about = None,
    version = env!("GRIDCUT_VERSION")
)]
struct Cli {
    /// Grid files (CSV); all of them must share the same binning
    #[clap(required = true, value_name = "GRID")]
    grids: Vec<PathBuf>,

    /// File the cuts are saved to
    #[clap(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Overwrite the output file instead of backing it up first
    #[clap(long, action)]
    overwrite: bool,

    /// Previously saved cuts to start from
    #[clap(short, long, value_name = "FILE")]
    mask: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    // Everything that can fail on bad input happens before the terminal is taken over
    let mut engine = CutEngine::new();
    for path in &cli.grids {
        let grid = Grid::try_from(path)?;
        engine.register(&grid)?;
    }
    engine.set_output_path(&cli.output, cli.overwrite)?;
    if let Some(mask) = &cli.mask {
        engine.load_mask(mask)?;
    }
    let mut app = App::new(engine)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut event_handler = EventHandler::new(100);

    // Main loop
    loop {
        terminal.draw(|frame| {
            gridcut::tui::ui::draw(frame, &mut app);
        })?;

        match event_handler.next().await? {
            Event::Tick => {
                app.on_tick();
            }
            Event::Key(key) => {
                app.on_key(key);
                if app.should_quit {
                    break;
                }
            }
            Event::Mouse(mouse) => {
                app.on_mouse(mouse);
            }
            Event::Resize(_, _) => {
                // Terminal will redraw automatically
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    let store = app.engine.store();
    if !store.is_empty() {
        println!("\nCut regions:");
        for mode in CutMode::ALL {
            let count = store.count(mode);
            if count > 0 {
                println!("  {:<18} {}", mode.label(), count);
            }
        }
    }
    if app.has_unsaved_cuts() {
        println!(
            "\nUnsaved cuts were discarded (press p in the session to write them to {})",
            cli.output.display()
        );
    }

    Ok(())
}
