//! Long Twilight TUI application.
//!
//! A terminal front end over the `twilight-core` engine: dialogue pane with
//! numbered options, navigation, stats and knowledge views.
//!
//! ```bash
//! cargo run -p twilight -- --seed 7 --data-dir game
//! ```

mod app;
mod events;
mod ui;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use twilight_core::{GameSession, SessionConfig};

use app::App;
use events::{handle_event, EventResult};
use ui::render::render;

/// Parsed command line options.
struct CliOptions {
    seed: Option<u64>,
    data_dir: PathBuf,
    save_path: PathBuf,
    player_name: String,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            seed: None,
            data_dir: PathBuf::from("game"),
            save_path: PathBuf::from(".cache/twilight_save.json"),
            player_name: "Protagonist".to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }
    let options = parse_args(&args);

    setup_logging();

    // Build the session before touching the terminal so configuration
    // errors print cleanly.
    let mut config = SessionConfig::new(options.player_name.clone())
        .with_data_dir(&options.data_dir)
        .with_starting_focus("tammy");
    if let Some(seed) = options.seed {
        config = config.with_seed(seed);
    }
    let mut session = match GameSession::new(config) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("Cannot start: {err}");
            std::process::exit(1);
        }
    };
    let restored = session.load(&options.save_path).await;
    tracing::info!(restored, seed = ?options.seed, "session starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session, options.save_path);
    if restored {
        app.set_status("Save restored.");
    }
    let result = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

/// Main event loop: draw, poll, dispatch.
async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| render(frame, &app))?;

        if event::poll(Duration::from_millis(100))? {
            match handle_event(&mut app, event::read()?) {
                EventResult::Quit => return Ok(()),
                EventResult::Save => app.save().await,
                EventResult::Continue | EventResult::NeedsRedraw => {}
            }
        }
    }
}

/// Log to a file under `.cache/`; stderr is unusable beneath the alternate
/// screen. Logging is skipped entirely when the directory cannot be made.
fn setup_logging() {
    let Ok(()) = std::fs::create_dir_all(".cache") else {
        return;
    };
    let Ok(file) = std::fs::File::create(".cache/twilight.log") else {
        return;
    };
    let filter =
        EnvFilter::try_from_env("TWILIGHT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
}

fn parse_args(args: &[String]) -> CliOptions {
    let mut options = CliOptions::default();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--seed" => {
                options.seed = iter.next().and_then(|v| v.parse().ok());
            }
            "--data-dir" => {
                if let Some(dir) = iter.next() {
                    options.data_dir = PathBuf::from(dir);
                }
            }
            "--save" => {
                if let Some(path) = iter.next() {
                    options.save_path = PathBuf::from(path);
                }
            }
            "--name" => {
                if let Some(name) = iter.next() {
                    options.player_name = name.clone();
                }
            }
            other => {
                eprintln!("Unknown argument: {other} (try --help)");
            }
        }
    }
    options
}

fn print_help() {
    println!("Long Twilight — a small dating sim in the terminal");
    println!();
    println!("USAGE:");
    println!("    twilight [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --seed <N>        Seed the session for deterministic behaviour");
    println!("    --data-dir <DIR>  Directory with script.yaml / character.yaml (default: game)");
    println!("    --save <PATH>     Save file path (default: .cache/twilight_save.json)");
    println!("    --name <NAME>     Player name (default: Protagonist)");
    println!("    -h, --help        Show this help");
    println!();
    println!("KEYS:");
    println!("    1-9   choose a dialogue option or exit");
    println!("    t     talk to someone nearby");
    println!("    n     navigation   c  stats   k  knowledge   d/Esc  dialogue");
    println!("    s     save         q  quit");
}
