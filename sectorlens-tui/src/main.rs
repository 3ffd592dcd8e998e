//! SectorLens TUI - dashboard over the tables of a finished pipeline run.
//!
//! Panels:
//! 1. Summary: per-firm price change, sector stats or movers, price trends
//! 2. Performance: close price comparison of chosen firms
//! 3. Risk: daily returns, rolling volatility and drawdown
//! 4. Correlation: sector / super sector heat table
//! 5. Data: browse and download any output table
//! 6. Help: keyboard shortcuts

use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use sectorlens_tui::app::{AppState, ErrorCategory};
use sectorlens_tui::dataset::Dataset;
use sectorlens_tui::{input, persistence, ui};

#[derive(Parser)]
#[command(name = "sectorlens-tui", about = "Terminal dashboard over SectorLens output tables")]
struct Args {
    /// Output directory of a pipeline run.
    #[arg(long, default_value = "outputs")]
    output_dir: PathBuf,

    /// Directory receiving downloaded tables.
    #[arg(long, default_value = "exports")]
    export_dir: PathBuf,

    /// Dashboard state file. Defaults to the user config directory.
    #[arg(long)]
    state: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let state_path = args.state.unwrap_or_else(persistence::default_path);
    let persisted = persistence::load(&state_path);

    let (dataset, issues) = Dataset::load(&args.output_dir);
    let mut app = AppState::new(dataset, args.export_dir);
    persistence::apply(&mut app, persisted);
    if !app.report_issues(&issues) {
        app.set_status(format!(
            "Loaded {} firms from {}",
            app.dataset.universe.firm_count(),
            app.dataset.output_dir.display()
        ));
    }

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    let persisted = persistence::extract(&app);
    if let Err(e) = persistence::save(&state_path, &persisted) {
        app.push_error(ErrorCategory::State, format!("{e:#}"), state_path.display().to_string());
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(err) = app
        .error_history
        .iter()
        .find(|e| e.category == ErrorCategory::State)
    {
        eprintln!("warning: dashboard state not saved: {}", err.message);
    }

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        // ~20 FPS tick.
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        if !app.running {
            break;
        }
    }
    Ok(())
}
