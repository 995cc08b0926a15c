//! Wizi Learn terminal client
//!
//! Browses the formation catalogue and the ranking of a Wizi Learn backend, with
//! cached loads and toast notifications for errors and actions.

mod app;
mod ui;

use std::io::{self, Stdout};
use std::panic;
use std::process;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Flex, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame, Terminal,
};
use tracing::{info, warn};

use app::{App, AppState};
use wizi::cli::{Cli, Settings};
use wizi::logging;

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// How long to wait for a key before redrawing
const TICK: Duration = Duration::from_millis(100);

fn enter_terminal() -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)
}

/// Restores the terminal before the default panic message is printed
fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        default_hook(info);
    }));
}

fn draw(frame: &mut Frame, app: &App) {
    match app.state {
        AppState::Loading => draw_loading(frame),
        AppState::Ready => ui::render_catalog(frame, app),
    }

    ui::render_toasts(frame, &app.toast_snapshot);

    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

fn draw_loading(frame: &mut Frame) {
    let [line] = Layout::vertical([Constraint::Length(1)])
        .flex(Flex::Center)
        .areas(frame.area());
    frame.render_widget(
        Paragraph::new("Chargement…")
            .style(Style::default().fg(Color::Cyan))
            .centered(),
        line,
    );
}

async fn run(terminal: &mut Tui, app: &mut App) -> io::Result<()> {
    terminal.draw(|frame| draw(frame, app))?;
    app.prefetch_reference_data().await;

    while !app.should_quit {
        app.process_pending().await;
        app.sync_toasts();
        terminal.draw(|frame| draw(frame, app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        // Toast timers and background revalidation run on this runtime too.
        tokio::task::yield_now().await;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Bad arguments are reported before the terminal is taken over
    let settings = match Settings::from_cli(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    };

    match logging::init_logging(settings.log_file.as_deref()) {
        Ok(Some(path)) => info!(path = %path.display(), api_url = %settings.api_url, "starting"),
        Ok(None) => {}
        Err(e) => eprintln!("warning: logging disabled: {e}"),
    }

    install_panic_hook();
    let mut terminal = enter_terminal()?;
    let mut app = App::new(&settings);

    let result = run(&mut terminal, &mut app).await;

    if let Err(e) = restore_terminal() {
        warn!(error = %e, "failed to restore terminal");
    }
    if let Err(e) = &result {
        warn!(error = %e, "event loop failed");
    }
    info!("exiting");

    result?;
    Ok(())
}
