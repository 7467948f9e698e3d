//! Terminal UI for Strictly XO

mod app;
mod input;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use strictly_xo::{
    ClientConfig, GameApi, LobbySender, ReqwestTransport, SessionDriver, connect,
};
use tracing::{debug, error, info, instrument};

use app::{App, Step};
use input::intent_for;

/// How long one pass of the loop waits for a key.
const INPUT_POLL: Duration = Duration::from_millis(50);

type Driver = SessionDriver<ReqwestTransport, LobbySender>;

/// Run the TUI client
#[instrument(skip_all, fields(host = %config.host()))]
pub async fn run_tui(config: ClientConfig) -> Result<()> {
    info!("Starting Strictly XO TUI");

    let endpoints = config.endpoints();
    let transport = ReqwestTransport::new(endpoints.clone(), config.request_timeout())?;
    let (sender, signals) = connect(&endpoints.games_channel()).await?;
    let mut driver = SessionDriver::new(GameApi::new(transport), sender, signals, config.poll_policy());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_loop(&mut terminal, &mut driver).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Game loop error");
    }
    res
}

/// Draw, apply whatever the network delivered, then read one key.
async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    driver: &mut Driver,
) -> Result<()> {
    let mut app = App::new();

    loop {
        let applied = driver.pump();
        if applied > 0 {
            debug!(applied, phase = %driver.machine().phase(), "Network inputs applied");
        }
        app.sync(driver.machine());

        terminal.draw(|f| ui::draw(f, driver.machine(), &app))?;

        // Keep the runtime free for the request tasks between frames.
        if !event::poll(Duration::ZERO)? {
            tokio::time::sleep(INPUT_POLL).await;
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind == KeyEventKind::Release {
            continue;
        }
        let Some(intent) = intent_for(key.code) else {
            continue;
        };

        match app.on_intent(intent, driver.machine()) {
            Step::Quit => {
                info!("User quit");
                return Ok(());
            }
            Step::Redraw => {}
            Step::Act(action) => {
                if let Err(rejection) = driver.act(action) {
                    app.set_notice(rejection.to_string());
                }
            }
        }
    }
}
