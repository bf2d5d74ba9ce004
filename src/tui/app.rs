//! Application loop and screen routing.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use uuid::Uuid;

use crate::config::Config;
use crate::media::DirectoryGallery;
use crate::storage::Storage;

use super::screens::{HomeScreen, ReportScreen, TranscriptScreen};

/// How long to wait for input when no deferred effect is pending.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Which screen is currently displayed.
enum Screen {
    Home(HomeScreen),
    Report(ReportScreen),
    Transcript(TranscriptScreen),
}

/// Actions a home-screen selection can trigger.
pub enum HomeAction {
    NewReport,
    OpenReport(Uuid),
}

/// Runs the TUI event loop until the user quits.
pub fn run(config: &Config, storage: &Storage) -> io::Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, config, storage);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    config: &Config,
    storage: &Storage,
) -> io::Result<()> {
    let mut screen = Screen::Home(load_home_screen(storage)?);

    loop {
        terminal.draw(|frame| match &screen {
            Screen::Home(s) => s.render(frame),
            Screen::Report(s) => s.render(frame),
            Screen::Transcript(s) => s.render(frame),
        })?;

        match &mut screen {
            Screen::Home(home) => {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Up | KeyCode::Char('k') => home.move_up(),
                        KeyCode::Down | KeyCode::Char('j') => home.move_down(),
                        KeyCode::Char('r') => {
                            screen = Screen::Report(new_report_screen(config));
                        }
                        KeyCode::Enter => {
                            if let Some(action) = home.select() {
                                screen = open_home_action(action, config, storage)?;
                            }
                        }
                        _ => {}
                    }
                }
            }
            Screen::Report(report) => {
                // Wake up in time for the next deferred effect even when no
                // key arrives.
                let timeout = report
                    .next_due()
                    .map_or(IDLE_POLL, |due| due.saturating_duration_since(Instant::now()));
                if event::poll(timeout)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind == KeyEventKind::Press {
                            if let Some(exit) = report.handle_key(key, Instant::now()) {
                                if let Some((meta, messages)) = exit.archive {
                                    storage
                                        .archive(&meta, &messages)
                                        .map_err(io::Error::other)?;
                                }
                                screen = Screen::Home(load_home_screen(storage)?);
                                continue;
                            }
                        }
                    }
                }
                report.tick(Instant::now());
            }
            Screen::Transcript(view) => {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match key.code {
                        KeyCode::Esc | KeyCode::Char('q') => {
                            screen = Screen::Home(load_home_screen(storage)?);
                        }
                        KeyCode::Up | KeyCode::Char('k') => view.on_scroll_up(),
                        KeyCode::Down | KeyCode::Char('j') => view.on_scroll_down(),
                        _ => {}
                    }
                }
            }
        }
    }
}

fn load_home_screen(storage: &Storage) -> io::Result<HomeScreen> {
    let reports = storage.list_reports().map_err(io::Error::other)?;
    Ok(HomeScreen::new(reports))
}

fn new_report_screen(config: &Config) -> ReportScreen {
    let gallery = DirectoryGallery::new(config.gallery_dir().unwrap_or_default());
    ReportScreen::new(config.skip_confirmation, gallery)
}

fn open_home_action(
    action: HomeAction,
    config: &Config,
    storage: &Storage,
) -> io::Result<Screen> {
    match action {
        HomeAction::NewReport => Ok(Screen::Report(new_report_screen(config))),
        HomeAction::OpenReport(id) => {
            let report = storage.load_report(id).map_err(io::Error::other)?;
            let messages = storage.load_transcript(id).map_err(io::Error::other)?;
            Ok(Screen::Transcript(TranscriptScreen::new(report, messages)))
        }
    }
}
