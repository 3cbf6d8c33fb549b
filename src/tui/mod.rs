pub mod action;
pub mod input;
pub mod state;
pub mod view;

use crate::admin::{self, EDITABLE_PERIODS};
use crate::calendar;
use crate::client::{DataSource, HttpClient, load_school_data};
use crate::config::Config;
use crate::storage::LocalStorage;
use crate::tui::action::{Action, AppEvent};
use crate::tui::input::handle_key;
use crate::tui::state::{AppState, CalendarView};
use crate::tui::view::draw;

use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const TICK: Duration = Duration::from_secs(1);
const CALENDAR_EVENTS: usize = 3;

pub async fn run(config: Config, source: DataSource) -> Result<()> {
    let http = HttpClient::new(config.allow_insecure_certs)?.with_timeout(config.fetch_timeout());
    let settings = LocalStorage::load_settings();
    let mut app_state = AppState::new(&config, settings);

    let (action_tx, action_rx) = mpsc::channel(32);
    let (event_tx, mut event_rx) = mpsc::channel(32);

    tokio::spawn(worker(http, source, action_rx, event_tx));

    let _ = action_tx.send(Action::LoadData).await;
    if !app_state.settings.ical_url.is_empty() {
        let _ = action_tx
            .send(Action::FetchCalendar(app_state.settings.ical_url.clone()))
            .await;
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui_loop(&mut terminal, &mut app_state, &action_tx, &mut event_rx).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn ui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app_state: &mut AppState,
    action_tx: &mpsc::Sender<Action>,
    event_rx: &mut mpsc::Receiver<AppEvent>,
) -> Result<()> {
    // Clock and pomodoro tick independently, each once per second.
    let mut last_clock = Instant::now();
    let mut last_pomo = Instant::now();

    loop {
        terminal.draw(|f| draw(f, app_state))?;

        while let Ok(event) = event_rx.try_recv() {
            apply_event(app_state, event);
        }

        if last_clock.elapsed() >= TICK {
            app_state.refresh_clock();
            last_clock = Instant::now();
        }
        if last_pomo.elapsed() >= TICK {
            last_pomo = Instant::now();
            if let Some(ev) = app_state.pomodoro.tick() {
                app_state.message = ev.message().to_string();
            }
        }

        if crossterm::event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Mouse(mouse_event) => match mouse_event.kind {
                    MouseEventKind::ScrollDown => app_state.next(),
                    MouseEventKind::ScrollUp => app_state.previous(),
                    _ => {}
                },
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let was_running = app_state.pomodoro.is_running();
                    let today = Local::now().date_naive();
                    let actions = handle_key(app_state, key, today);
                    if !was_running && app_state.pomodoro.is_running() {
                        last_pomo = Instant::now();
                    }

                    let mut quit = false;
                    for action in actions {
                        quit |= matches!(action, Action::Quit);
                        let _ = action_tx.send(action).await;
                    }
                    if quit {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }
}

pub fn apply_event(state: &mut AppState, event: AppEvent) {
    match event {
        AppEvent::DataLoaded(data, origin) => {
            state.loading = false;
            state.data_origin = Some(origin);
            if state.data_edited {
                tracing::warn!(?origin, "timetable arrived after admin edits, keeping the edits");
                state.message = "Timetable loaded late; kept your unexported edits.".to_string();
            } else {
                state.data = data;
                state.message = origin.status_text().to_string();
            }
            if let Ok(mut ed) = state.admin.editor(&mut state.data) {
                ed.ensure_periods(EDITABLE_PERIODS);
            }
        }
        AppEvent::CalendarLoaded(url, result) => {
            if url != state.settings.ical_url {
                tracing::debug!(%url, "dropping events for a replaced calendar url");
                return;
            }
            state.calendar = match result {
                Ok(events) => CalendarView::Events(events),
                Err(e) => CalendarView::Failed(e),
            };
        }
        AppEvent::Error(msg) => {
            state.message = format!("Error: {}", msg);
            state.loading = false;
        }
        AppEvent::Status(msg) => {
            state.message = msg;
        }
    }
}

async fn worker(
    http: HttpClient,
    source: DataSource,
    mut action_rx: mpsc::Receiver<Action>,
    event_tx: mpsc::Sender<AppEvent>,
) {
    while let Some(action) = action_rx.recv().await {
        match action {
            Action::Quit => break,

            Action::LoadData => {
                let http = http.clone();
                let source = source.clone();
                let event_tx = event_tx.clone();
                tokio::spawn(async move {
                    let (data, origin) = load_school_data(&source, &http).await;
                    let _ = event_tx.send(AppEvent::DataLoaded(data, origin)).await;
                });
            }

            Action::FetchCalendar(url) => {
                let http = http.clone();
                let event_tx = event_tx.clone();
                tokio::spawn(async move {
                    let result = match http.fetch_text(&url).await {
                        Ok(ics) => {
                            let now = Local::now().naive_local();
                            calendar::upcoming_events(&ics, &now, CALENDAR_EVENTS)
                        }
                        Err(e) => Err(e.to_string()),
                    };
                    if let Err(e) = &result {
                        tracing::warn!(error = %e, "calendar fetch failed");
                    }
                    let _ = event_tx.send(AppEvent::CalendarLoaded(url, result)).await;
                });
            }

            Action::SaveSettings(settings) => {
                let saved =
                    tokio::task::spawn_blocking(move || LocalStorage::save_settings(&settings))
                        .await;
                match saved {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::error!(error = %e, "saving settings failed");
                        let _ = event_tx.send(AppEvent::Error(e.to_string())).await;
                    }
                    Err(e) => {
                        let _ = event_tx.send(AppEvent::Error(e.to_string())).await;
                    }
                }
            }

            Action::Export(data, path) => match admin::export(&data, &path) {
                Ok(()) => {
                    let _ = event_tx
                        .send(AppEvent::Status(format!("Exported to {}", path.display())))
                        .await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "export failed");
                    let _ = event_tx.send(AppEvent::Error(e.to_string())).await;
                }
            },
        }
    }
}
