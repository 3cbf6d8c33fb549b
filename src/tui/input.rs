// Key handling. Pure state transitions; side effects come back as `Action`s.
use crate::admin::{EDITABLE_PERIODS, EXPORT_FILE_NAME};
use crate::model::{parse_slot, parse_test_input};
use crate::tui::action::Action;
use crate::tui::state::{AdminTab, AppState, CalendarView, InputMode, Page};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use std::path::PathBuf;

pub fn handle_key(state: &mut AppState, key: KeyEvent, today: NaiveDate) -> Vec<Action> {
    if state.mode == InputMode::Normal {
        handle_normal(state, key.code)
    } else {
        handle_input(state, key.code, today)
    }
}

fn save(state: &AppState) -> Action {
    Action::SaveSettings(state.settings.clone())
}

fn handle_input(state: &mut AppState, code: KeyCode, today: NaiveDate) -> Vec<Action> {
    match code {
        KeyCode::Enter => commit_input(state, today),
        KeyCode::Esc => {
            let mode = state.mode;
            state.end_input();
            if mode == InputMode::Password {
                state.goto_page(Page::Home);
            }
            vec![]
        }
        KeyCode::Char(c) => {
            state.enter_char(c);
            vec![]
        }
        KeyCode::Backspace => {
            state.delete_char();
            vec![]
        }
        KeyCode::Left => {
            state.move_cursor_left();
            vec![]
        }
        KeyCode::Right => {
            state.move_cursor_right();
            vec![]
        }
        _ => vec![],
    }
}

fn commit_input(state: &mut AppState, today: NaiveDate) -> Vec<Action> {
    let mode = state.mode;
    let text = state.end_input();

    match mode {
        InputMode::Normal => vec![],

        InputMode::AddingTodo => {
            if state.add_todo(&text) {
                let last = state.settings.todos.len() - 1;
                state.todo_list.select(Some(last));
                vec![save(state)]
            } else {
                vec![]
            }
        }

        InputMode::EditingIcal => {
            state.settings_ical = text;
            vec![]
        }

        InputMode::Password => {
            if state.admin.login(&text) {
                if let Ok(mut ed) = state.admin.editor(&mut state.data) {
                    ed.ensure_periods(EDITABLE_PERIODS);
                }
                state.goto_page(Page::AdminDashboard);
                state.message = "Logged in.".to_string();
            } else {
                state.begin_input(InputMode::Password, "");
            }
            vec![]
        }

        InputMode::EditingTiming => {
            let Some(idx) = state.selected_row() else {
                return vec![];
            };
            let Some(slot) = parse_slot(&text) else {
                state.message = format!("Error: expected HH:MM-HH:MM, got '{}'", text);
                return vec![];
            };
            let result = state.edit(|ed| ed.set_timing(idx, &slot.start, &slot.end));
            if let Err(e) = result {
                state.message = format!("Error: {}", e);
            }
            vec![]
        }

        InputMode::EditingSubject => {
            let Some(idx) = state.selected_row() else {
                return vec![];
            };
            let class_id = state.admin_class_id();
            let day = state.admin_day_key();
            let result = state.edit(|ed| ed.set_subject(&class_id, day, idx + 1, text.trim()));
            if let Err(e) = result {
                state.message = format!("Error: {}", e);
            }
            vec![]
        }

        InputMode::AddingTest => {
            let Some(test) = parse_test_input(&text, today) else {
                state.message = "Error: use 'Name @YYYY-MM-DD'".to_string();
                return vec![];
            };
            let result = state.edit(|ed| ed.add_test(&test.name, &test.date));
            match result {
                Ok(()) => state.message = format!("Added {}", test.name),
                Err(e) => state.message = format!("Error: {}", e),
            }
            vec![]
        }

        InputMode::ExportPath => {
            let path = if text.trim().is_empty() {
                EXPORT_FILE_NAME.to_string()
            } else {
                text.trim().to_string()
            };
            vec![Action::Export(state.data.clone(), PathBuf::from(path))]
        }
    }
}

fn handle_normal(state: &mut AppState, code: KeyCode) -> Vec<Action> {
    match code {
        KeyCode::Char('q') => return vec![Action::Quit],
        KeyCode::Tab => {
            state.cycle_page();
            return vec![];
        }
        KeyCode::Char('1') => {
            state.goto_page(Page::Home);
            return vec![];
        }
        KeyCode::Char('2') => {
            state.goto_page(Page::Settings);
            return vec![];
        }
        KeyCode::Char('3') => {
            state.goto_page(Page::AdminLogin);
            return vec![];
        }
        KeyCode::Char('c') => {
            state.cycle_class();
            state.message = format!("Class: {}", state.class_id());
            return vec![save(state)];
        }
        _ => {}
    }

    match state.page {
        Page::Home => handle_home(state, code),
        Page::Settings => handle_settings(state, code),
        Page::AdminLogin => {
            if matches!(code, KeyCode::Enter | KeyCode::Char('i')) {
                state.begin_input(InputMode::Password, "");
            }
            vec![]
        }
        Page::AdminDashboard => handle_admin(state, code),
    }
}

fn handle_home(state: &mut AppState, code: KeyCode) -> Vec<Action> {
    match code {
        KeyCode::Char('n') => {
            state.begin_input(InputMode::AddingTodo, "");
            state.message = "Example: 数学 ワーク p.32".to_string();
            vec![]
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.next();
            vec![]
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.previous();
            vec![]
        }
        KeyCode::Char(' ') => {
            if state.toggle_selected_todo() {
                vec![save(state)]
            } else {
                vec![]
            }
        }
        KeyCode::Char('d') => {
            if state.remove_selected_todo() {
                vec![save(state)]
            } else {
                vec![]
            }
        }
        KeyCode::Char('p') => {
            state.pomodoro.toggle();
            vec![]
        }
        KeyCode::Char('r') => {
            state.pomodoro.reset();
            vec![]
        }
        _ => vec![],
    }
}

fn handle_settings(state: &mut AppState, code: KeyCode) -> Vec<Action> {
    match code {
        KeyCode::Left | KeyCode::Char('h') => {
            state.shift_settings_class(-1);
            vec![]
        }
        KeyCode::Right | KeyCode::Char('l') => {
            state.shift_settings_class(1);
            vec![]
        }
        KeyCode::Char('i') => {
            let current = state.settings_ical.clone();
            state.begin_input(InputMode::EditingIcal, &current);
            vec![]
        }
        KeyCode::Enter => {
            let settings = state.apply_settings_draft();
            state.message = "設定を保存しました".to_string();
            let mut actions = vec![Action::SaveSettings(settings.clone())];
            if settings.ical_url.is_empty() {
                state.calendar = CalendarView::Unlinked;
            } else {
                state.calendar = CalendarView::Loading;
                actions.push(Action::FetchCalendar(settings.ical_url));
            }
            actions
        }
        KeyCode::Esc => {
            state.goto_page(Page::Home);
            vec![]
        }
        _ => vec![],
    }
}

fn handle_admin(state: &mut AppState, code: KeyCode) -> Vec<Action> {
    match code {
        KeyCode::Char('t') => state.next_admin_tab(),
        KeyCode::Down | KeyCode::Char('j') => state.next(),
        KeyCode::Up | KeyCode::Char('k') => state.previous(),
        KeyCode::Char('h') if state.admin_tab == AdminTab::Schedule => state.shift_admin_day(-1),
        KeyCode::Char('l') if state.admin_tab == AdminTab::Schedule => state.shift_admin_day(1),
        KeyCode::Char('H') if state.admin_tab == AdminTab::Schedule => state.shift_admin_class(-1),
        KeyCode::Char('L') if state.admin_tab == AdminTab::Schedule => state.shift_admin_class(1),
        KeyCode::Enter => {
            let Some(idx) = state.selected_row() else {
                return vec![];
            };
            match state.admin_tab {
                AdminTab::Timings => {
                    let initial = state
                        .data
                        .time_settings
                        .get(idx)
                        .map(|s| format!("{}-{}", s.start, s.end))
                        .unwrap_or_default();
                    state.begin_input(InputMode::EditingTiming, &initial);
                }
                AdminTab::Schedule => {
                    let class_id = state.admin_class_id();
                    let day = state.admin_day_key();
                    let current = state
                        .admin
                        .editor(&mut state.data)
                        .ok()
                        .and_then(|mut ed| ed.subjects_for(&class_id, day).into_iter().nth(idx))
                        .unwrap_or_default();
                    state.begin_input(InputMode::EditingSubject, &current);
                }
                AdminTab::Tests => {}
            }
        }
        KeyCode::Char('n') if state.admin_tab == AdminTab::Tests => {
            state.begin_input(InputMode::AddingTest, "");
        }
        KeyCode::Char('d') if state.admin_tab == AdminTab::Tests => {
            if let Some(idx) = state.selected_row() {
                let removed = state.edit(|ed| ed.remove_test(idx));
                match removed {
                    Ok(t) => state.message = format!("Removed {}", t.name),
                    Err(e) => state.message = format!("Error: {}", e),
                }
                let len = state.data.tests.len();
                if len > 0 && idx >= len {
                    state.admin_list.select(Some(len - 1));
                }
            }
        }
        KeyCode::Char('x') => state.begin_input(InputMode::ExportPath, EXPORT_FILE_NAME),
        KeyCode::Char('o') => {
            state.admin.logout();
            state.goto_page(Page::Home);
            state.message = "Logged out.".to_string();
        }
        _ => {}
    }
    vec![]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::UserSettings;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(state: &mut AppState, text: &str, today: NaiveDate) {
        for c in text.chars() {
            handle_key(state, key(KeyCode::Char(c)), today);
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn state() -> AppState {
        AppState::new(&Config::default(), UserSettings::default())
    }

    #[test]
    fn adding_a_todo_persists() {
        let mut s = state();
        handle_key(&mut s, key(KeyCode::Char('n')), today());
        assert_eq!(s.mode, InputMode::AddingTodo);
        type_text(&mut s, "宿題", today());
        let actions = handle_key(&mut s, key(KeyCode::Enter), today());
        assert!(matches!(actions.as_slice(), [Action::SaveSettings(saved)] if saved.todos.len() == 1));
        assert_eq!(s.settings.todos[0].text, "宿題");
    }

    #[test]
    fn blank_todo_is_dropped() {
        let mut s = state();
        handle_key(&mut s, key(KeyCode::Char('n')), today());
        type_text(&mut s, "  ", today());
        assert!(handle_key(&mut s, key(KeyCode::Enter), today()).is_empty());
        assert!(s.settings.todos.is_empty());
    }

    #[test]
    fn wrong_password_shows_error_and_reprompts() {
        let mut s = state();
        handle_key(&mut s, key(KeyCode::Char('3')), today());
        type_text(&mut s, "0000", today());
        handle_key(&mut s, key(KeyCode::Enter), today());
        assert_eq!(s.page, Page::AdminLogin);
        assert!(s.admin.login_error);
        assert_eq!(s.mode, InputMode::Password);
    }

    fn login(s: &mut AppState) {
        handle_key(s, key(KeyCode::Char('3')), today());
        type_text(s, "1234", today());
        handle_key(s, key(KeyCode::Enter), today());
    }

    #[test]
    fn admin_edits_timings_and_subjects() {
        let mut s = state();
        login(&mut s);
        assert_eq!(s.page, Page::AdminDashboard);
        assert_eq!(s.data.time_settings.len(), 7);

        handle_key(&mut s, key(KeyCode::Enter), today());
        assert_eq!(s.input_buffer, "00:00-00:00");
        s.end_input();
        s.begin_input(InputMode::EditingTiming, "");
        type_text(&mut s, "08:50-09:40", today());
        handle_key(&mut s, key(KeyCode::Enter), today());
        assert_eq!(s.data.time_settings[0].start, "08:50");

        handle_key(&mut s, key(KeyCode::Char('t')), today());
        assert_eq!(s.admin_tab, AdminTab::Schedule);
        handle_key(&mut s, key(KeyCode::Enter), today());
        type_text(&mut s, "国語", today());
        handle_key(&mut s, key(KeyCode::Enter), today());
        assert_eq!(s.data.subject("21HR", "Mon", 1), Some("国語"));
        assert!(s.data_edited);

        handle_key(&mut s, key(KeyCode::Enter), today());
        assert_eq!(s.input_buffer, "国語");
    }

    #[test]
    fn admin_adds_and_exports_tests() {
        let mut s = state();
        login(&mut s);
        handle_key(&mut s, key(KeyCode::Char('t')), today());
        handle_key(&mut s, key(KeyCode::Char('t')), today());
        handle_key(&mut s, key(KeyCode::Char('n')), today());
        type_text(&mut s, "期末 @2026-12-01", today());
        handle_key(&mut s, key(KeyCode::Enter), today());
        assert_eq!(s.data.tests.len(), 1);
        assert_eq!(s.data.tests[0].name, "期末");

        handle_key(&mut s, key(KeyCode::Char('x')), today());
        let actions = handle_key(&mut s, key(KeyCode::Enter), today());
        assert!(matches!(
            actions.as_slice(),
            [Action::Export(data, path)] if data.tests.len() == 1 && path == &PathBuf::from("data.json")
        ));

        handle_key(&mut s, key(KeyCode::Char('d')), today());
        assert!(s.data.tests.is_empty());
    }

    #[test]
    fn saving_settings_requests_calendar() {
        let mut s = state();
        handle_key(&mut s, key(KeyCode::Char('2')), today());
        handle_key(&mut s, key(KeyCode::Char('i')), today());
        type_text(&mut s, "https://example.com/basic.ics", today());
        handle_key(&mut s, key(KeyCode::Enter), today());
        let actions = handle_key(&mut s, key(KeyCode::Enter), today());
        assert_eq!(actions.len(), 2);
        assert!(matches!(&actions[1], Action::FetchCalendar(u) if u == "https://example.com/basic.ics"));
        assert_eq!(s.calendar, CalendarView::Loading);
    }

    #[test]
    fn pomodoro_keys() {
        let mut s = state();
        handle_key(&mut s, key(KeyCode::Char('p')), today());
        assert!(s.pomodoro.is_running());
        handle_key(&mut s, key(KeyCode::Char('r')), today());
        assert!(!s.pomodoro.is_running());
    }
}
