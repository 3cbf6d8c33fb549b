use crate::admin::{AdminError, AdminSession, EDITABLE_PERIODS, Editor};
use crate::calendar::CalendarEvent;
use crate::client::DataOrigin;
use crate::config::Config;
use crate::model::{SchoolData, UserSettings};
use crate::pomodoro::Pomodoro;
use crate::schedule::DAY_KEYS;
use crate::todo::TodoList;
use chrono::{Local, NaiveDateTime};
use ratatui::widgets::ListState;

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Page {
    Home,
    Settings,
    AdminLogin,
    AdminDashboard,
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum AdminTab {
    Timings,
    Schedule,
    Tests,
}

impl AdminTab {
    pub fn next(self) -> Self {
        match self {
            AdminTab::Timings => AdminTab::Schedule,
            AdminTab::Schedule => AdminTab::Tests,
            AdminTab::Tests => AdminTab::Timings,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AdminTab::Timings => "Timings",
            AdminTab::Schedule => "Schedule",
            AdminTab::Tests => "Tests",
        }
    }
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum InputMode {
    Normal,
    AddingTodo,
    EditingIcal,
    Password,
    EditingTiming,
    EditingSubject,
    AddingTest,
    ExportPath,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalendarView {
    Unlinked,
    Loading,
    Events(Vec<CalendarEvent>),
    Failed(String),
}

pub struct AppState {
    pub now: NaiveDateTime,
    pub page: Page,
    pub mode: InputMode,
    pub message: String,
    pub loading: bool,
    pub data: SchoolData,
    pub data_origin: Option<DataOrigin>,
    /// Set once the admin has changed `data`; a late load must not overwrite it.
    pub data_edited: bool,
    pub settings: UserSettings,
    pub classes: Vec<String>,
    pub pomodoro: Pomodoro,
    pub admin: AdminSession,
    pub admin_tab: AdminTab,
    pub admin_class: usize,
    pub admin_day: usize,
    pub admin_list: ListState,
    pub todo_list: ListState,
    pub settings_class: usize,
    pub settings_ical: String,
    pub calendar: CalendarView,
    pub input_buffer: String,
    pub cursor_position: usize,
}

impl AppState {
    pub fn new(config: &Config, settings: UserSettings) -> Self {
        let mut todo_list = ListState::default();
        todo_list.select(Some(0));
        let mut admin_list = ListState::default();
        admin_list.select(Some(0));

        let classes = config.classes.clone();
        let settings_class = classes
            .iter()
            .position(|c| *c == settings.class_id)
            .unwrap_or(0);
        let calendar = if settings.ical_url.is_empty() {
            CalendarView::Unlinked
        } else {
            CalendarView::Loading
        };

        Self {
            now: Local::now().naive_local(),
            page: Page::Home,
            mode: InputMode::Normal,
            message: "Loading timetable...".to_string(),
            loading: true,
            data: SchoolData::default(),
            data_origin: None,
            data_edited: false,
            settings_ical: settings.ical_url.clone(),
            settings,
            classes,
            pomodoro: Pomodoro::new(config.work_secs(), config.break_secs()),
            admin: AdminSession::new(&config.admin_password),
            admin_tab: AdminTab::Timings,
            admin_class: 0,
            admin_day: 1,
            admin_list,
            todo_list,
            settings_class,
            calendar,
            input_buffer: String::new(),
            cursor_position: 0,
        }
    }

    pub fn refresh_clock(&mut self) {
        self.now = Local::now().naive_local();
    }

    // --- Input buffer (same editing model for every prompt) ---

    pub fn begin_input(&mut self, mode: InputMode, initial: &str) {
        self.mode = mode;
        self.input_buffer = initial.to_string();
        self.cursor_position = self.input_buffer.chars().count();
    }

    pub fn end_input(&mut self) -> String {
        self.mode = InputMode::Normal;
        self.cursor_position = 0;
        std::mem::take(&mut self.input_buffer)
    }

    pub fn move_cursor_left(&mut self) {
        let cursor_moved_left = self.cursor_position.saturating_sub(1);
        self.cursor_position = self.clamp_cursor(cursor_moved_left);
    }
    pub fn move_cursor_right(&mut self) {
        let cursor_moved_right = self.cursor_position.saturating_add(1);
        self.cursor_position = self.clamp_cursor(cursor_moved_right);
    }
    pub fn enter_char(&mut self, new_char: char) {
        let byte_idx = self.byte_index();
        self.input_buffer.insert(byte_idx, new_char);
        self.move_cursor_right();
    }
    pub fn delete_char(&mut self) {
        if self.cursor_position != 0 {
            let current_index = self.cursor_position;
            let from_left_to_current_index = current_index - 1;
            let before_char_to_delete = self.input_buffer.chars().take(from_left_to_current_index);
            let after_char_to_delete = self.input_buffer.chars().skip(current_index);
            self.input_buffer = before_char_to_delete.chain(after_char_to_delete).collect();
            self.move_cursor_left();
        }
    }
    fn byte_index(&self) -> usize {
        self.input_buffer
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.cursor_position)
            .unwrap_or(self.input_buffer.len())
    }
    fn clamp_cursor(&self, new_cursor_pos: usize) -> usize {
        new_cursor_pos.clamp(0, self.input_buffer.chars().count())
    }

    /// Runs one admin edit and marks the document as locally changed on success.
    pub fn edit<T>(
        &mut self,
        f: impl FnOnce(&mut Editor<'_>) -> Result<T, AdminError>,
    ) -> Result<T, AdminError> {
        let mut ed = self.admin.editor(&mut self.data)?;
        let out = f(&mut ed)?;
        self.data_edited = true;
        Ok(out)
    }

    // --- Class selection ---

    pub fn class_id(&self) -> &str {
        &self.settings.class_id
    }

    /// Quick switch from the header: applies immediately.
    pub fn cycle_class(&mut self) {
        if self.classes.is_empty() {
            return;
        }
        let idx = self
            .classes
            .iter()
            .position(|c| *c == self.settings.class_id)
            .map(|i| (i + 1) % self.classes.len())
            .unwrap_or(0);
        self.settings.class_id = self.classes[idx].clone();
        self.settings_class = idx;
    }

    pub fn admin_class_id(&self) -> String {
        self.classes
            .get(self.admin_class)
            .cloned()
            .unwrap_or_else(|| crate::model::item::DEFAULT_CLASS_ID.to_string())
    }

    pub fn admin_day_key(&self) -> &'static str {
        DAY_KEYS[self.admin_day % DAY_KEYS.len()]
    }

    pub fn shift_admin_class(&mut self, delta: isize) {
        self.admin_class = wrap(self.admin_class, delta, self.classes.len());
    }

    pub fn shift_admin_day(&mut self, delta: isize) {
        self.admin_day = wrap(self.admin_day, delta, DAY_KEYS.len());
    }

    pub fn shift_settings_class(&mut self, delta: isize) {
        self.settings_class = wrap(self.settings_class, delta, self.classes.len());
    }

    /// Applies the settings page draft. Returns the new settings to persist.
    pub fn apply_settings_draft(&mut self) -> UserSettings {
        if let Some(c) = self.classes.get(self.settings_class) {
            self.settings.class_id = c.clone();
        }
        self.settings.ical_url = self.settings_ical.trim().to_string();
        self.settings.clone()
    }

    // --- Todo list ---

    pub fn add_todo(&mut self, text: &str) -> bool {
        self.settings.todos.add_todo(text)
    }

    pub fn toggle_selected_todo(&mut self) -> bool {
        match self.todo_list.selected() {
            Some(i) => self.settings.todos.toggle_todo(i),
            None => false,
        }
    }

    pub fn remove_selected_todo(&mut self) -> bool {
        let Some(i) = self.todo_list.selected() else {
            return false;
        };
        let removed = self.settings.todos.remove_todo(i);
        let len = self.settings.todos.len();
        if len > 0 && i >= len {
            self.todo_list.select(Some(len - 1));
        }
        removed
    }

    // --- Row navigation for whichever list has focus ---

    fn focused_len(&self) -> usize {
        match self.page {
            Page::Home => self.settings.todos.len(),
            Page::AdminDashboard => match self.admin_tab {
                AdminTab::Timings => self.data.time_settings.len(),
                AdminTab::Schedule => EDITABLE_PERIODS,
                AdminTab::Tests => self.data.tests.len(),
            },
            _ => 0,
        }
    }

    fn focused_list(&mut self) -> Option<&mut ListState> {
        match self.page {
            Page::Home => Some(&mut self.todo_list),
            Page::AdminDashboard => Some(&mut self.admin_list),
            _ => None,
        }
    }

    pub fn next(&mut self) {
        let len = self.focused_len();
        if len == 0 {
            return;
        }
        if let Some(list) = self.focused_list() {
            let i = match list.selected() {
                Some(i) if i >= len - 1 => 0,
                Some(i) => i + 1,
                None => 0,
            };
            list.select(Some(i));
        }
    }

    pub fn previous(&mut self) {
        let len = self.focused_len();
        if len == 0 {
            return;
        }
        if let Some(list) = self.focused_list() {
            let i = match list.selected() {
                Some(0) => len - 1,
                Some(i) => (i - 1).min(len - 1),
                None => 0,
            };
            list.select(Some(i));
        }
    }

    pub fn selected_row(&self) -> Option<usize> {
        let list = match self.page {
            Page::Home => &self.todo_list,
            Page::AdminDashboard => &self.admin_list,
            _ => return None,
        };
        list.selected().filter(|&i| i < self.focused_len())
    }

    pub fn next_admin_tab(&mut self) {
        self.admin_tab = self.admin_tab.next();
        self.admin_list.select(Some(0));
    }

    pub fn goto_page(&mut self, page: Page) {
        self.page = match page {
            Page::AdminLogin | Page::AdminDashboard if self.admin.is_logged_in() => {
                Page::AdminDashboard
            }
            Page::AdminLogin | Page::AdminDashboard => Page::AdminLogin,
            other => other,
        };
        if self.page == Page::Settings {
            self.settings_ical = self.settings.ical_url.clone();
            self.settings_class = self
                .classes
                .iter()
                .position(|c| *c == self.settings.class_id)
                .unwrap_or(0);
        }
        if self.page == Page::AdminLogin {
            self.begin_input(InputMode::Password, "");
        } else {
            self.mode = InputMode::Normal;
        }
    }

    pub fn cycle_page(&mut self) {
        let next = match self.page {
            Page::Home => Page::Settings,
            Page::Settings => Page::AdminLogin,
            Page::AdminLogin | Page::AdminDashboard => Page::Home,
        };
        self.goto_page(next);
    }
}

fn wrap(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (current as isize + delta).rem_euclid(len as isize) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Todo;

    fn state() -> AppState {
        AppState::new(&Config::default(), UserSettings::default())
    }

    #[test]
    fn class_cycle_wraps() {
        let mut s = state();
        assert_eq!(s.class_id(), "21HR");
        s.cycle_class();
        assert_eq!(s.class_id(), "22HR");
        for _ in 0..7 {
            s.cycle_class();
        }
        assert_eq!(s.class_id(), "21HR");
    }

    #[test]
    fn admin_page_requires_login() {
        let mut s = state();
        s.goto_page(Page::AdminDashboard);
        assert_eq!(s.page, Page::AdminLogin);
        assert_eq!(s.mode, InputMode::Password);

        assert!(s.admin.login("1234"));
        s.goto_page(Page::AdminLogin);
        assert_eq!(s.page, Page::AdminDashboard);
        assert_eq!(s.mode, InputMode::Normal);
    }

    #[test]
    fn todo_selection_follows_removal() {
        let mut s = state();
        s.settings.todos = vec![Todo::new("a"), Todo::new("b")];
        s.next();
        assert_eq!(s.selected_row(), Some(1));
        assert!(s.remove_selected_todo());
        assert_eq!(s.selected_row(), Some(0));
        assert!(s.toggle_selected_todo());
        assert!(s.settings.todos[0].done);
    }

    #[test]
    fn input_buffer_handles_multibyte() {
        let mut s = state();
        s.begin_input(InputMode::EditingSubject, "数学");
        s.move_cursor_left();
        s.enter_char('Ⅱ');
        assert_eq!(s.input_buffer, "数Ⅱ学");
        s.delete_char();
        assert_eq!(s.end_input(), "数学");
        assert_eq!(s.mode, InputMode::Normal);
    }

    #[test]
    fn only_successful_edits_mark_the_document() {
        let mut s = state();
        assert_eq!(s.edit(|ed| ed.remove_test(0)), Err(AdminError::NotLoggedIn));
        assert!(s.admin.login("1234"));
        assert!(s.edit(|ed| ed.remove_test(0)).is_err());
        assert!(!s.data_edited);
        s.edit(|ed| ed.add_test("Quiz", "2026-11-01")).unwrap();
        assert!(s.data_edited);
    }

    #[test]
    fn settings_draft_applies_on_save() {
        let mut s = state();
        s.goto_page(Page::Settings);
        s.shift_settings_class(-1);
        s.settings_ical = " https://example.com/a.ics ".to_string();
        assert_eq!(s.settings.class_id, "21HR");
        let saved = s.apply_settings_draft();
        assert_eq!(saved.class_id, "28HR");
        assert_eq!(saved.ical_url, "https://example.com/a.ics");
    }
}
