use crate::calendar::CalendarEvent;
use crate::client::DataOrigin;
use crate::model::{SchoolData, UserSettings};
use std::path::PathBuf;

/// Requests from the UI loop to the background worker.
#[derive(Debug)]
pub enum Action {
    LoadData,
    FetchCalendar(String),
    SaveSettings(UserSettings),
    Export(SchoolData, PathBuf),
    Quit,
}

#[derive(Debug)]
pub enum AppEvent {
    DataLoaded(SchoolData, DataOrigin),
    /// Feed URL the result belongs to, then the events or an error line.
    CalendarLoaded(String, Result<Vec<CalendarEvent>, String>),
    Error(String),
    Status(String),
}
