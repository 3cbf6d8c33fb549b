// File: ./src/admin.rs
// Password-gated editor for the school document
use crate::model::parser::is_valid_hhmm;
use crate::model::{SchoolData, Test, TimeSlot};
use crate::storage::LocalStorage;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_ADMIN_PASSWORD: &str = "1234";
pub const EDITABLE_PERIODS: usize = 7;
pub const EXPORT_FILE_NAME: &str = "data.json";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdminError {
    #[error("not logged in")]
    NotLoggedIn,
    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("no period {0}")]
    NoSuchPeriod(usize),
    #[error("test name and date are both required")]
    MissingTestField,
    #[error("unrecognized date '{0}'")]
    InvalidDate(String),
    #[error("no test at position {0}")]
    NoSuchTest(usize),
}

#[derive(Debug, Clone)]
pub struct AdminSession {
    password: String,
    logged_in: bool,
    pub login_error: bool,
}

impl AdminSession {
    pub fn new(password: &str) -> Self {
        Self {
            password: password.to_string(),
            logged_in: false,
            login_error: false,
        }
    }

    pub fn login(&mut self, attempt: &str) -> bool {
        self.logged_in = attempt == self.password;
        self.login_error = !self.logged_in;
        if self.logged_in {
            tracing::info!("admin logged in");
        } else {
            tracing::warn!("admin login rejected");
        }
        self.logged_in
    }

    pub fn logout(&mut self) {
        self.logged_in = false;
        self.login_error = false;
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Borrow the document for editing; refused until login succeeds.
    pub fn editor<'a>(&self, data: &'a mut SchoolData) -> Result<Editor<'a>, AdminError> {
        if !self.logged_in {
            return Err(AdminError::NotLoggedIn);
        }
        Ok(Editor { data })
    }
}

pub struct Editor<'a> {
    data: &'a mut SchoolData,
}

impl Editor<'_> {
    /// Pads the timing table to `count` blank periods, keeping existing ones.
    pub fn ensure_periods(&mut self, count: usize) {
        while self.data.time_settings.len() < count {
            self.data.time_settings.push(TimeSlot::blank());
        }
    }

    pub fn set_timing(&mut self, index: usize, start: &str, end: &str) -> Result<(), AdminError> {
        for t in [start, end] {
            if !is_valid_hhmm(t) {
                return Err(AdminError::InvalidTime(t.to_string()));
            }
        }
        let slot = self
            .data
            .time_settings
            .get_mut(index)
            .ok_or(AdminError::NoSuchPeriod(index + 1))?;
        *slot = TimeSlot::new(start.trim(), end.trim());
        Ok(())
    }

    /// Subjects for periods 1..=7 of a class/day, creating the entry if absent.
    pub fn subjects_for(&mut self, class_id: &str, day: &str) -> Vec<String> {
        let day_map = self.day_entry(class_id, day);
        (1..=EDITABLE_PERIODS as u8)
            .map(|p| day_map.get(&p).cloned().unwrap_or_default())
            .collect()
    }

    pub fn set_subject(
        &mut self,
        class_id: &str,
        day: &str,
        period: usize,
        subject: &str,
    ) -> Result<(), AdminError> {
        let p = u8::try_from(period)
            .ok()
            .filter(|p| (1..=EDITABLE_PERIODS as u8).contains(p))
            .ok_or(AdminError::NoSuchPeriod(period))?;
        self.day_entry(class_id, day).insert(p, subject.to_string());
        Ok(())
    }

    fn day_entry(&mut self, class_id: &str, day: &str) -> &mut BTreeMap<u8, String> {
        self.data
            .timetables
            .entry(class_id.to_string())
            .or_default()
            .entry(day.to_string())
            .or_default()
    }

    pub fn add_test(&mut self, name: &str, date: &str) -> Result<(), AdminError> {
        if name.trim().is_empty() || date.trim().is_empty() {
            return Err(AdminError::MissingTestField);
        }
        let test = Test::new(name, date.trim());
        if test.due().is_none() {
            return Err(AdminError::InvalidDate(date.to_string()));
        }
        self.data.tests.push(test);
        Ok(())
    }

    pub fn remove_test(&mut self, index: usize) -> Result<Test, AdminError> {
        if index >= self.data.tests.len() {
            return Err(AdminError::NoSuchTest(index));
        }
        Ok(self.data.tests.remove(index))
    }
}

/// Writes the document as pretty JSON. The file is replaced atomically.
pub fn export(data: &SchoolData, path: &Path) -> anyhow::Result<()> {
    let json = data.to_json_pretty()?;
    LocalStorage::atomic_write(path, json)?;
    tracing::info!(path = %path.display(), "exported school data");
    Ok(())
}
