pub mod admin;
pub mod cache;
pub mod calendar;
pub mod client;
pub mod color_utils;
pub mod config;
pub mod countdown;
pub mod logging;
pub mod model;
pub mod pomodoro;
pub mod schedule;
pub mod storage;
pub mod todo;

#[cfg(feature = "tui")]
pub mod tui;
