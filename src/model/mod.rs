// File: ./src/model/mod.rs
// Aggregates the split model files
pub mod item;
pub mod parser;

pub use item::{SchoolData, Test, TimeSlot, Timetable, Todo, UserSettings};
pub use parser::{parse_hhmm, parse_slot, parse_test_input};
