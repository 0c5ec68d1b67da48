//! `calendify-roster`: SQLite persistence for stores, employees, weekly
//! schedules and shifts.
//!
//! Every read and write takes the caller's [`UserId`](calendify_core::types::UserId)
//! and filters on `owner_id`. A record that belongs to another user behaves
//! exactly like one that does not exist.

pub mod db;
pub mod error;
pub mod manager;
pub mod types;

pub use error::{Result, RosterError};
pub use manager::RosterManager;
pub use types::{
    NewEmployee, NewSchedule, NewShift, NewStore, ScheduleDetail, ScheduleSummary, StoreDetail,
};
