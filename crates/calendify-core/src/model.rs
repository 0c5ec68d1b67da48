//! Records shared by the repository, the week resolver and the gateway.
//!
//! Field names go over the wire in camelCase. Every record carries the
//! `owner_id` of the user who created it; nothing outside the owning user's
//! queries ever sees it.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Day of the week, Sunday-based: 0 = Sunday … 6 = Saturday.
///
/// Matches chrono's `num_days_from_sunday`, not ISO numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const SUNDAY: DayOfWeek = DayOfWeek(0);
    pub const SATURDAY: DayOfWeek = DayOfWeek(6);

    pub fn new(index: u8) -> Option<Self> {
        (index <= 6).then_some(Self(index))
    }

    /// The weekday a calendar date falls on.
    pub fn of(date: NaiveDate) -> Self {
        Self(date.weekday().num_days_from_sunday() as u8)
    }

    /// Sunday through Saturday, in order.
    pub fn all() -> impl Iterator<Item = DayOfWeek> {
        (0..=6).map(DayOfWeek)
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        DayOfWeek::new(value).ok_or_else(|| format!("day of week out of range (0-6): {value}"))
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> Self {
        day.0
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: String,
    pub store_number: i64,
    pub name: String,
    pub location: String,
    pub owner_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub employee_number: i64,
    pub name: String,
    pub store_id: String,
    pub owner_id: String,
    pub created_at: String,
}

/// One seven-day work week for a store.
///
/// `end_of_week_date` is stored as entered; see `calendify_week::reference_date`
/// for how it maps onto the displayed week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: String,
    pub end_of_week_date: NaiveDate,
    pub store_id: String,
    pub owner_id: String,
    pub created_at: String,
}

/// One employee's working interval on one day of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: String,
    pub employee_id: String,
    pub schedule_id: String,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub owner_id: String,
    pub created_at: String,
}
