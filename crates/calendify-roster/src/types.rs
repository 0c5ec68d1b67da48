use std::collections::BTreeMap;

use calendify_core::model::{DayOfWeek, Employee, Schedule, Shift, Store};
use calendify_week::{
    format_display_date, format_long_date, format_shift_span, resolve, schedule_week, ShiftGrid,
    WeekDates,
};
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RosterError};

// ---------------------------------------------------------------------------
// Inputs
//
// Every field is optional at the serde level so a missing field produces the
// same client-facing message as an empty one ("Name is required").
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStore {
    pub store_number: Option<i64>,
    pub name: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub employee_number: Option<i64>,
    pub name: Option<String>,
    pub store_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSchedule {
    pub end_of_week_date: Option<NaiveDate>,
    pub store_id: Option<String>,
}

/// Times accept `HH:MM` (what a browser time input sends) or `HH:MM:SS`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShift {
    pub employee_id: Option<String>,
    pub schedule_id: Option<String>,
    pub day_of_week: Option<i64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub notes: Option<String>,
}

pub(crate) struct ValidStore {
    pub store_number: i64,
    pub name: String,
    pub location: String,
}

pub(crate) struct ValidEmployee {
    pub employee_number: i64,
    pub name: String,
    pub store_id: String,
}

pub(crate) struct ValidSchedule {
    pub end_of_week_date: NaiveDate,
    pub store_id: String,
}

pub(crate) struct ValidShift {
    pub employee_id: String,
    pub schedule_id: String,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub notes: Option<String>,
}

impl NewStore {
    pub(crate) fn validate(self) -> Result<ValidStore> {
        Ok(ValidStore {
            store_number: required_number(self.store_number, "Store number")?,
            name: required_text(self.name, "Name")?,
            location: required_text(self.location, "Location")?,
        })
    }
}

impl NewEmployee {
    pub(crate) fn validate(self) -> Result<ValidEmployee> {
        Ok(ValidEmployee {
            employee_number: required_number(self.employee_number, "Employee number")?,
            name: required_text(self.name, "Name")?,
            store_id: required_text(self.store_id, "Store")?,
        })
    }
}

impl NewSchedule {
    pub(crate) fn validate(self) -> Result<ValidSchedule> {
        let end_of_week_date = self
            .end_of_week_date
            .ok_or_else(|| required("End of week date"))?;
        // Keeps week expansion inside chrono's range.
        if !(1..=9999).contains(&end_of_week_date.year()) {
            return Err(RosterError::Validation(
                "End of week date must be between years 1 and 9999".to_string(),
            ));
        }
        Ok(ValidSchedule {
            end_of_week_date,
            store_id: required_text(self.store_id, "Store")?,
        })
    }
}

impl NewShift {
    pub(crate) fn validate(self) -> Result<ValidShift> {
        let employee_id = required_text(self.employee_id, "Employee")?;
        let schedule_id = required_text(self.schedule_id, "Schedule")?;
        let day = self.day_of_week.ok_or_else(|| required("Day of week"))?;
        let day_of_week = u8::try_from(day)
            .ok()
            .and_then(DayOfWeek::new)
            .ok_or_else(|| {
                RosterError::Validation(format!("Day of week must be between 0 and 6, got {day}"))
            })?;
        let start_time = required_time(self.start_time, "Start time")?;
        let end_time = required_time(self.end_time, "End time")?;
        let notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Ok(ValidShift {
            employee_id,
            schedule_id,
            day_of_week,
            start_time,
            end_time,
            notes,
        })
    }
}

fn required(field: &str) -> RosterError {
    RosterError::Validation(format!("{field} is required"))
}

fn required_text(value: Option<String>, field: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| required(field))
}

fn required_number(value: Option<i64>, field: &str) -> Result<i64> {
    match value {
        Some(n) if n >= 0 => Ok(n),
        Some(n) => Err(RosterError::Validation(format!(
            "{field} must not be negative, got {n}"
        ))),
        None => Err(required(field)),
    }
}

fn required_time(value: Option<String>, field: &str) -> Result<NaiveTime> {
    let raw = required_text(value, field)?;
    parse_time_of_day(&raw).ok_or_else(|| {
        RosterError::Validation(format!("{field} must be HH:MM or HH:MM:SS, got '{raw}'"))
    })
}

pub(crate) fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// A store together with its employees, in creation order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDetail {
    #[serde(flatten)]
    pub store: Store,
    pub employees: Vec<Employee>,
}

/// One row of the schedule listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub store: Store,
    /// `June 8th, 2024`
    pub display_date: String,
}

impl ScheduleSummary {
    pub fn new(schedule: Schedule, store: Store) -> Self {
        let display_date = format_long_date(schedule.end_of_week_date);
        Self {
            schedule,
            store,
            display_date,
        }
    }
}

/// Everything the week view needs for one schedule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDetail {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub store: StoreDetail,
    /// Heading for the whole schedule, from the stored end-of-week date.
    pub title: String,
    pub week_dates: WeekDates,
    /// `week_dates` rendered for column headings.
    pub week_headings: Vec<String>,
    pub shifts_by_employee_id: ShiftGrid,
    /// Shift id → `2pm - 10pm`, for every shift in the grid.
    pub display_times: BTreeMap<String, String>,
}

impl ScheduleDetail {
    /// Resolve the week and the grid. `employees` and `shifts` must already
    /// be scoped to the schedule's store and to the caller.
    pub fn build(
        schedule: Schedule,
        store: Store,
        employees: Vec<Employee>,
        shifts: Vec<Shift>,
    ) -> Self {
        let week_dates = schedule_week(&schedule);
        let grid = resolve(&week_dates, &employees, &shifts);
        let display_times = grid
            .filled()
            .map(|s| (s.id.clone(), format_shift_span(s.start_time, s.end_time)))
            .collect();

        Self {
            title: format_display_date(schedule.end_of_week_date),
            week_headings: week_dates.iter().copied().map(format_display_date).collect(),
            week_dates,
            shifts_by_employee_id: grid,
            display_times,
            store: StoreDetail { store, employees },
            schedule,
        }
    }
}
