use std::collections::{BTreeMap, BTreeSet};

use calendify_core::model::{DayOfWeek, Employee, Shift};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Two-level lookup: employee id → day of week → shift.
///
/// A present key holding `None` means "no shift that day"; a missing key
/// means the pair is not part of the grid at all. Serialises as
/// `{ "<employeeId>": { "0": null, "3": { …shift… }, … } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShiftGrid {
    rows: BTreeMap<String, BTreeMap<DayOfWeek, Option<Shift>>>,
}

impl ShiftGrid {
    /// `None` when (employee, day) is outside the grid, `Some(None)` for an
    /// open day, `Some(Some(shift))` for a filled one.
    pub fn lookup(&self, employee_id: &str, day: DayOfWeek) -> Option<Option<&Shift>> {
        self.rows
            .get(employee_id)
            .and_then(|days| days.get(&day))
            .map(Option::as_ref)
    }

    /// The shift at (employee, day), if one is scheduled.
    pub fn shift_at(&self, employee_id: &str, day: DayOfWeek) -> Option<&Shift> {
        self.lookup(employee_id, day).flatten()
    }

    /// All day slots for one employee.
    pub fn days_for(&self, employee_id: &str) -> Option<&BTreeMap<DayOfWeek, Option<Shift>>> {
        self.rows.get(employee_id)
    }

    pub fn employee_ids(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Every placed shift, grouped by employee.
    pub fn filled(&self) -> impl Iterator<Item = &Shift> {
        self.rows
            .values()
            .flat_map(|days| days.values().filter_map(Option::as_ref))
    }

    /// Number of employees in the grid.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Build the complete (employee, day) grid for one schedule.
///
/// Every employee gets one slot per weekday present in `week`, initialised
/// to "no shift". Shifts are then placed by `(employee_id, day_of_week)`;
/// when two collide the later one in `shifts` wins. Shifts for employees
/// not in `employees` are dropped. Never fails.
pub fn resolve(week: &[NaiveDate], employees: &[Employee], shifts: &[Shift]) -> ShiftGrid {
    let days: BTreeSet<DayOfWeek> = week.iter().copied().map(DayOfWeek::of).collect();

    let mut rows: BTreeMap<String, BTreeMap<DayOfWeek, Option<Shift>>> = employees
        .iter()
        .map(|e| (e.id.clone(), days.iter().map(|d| (*d, None)).collect()))
        .collect();

    for shift in shifts {
        let Some(slot) = rows
            .get_mut(&shift.employee_id)
            .and_then(|row| row.get_mut(&shift.day_of_week))
        else {
            continue;
        };
        if let Some(previous) = slot.as_ref() {
            // Write-time uniqueness should make this impossible.
            warn!(
                employee_id = %shift.employee_id,
                day = %shift.day_of_week,
                replaced = %previous.id,
                by = %shift.id,
                "duplicate shift for employee/day; keeping the later one"
            );
        }
        *slot = Some(shift.clone());
    }

    ShiftGrid { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::week_dates;
    use chrono::NaiveTime;

    fn employee(id: &str) -> Employee {
        Employee {
            id: id.to_string(),
            employee_number: 1,
            name: id.to_uppercase(),
            store_id: "st-1".into(),
            owner_id: "u-1".into(),
            created_at: String::new(),
        }
    }

    fn shift(id: &str, employee_id: &str, day: u8) -> Shift {
        Shift {
            id: id.to_string(),
            employee_id: employee_id.to_string(),
            schedule_id: "s-1".into(),
            day_of_week: DayOfWeek::new(day).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            notes: None,
            owner_id: "u-1".into(),
            created_at: String::new(),
        }
    }

    fn week() -> Vec<NaiveDate> {
        week_dates(NaiveDate::from_ymd_opt(2024, 6, 8).unwrap()).to_vec()
    }

    #[test]
    fn later_duplicate_wins() {
        let grid = resolve(
            &week(),
            &[employee("a")],
            &[shift("first", "a", 2), shift("second", "a", 2)],
        );
        let day = DayOfWeek::new(2).unwrap();
        assert_eq!(grid.shift_at("a", day).map(|s| s.id.as_str()), Some("second"));
        assert_eq!(grid.filled().count(), 1);
    }

    #[test]
    fn empty_employee_list_gives_empty_grid() {
        let grid = resolve(&week(), &[], &[shift("x", "a", 1)]);
        assert!(grid.is_empty());
        assert_eq!(grid.filled().count(), 0);
    }

    #[test]
    fn serializes_open_days_as_null() {
        let grid = resolve(&week(), &[employee("a")], &[shift("x", "a", 3)]);
        let json = serde_json::to_value(&grid).unwrap();
        assert!(json["a"]["0"].is_null());
        assert_eq!(json["a"]["3"]["id"], "x");
        assert_eq!(json["a"].as_object().unwrap().len(), 7);
    }
}
