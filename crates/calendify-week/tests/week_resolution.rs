// End-to-end checks for week expansion and grid resolution over plain records.

use calendify_core::model::{DayOfWeek, Employee, Schedule, Shift};
use calendify_week::{format_display_time, resolve, schedule_week, week_dates};
use chrono::{Days, NaiveDate, NaiveTime};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn employee(id: &str) -> Employee {
    Employee {
        id: id.to_string(),
        employee_number: 7,
        name: format!("Employee {id}"),
        store_id: "store-1".into(),
        owner_id: "owner-1".into(),
        created_at: "2024-06-01T00:00:00+00:00".into(),
    }
}

fn shift(id: &str, employee_id: &str, day: u8, start: NaiveTime, end: NaiveTime) -> Shift {
    Shift {
        id: id.to_string(),
        employee_id: employee_id.to_string(),
        schedule_id: "sched-1".into(),
        day_of_week: DayOfWeek::new(day).unwrap(),
        start_time: start,
        end_time: end,
        notes: Some("register".into()),
        owner_id: "owner-1".into(),
        created_at: "2024-06-01T00:00:00+00:00".into(),
    }
}

#[test]
fn week_has_seven_consecutive_days_ending_on_reference() {
    let samples = [
        ymd(2024, 6, 8),
        ymd(2024, 3, 1),
        ymd(2024, 1, 1),
        ymd(2023, 3, 12), // US DST start
        ymd(2023, 11, 5), // US DST end
        ymd(1999, 12, 31),
    ];
    for reference in samples {
        let week = week_dates(reference);
        assert_eq!(week.len(), 7);
        assert_eq!(week[6], reference);
        for pair in week.windows(2) {
            assert_eq!(pair[0] + Days::new(1), pair[1], "gap in week ending {reference}");
        }
    }
}

#[test]
fn week_is_deterministic() {
    let reference = ymd(2024, 10, 27);
    assert_eq!(week_dates(reference), week_dates(reference));
}

#[test]
fn first_of_month_spans_previous_month() {
    let week = week_dates(ymd(2024, 3, 1));
    assert_eq!(week[0], ymd(2024, 2, 24));
    assert_eq!(week[5], ymd(2024, 2, 29));
    assert_eq!(week[6], ymd(2024, 3, 1));
}

#[test]
fn leap_day_reference_neither_skips_nor_repeats() {
    let week = week_dates(ymd(2024, 2, 29));
    let expected: Vec<NaiveDate> = (23..=29).map(|d| ymd(2024, 2, d)).collect();
    assert_eq!(week.to_vec(), expected);
}

#[test]
fn scenario_saturday_reference() {
    let week = week_dates(ymd(2024, 6, 8));
    let expected: Vec<NaiveDate> = (2..=8).map(|d| ymd(2024, 6, d)).collect();
    assert_eq!(week.to_vec(), expected);
}

#[test]
fn schedule_week_applies_stored_date_offset() {
    let schedule = Schedule {
        id: "sched-1".into(),
        end_of_week_date: ymd(2024, 6, 7),
        store_id: "store-1".into(),
        owner_id: "owner-1".into(),
        created_at: String::new(),
    };
    let week = schedule_week(&schedule);
    assert_eq!(week[0], ymd(2024, 6, 2));
    assert_eq!(week[6], ymd(2024, 6, 8));
}

#[test]
fn grid_covers_every_employee_and_day() {
    let week = week_dates(ymd(2024, 6, 8));
    let employees: Vec<Employee> = ["a", "b", "c"].iter().map(|id| employee(id)).collect();
    let grid = resolve(&week, &employees, &[]);

    assert_eq!(grid.len(), 3);
    for e in &employees {
        let days = grid.days_for(&e.id).expect("every employee has a row");
        assert_eq!(days.len(), 7);
        for day in DayOfWeek::all() {
            assert_eq!(grid.lookup(&e.id, day), Some(None), "{} day {day}", e.id);
        }
    }
}

#[test]
fn scenario_single_shift_placement() {
    let week = week_dates(ymd(2024, 6, 8));
    let employees = vec![employee("A"), employee("B")];
    let shifts = vec![shift("sh-1", "A", 3, hm(14, 0), hm(22, 0))];
    let grid = resolve(&week, &employees, &shifts);

    let wednesday = DayOfWeek::new(3).unwrap();
    let placed = grid.shift_at("A", wednesday).expect("shift placed at (A, 3)");
    assert_eq!(placed.id, "sh-1");
    assert_eq!(format_display_time(placed.start_time), "2pm");
    assert_eq!(format_display_time(placed.end_time), "10pm");

    for day in DayOfWeek::all().filter(|d| *d != wednesday) {
        assert_eq!(grid.lookup("A", day), Some(None));
    }
    for day in DayOfWeek::all() {
        assert_eq!(grid.lookup("B", day), Some(None));
    }
    assert_eq!(grid.filled().count(), 1);
}

#[test]
fn shift_for_unknown_employee_is_unreachable() {
    let week = week_dates(ymd(2024, 6, 8));
    let grid = resolve(
        &week,
        &[employee("A")],
        &[shift("ghost", "Z", 1, hm(9, 0), hm(17, 0))],
    );
    assert_eq!(grid.lookup("Z", DayOfWeek::new(1).unwrap()), None);
    assert!(grid.employee_ids().all(|id| id == "A"));
    assert_eq!(grid.filled().count(), 0);
}

#[test]
fn half_hour_formatting() {
    assert_eq!(format_display_time(hm(14, 30)), "2:30pm");
    assert_eq!(format_display_time(hm(14, 0)), "2pm");
}
