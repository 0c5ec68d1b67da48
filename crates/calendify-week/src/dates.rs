use calendify_core::model::Schedule;
use chrono::{Days, NaiveDate};

pub const WEEK_LEN: usize = 7;

/// Days added to a stored `end_of_week_date` before expanding it.
///
/// Schedules have always been displayed one day past the stored value, so
/// the persisted date is the day *before* the last displayed day. Changing
/// this shifts every existing schedule.
pub const END_OF_WEEK_OFFSET_DAYS: u64 = 1;

/// Seven consecutive calendar days, oldest first.
pub type WeekDates = [NaiveDate; WEEK_LEN];

/// The 7 calendar days ending on (and including) `reference`:
/// `[R-6, R-5, …, R]`.
///
/// Works on `NaiveDate`, so the step is always one calendar day regardless
/// of daylight-saving transitions. Valid for any date at least six days
/// after `NaiveDate::MIN`; the repository only stores years 1-9999.
pub fn week_dates(reference: NaiveDate) -> WeekDates {
    std::array::from_fn(|i| reference - Days::new((WEEK_LEN - 1 - i) as u64))
}

/// Last displayed day of the week for a stored end-of-week date.
pub fn reference_date(stored_end_of_week: NaiveDate) -> NaiveDate {
    stored_end_of_week + Days::new(END_OF_WEEK_OFFSET_DAYS)
}

/// Displayed week for a persisted schedule.
pub fn schedule_week(schedule: &Schedule) -> WeekDates {
    week_dates(reference_date(schedule.end_of_week_date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn saturday_reference_yields_sunday_to_saturday() {
        let week = week_dates(ymd(2024, 6, 8));
        assert_eq!(
            week,
            [
                ymd(2024, 6, 2),
                ymd(2024, 6, 3),
                ymd(2024, 6, 4),
                ymd(2024, 6, 5),
                ymd(2024, 6, 6),
                ymd(2024, 6, 7),
                ymd(2024, 6, 8),
            ]
        );
    }

    #[test]
    fn crosses_year_boundary() {
        let week = week_dates(ymd(2025, 1, 3));
        assert_eq!(week[0], ymd(2024, 12, 28));
        assert_eq!(week[6], ymd(2025, 1, 3));
    }

    #[test]
    fn stored_date_is_advanced_one_day() {
        assert_eq!(reference_date(ymd(2024, 6, 7)), ymd(2024, 6, 8));
        assert_eq!(reference_date(ymd(2024, 2, 28)), ymd(2024, 2, 29));
        assert_eq!(reference_date(ymd(2023, 12, 31)), ymd(2024, 1, 1));
    }
}
