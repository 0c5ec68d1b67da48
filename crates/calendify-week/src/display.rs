use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

/// `2pm` on the hour, `2:30pm` otherwise. Fixed 12-hour convention, no locale.
pub fn format_display_time(time: NaiveTime) -> String {
    if time.minute() == 0 {
        time.format("%-I%P").to_string()
    } else {
        time.format("%-I:%M%P").to_string()
    }
}

/// `2pm - 10pm`
pub fn format_shift_span(start: NaiveTime, end: NaiveTime) -> String {
    format!("{} - {}", format_display_time(start), format_display_time(end))
}

/// Column heading form: `Sat Jun 08 2024`.
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// Listing form: `June 8th, 2024`.
pub fn format_long_date(date: NaiveDate) -> String {
    let day = date.day();
    format!(
        "{} {}{}, {}",
        date.format("%B"),
        day,
        ordinal_suffix(day),
        date.year()
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
