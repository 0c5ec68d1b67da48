//! `calendify-week`: resolves a schedule into its displayed week.
//!
//! # Overview
//!
//! Pure functions only: callers fetch the schedule, its store's employees
//! and its shifts (already scoped to the requesting user) and hand them in.
//! Nothing here touches the database or the network.
//!
//! | Function                 | Produces                                          |
//! |--------------------------|---------------------------------------------------|
//! | [`week_dates`]           | The 7 calendar days ending on a reference date    |
//! | [`reference_date`]       | The reference date for a stored end-of-week date  |
//! | [`resolve`]              | employee → day-of-week → shift / no shift         |
//! | [`format_display_time`]  | `2pm`, `2:30pm`                                   |
//! | [`format_display_date`]  | `Sat Jun 08 2024`                                 |

pub mod dates;
pub mod display;
pub mod grid;

pub use dates::{reference_date, schedule_week, week_dates, WeekDates, END_OF_WEEK_OFFSET_DAYS};
pub use display::{format_display_date, format_display_time, format_long_date, format_shift_span};
pub use grid::{resolve, ShiftGrid};
