//! Release week calculation.
//!
//! Marvel Unlimited lists comics a few months after their print release, and
//! a week's new issues only show up the day after the week boundary. The
//! window for "this week" is therefore shifted back by a configurable number
//! of months and anchored on the previous full week.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

/// Day on which a release week starts.
pub const WEEK_BOUNDARY: Weekday = Weekday::Sun;

/// Inclusive seven-day date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseWindow {
  pub start: NaiveDate,
  pub end: NaiveDate,
}

impl ReleaseWindow {
  /// Compute the window for `date`, shifted by `month_offset` months.
  ///
  /// Returns `None` only if the arithmetic leaves chrono's date range.
  pub fn for_date(date: NaiveDate, month_offset: i32) -> Option<Self> {
    // Issues for the boundary day are not up yet, count it as the day before.
    let date = if date.weekday() == WEEK_BOUNDARY {
      date.pred_opt()?
    } else {
      date
    };

    let date = shift_months(date, month_offset)?;
    let since_boundary = days_since(date.weekday(), WEEK_BOUNDARY);

    let start = date.checked_sub_days(Days::new(since_boundary + 7))?;
    let end = start.checked_add_days(Days::new(6))?;

    Some(Self { start, end })
  }
}

/// Shift by whole months, keeping the day of month. A day past the end of
/// the target month rolls over into the next one (05-31 minus 3 months is
/// 03-02 in a leap year).
fn shift_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
  let first = date.with_day(1)?;
  let delta = Months::new(months.unsigned_abs());
  let first = if months < 0 {
    first.checked_sub_months(delta)?
  } else {
    first.checked_add_months(delta)?
  };
  first.checked_add_days(Days::new(u64::from(date.day0())))
}

fn days_since(day: Weekday, boundary: Weekday) -> u64 {
  let day = day.num_days_from_monday();
  let boundary = boundary.num_days_from_monday();
  u64::from((day + 7 - boundary) % 7)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn window(y: i32, m: u32, d: u32, offset: i32) -> (NaiveDate, NaiveDate) {
    let w = ReleaseWindow::for_date(date(y, m, d), offset).unwrap();
    (w.start, w.end)
  }

  #[test]
  fn test_window_without_offset() {
    // Wednesday -> previous full Sunday..Saturday week
    assert_eq!(window(2024, 1, 10, 0), (date(2023, 12, 31), date(2024, 1, 6)));
  }

  #[test]
  fn test_window_with_default_offset() {
    // 2024-05-15 -> 2024-02-15 (Thu) -> Sunday 02-11 -> one week back
    assert_eq!(window(2024, 5, 15, -3), (date(2024, 2, 4), date(2024, 2, 10)));
  }

  #[test]
  fn test_boundary_day_matches_previous_day() {
    // 2024-05-19 is a Sunday
    assert_eq!(date(2024, 5, 19).weekday(), Weekday::Sun);
    assert_eq!(window(2024, 5, 19, -3), window(2024, 5, 18, -3));
    assert_eq!(window(2024, 5, 19, 0), window(2024, 5, 18, 0));
  }

  #[test]
  fn test_boundary_day_window() {
    // Sunday -> Saturday 05-18 -> 02-18 (a Sunday) -> back one week
    assert_eq!(window(2024, 5, 19, -3), (date(2024, 2, 11), date(2024, 2, 17)));
  }

  #[test]
  fn test_window_is_seven_days_starting_on_boundary() {
    for day in 1..=28 {
      let w = ReleaseWindow::for_date(date(2023, 7, day), -3).unwrap();
      assert_eq!(w.start.weekday(), WEEK_BOUNDARY);
      assert_eq!((w.end - w.start).num_days(), 6);
      assert!(w.end < date(2023, 7, day));
    }
  }

  #[test]
  fn test_month_offset_rolls_over_short_months() {
    // 2024-05-31 -> 2024-02-31, i.e. 03-02 (Sat) -> Sunday 02-25 -> 02-18
    assert_eq!(window(2024, 5, 31, -3), (date(2024, 2, 18), date(2024, 2, 24)));
  }

  #[test]
  fn test_month_offset_rollover_crosses_week() {
    // 2015-05-29 -> 2015-02-29, i.e. 03-01 (Sun) -> back one week
    assert_eq!(window(2015, 5, 29, -3), (date(2015, 2, 22), date(2015, 2, 28)));
    // 2014-05-30 -> 2014-03-02 (Sun)
    assert_eq!(window(2014, 5, 30, -3), (date(2014, 2, 23), date(2014, 3, 1)));
  }

  #[test]
  fn test_shift_months_rolls_over() {
    assert_eq!(shift_months(date(2023, 3, 31), -1), Some(date(2023, 3, 3)));
    assert_eq!(shift_months(date(2024, 1, 31), 1), Some(date(2024, 3, 2)));
    assert_eq!(shift_months(date(2024, 5, 15), -3), Some(date(2024, 2, 15)));
    assert_eq!(shift_months(date(2024, 12, 31), 0), Some(date(2024, 12, 31)));
  }

  #[test]
  fn test_positive_offset() {
    // 2024-01-10 -> 2024-02-10 (Sat) -> Sunday 02-04 -> 01-28
    assert_eq!(window(2024, 1, 10, 1), (date(2024, 1, 28), date(2024, 2, 3)));
  }
}
