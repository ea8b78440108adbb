//! Odd/even week parity relative to a fixed epoch.

use chrono::{Local, NaiveDate, Weekday};

use super::types::WeekParity;

/// Default parity origin: 2025-09-01, the Monday opening the academic year.
pub const DEFAULT_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(2025, 9, 1) {
  Some(date) => date,
  None => unreachable!(),
};

/// Parity origin for the bi-weekly schedule cycle.
///
/// The epoch's week is week number 1 and counts as odd. Which calendar week
/// is odd is a deployment constant carried in configuration, not something
/// derivable — two campuses can legitimately disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekReference {
  epoch_monday: NaiveDate,
}

impl WeekReference {
  /// Create a reference anchored at the week containing `epoch`.
  ///
  /// The date is normalized to its Monday, so any day of the intended first
  /// week works as the epoch.
  pub fn new(epoch: NaiveDate) -> Self {
    Self {
      epoch_monday: monday_of_week(epoch),
    }
  }

  /// Week number of `date`, counted from the epoch week starting at 1.
  ///
  /// Dates before the epoch keep counting down (0, -1, ..) via euclidean
  /// division, so parity stays periodic across the boundary.
  pub fn week_number(&self, date: NaiveDate) -> i64 {
    let days = (monday_of_week(date) - self.epoch_monday).num_days();
    days.div_euclid(7) + 1
  }

  /// Whether `date` falls on an odd week. Pure — no clock involved.
  pub fn is_week_odd(&self, date: NaiveDate) -> bool {
    self.week_number(date).rem_euclid(2) == 1
  }

  /// Whether the week containing today is odd.
  pub fn is_current_week_odd(&self) -> bool {
    self.is_week_odd(Local::now().date_naive())
  }

  /// The parity of the week containing `date`.
  pub fn parity_of(&self, date: NaiveDate) -> WeekParity {
    if self.is_week_odd(date) {
      WeekParity::Odd
    } else {
      WeekParity::Even
    }
  }
}

impl Default for WeekReference {
  fn default() -> Self {
    Self::new(DEFAULT_EPOCH)
  }
}

fn monday_of_week(date: NaiveDate) -> NaiveDate {
  date.week(Weekday::Mon).first_day()
}
