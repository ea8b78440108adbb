//! Pure schedule-time queries over lesson records.
//!
//! Every operation here is a function of its arguments: no clock reads
//! beyond the explicit reference instant, no I/O, no mutation. The caller
//! supplies whatever lesson set it currently has — cached, persisted, or
//! freshly fetched — and the engine answers time questions about it.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;

use super::types::LessonRecord;
use super::week::WeekReference;

/// Sort key placing lessons with unparsable times last.
fn start_key(lesson: &LessonRecord) -> (bool, NaiveTime) {
  match lesson.start_time() {
    Some(time) => (false, time),
    None => (true, NaiveTime::MIN),
  }
}

/// Schedule-time computations over caller-supplied lesson sets.
///
/// Holds only the week-parity rule; all data lives with the caller.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleEngine {
  weeks: WeekReference,
}

impl ScheduleEngine {
  pub fn new(weeks: WeekReference) -> Self {
    Self { weeks }
  }

  pub fn week_reference(&self) -> WeekReference {
    self.weeks
  }

  /// Lessons running on `date`, ascending by start time.
  ///
  /// Filters to the date's weekday and week parity; lessons whose time does
  /// not parse sort last, not first.
  pub fn lessons_for_date(&self, lessons: &[LessonRecord], date: NaiveDate) -> Vec<LessonRecord> {
    let day = date.weekday().number_from_monday() as u8;
    day_lessons(lessons, day, self.weeks.is_week_odd(date))
  }

  /// Lessons for a day-of-week (1 = Monday .. 6 = Saturday), under the given
  /// parity or the current week's parity when no override is supplied.
  pub fn lessons_for_day_of_week(
    &self,
    lessons: &[LessonRecord],
    day_of_week: u8,
    is_odd_week: Option<bool>,
  ) -> Vec<LessonRecord> {
    let odd = is_odd_week.unwrap_or_else(|| self.weeks.is_current_week_odd());
    day_lessons(lessons, day_of_week, odd)
  }

  /// Full week view: day-of-week (1..=6) to ordered lessons.
  ///
  /// Parity is fixed once from `start` and applied to all six days — a week
  /// has one parity, it is never recomputed per day.
  pub fn week_schedule(
    &self,
    lessons: &[LessonRecord],
    start: NaiveDate,
  ) -> BTreeMap<u8, Vec<LessonRecord>> {
    let odd = self.weeks.is_week_odd(start);
    (1..=6)
      .map(|day| (day, day_lessons(lessons, day, odd)))
      .collect()
  }

  /// The first lesson strictly after `now`, searching the current week and
  /// then the next.
  ///
  /// In the current week a lesson without a readable start time cannot be
  /// "next" and is skipped. In the next-week fallback such lessons rank
  /// last, so they only surface when nothing else runs that week.
  pub fn next_lesson(&self, lessons: &[LessonRecord], now: NaiveDateTime) -> Option<LessonRecord> {
    let today = now.date();
    let current_day = today.weekday().number_from_monday() as u8;
    let current_time = now.time();
    let this_week_odd = self.weeks.is_week_odd(today);

    let mut candidates: Vec<&LessonRecord> = lessons
      .iter()
      .filter(|lesson| lesson.week_parity.matches(this_week_odd))
      .collect();
    candidates.sort_by_key(|lesson| (lesson.day_of_week, start_key(lesson)));

    for lesson in &candidates {
      let Some(start) = lesson.start_time() else {
        continue;
      };
      if lesson.day_of_week == current_day && start > current_time {
        return Some((*lesson).clone());
      }
      if lesson.day_of_week > current_day {
        return Some((*lesson).clone());
      }
    }

    // Nothing left this week: earliest slot of the following week, under
    // whatever parity that week has.
    let next_week_odd = self.weeks.is_week_odd(today + chrono::Days::new(7));
    lessons
      .iter()
      .filter(|lesson| lesson.week_parity.matches(next_week_odd))
      .min_by_key(|lesson| (lesson.day_of_week, start_key(lesson)))
      .cloned()
  }
}

fn day_lessons(lessons: &[LessonRecord], day_of_week: u8, odd: bool) -> Vec<LessonRecord> {
  let mut day: Vec<LessonRecord> = lessons
    .iter()
    .filter(|lesson| lesson.day_of_week == day_of_week && lesson.week_parity.matches(odd))
    .cloned()
    .collect();
  day.sort_by_key(start_key);
  day
}
