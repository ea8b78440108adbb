//! Domain records for the timetable.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Recurrence rule for a lesson: which weeks of the odd/even cycle it runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekParity {
  Odd,
  Even,
  /// Runs every week. Unknown parity labels normalize here instead of
  /// dropping the lesson.
  #[default]
  Both,
}

impl WeekParity {
  /// Permissive parse; source timetables mix English and Russian labels.
  pub fn parse(raw: &str) -> Self {
    match raw.trim().to_lowercase().as_str() {
      "odd" | "нечетная" | "нечётная" => Self::Odd,
      "even" | "четная" | "чётная" => Self::Even,
      _ => Self::Both,
    }
  }

  /// Does a lesson with this rule run on a week of the given parity?
  pub fn matches(self, week_is_odd: bool) -> bool {
    match self {
      Self::Odd => week_is_odd,
      Self::Even => !week_is_odd,
      Self::Both => true,
    }
  }
}

/// Kind of class a lesson slot holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonKind {
  Lecture,
  Practice,
  Lab,
  #[default]
  Other,
}

impl LessonKind {
  /// Permissive parse mirroring [`WeekParity::parse`]; unknown kinds are
  /// `Other`, never an error.
  pub fn parse(raw: &str) -> Self {
    match raw.trim().to_lowercase().as_str() {
      "lecture" | "лекция" | "лк" => Self::Lecture,
      "practice" | "практика" | "пз" => Self::Practice,
      "lab" | "лабораторная" | "лаб" => Self::Lab,
      _ => Self::Other,
    }
  }
}

/// One recurring timetable slot for a group.
///
/// Immutable once constructed; whichever cache or store currently holds a
/// record owns its copy outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonRecord {
  pub id: i64,
  pub group_key: String,
  /// 1 = Monday .. 6 = Saturday.
  pub day_of_week: u8,
  /// Slot number within the day, 1..=7.
  pub pair_number: u8,
  /// Wall-clock range as printed in the source timetable: "HH:MM-HH:MM",
  /// or just a start "HH:MM".
  pub time: String,
  pub subject: String,
  pub teacher: Option<String>,
  pub room: Option<String>,
  pub building: Option<String>,
  pub kind: LessonKind,
  pub week_parity: WeekParity,
}

impl LessonRecord {
  /// Start bound of the time range, if it parses.
  pub fn start_time(&self) -> Option<NaiveTime> {
    parse_start_time(&self.time)
  }
}

/// Parse the start bound out of `"HH:MM"` or `"HH:MM-HH:MM"`.
///
/// Malformed input is "no time", never an error — the engine deprioritizes
/// such lessons instead of failing, so callers never observe a parse error.
pub fn parse_start_time(raw: &str) -> Option<NaiveTime> {
  let start = match raw.split_once('-') {
    Some((start, _)) => start,
    None => raw,
  };
  NaiveTime::parse_from_str(start.trim(), "%H:%M").ok()
}

/// A faculty as listed by the university.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
  pub code: String,
  pub name: String,
}

/// A student group within a faculty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
  pub code: String,
  pub faculty_code: String,
  /// Course year; 0 when the source data did not carry one.
  pub course: u8,
  pub education_form: Option<String>,
}

impl Group {
  /// Course year, falling back to the number embedded in group codes like
  /// "2-01" when the stored course is 0.
  pub fn course_hint(&self) -> u8 {
    if self.course != 0 {
      return self.course;
    }
    course_from_code(&self.code)
  }
}

// Source data sometimes ships course 0 with the real year buried in the
// group code ("2-01", "2П-01"); 0 means no hint could be recovered.
fn course_from_code(code: &str) -> u8 {
  let code = code.trim();
  if let Some((head, _)) = code.split_once('-') {
    if let Ok(course) = head.trim().parse::<u8>() {
      if (1..=6).contains(&course) {
        return course;
      }
    }
  }
  let digits: String = code.chars().take_while(|c| c.is_ascii_digit()).collect();
  if let Ok(course) = digits.parse::<u8>() {
    if (1..=6).contains(&course) {
      return course;
    }
  }
  0
}

/// A scheduled exam or credit test for a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
  pub id: i64,
  pub group_key: String,
  pub subject: String,
  pub date: NaiveDate,
  pub time: Option<String>,
  pub teacher: Option<String>,
  pub room: Option<String>,
}
