//! Academic progression calculator.
//!
//! Pure functions of (registration date, initial standing, configured
//! academic periods, injected "now") to the member's current academic
//! standing. Nothing here touches the database or the system clock.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::academic_period::AcademicPeriod;

/// Default number of semesters per academic year; the organizational
/// policy constant, overridable via configuration.
pub const DEFAULT_SEMESTERS_PER_YEAR: i32 = 2;

/// Closed set of academic standings.
///
/// A member can never be both a finalist and an alumnus; modeling the
/// standing as a single tagged value makes the exclusion structural
/// rather than a runtime double-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcademicStanding {
    /// Still progressing through the course, or inputs incomplete.
    None,
    /// In the final year of the course.
    Finalist,
    /// Progressed past the course's final year.
    Alumni,
}

impl AcademicStanding {
    pub fn is_finalist(&self) -> bool {
        matches!(self, Self::Finalist)
    }

    pub fn is_alumni(&self) -> bool {
        matches!(self, Self::Alumni)
    }
}

/// Inputs for an academic assessment, as stored on the member row.
/// All optional; any gap degrades the result to `AcademicStanding::None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcademicProfile {
    pub registered_on: Option<NaiveDate>,
    pub initial_year: Option<i32>,
    pub initial_semester: Option<i32>,
    pub course_duration_years: Option<i32>,
}

/// Result of an academic assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcademicAssessment {
    pub current_year: Option<i32>,
    pub current_semester: Option<i32>,
    pub standing: AcademicStanding,
}

impl AcademicAssessment {
    /// Assessment for a member with incomplete inputs.
    pub fn unknown() -> Self {
        Self {
            current_year: None,
            current_semester: None,
            standing: AcademicStanding::None,
        }
    }
}

/// Counts academic periods whose `[starts_on, ends_on]` lies entirely
/// within `(registered_on, as_of]`.
///
/// Periods are assumed non-overlapping and chronologically ordered; a
/// period that straddles either bound does not count.
pub fn elapsed_periods(
    registered_on: NaiveDate,
    as_of: NaiveDate,
    periods: &[AcademicPeriod],
) -> i32 {
    periods
        .iter()
        .filter(|p| p.starts_on > registered_on && p.ends_on <= as_of)
        .count() as i32
}

/// Advances (initial_year, initial_semester) by `elapsed` periods.
///
/// Converts the initial standing to a total-semester count, adds the
/// elapsed periods, and converts back:
/// `total = (year-1)*S + semester + elapsed`,
/// `year = ceil(total/S)`, `semester = ((total-1) mod S) + 1`.
pub fn progress(
    initial_year: i32,
    initial_semester: i32,
    elapsed: i32,
    semesters_per_year: i32,
) -> (i32, i32) {
    let s = semesters_per_year.max(1);
    let total = (initial_year - 1) * s + initial_semester + elapsed;
    let total = total.max(1);

    let current_year = (total + s - 1) / s;
    let current_semester = (total - 1) % s + 1;
    (current_year, current_semester)
}

/// Maps a current year onto the standing set for a course of the given
/// duration.
pub fn standing(current_year: i32, duration_years: i32) -> AcademicStanding {
    if current_year > duration_years {
        AcademicStanding::Alumni
    } else if current_year == duration_years {
        AcademicStanding::Finalist
    } else {
        AcademicStanding::None
    }
}

/// Full assessment of a member's academic position.
///
/// Missing inputs never error; they degrade to `AcademicAssessment::unknown()`.
pub fn assess(
    profile: AcademicProfile,
    periods: &[AcademicPeriod],
    as_of: NaiveDate,
    semesters_per_year: i32,
) -> AcademicAssessment {
    let (Some(registered_on), Some(initial_year), Some(initial_semester)) = (
        profile.registered_on,
        profile.initial_year,
        profile.initial_semester,
    ) else {
        return AcademicAssessment::unknown();
    };

    let elapsed = elapsed_periods(registered_on, as_of, periods);
    let (current_year, current_semester) =
        progress(initial_year, initial_semester, elapsed, semesters_per_year);

    let standing = match profile.course_duration_years {
        Some(duration) => standing(current_year, duration),
        // No course: the member still has a computable year, but
        // finalist/alumni cannot be decided.
        None => AcademicStanding::None,
    };

    AcademicAssessment {
        current_year: Some(current_year),
        current_semester: Some(current_semester),
        standing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(start: NaiveDate, end: NaiveDate) -> AcademicPeriod {
        AcademicPeriod {
            id: Uuid::new_v4(),
            name: format!("{}-{}", start, end),
            starts_on: start,
            ends_on: end,
            created_at: Utc::now(),
        }
    }

    /// Two periods per calendar year, roughly semester-shaped.
    fn semesters_2023_2026() -> Vec<AcademicPeriod> {
        let mut out = Vec::new();
        for year in 2023..=2026 {
            out.push(period(date(year, 1, 15), date(year, 5, 30)));
            out.push(period(date(year, 8, 15), date(year, 12, 10)));
        }
        out
    }

    #[test]
    fn test_elapsed_periods_counts_fully_contained_only() {
        let periods = semesters_2023_2026();
        let registered = date(2023, 9, 1); // mid second-2023 period

        // The straddled 2023 autumn period must not count.
        assert_eq!(elapsed_periods(registered, date(2023, 12, 31), &periods), 0);
        // First full period elapses in May 2024.
        assert_eq!(elapsed_periods(registered, date(2024, 6, 1), &periods), 1);
        assert_eq!(elapsed_periods(registered, date(2024, 12, 31), &periods), 2);
        assert_eq!(elapsed_periods(registered, date(2025, 12, 31), &periods), 4);
    }

    #[test]
    fn test_elapsed_periods_none_before_registration() {
        let periods = semesters_2023_2026();
        assert_eq!(
            elapsed_periods(date(2026, 12, 31), date(2026, 12, 31), &periods),
            0
        );
    }

    #[test]
    fn test_progress_no_elapsed_is_identity() {
        assert_eq!(progress(1, 1, 0, 2), (1, 1));
        assert_eq!(progress(2, 2, 0, 2), (2, 2));
        assert_eq!(progress(4, 1, 0, 2), (4, 1));
    }

    #[test]
    fn test_progress_advances_semesters() {
        // Y1S1 + 1 period -> Y1S2
        assert_eq!(progress(1, 1, 1, 2), (1, 2));
        // Y1S1 + 2 periods -> Y2S1
        assert_eq!(progress(1, 1, 2, 2), (2, 1));
        // Y1S2 + 1 period -> Y2S1
        assert_eq!(progress(1, 2, 1, 2), (2, 1));
        // Y3S2 + 3 periods -> Y5S1
        assert_eq!(progress(3, 2, 3, 2), (5, 1));
    }

    #[test]
    fn test_progress_honors_semesters_per_year() {
        // Trimester system: Y1T1 + 3 -> Y2T1
        assert_eq!(progress(1, 1, 3, 3), (2, 1));
        assert_eq!(progress(1, 3, 1, 3), (2, 1));
    }

    #[test]
    fn test_progress_monotonic_in_elapsed() {
        let mut last_year = 0;
        for elapsed in 0..24 {
            let (year, _) = progress(1, 1, elapsed, 2);
            assert!(year >= last_year, "year regressed at elapsed={}", elapsed);
            last_year = year;
        }
    }

    #[test]
    fn test_standing_transitions() {
        // duration 4: year 3 neither, year 4 finalist, year 5 alumni
        assert_eq!(standing(3, 4), AcademicStanding::None);
        assert_eq!(standing(4, 4), AcademicStanding::Finalist);
        assert_eq!(standing(5, 4), AcademicStanding::Alumni);
    }

    #[test]
    fn test_standing_predicates_are_exclusive() {
        for year in 1..=8 {
            let s = standing(year, 4);
            assert!(!(s.is_finalist() && s.is_alumni()));
        }
    }

    #[test]
    fn test_assess_missing_inputs_degrade_to_unknown() {
        let periods = semesters_2023_2026();
        let as_of = date(2025, 1, 1);

        let missing_registration = AcademicProfile {
            registered_on: None,
            initial_year: Some(1),
            initial_semester: Some(1),
            course_duration_years: Some(4),
        };
        assert_eq!(
            assess(missing_registration, &periods, as_of, 2),
            AcademicAssessment::unknown()
        );

        let missing_year = AcademicProfile {
            registered_on: Some(date(2023, 9, 1)),
            initial_year: None,
            initial_semester: Some(1),
            course_duration_years: Some(4),
        };
        assert_eq!(
            assess(missing_year, &periods, as_of, 2),
            AcademicAssessment::unknown()
        );
    }

    #[test]
    fn test_assess_without_course_computes_year_but_no_standing() {
        let periods = semesters_2023_2026();
        let profile = AcademicProfile {
            registered_on: Some(date(2023, 9, 1)),
            initial_year: Some(1),
            initial_semester: Some(1),
            course_duration_years: None,
        };

        let result = assess(profile, &periods, date(2025, 1, 1), 2);
        assert_eq!(result.current_year, Some(2));
        assert_eq!(result.standing, AcademicStanding::None);
        assert!(!result.standing.is_finalist());
        assert!(!result.standing.is_alumni());
    }

    #[test]
    fn test_assess_finalist_then_alumni_over_time() {
        let periods = semesters_2023_2026();
        // Registered September 2023 as Y3S1 of a 4-year course.
        let profile = AcademicProfile {
            registered_on: Some(date(2023, 9, 1)),
            initial_year: Some(3),
            initial_semester: Some(1),
            course_duration_years: Some(4),
        };

        // Nothing elapsed yet: year 3, neither.
        let at_registration = assess(profile, &periods, date(2023, 9, 2), 2);
        assert_eq!(at_registration.current_year, Some(3));
        assert_eq!(at_registration.standing, AcademicStanding::None);

        // Two periods later: year 4 -> finalist.
        let mid_2025 = assess(profile, &periods, date(2024, 12, 31), 2);
        assert_eq!(mid_2025.current_year, Some(4));
        assert_eq!(mid_2025.standing, AcademicStanding::Finalist);

        // Four periods later: year 5 -> alumni.
        let end_2025 = assess(profile, &periods, date(2025, 12, 31), 2);
        assert_eq!(end_2025.current_year, Some(5));
        assert_eq!(end_2025.standing, AcademicStanding::Alumni);
    }

    #[test]
    fn test_assess_monotonic_over_time() {
        let periods = semesters_2023_2026();
        let profile = AcademicProfile {
            registered_on: Some(date(2023, 2, 1)),
            initial_year: Some(1),
            initial_semester: Some(1),
            course_duration_years: Some(4),
        };

        let mut last_year = 0;
        let mut as_of = date(2023, 3, 1);
        while as_of < date(2027, 1, 1) {
            let result = assess(profile, &periods, as_of, 2);
            let year = result.current_year.unwrap();
            assert!(year >= last_year, "year regressed at {}", as_of);
            last_year = year;
            as_of += chrono::Duration::days(30);
        }
    }
}
