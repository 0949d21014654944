use serde::Serialize;

use crate::models::DaySchedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleError {
    #[error("period {period} has no start time")]
    MissingStart { period: usize },

    #[error("periods {first} and {second} overlap")]
    OverlappingPeriods { first: usize, second: usize },
}

/// Checks one day. Unavailable days always pass. Every period needs a start,
/// and no two `[start, start + duration)` windows may share more than an
/// endpoint. Windows are compared without wrapping at midnight.
pub fn validate_day(day: &DaySchedule) -> Result<(), ScheduleError> {
    if !day.availability {
        return Ok(());
    }

    for (i, first) in day.periods.iter().enumerate() {
        if first.start.is_none() {
            return Err(ScheduleError::MissingStart { period: i });
        }
        for (j, second) in day.periods.iter().enumerate().skip(i + 1) {
            if second.start.is_none() {
                return Err(ScheduleError::MissingStart { period: j });
            }
            if first.overlaps(second) {
                return Err(ScheduleError::OverlappingPeriods {
                    first: i,
                    second: j,
                });
            }
        }
    }

    Ok(())
}

pub fn is_valid_schedule(day: &DaySchedule) -> bool {
    validate_day(day).is_ok()
}

/// Stricter check used when the schedule is submitted: an available day with
/// nothing configured still holds its placeholder row, whose start is unset.
pub fn validate_for_submission(day: &DaySchedule) -> Result<(), ScheduleError> {
    if day.availability && day.periods.is_empty() {
        return Err(ScheduleError::MissingStart { period: 0 });
    }
    validate_day(day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Period, PeriodDuration, TimeOfDay};

    fn p(start: u32, duration: u16) -> Period {
        Period::new(
            TimeOfDay::from_minutes(start).unwrap(),
            PeriodDuration::new(duration).unwrap(),
        )
    }

    fn monday(periods: Vec<Period>) -> DaySchedule {
        DaySchedule::available("Monday", periods)
    }

    #[test]
    fn test_unavailable_always_valid() {
        let mut day = monday(vec![p(540, 120), p(600, 60), Period::placeholder()]);
        day.availability = false;
        assert!(is_valid_schedule(&day));
        assert!(validate_for_submission(&DaySchedule::unavailable("Sunday")).is_ok());
    }

    #[test]
    fn test_non_overlapping_valid() {
        assert!(is_valid_schedule(&monday(vec![p(540, 60)])));
        assert!(is_valid_schedule(&monday(vec![
            p(540, 60),
            p(720, 120),
            p(1020, 60)
        ])));
        // order does not matter
        assert!(is_valid_schedule(&monday(vec![p(1020, 60), p(540, 60)])));
    }

    #[test]
    fn test_second_starts_inside_first() {
        let day = monday(vec![p(540, 120), p(600, 60)]);
        assert_eq!(
            validate_day(&day),
            Err(ScheduleError::OverlappingPeriods { first: 0, second: 1 })
        );
    }

    #[test]
    fn test_containment_overlaps() {
        assert!(!is_valid_schedule(&monday(vec![p(600, 60), p(540, 240)])));
        assert!(!is_valid_schedule(&monday(vec![p(540, 60), p(540, 60)])));
    }

    #[test]
    fn test_touching_is_not_overlap() {
        assert!(is_valid_schedule(&monday(vec![p(540, 60), p(600, 60)])));
        assert!(is_valid_schedule(&monday(vec![p(600, 60), p(540, 60)])));
    }

    #[test]
    fn test_windows_not_wrapped() {
        // 23:00 for 2 hours runs to 25:00 on the line, never reaching 00:30
        assert!(is_valid_schedule(&monday(vec![p(1380, 120), p(30, 60)])));
    }

    #[test]
    fn test_missing_start() {
        let day = monday(vec![p(540, 60), Period::placeholder()]);
        assert_eq!(
            validate_day(&day),
            Err(ScheduleError::MissingStart { period: 1 })
        );
        let day = monday(vec![Period::placeholder()]);
        assert_eq!(
            validate_day(&day),
            Err(ScheduleError::MissingStart { period: 0 })
        );
    }

    #[test]
    fn test_empty_available_day() {
        let day = monday(vec![]);
        assert!(is_valid_schedule(&day));
        assert_eq!(
            validate_for_submission(&day),
            Err(ScheduleError::MissingStart { period: 0 })
        );
    }
}
