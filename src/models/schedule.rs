use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::EditorError;
use crate::models::time::{PeriodDuration, TimeLabel, TimeOfDay, MINUTES_PER_DAY};

pub const MAX_PERIODS: usize = 3;

/// Gap left between the end of the last period and a newly added one.
pub const ADD_PERIOD_GAP_MINUTES: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: Option<TimeOfDay>,
    pub duration: PeriodDuration,
}

impl Period {
    pub fn new(start: TimeOfDay, duration: PeriodDuration) -> Self {
        Self {
            start: Some(start),
            duration,
        }
    }

    /// Empty row shown for an available day with nothing configured.
    pub fn placeholder() -> Self {
        Self {
            start: None,
            duration: PeriodDuration::ONE_HOUR,
        }
    }

    /// End in minutes since the start of the day, not wrapped at midnight.
    pub fn end_minutes(&self) -> Option<u32> {
        self.start.map(|s| s.minutes() + self.duration.minutes())
    }

    pub fn end(&self) -> Option<TimeOfDay> {
        self.end_minutes().map(TimeOfDay::wrapping)
    }

    pub fn end_label(&self) -> Option<TimeLabel> {
        self.end_minutes().map(TimeLabel::for_minutes)
    }

    pub fn spans_midnight(&self) -> bool {
        self.end_minutes().is_some_and(|end| end >= MINUTES_PER_DAY)
    }

    /// Half-open `[start, end)` window on a 24-hour line that is not wrapped.
    pub fn window(&self) -> Option<(u32, u32)> {
        Some((self.start?.minutes(), self.end_minutes()?))
    }

    /// Touching windows do not overlap; an unset start never overlaps.
    pub fn overlaps(&self, other: &Period) -> bool {
        match (self.window(), other.window()) {
            (Some((a_start, a_end)), Some((b_start, b_end))) => {
                a_start < b_end && b_start < a_end
            }
            _ => false,
        }
    }

    /// Period suggested by "Add Period": one hour after this one ends, one
    /// hour long.
    pub fn following(&self) -> Period {
        Period {
            start: self
                .end_minutes()
                .map(|end| TimeOfDay::wrapping(end + ADD_PERIOD_GAP_MINUTES)),
            duration: PeriodDuration::ONE_HOUR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day: String,
    pub availability: bool,
    pub periods: Vec<Period>,
}

impl DaySchedule {
    pub fn available(day: &str, periods: Vec<Period>) -> Self {
        Self {
            day: day.to_string(),
            availability: true,
            periods,
        }
    }

    pub fn unavailable(day: &str) -> Self {
        Self {
            day: day.to_string(),
            availability: false,
            periods: vec![],
        }
    }

    pub fn is_full(&self) -> bool {
        self.periods.len() >= MAX_PERIODS
    }

    /// An available day with nothing configured gets one placeholder row.
    pub fn ensure_placeholder(&mut self) {
        if self.availability && self.periods.is_empty() {
            self.periods.push(Period::placeholder());
        }
    }

    /// Checks the label and period count, returning the weekday the label names.
    pub fn check_shape(&self) -> Result<chrono::Weekday, EditorError> {
        let weekday = chrono::Weekday::from_str(self.day.trim())
            .map_err(|_| EditorError::UnknownWeekday(self.day.clone()))?;
        if self.periods.len() > MAX_PERIODS {
            return Err(EditorError::TooManyPeriods {
                day: self.day.clone(),
                count: self.periods.len(),
            });
        }
        Ok(weekday)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(start: u32, duration: u16) -> Period {
        Period::new(
            TimeOfDay::from_minutes(start).unwrap(),
            PeriodDuration::new(duration).unwrap(),
        )
    }

    #[test]
    fn test_end_and_midnight() {
        let late = p(1380, 120);
        assert_eq!(late.end_minutes(), Some(1500));
        assert_eq!(late.end().unwrap().minutes(), 60);
        assert!(late.spans_midnight());
        assert!(late.end_label().unwrap().next_day);

        let ends_at_midnight = p(1380, 60);
        assert!(ends_at_midnight.spans_midnight());

        assert!(!p(540, 60).spans_midnight());
        assert!(!Period::placeholder().spans_midnight());
    }

    #[test]
    fn test_overlap_rules() {
        // second starts inside first
        assert!(p(540, 120).overlaps(&p(600, 60)));
        // containment both ways
        assert!(p(540, 240).overlaps(&p(600, 60)));
        assert!(p(600, 60).overlaps(&p(540, 240)));
        // identical
        assert!(p(540, 60).overlaps(&p(540, 60)));
        // touching
        assert!(!p(540, 60).overlaps(&p(600, 60)));
        assert!(!p(600, 60).overlaps(&p(540, 60)));
        // disjoint
        assert!(!p(540, 60).overlaps(&p(720, 60)));
        // unset never overlaps
        assert!(!Period::placeholder().overlaps(&p(540, 60)));
    }

    #[test]
    fn test_following_period() {
        let next = p(540, 60).following();
        assert_eq!(next.start.unwrap().minutes(), 660);
        assert_eq!(next.duration, PeriodDuration::ONE_HOUR);

        let wrapped = p(1320, 90).following();
        assert_eq!(wrapped.start.unwrap().minutes(), 30);

        assert!(Period::placeholder().following().start.is_none());
    }

    #[test]
    fn test_ensure_placeholder() {
        let mut empty = DaySchedule::available("Monday", vec![]);
        empty.ensure_placeholder();
        assert_eq!(empty.periods, vec![Period::placeholder()]);
        empty.ensure_placeholder();
        assert_eq!(empty.periods.len(), 1);

        let mut off = DaySchedule::unavailable("Sunday");
        off.ensure_placeholder();
        assert!(off.periods.is_empty());
    }

    #[test]
    fn test_check_shape() {
        assert!(DaySchedule::available("Monday", vec![]).check_shape().is_ok());
        assert_eq!(
            DaySchedule::available("tue", vec![]).check_shape(),
            Ok(chrono::Weekday::Tue)
        );
        assert!(matches!(
            DaySchedule::available("Funday", vec![]).check_shape(),
            Err(EditorError::UnknownWeekday(_))
        ));
        let crowded = DaySchedule::available(
            "Friday",
            vec![p(0, 60), p(120, 60), p(240, 60), p(360, 60)],
        );
        assert!(matches!(
            crowded.check_shape(),
            Err(EditorError::TooManyPeriods { count: 4, .. })
        ));
    }
}
