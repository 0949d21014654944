use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::errors::EditorError;

pub const MINUTES_PER_DAY: u32 = 1440;

/// Time of day at minute resolution, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        if minutes < MINUTES_PER_DAY {
            Some(TimeOfDay(minutes as u16))
        } else {
            None
        }
    }

    /// Wraps any minute count onto the clock face.
    pub fn wrapping(minutes: u32) -> Self {
        TimeOfDay((minutes % MINUTES_PER_DAY) as u16)
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Self::from_minutes(hour * 60 + minute)
    }

    pub fn minutes(self) -> u32 {
        self.0 as u32
    }

    pub fn hour(self) -> u32 {
        self.minutes() / 60
    }

    pub fn minute(self) -> u32 {
        self.minutes() % 60
    }

    /// 12-hour label such as `9:00 am` or `12:30 pm`.
    pub fn label(self) -> String {
        let hour = match self.hour() % 12 {
            0 => 12,
            h => h,
        };
        let meridiem = if self.hour() < 12 { "am" } else { "pm" };
        format!("{hour}:{:02} {meridiem}", self.minute())
    }

    /// 24-hour `HH:MM` form, the representation the time picker works in.
    pub fn to_24h(self) -> String {
        format!("{:02}:{:02}", self.hour(), self.minute())
    }

    /// Accepts `h:mm am|pm` (any case) or `HH:MM`.
    pub fn parse(s: &str) -> Result<Self, EditorError> {
        let trimmed = s.trim();
        let parsed = NaiveTime::parse_from_str(trimmed, "%I:%M %p")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .map_err(|_| EditorError::InvalidTime(s.to_string()))?;
        Self::from_hm(parsed.hour(), parsed.minute())
            .ok_or_else(|| EditorError::InvalidTime(s.to_string()))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for TimeOfDay {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<u16> for TimeOfDay {
    type Error = EditorError;

    fn try_from(minutes: u16) -> Result<Self, Self::Error> {
        Self::from_minutes(minutes as u32)
            .ok_or_else(|| EditorError::InvalidTime(minutes.to_string()))
    }
}

impl From<TimeOfDay> for u16 {
    fn from(t: TimeOfDay) -> u16 {
        t.0
    }
}

/// Length of a working period: 1 to 12 hours in 30-minute steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct PeriodDuration(u16);

impl PeriodDuration {
    pub const MIN: u16 = 60;
    pub const MAX: u16 = 720;
    pub const STEP: u16 = 30;
    pub const ONE_HOUR: PeriodDuration = PeriodDuration(60);

    pub fn new(minutes: u16) -> Result<Self, EditorError> {
        if (Self::MIN..=Self::MAX).contains(&minutes) && minutes % Self::STEP == 0 {
            Ok(PeriodDuration(minutes))
        } else {
            Err(EditorError::InvalidDuration(minutes))
        }
    }

    pub fn minutes(self) -> u32 {
        self.0 as u32
    }

    /// Label shown in the duration dropdown, e.g. `1 hr 30 mins`.
    pub fn label(self) -> String {
        let hours = self.0 / 60;
        let minutes = self.0 % 60;
        let unit = if hours == 1 { "hr" } else { "hrs" };
        if minutes == 0 {
            format!("{hours} {unit}")
        } else {
            format!("{hours} {unit} {minutes} mins")
        }
    }

    /// Every allowed value, shortest first.
    pub fn choices() -> impl Iterator<Item = PeriodDuration> {
        (Self::MIN..=Self::MAX)
            .step_by(Self::STEP as usize)
            .map(PeriodDuration)
    }
}

impl Default for PeriodDuration {
    fn default() -> Self {
        Self::ONE_HOUR
    }
}

impl TryFrom<u16> for PeriodDuration {
    type Error = EditorError;

    fn try_from(minutes: u16) -> Result<Self, Self::Error> {
        Self::new(minutes)
    }
}

impl From<PeriodDuration> for u16 {
    fn from(d: PeriodDuration) -> u16 {
        d.0
    }
}

/// Display form of an unwrapped minute count. Values at or past midnight are
/// labelled on the clock face and marked as falling on the next day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeLabel {
    pub text: String,
    pub next_day: bool,
}

impl TimeLabel {
    pub fn for_minutes(minutes: u32) -> Self {
        Self {
            text: TimeOfDay::wrapping(minutes).label(),
            next_day: minutes >= MINUTES_PER_DAY,
        }
    }
}

impl fmt::Display for TimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.next_day {
            write!(f, "{} (next day)", self.text)
        } else {
            f.write_str(&self.text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(minutes: u32) -> TimeOfDay {
        TimeOfDay::from_minutes(minutes).unwrap()
    }

    #[test]
    fn test_label_boundaries() {
        assert_eq!(t(0).label(), "12:00 am");
        assert_eq!(t(540).label(), "9:00 am");
        assert_eq!(t(720).label(), "12:00 pm");
        assert_eq!(t(765).label(), "12:45 pm");
        assert_eq!(t(1380).label(), "11:00 pm");
        assert_eq!(t(1439).label(), "11:59 pm");
    }

    #[test]
    fn test_label_round_trip_whole_day() {
        for m in 0..MINUTES_PER_DAY {
            let label = t(m).label();
            let parsed: TimeOfDay = label.parse().unwrap();
            assert_eq!(parsed.minutes(), m, "label {label}");
        }
    }

    #[test]
    fn test_parse_accepts_both_forms() {
        assert_eq!(TimeOfDay::parse("9:00 AM").unwrap().minutes(), 540);
        assert_eq!(TimeOfDay::parse("09:30 pm").unwrap().minutes(), 1290);
        assert_eq!(TimeOfDay::parse("12:00 am").unwrap().minutes(), 0);
        assert_eq!(TimeOfDay::parse("13:15").unwrap().minutes(), 795);
        assert_eq!(TimeOfDay::parse("00:00").unwrap(), TimeOfDay::MIDNIGHT);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(TimeOfDay::parse("").is_err());
        assert!(TimeOfDay::parse("noon").is_err());
        assert!(TimeOfDay::parse("25:00").is_err());
        assert!(TimeOfDay::parse("9:75 am").is_err());
    }

    #[test]
    fn test_to_24h() {
        assert_eq!(t(545).to_24h(), "09:05");
        assert_eq!(t(1439).to_24h(), "23:59");
    }

    #[test]
    fn test_from_minutes_out_of_range() {
        assert!(TimeOfDay::from_minutes(1440).is_none());
        assert_eq!(TimeOfDay::wrapping(1500).minutes(), 60);
    }

    #[test]
    fn test_time_label_next_day() {
        let label = TimeLabel::for_minutes(1500);
        assert_eq!(label.text, "1:00 am");
        assert!(label.next_day);

        let label = TimeLabel::for_minutes(1440);
        assert_eq!(label.text, "12:00 am");
        assert!(label.next_day);

        let label = TimeLabel::for_minutes(1439);
        assert!(!label.next_day);
        assert_eq!(label.to_string(), "11:59 pm");
    }

    #[test]
    fn test_duration_domain() {
        assert!(PeriodDuration::new(60).is_ok());
        assert!(PeriodDuration::new(90).is_ok());
        assert!(PeriodDuration::new(720).is_ok());
        assert!(PeriodDuration::new(30).is_err());
        assert!(PeriodDuration::new(75).is_err());
        assert!(PeriodDuration::new(750).is_err());
        assert_eq!(PeriodDuration::choices().count(), 23);
    }

    #[test]
    fn test_duration_labels() {
        assert_eq!(PeriodDuration::new(60).unwrap().label(), "1 hr");
        assert_eq!(PeriodDuration::new(90).unwrap().label(), "1 hr 30 mins");
        assert_eq!(PeriodDuration::new(120).unwrap().label(), "2 hrs");
        assert_eq!(PeriodDuration::new(630).unwrap().label(), "10 hrs 30 mins");
    }

    #[test]
    fn test_duration_serde_rejects_off_step() {
        let ok: PeriodDuration = serde_json::from_str("150").unwrap();
        assert_eq!(ok.minutes(), 150);
        assert!(serde_json::from_str::<PeriodDuration>("100").is_err());
    }
}
