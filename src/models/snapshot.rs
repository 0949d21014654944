use serde::{Deserialize, Serialize};

use crate::errors::EditorError;
use crate::models::schedule::{DaySchedule, Period};
use crate::models::time::{PeriodDuration, TimeOfDay};

/// One working-hours entry as submitted with the schedule form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    #[serde(default)]
    pub from: String,
    pub duration: u16,
}

/// Submission shape of a day. `working_hours` is `null` for unavailable days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub day: String,
    pub working_hours: Option<Vec<WorkingHours>>,
    pub availability: bool,
}

impl DayRecord {
    pub fn from_day(day: &DaySchedule) -> Self {
        let working_hours = day.availability.then(|| {
            day.periods
                .iter()
                .map(|period| WorkingHours {
                    from: period.start.map(|s| s.label()).unwrap_or_default(),
                    duration: period.duration.into(),
                })
                .collect()
        });

        Self {
            day: day.day.clone(),
            working_hours,
            availability: day.availability,
        }
    }

    /// Parses a record supplied by the page. Blank `from` values become
    /// periods with an unset start.
    pub fn into_day_schedule(self) -> Result<DaySchedule, EditorError> {
        let periods = self
            .working_hours
            .unwrap_or_default()
            .into_iter()
            .map(|wh| -> Result<Period, EditorError> {
                let start = if wh.from.trim().is_empty() {
                    None
                } else {
                    Some(TimeOfDay::parse(&wh.from)?)
                };
                Ok(Period {
                    start,
                    duration: PeriodDuration::new(wh.duration)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DaySchedule {
            day: self.day,
            availability: self.availability,
            periods,
        })
    }
}
