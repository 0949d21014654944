use serde::Serialize;

use crate::errors::EditorError;
use crate::models::{
    DayRecord, DaySchedule, Period, PeriodDuration, TimeLabel, TimeOfDay, MINUTES_PER_DAY,
};
use crate::services::validation::{is_valid_schedule, validate_for_submission, ScheduleError};

/// Enablement of the per-day buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayControls {
    pub add_period: bool,
    pub copy_to_next_day: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum RenderTarget {
    /// The whole day fragment, rows included.
    Day,
    /// A single period row.
    Period(usize),
    /// Buttons and the error indicator.
    Controls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderRequest {
    pub day: usize,
    pub target: RenderTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayFault {
    pub day: usize,
    pub error: ScheduleError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{} day(s) failed validation", .faults.len())]
pub struct InvalidDays {
    pub faults: Vec<DayFault>,
}

impl InvalidDays {
    pub fn indices(&self) -> Vec<usize> {
        self.faults.iter().map(|f| f.day).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodView {
    pub index: usize,
    pub start: Option<String>,
    pub start_24h: Option<String>,
    pub duration: u16,
    pub duration_label: String,
    pub end: Option<TimeLabel>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayView {
    pub index: usize,
    pub day: String,
    pub availability: bool,
    pub periods: Vec<PeriodView>,
    pub flagged: bool,
    pub controls: DayControls,
}

#[derive(Debug, Clone)]
struct DayState {
    flagged: bool,
    controls: DayControls,
}

/// Weekly working-hours editor.
///
/// Owns the day records for one editing session. Every command runs to
/// completion, keeps per-day error indicators and button enablement in step
/// with the model, and queues the fragments that need redrawing.
#[derive(Debug, Clone)]
pub struct ScheduleEditor {
    days: Vec<DaySchedule>,
    states: Vec<DayState>,
    pending: Vec<RenderRequest>,
}

impl ScheduleEditor {
    pub fn new(
        mut days: Vec<DaySchedule>,
        error_days: Option<&[usize]>,
    ) -> Result<Self, EditorError> {
        if days.is_empty() {
            return Err(EditorError::EmptySchedule);
        }
        let mut seen = Vec::with_capacity(days.len());
        for day in &days {
            let weekday = day.check_shape()?;
            if seen.contains(&weekday) {
                return Err(EditorError::DuplicateDay(day.day.clone()));
            }
            seen.push(weekday);
        }
        let error_days = error_days.unwrap_or_default();
        if let Some(&bad) = error_days.iter().find(|&&i| i >= days.len()) {
            return Err(EditorError::DayOutOfRange(bad));
        }

        let count = days.len();
        let states = days
            .iter_mut()
            .enumerate()
            .map(|(index, day)| {
                day.ensure_placeholder();
                DayState {
                    flagged: error_days.contains(&index),
                    controls: DayControls {
                        add_period: day.availability && !day.is_full(),
                        copy_to_next_day: day.availability && index + 1 < count,
                    },
                }
            })
            .collect();

        tracing::debug!(days = count, flagged = error_days.len(), "schedule editor initialized");

        Ok(Self {
            days,
            states,
            pending: vec![],
        })
    }

    pub fn from_records(
        records: Vec<DayRecord>,
        error_days: Option<&[usize]>,
    ) -> Result<Self, EditorError> {
        let days = records
            .into_iter()
            .map(DayRecord::into_day_schedule)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(days, error_days)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn days(&self) -> &[DaySchedule] {
        &self.days
    }

    pub fn day(&self, day: usize) -> Option<&DaySchedule> {
        self.days.get(day)
    }

    pub fn is_flagged(&self, day: usize) -> bool {
        self.states.get(day).is_some_and(|s| s.flagged)
    }

    pub fn controls(&self, day: usize) -> Option<DayControls> {
        self.states.get(day).map(|s| s.controls)
    }

    // ── Commands ──

    /// Marking a day unavailable keeps its periods but ignores them.
    pub fn set_availability(&mut self, day: usize, available: bool) -> Result<(), EditorError> {
        self.check_day(day)?;
        let has_next = day + 1 < self.days.len();

        let schedule = &mut self.days[day];
        schedule.availability = available;
        schedule.ensure_placeholder();
        let full = schedule.is_full();
        let last = schedule.periods.len().checked_sub(1);

        let controls = &mut self.states[day].controls;
        controls.copy_to_next_day = available && has_next;
        controls.add_period = available && !full;

        match last {
            Some(last) if available => self.recalc(day, last),
            _ => self.revalidate(day),
        }
        self.request(day, RenderTarget::Day);
        Ok(())
    }

    /// `None` is the picker's "no selection": the start is cleared and the day
    /// is flagged until a time is picked again.
    pub fn set_period_start(
        &mut self,
        day: usize,
        period: usize,
        start: Option<TimeOfDay>,
    ) -> Result<(), EditorError> {
        self.check_period(day, period)?;
        self.days[day].periods[period].start = start;

        match start {
            Some(_) => self.recalc(day, period),
            None => {
                tracing::debug!(day, period, "period start cleared");
                self.states[day].flagged = self.days[day].availability;
                self.request(day, RenderTarget::Period(period));
                self.request(day, RenderTarget::Controls);
            }
        }
        Ok(())
    }

    pub fn set_period_duration(
        &mut self,
        day: usize,
        period: usize,
        duration: PeriodDuration,
    ) -> Result<(), EditorError> {
        self.check_period(day, period)?;
        self.days[day].periods[period].duration = duration;
        self.recalc(day, period);
        Ok(())
    }

    /// Appends a period one hour after the last one ends. Does nothing on an
    /// unavailable or full day.
    pub fn add_period(&mut self, day: usize) -> Result<(), EditorError> {
        self.check_day(day)?;
        let schedule = &mut self.days[day];
        if !schedule.availability || schedule.is_full() {
            return Ok(());
        }

        let next = schedule
            .periods
            .last()
            .map(Period::following)
            .unwrap_or_else(Period::placeholder);
        schedule.periods.push(next);
        let index = schedule.periods.len() - 1;

        if schedule.is_full() {
            self.states[day].controls.add_period = false;
        }
        self.revalidate(day);
        self.request(day, RenderTarget::Period(index));
        self.request(day, RenderTarget::Controls);
        Ok(())
    }

    /// Removes a period, shifting later ones down. Removing the last period is
    /// allowed and leaves the day with nothing configured.
    pub fn remove_period(&mut self, day: usize, period: usize) -> Result<(), EditorError> {
        self.check_period(day, period)?;
        let schedule = &mut self.days[day];
        schedule.periods.remove(period);
        let add = schedule.availability && !schedule.is_full();
        let last = schedule.periods.len().checked_sub(1);

        self.states[day].controls.add_period = add;
        match last {
            Some(last) => self.recalc(day, last),
            None => self.revalidate(day),
        }
        self.request(day, RenderTarget::Day);
        Ok(())
    }

    /// Replaces the following day's periods with a copy of this day's.
    pub fn copy_to_next_day(&mut self, day: usize) -> Result<(), EditorError> {
        self.check_day(day)?;
        let next = day + 1;
        if next >= self.days.len() {
            return Err(EditorError::NoNextDay(day));
        }
        if !self.days[day].availability {
            return Ok(());
        }

        let periods = self.days[day].periods.clone();
        let target = &mut self.days[next];
        target.periods = periods;
        let add = target.availability && !target.is_full();
        let last = target.periods.len().checked_sub(1);

        self.states[next].controls.add_period = add;
        match last {
            Some(last) => self.recalc(next, last),
            None => self.revalidate(next),
        }
        self.request(next, RenderTarget::Day);
        Ok(())
    }

    /// Validates every day. On success returns the submission records; on
    /// failure returns which days are invalid and why. Never mutates.
    pub fn collect(&self) -> Result<Vec<DayRecord>, InvalidDays> {
        let faults: Vec<DayFault> = self
            .days
            .iter()
            .enumerate()
            .filter_map(|(day, schedule)| {
                validate_for_submission(schedule)
                    .err()
                    .map(|error| DayFault { day, error })
            })
            .collect();

        if !faults.is_empty() {
            return Err(InvalidDays { faults });
        }

        Ok(self.days.iter().map(DayRecord::from_day).collect())
    }

    pub fn view(&self) -> Vec<DayView> {
        self.days
            .iter()
            .zip(&self.states)
            .enumerate()
            .map(|(index, (schedule, state))| DayView {
                index,
                day: schedule.day.clone(),
                availability: schedule.availability,
                periods: schedule
                    .periods
                    .iter()
                    .enumerate()
                    .map(|(i, period)| PeriodView {
                        index: i,
                        start: period.start.map(TimeOfDay::label),
                        start_24h: period.start.map(TimeOfDay::to_24h),
                        duration: period.duration.into(),
                        duration_label: period.duration.label(),
                        end: period.end_label(),
                    })
                    .collect(),
                flagged: state.flagged,
                controls: state.controls,
            })
            .collect()
    }

    pub fn drain_render_requests(&mut self) -> Vec<RenderRequest> {
        std::mem::take(&mut self.pending)
    }

    // ── Internals ──

    fn check_day(&self, day: usize) -> Result<(), EditorError> {
        if day < self.days.len() {
            Ok(())
        } else {
            Err(EditorError::DayOutOfRange(day))
        }
    }

    fn check_period(&self, day: usize, period: usize) -> Result<(), EditorError> {
        self.check_day(day)?;
        if period < self.days[day].periods.len() {
            Ok(())
        } else {
            Err(EditorError::PeriodOutOfRange { day, period })
        }
    }

    fn revalidate(&mut self, day: usize) {
        self.states[day].flagged = !is_valid_schedule(&self.days[day]);
        self.request(day, RenderTarget::Controls);
    }

    /// Refreshes a period's end, the day's indicator, and "Add Period". A
    /// period running to or past midnight leaves no room for another one.
    fn recalc(&mut self, day: usize, period: usize) {
        self.revalidate(day);
        self.request(day, RenderTarget::Period(period));
        let schedule = &self.days[day];
        let Some(end) = schedule.periods.get(period).and_then(Period::end_minutes) else {
            return;
        };
        let add = schedule.availability && end < MINUTES_PER_DAY && !schedule.is_full();
        self.states[day].controls.add_period = add;
    }

    fn request(&mut self, day: usize, target: RenderTarget) {
        let req = RenderRequest { day, target };
        if !self.pending.contains(&req) {
            self.pending.push(req);
        }
    }
}
