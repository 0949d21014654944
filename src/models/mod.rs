pub mod schedule;
pub mod snapshot;
pub mod time;

pub use schedule::{DaySchedule, Period, MAX_PERIODS};
pub use snapshot::{DayRecord, WorkingHours};
pub use time::{PeriodDuration, TimeLabel, TimeOfDay, MINUTES_PER_DAY};
