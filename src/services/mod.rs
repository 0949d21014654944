pub mod editor;
pub mod upload;
pub mod validation;

pub use editor::{
    DayControls, DayFault, DayView, InvalidDays, RenderRequest, RenderTarget, ScheduleEditor,
};
pub use validation::{is_valid_schedule, validate_day, ScheduleError};
