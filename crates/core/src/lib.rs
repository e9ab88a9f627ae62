#![forbid(unsafe_code)]

pub mod calendar;
pub mod checklist;
pub mod model;
pub mod schedule;
pub mod time;

pub use calendar::DateRange;
pub use checklist::{Checklist, NodeKey, ToggleOutcome};
pub use schedule::{DayPlan, ItemFilter, ProgressStats, RevisionItem, RevisionSchedule};
pub use time::Clock;
