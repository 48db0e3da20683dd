//! Core engine of the deadlines calendar.
//!
//! The calendar is an infinite, vertically scrolled list of week blocks.
//! This crate owns everything about it that is not presentation:
//!
//! - **Week axis** ([`WeekIndexer`]): a fixed axis of [`TOTAL_WEEKS`] week
//!   indices, anchored so that [`ANCHOR_WEEK_INDEX`] is the Monday-started
//!   week containing today.
//! - **Virtualization** ([`Virtualizer`]): which rows intersect the viewport,
//!   from estimated heights refined by per-row measurements.
//! - **Caching** ([`WeekCache`]): per-week deadline data with
//!   stale-while-revalidate, fetch deduplication and garbage collection.
//! - **Header derivation** ([`derive_header_text`]): the Russian month/year
//!   label computed from the week starts visible without overscan.
//! - **Layout** ([`layout_week`]): the month-divider rule that replaces the
//!   1st's day cell with a divider when it falls early enough in its week.
//!
//! [`CalendarEngine`] ties these together. It performs no I/O of its own:
//! each frame lists the week windows to fetch, and completions are applied
//! back in any order.
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//!
//! use chrono::NaiveDate;
//! use zachetka_core::{CalendarEngine, DeadlinesByDay, ANCHOR_WEEK_INDEX};
//!
//! let today = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
//! let mut engine = CalendarEngine::new(today, 12.0);
//! engine.set_viewport(48.0);
//!
//! // A frame lists the weeks to draw and the fetches to run.
//! let now = Instant::now();
//! let frame = engine.frame(4, now);
//! assert!(frame.weeks.iter().any(|week| week.index == ANCHOR_WEEK_INDEX));
//! assert!(!frame.requests.is_empty());
//!
//! // Completions land keyed by week index, in any order.
//! let first = frame.requests[0].clone();
//! engine.apply_fetch(first.week_index, Ok(DeadlinesByDay::new()), now);
//! let next = engine.frame(4, now);
//! let week = next.weeks.iter().find(|week| week.index == first.week_index).unwrap();
//! assert!(week.status.data.is_some());
//! ```

pub mod cache;
pub mod calendar;
pub mod deadline;
pub mod header;
pub mod layout;
pub mod virtualizer;
pub mod week;

pub use cache::{WeekCache, WeekState, WeekStatus, EVICT_AFTER, STALE_AFTER};
pub use calendar::{CalendarEngine, CalendarFrame, FetchRequest, WeekRow, OVERSCAN};
pub use deadline::{CourseColor, Deadline, DeadlinesByDay};
pub use header::{derive_header_text, month_genitive_ru, month_name_ru, HeaderMemo};
pub use layout::{layout_week, season_of, Season, WeekCell};
pub use virtualizer::{VirtualRow, Virtualizer};
pub use week::{WeekIndexer, ANCHOR_WEEK_INDEX, TOTAL_WEEKS};
