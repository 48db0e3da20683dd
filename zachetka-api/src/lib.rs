//! Platform API surface: the session client, the deadline sources feeding
//! the calendar, and the course-catalog types for the courses tab.
//!
//! Deadline data flows through the [`DeadlineSource`] trait. The live
//! [`ApiClient`] and the offline [`MockDeadlineSource`] both implement it,
//! and [`AnyDeadlineSource`] dispatches between them so the application can
//! pick one at startup.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use zachetka_api::{AnyDeadlineSource, DeadlineSource, MockDeadlineSource};
//!
//! # async fn demo() {
//! let source = AnyDeadlineSource::Mock(MockDeadlineSource::seeded(42));
//! let start = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap().and_hms_opt(23, 59, 59).unwrap();
//! let by_day = source.fetch_deadlines(start, end).await.unwrap();
//! # }
//! ```

mod client;
mod course;
mod error;
mod mock;
mod session;
mod source;

pub use client::ApiClient;
pub use course::{Course, Teacher};
pub use error::ApiError;
pub use mock::{mock_courses, MockDeadlineSource};
pub use session::{LoginRequest, Session, SessionState};
pub use source::{AnyDeadlineSource, AnySourceError, DeadlineSource};
