//! Canonical timetable model.
//!
//! These types are shared by every ingestion path:
//! - `ThirdPartyCourse`/`ThirdPartyResult`: the discrete, as-received form
//! - `WeekRange`/`PeriodRange`: folded intermediate ranges
//! - `CanonicalSession`: one contiguous-week, contiguous-period block on one weekday
//! - `CanonicalCourse`: the persisted entity handed to the storage collaborator

mod course;
mod range;
mod session;
mod third_party;

pub use course::{CanonicalCourse, PALETTE, palette_color_for};
pub use range::{PeriodRange, WeekParity, WeekRange};
pub use session::CanonicalSession;
pub use third_party::{ThirdPartyCourse, ThirdPartyResult};
