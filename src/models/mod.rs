//! Domain models for gaucho-graduate.
//!
//! # Core Concepts
//!
//! - [`Course`]: an academic offering as the catalog and planner see it. Its
//!   JSON form is the drag-transfer payload.
//! - [`CourseRecord`]: the stored/upstream row a [`Course`] is derived from,
//!   keyed by numeric id and [`Quarter`].
//! - [`Plan`]: the four-year, four-term-per-year assignment of courses.
//!   Plans are persistent values that share unchanged cells between versions.

mod course;
mod plan;

pub use course::*;
pub use plan::*;
