use std::fmt::Display;

use crate::models::{Course, Quarter};

/// Identifies one in-flight load of the directory.
///
/// Tickets are issued in increasing order; only the most recently issued
/// ticket may replace the directory contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
    quarter: Quarter,
}

impl LoadTicket {
    pub fn quarter(&self) -> Quarter {
        self.quarter
    }
}

/// The in-memory courses of the currently selected quarter.
#[derive(Debug, Default)]
pub struct CourseDirectory {
    courses: Vec<Course>,
    quarter: Option<Quarter>,
    issued: u64,
}

impl CourseDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Quarter of the contents currently held, if any load has completed.
    pub fn quarter(&self) -> Option<Quarter> {
        self.quarter
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Start loading a quarter. Any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self, quarter: Quarter) -> LoadTicket {
        self.issued += 1;
        tracing::debug!(quarter = %quarter, seq = self.issued, "Loading course directory");
        LoadTicket {
            seq: self.issued,
            quarter,
        }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.seq == self.issued
    }

    /// Replace the contents with the result of a load.
    ///
    /// Returns `false` and leaves the directory untouched when a newer load
    /// has been started since `ticket` was issued.
    pub fn finish_load(&mut self, ticket: LoadTicket, courses: Vec<Course>) -> bool {
        if !self.is_current(&ticket) {
            tracing::debug!(
                quarter = %ticket.quarter,
                seq = ticket.seq,
                latest = self.issued,
                "Dropping stale course directory load"
            );
            return false;
        }

        tracing::info!(
            quarter = %ticket.quarter,
            count = courses.len(),
            "Course directory replaced"
        );
        self.courses = courses;
        self.quarter = Some(ticket.quarter);
        true
    }

    /// Record a failed load. The previous contents stay in place.
    pub fn fail_load(&mut self, ticket: LoadTicket, error: impl Display) {
        tracing::error!(
            quarter = %ticket.quarter,
            seq = ticket.seq,
            "Error fetching courses: {}",
            error
        );
    }

    /// Apply a load result, keeping the old contents on error.
    pub fn complete<E: Display>(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Course>, E>,
    ) -> bool {
        match result {
            Ok(courses) => self.finish_load(ticket, courses),
            Err(e) => {
                self.fail_load(ticket, e);
                false
            }
        }
    }
}
