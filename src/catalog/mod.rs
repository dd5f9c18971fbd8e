//! Course directory and catalog filtering.
//!
//! The directory holds the courses of one quarter and is replaced wholesale
//! whenever a new quarter is loaded. Filtering is a pure function of the
//! directory contents and a [`FilterState`].

mod directory;

pub use directory::*;

use serde::{Deserialize, Serialize};

use crate::models::{Course, Term};

/// The catalog's search inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// Case-insensitive substring matched against course titles.
    #[serde(default)]
    pub search_query: String,
    /// Exact department to keep. `None` keeps every department.
    #[serde(default)]
    pub selected_department: Option<String>,
    /// Term the course must be offered in. `None` keeps every course.
    #[serde(default)]
    pub selected_term: Option<Term>,
}

impl FilterState {
    /// Whether `course` passes all three predicates. An empty department
    /// string is treated the same as no department.
    pub fn matches(&self, course: &Course) -> bool {
        let query = self.search_query.to_lowercase();
        (query.is_empty() || course.title.to_lowercase().contains(&query))
            && self
                .selected_department
                .as_deref()
                .filter(|d| !d.is_empty())
                .map_or(true, |dept| course.department == dept)
            && self.selected_term.map_or(true, |term| course.offered_in(term))
    }
}

/// Filter courses by title text, department, and term, keeping input order.
pub fn filter_courses(
    courses: &[Course],
    query: &str,
    department: Option<&str>,
    term: Option<Term>,
) -> Vec<Course> {
    apply_filters(
        courses,
        &FilterState {
            search_query: query.to_string(),
            selected_department: department.map(str::to_string),
            selected_term: term,
        },
    )
}

/// Apply a [`FilterState`] to a course list.
pub fn apply_filters(courses: &[Course], filters: &FilterState) -> Vec<Course> {
    courses
        .iter()
        .filter(|c| filters.matches(c))
        .cloned()
        .collect()
}

/// Distinct departments in first-occurrence order.
pub fn department_options(courses: &[Course]) -> Vec<String> {
    let mut seen = Vec::new();
    for course in courses {
        if !seen.contains(&course.department) {
            seen.push(course.department.clone());
        }
    }
    seen
}

/// Distinct offered terms in first-occurrence order.
pub fn term_options(courses: &[Course]) -> Vec<Term> {
    let mut seen = Vec::new();
    for term in courses.iter().flat_map(|c| &c.term) {
        if !seen.contains(term) {
            seen.push(*term);
        }
    }
    seen
}

/// A filtered catalog listing along with the selector options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub courses: Vec<Course>,
    pub departments: Vec<String>,
    pub terms: Vec<Term>,
}

impl CatalogPage {
    /// Options are derived from the full directory, not the filtered list, so
    /// narrowing one selector never hides choices from the others.
    pub fn build(courses: &[Course], filters: &FilterState) -> Self {
        Self {
            courses: apply_filters(courses, filters),
            departments: department_options(courses),
            terms: term_options(courses),
        }
    }
}
