//! The four-year plan state machine.
//!
//! A [`Planner`] owns the plan and the selected year. Every add or remove
//! targets the selected year; the grid only ever shows one year at a time.
//! Mutations swap in a new [`Plan`] value rather than editing cells in place.

use crate::models::{Course, Plan, PlanView, TermColumn, Term, Year};
use crate::transfer::{self, TransferPayload};

#[derive(Debug, Clone, Default)]
pub struct Planner {
    plan: Plan,
    selected_year: Year,
}

impl Planner {
    /// Empty plan with Year 1 selected.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Cheap copy of the current plan that later mutations will not affect.
    pub fn snapshot(&self) -> Plan {
        self.plan.clone()
    }

    pub fn selected_year(&self) -> Year {
        self.selected_year
    }

    pub fn select_year(&mut self, year: Year) {
        self.selected_year = year;
    }

    /// Append a course to the selected year's `term` cell.
    ///
    /// A course already in that cell is not added again. Returns whether the
    /// plan changed.
    pub fn add_course(&mut self, course: Course, term: Term) -> bool {
        let year = self.selected_year;
        if self.plan.contains(year, term, &course.course_id) {
            tracing::debug!(course_id = %course.course_id, %year, %term, "Course already planned");
            return false;
        }

        let mut courses = self.plan.cell(year, term).to_vec();
        tracing::debug!(course_id = %course.course_id, %year, %term, "Adding course");
        courses.push(course);
        self.plan = self.plan.with_cell(year, term, courses);
        true
    }

    /// Remove every entry with `course_id` from the selected year's `term`
    /// cell. Returns how many entries were removed.
    pub fn remove_course(&mut self, course_id: &str, term: Term) -> usize {
        let year = self.selected_year;
        let cell = self.plan.cell(year, term);
        let kept: Vec<Course> = cell
            .iter()
            .filter(|c| c.course_id != course_id)
            .cloned()
            .collect();

        let removed = cell.len() - kept.len();
        if removed > 0 {
            tracing::debug!(course_id, %year, %term, removed, "Removing course");
            self.plan = self.plan.with_cell(year, term, kept);
        }
        removed
    }

    /// Handle a drop onto the selected year's `term` cell.
    ///
    /// Absent or malformed payloads are ignored. Returns whether the plan
    /// changed.
    pub fn drop_payload(&mut self, term: Term, payload: Option<&TransferPayload>) -> bool {
        match transfer::decode(payload) {
            Some(course) => self.add_course(course, term),
            None => false,
        }
    }

    pub fn view(&self) -> PlanView {
        let year = self.selected_year;
        PlanView {
            selected_year: year,
            terms: Term::ALL
                .iter()
                .map(|&term| TermColumn {
                    term,
                    courses: self.plan.cell(year, term).to_vec(),
                })
                .collect(),
            total_units: self.plan.total_units(year),
            plan_units: self.plan.total_units_all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: &str, title: &str, units: Option<f64>) -> Course {
        Course {
            course_id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            department: String::new(),
            units,
            general_ed: vec![],
            prerequisites: vec![],
            unlocks: vec![],
            term: vec![],
        }
    }

    fn ids(courses: &[Course]) -> Vec<&str> {
        courses.iter().map(|c| c.course_id.as_str()).collect()
    }

    #[test]
    fn drops_append_in_order() {
        let mut planner = Planner::new();
        let cs1 = transfer::encode(&course("CS 1", "Intro", Some(4.0))).unwrap();
        let math = transfer::encode(&course("MATH 3A", "Calculus", Some(4.0))).unwrap();

        assert!(planner.drop_payload(Term::Fall, Some(&cs1)));
        assert!(planner.drop_payload(Term::Fall, Some(&math)));

        assert_eq!(
            ids(planner.plan().cell(Year::One, Term::Fall)),
            vec!["CS 1", "MATH 3A"]
        );

        assert_eq!(planner.remove_course("CS 1", Term::Fall), 1);
        assert_eq!(ids(planner.plan().cell(Year::One, Term::Fall)), vec!["MATH 3A"]);
    }

    #[test]
    fn add_then_remove_restores_cell() {
        let mut planner = Planner::new();
        planner.add_course(course("A", "A", None), Term::Winter);
        let before = planner.plan().cell(Year::One, Term::Winter).to_vec();

        planner.add_course(course("B", "B", None), Term::Winter);
        planner.remove_course("B", Term::Winter);

        assert_eq!(planner.plan().cell(Year::One, Term::Winter), before.as_slice());
    }

    #[test]
    fn remove_on_empty_or_unmatched_cell_is_noop() {
        let mut planner = Planner::new();
        let before = planner.snapshot();
        assert_eq!(planner.remove_course("X", Term::Spring), 0);
        assert!(planner.plan().shares_cell(&before, Year::One, Term::Spring));

        planner.add_course(course("A", "A", None), Term::Spring);
        let before = planner.snapshot();
        assert_eq!(planner.remove_course("X", Term::Spring), 0);
        assert!(planner.plan().shares_cell(&before, Year::One, Term::Spring));
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let mut planner = Planner::new();
        assert!(planner.add_course(course("A", "A", None), Term::Fall));
        assert!(!planner.add_course(course("A", "A again", None), Term::Fall));
        assert_eq!(planner.plan().cell(Year::One, Term::Fall).len(), 1);

        // Other cells may still hold the same course.
        assert!(planner.add_course(course("A", "A", None), Term::Winter));
    }

    #[test]
    fn mutations_target_selected_year() {
        let mut planner = Planner::new();
        planner.select_year(Year::Three);
        planner.add_course(course("A", "A", None), Term::Summer);

        assert!(planner.plan().cell(Year::One, Term::Summer).is_empty());
        assert_eq!(ids(planner.plan().cell(Year::Three, Term::Summer)), vec!["A"]);

        planner.select_year(Year::One);
        assert_eq!(planner.remove_course("A", Term::Summer), 0);
        assert_eq!(planner.plan().cell(Year::Three, Term::Summer).len(), 1);
    }

    #[test]
    fn malformed_drop_leaves_plan_untouched() {
        let mut planner = Planner::new();
        let bad = TransferPayload::new(transfer::COURSE_MEDIA_TYPE, "not json");
        assert!(!planner.drop_payload(Term::Fall, Some(&bad)));
        assert!(!planner.drop_payload(Term::Fall, None));
        assert!(planner.plan().is_empty());
    }

    #[test]
    fn snapshot_is_unaffected_by_later_mutations() {
        let mut planner = Planner::new();
        planner.add_course(course("A", "A", None), Term::Fall);
        let snapshot = planner.snapshot();

        planner.remove_course("A", Term::Fall);
        planner.add_course(course("B", "B", None), Term::Fall);

        assert_eq!(ids(snapshot.cell(Year::One, Term::Fall)), vec!["A"]);
    }

    #[test]
    fn view_shows_selected_year_with_derived_units() {
        let mut planner = Planner::new();
        planner.add_course(course("A", "A", Some(4.0)), Term::Fall);
        planner.add_course(course("B", "B", Some(5.0)), Term::Spring);
        planner.select_year(Year::Two);
        planner.add_course(course("C", "C", Some(3.0)), Term::Fall);

        let view = planner.view();
        assert_eq!(view.selected_year, Year::Two);
        let terms: Vec<Term> = view.terms.iter().map(|c| c.term).collect();
        assert_eq!(terms, Term::ALL.to_vec());
        assert_eq!(view.total_units, 3.0);
        assert_eq!(view.plan_units, 12.0);
    }
}
