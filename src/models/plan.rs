use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::course::{Course, Term};

/// One of the four years of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Year {
    #[default]
    #[serde(rename = "Year 1")]
    One,
    #[serde(rename = "Year 2")]
    Two,
    #[serde(rename = "Year 3")]
    Three,
    #[serde(rename = "Year 4")]
    Four,
}

impl Year {
    pub const ALL: [Year; 4] = [Year::One, Year::Two, Year::Three, Year::Four];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::One => "Year 1",
            Self::Two => "Year 2",
            Self::Three => "Year 3",
            Self::Four => "Year 4",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "Year 1" | "1" => Some(Self::One),
            "Year 2" | "2" => Some(Self::Two),
            "Year 3" | "3" => Some(Self::Three),
            "Year 4" | "4" => Some(Self::Four),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
            Self::Three => 2,
            Self::Four => 3,
        }
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn term_index(term: Term) -> usize {
    match term {
        Term::Fall => 0,
        Term::Winter => 1,
        Term::Spring => 2,
        Term::Summer => 3,
    }
}

/// The four term cells of one plan year.
#[derive(Debug, Clone, Default)]
struct YearPlan {
    terms: [Arc<Vec<Course>>; 4],
}

/// A four-year course plan: Year × Term → ordered courses.
///
/// Plans are persistent values. [`Plan::with_cell`] returns a new plan that
/// shares every untouched year and term with the original, so a clone taken
/// before a mutation keeps its contents and cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    years: [Arc<YearPlan>; 4],
}

impl Plan {
    /// A plan with all sixteen cells empty.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, year: Year, term: Term) -> &[Course] {
        &self.years[year.index()].terms[term_index(term)]
    }

    /// Replace one cell, sharing the rest of the structure.
    pub fn with_cell(&self, year: Year, term: Term, courses: Vec<Course>) -> Self {
        let mut year_plan = (*self.years[year.index()]).clone();
        year_plan.terms[term_index(term)] = Arc::new(courses);

        let mut years = self.years.clone();
        years[year.index()] = Arc::new(year_plan);
        Self { years }
    }

    pub fn contains(&self, year: Year, term: Term, course_id: &str) -> bool {
        self.cell(year, term).iter().any(|c| c.course_id == course_id)
    }

    /// Sum of course units in one year. Courses without units count as zero.
    pub fn total_units(&self, year: Year) -> f64 {
        Term::ALL
            .iter()
            .flat_map(|&term| self.cell(year, term))
            .filter_map(|c| c.units)
            .sum()
    }

    pub fn total_units_all(&self) -> f64 {
        Year::ALL.iter().map(|&year| self.total_units(year)).sum()
    }

    pub fn is_empty(&self) -> bool {
        Year::ALL
            .iter()
            .all(|&year| Term::ALL.iter().all(|&term| self.cell(year, term).is_empty()))
    }

    /// Whether two plans share the storage of a cell (no copy was made).
    pub fn shares_cell(&self, other: &Plan, year: Year, term: Term) -> bool {
        Arc::ptr_eq(
            &self.years[year.index()].terms[term_index(term)],
            &other.years[year.index()].terms[term_index(term)],
        )
    }
}

/// Serializes as `{"Year 1": {"Fall": [...], "Winter": [...], ...}, ...}`.
impl Serialize for Plan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct YearCells<'a>(&'a YearPlan);

        impl Serialize for YearCells<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(4))?;
                for term in Term::ALL {
                    map.serialize_entry(term.as_str(), &*self.0.terms[term_index(term)])?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(4))?;
        for year in Year::ALL {
            map.serialize_entry(year.as_str(), &YearCells(&self.years[year.index()]))?;
        }
        map.end()
    }
}

/// One term column of the plan grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermColumn {
    pub term: Term,
    pub courses: Vec<Course>,
}

/// What the plan view renders: the selected year's four terms in grid order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanView {
    pub selected_year: Year,
    pub terms: Vec<TermColumn>,
    /// Units across the selected year's terms.
    pub total_units: f64,
    /// Units across the whole plan.
    pub plan_units: f64,
}

/// Input for changing the selected year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectYearInput {
    pub year: Year,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: &str, units: Option<f64>) -> Course {
        Course {
            course_id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            department: String::new(),
            units,
            general_ed: vec![],
            prerequisites: vec![],
            unlocks: vec![],
            term: vec![],
        }
    }

    #[test]
    fn new_plan_has_sixteen_empty_cells() {
        let plan = Plan::new();
        assert!(plan.is_empty());
        for year in Year::ALL {
            for term in Term::ALL {
                assert!(plan.cell(year, term).is_empty());
            }
        }
    }

    #[test]
    fn with_cell_shares_untouched_cells() {
        let before = Plan::new().with_cell(Year::Two, Term::Spring, vec![course("A", None)]);
        let after = before.with_cell(Year::One, Term::Fall, vec![course("B", None)]);

        assert!(after.shares_cell(&before, Year::Two, Term::Spring));
        assert!(after.shares_cell(&before, Year::One, Term::Winter));
        assert!(!after.shares_cell(&before, Year::One, Term::Fall));
        assert!(before.cell(Year::One, Term::Fall).is_empty());
    }

    #[test]
    fn total_units_skips_courses_without_units() {
        let plan = Plan::new()
            .with_cell(Year::One, Term::Fall, vec![course("A", Some(4.0)), course("B", None)])
            .with_cell(Year::One, Term::Summer, vec![course("C", Some(2.0))])
            .with_cell(Year::Three, Term::Fall, vec![course("D", Some(5.0))]);

        assert_eq!(plan.total_units(Year::One), 6.0);
        assert_eq!(plan.total_units(Year::Two), 0.0);
        assert_eq!(plan.total_units_all(), 11.0);
    }

    #[test]
    fn serializes_as_year_then_term_map() {
        let plan = Plan::new().with_cell(Year::One, Term::Fall, vec![course("CS 1", None)]);
        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json["Year 1"]["Fall"][0]["course_id"], "CS 1");
        assert_eq!(json["Year 4"]["Summer"], serde_json::json!([]));
    }

    #[test]
    fn year_parses_label_and_number() {
        assert_eq!(Year::from_str("Year 3"), Some(Year::Three));
        assert_eq!(Year::from_str("4"), Some(Year::Four));
        assert_eq!(Year::from_str("Year 5"), None);
        assert_eq!(serde_json::to_value(Year::Two).unwrap(), "Year 2");
    }
}
