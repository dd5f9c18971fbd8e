use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A single academic offering as the planner sees it.
///
/// Courses are immutable once fetched. The JSON form of this struct is the
/// drag-transfer payload, so field names follow that wire contract
/// (`generalEd` rather than `general_ed`). Deserialization is lenient about
/// the alternate spellings the course query API uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub course_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Subject area, e.g. `CMPSC` or `MATH`.
    #[serde(default, alias = "subject_area", alias = "subjectArea")]
    pub department: String,
    #[serde(default)]
    pub units: Option<f64>,
    #[serde(
        rename = "generalEd",
        alias = "general_ed",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub general_ed: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub prerequisites: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub unlocks: Vec<serde_json::Value>,
    /// Terms the course is offered in. Empty when the source did not say.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub term: Vec<Term>,
}

impl Course {
    pub fn offered_in(&self, term: Term) -> bool {
        self.term.contains(&term)
    }
}

/// One of the four academic sessions in a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    Fall,
    Winter,
    Spring,
    Summer,
}

impl Term {
    /// Plan grid order.
    pub const ALL: [Term; 4] = [Term::Fall, Term::Winter, Term::Spring, Term::Summer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fall => "Fall",
            Self::Winter => "Winter",
            Self::Spring => "Spring",
            Self::Summer => "Summer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fall" => Some(Self::Fall),
            "winter" => Some(Self::Winter),
            "spring" => Some(Self::Spring),
            "summer" => Some(Self::Summer),
            _ => None,
        }
    }

    /// Digit used in the last position of a quarter code.
    pub fn quarter_digit(&self) -> u8 {
        match self {
            Self::Winter => 1,
            Self::Spring => 2,
            Self::Summer => 3,
            Self::Fall => 4,
        }
    }

    pub fn from_quarter_digit(digit: u8) -> Option<Self> {
        match digit {
            1 => Some(Self::Winter),
            2 => Some(Self::Spring),
            3 => Some(Self::Summer),
            4 => Some(Self::Fall),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A specific term of a specific calendar year, coded `YYYYQ` on the wire
/// (`20241` is Winter 2024, `20244` is Fall 2024).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quarter {
    pub year: u16,
    pub term: Term,
}

impl Quarter {
    pub fn new(year: u16, term: Term) -> Self {
        Self { year, term }
    }

    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.len() != 5 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year = code[..4].parse().ok()?;
        let term = Term::from_quarter_digit(code.as_bytes()[4] - b'0')?;
        Some(Self { year, term })
    }

    pub fn from_code(code: i64) -> Option<Self> {
        if !(0..=99_999).contains(&code) {
            return None;
        }
        let year = u16::try_from(code / 10).ok()?;
        let term = Term::from_quarter_digit(u8::try_from(code % 10).ok()?)?;
        Some(Self { year, term })
    }

    pub fn code(&self) -> i64 {
        i64::from(self.year) * 10 + i64::from(self.term.quarter_digit())
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{}", self.year, self.term.quarter_digit())
    }
}

impl Serialize for Quarter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for Quarter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Code {
            Number(i64),
            Text(String),
        }

        let parsed = match Code::deserialize(deserializer)? {
            Code::Number(n) => Quarter::from_code(n),
            Code::Text(s) => Quarter::parse(&s),
        };
        parsed.ok_or_else(|| serde::de::Error::custom("invalid quarter code, expected YYYYQ"))
    }
}

/// A course row as stored in the database and served by the course endpoints.
///
/// This is the upstream record shape; [`Course`] is what the catalog and
/// planner work with. See [`CourseRecord::into_course`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub id: i64,
    pub quarter: i64,
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub subject_area: String,
    pub units: Option<f64>,
    pub general_ed: Vec<String>,
    pub prerequisites: Vec<serde_json::Value>,
    pub unlocks: Vec<serde_json::Value>,
}

impl CourseRecord {
    /// Convert to a planner course, tagged with the term of the record's quarter.
    pub fn into_course(self) -> Course {
        let term = Quarter::from_code(self.quarter)
            .map(|q| vec![q.term])
            .unwrap_or_default();
        Course {
            course_id: self.course_id.trim().to_string(),
            title: self.title,
            description: self.description,
            department: self.subject_area,
            units: self.units,
            general_ed: self.general_ed,
            prerequisites: self.prerequisites,
            unlocks: self.unlocks,
            term,
        }
    }
}

/// Input for inserting a course record. Missing list fields default to empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourseInput {
    pub course_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subject_area: String,
    #[serde(default)]
    pub units: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub general_ed: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub prerequisites: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub unlocks: Vec<serde_json::Value>,
}

/// Body of `GET /api/course/query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseQueryResponse {
    pub courses: Vec<CourseRecord>,
}

/// Body of `GET /api/course/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseResponse {
    pub course: CourseRecord,
}

/// Treat an explicit JSON `null` the same as a missing list.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
