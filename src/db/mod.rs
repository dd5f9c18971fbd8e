mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, Row};

use crate::models::*;

const COURSE_COLUMNS: &str = "id, quarter, course_id, title, description, subject_area, units,
     general_ed, prerequisites, unlocks";

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "gaucho-graduate")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("courses.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Course operations
    // ============================================================

    pub fn get_course(&self, id: i64) -> Result<Option<CourseRecord>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?"
        ))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(course_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn get_courses_by_quarter(&self, quarter: Quarter) -> Result<Vec<CourseRecord>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE quarter = ? ORDER BY course_id"
        ))?;

        let courses = stmt
            .query_map([quarter.code()], course_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(courses)
    }

    pub fn insert_course(&self, quarter: Quarter, input: CreateCourseInput) -> Result<CourseRecord> {
        let conn = self.conn.lock().expect("database lock poisoned");
        insert_course_row(&conn, quarter, input)
    }

    /// Replace every course of `quarter` with `inputs` in a single transaction.
    ///
    /// Entries repeating a `course_id` already seen in `inputs` are skipped.
    pub fn import_courses(
        &self,
        quarter: Quarter,
        inputs: Vec<CreateCourseInput>,
    ) -> Result<Vec<CourseRecord>> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        let removed = tx.execute("DELETE FROM courses WHERE quarter = ?", [quarter.code()])?;
        if removed > 0 {
            tracing::info!(%quarter, removed, "Replacing existing courses");
        }

        let mut records: Vec<CourseRecord> = Vec::with_capacity(inputs.len());
        for input in inputs {
            let course_id = input.course_id.trim();
            if records.iter().any(|r| r.course_id == course_id) {
                tracing::warn!(%quarter, course_id, "Skipping duplicate course in import");
                continue;
            }
            records.push(insert_course_row(&tx, quarter, input)?);
        }

        tx.commit().context("Failed to commit course import")?;
        Ok(records)
    }

    pub fn delete_quarter(&self, quarter: Quarter) -> Result<usize> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM courses WHERE quarter = ?", [quarter.code()])?;
        Ok(rows)
    }

    /// Quarters that have at least one course, newest first.
    pub fn list_quarters(&self) -> Result<Vec<Quarter>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt =
            conn.prepare("SELECT DISTINCT quarter FROM courses ORDER BY quarter DESC")?;

        let codes = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(codes.into_iter().filter_map(Quarter::from_code).collect())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn insert_course_row(
    conn: &Connection,
    quarter: Quarter,
    input: CreateCourseInput,
) -> Result<CourseRecord> {
    let course_id = input.course_id.trim().to_string();

    conn.execute(
        "INSERT INTO courses (quarter, course_id, title, description, subject_area, units,
             general_ed, prerequisites, unlocks, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            quarter.code(),
            &course_id,
            &input.title,
            &input.description,
            &input.subject_area,
            input.units,
            serde_json::to_string(&input.general_ed)?,
            serde_json::to_string(&input.prerequisites)?,
            serde_json::to_string(&input.unlocks)?,
            Utc::now().to_rfc3339(),
        ),
    )
    .with_context(|| format!("Failed to insert course {} for {}", course_id, quarter))?;

    Ok(CourseRecord {
        id: conn.last_insert_rowid(),
        quarter: quarter.code(),
        course_id,
        title: input.title,
        description: input.description,
        subject_area: input.subject_area,
        units: input.units,
        general_ed: input.general_ed,
        prerequisites: input.prerequisites,
        unlocks: input.unlocks,
    })
}

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<CourseRecord> {
    Ok(CourseRecord {
        id: row.get(0)?,
        quarter: row.get(1)?,
        course_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        subject_area: row.get(5)?,
        units: row.get(6)?,
        general_ed: parse_json_list(row.get::<_, String>(7)?),
        prerequisites: parse_json_list(row.get::<_, String>(8)?),
        unlocks: parse_json_list(row.get::<_, String>(9)?),
    })
}

fn parse_json_list<T: serde::de::DeserializeOwned>(s: String) -> Vec<T> {
    serde_json::from_str(&s).unwrap_or_default()
}
