use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::catalog::{CatalogPage, FilterState};
use crate::models::*;
use crate::transfer::TransferPayload;

// ============================================================
// Error Handling
// ============================================================

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: msg.into() }))
}

/// Log an internal error and return a sanitized response to the client.
/// Only the generic `public` message leaves the server.
fn internal_error(public: &'static str) -> impl FnOnce(anyhow::Error) -> ApiError {
    move |e| {
        tracing::error!("{}: {:#}", public, e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, public)
    }
}

fn parse_term(term: &str) -> Result<Term, ApiError> {
    Term::from_str(term).ok_or_else(|| {
        tracing::warn!("Invalid term in path: {}", term);
        api_error(
            StatusCode::BAD_REQUEST,
            "Term must be one of Fall, Winter, Spring, Summer",
        )
    })
}

fn parse_quarter(code: Option<&str>, default: Quarter) -> Result<Quarter, ApiError> {
    match code.map(str::trim).filter(|c| !c.is_empty()) {
        None => Ok(default),
        Some(code) => Quarter::parse(code).ok_or_else(|| {
            api_error(StatusCode::BAD_REQUEST, "Quarter must be a YYYYQ code")
        }),
    }
}

pub async fn method_not_allowed() -> ApiError {
    api_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Courses
// ============================================================

pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CourseResponse>, ApiError> {
    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "Course ID must be a number"))?;

    state
        .db
        .get_course(id)
        .map_err(internal_error("Failed to fetch course"))?
        .map(|course| Json(CourseResponse { course }))
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Course not found"))
}

#[derive(Debug, Deserialize)]
pub struct QuarterQuery {
    pub quarter: Option<String>,
}

pub async fn query_courses(
    State(state): State<AppState>,
    Query(query): Query<QuarterQuery>,
) -> Result<Json<CourseQueryResponse>, ApiError> {
    let Some(code) = query.quarter.as_deref() else {
        return Err(api_error(StatusCode::BAD_REQUEST, "Quarter is required"));
    };
    let quarter = parse_quarter(Some(code), state.default_quarter)?;

    state
        .db
        .get_courses_by_quarter(quarter)
        .map(|courses| Json(CourseQueryResponse { courses }))
        .map_err(internal_error("Failed to fetch courses"))
}

pub async fn list_quarters(State(state): State<AppState>) -> Result<Json<Vec<Quarter>>, ApiError> {
    state
        .db
        .list_quarters()
        .map(Json)
        .map_err(internal_error("Failed to list quarters"))
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub quarter: Option<String>,
    /// Title search text.
    pub q: Option<String>,
    pub department: Option<String>,
    pub term: Option<String>,
}

pub async fn get_catalog(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogPage>, ApiError> {
    let quarter = parse_quarter(query.quarter.as_deref(), state.default_quarter)?;
    let selected_term = match query.term.as_deref().filter(|t| !t.is_empty()) {
        Some(t) => Some(parse_term(t)?),
        None => None,
    };

    let filters = FilterState {
        search_query: query.q.unwrap_or_default(),
        selected_department: query.department.filter(|d| !d.is_empty()),
        selected_term,
    };

    let courses: Vec<Course> = state
        .db
        .get_courses_by_quarter(quarter)
        .map_err(internal_error("Failed to fetch courses"))?
        .into_iter()
        .map(CourseRecord::into_course)
        .collect();

    Ok(Json(CatalogPage::build(&courses, &filters)))
}

// ============================================================
// Plan
// ============================================================

pub async fn get_plan(State(state): State<AppState>) -> Json<PlanView> {
    let planner = state.planner.lock().expect("planner lock poisoned");
    Json(planner.view())
}

pub async fn get_full_plan(State(state): State<AppState>) -> Json<Plan> {
    let planner = state.planner.lock().expect("planner lock poisoned");
    Json(planner.snapshot())
}

pub async fn select_year(
    State(state): State<AppState>,
    Json(input): Json<SelectYearInput>,
) -> Json<PlanView> {
    let mut planner = state.planner.lock().expect("planner lock poisoned");
    planner.select_year(input.year);
    Json(planner.view())
}

/// Receive a drop onto a term cell of the selected year.
///
/// The request body is the transfer payload and its `Content-Type` the media
/// type. A payload that cannot be decoded is ignored and the unchanged view
/// is returned.
pub async fn drop_course(
    State(state): State<AppState>,
    Path(term): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PlanView>, ApiError> {
    let term = parse_term(&term)?;

    let payload = if body.is_empty() {
        None
    } else {
        match String::from_utf8(body.to_vec()) {
            Ok(text) => {
                let media_type = headers
                    .get(header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                Some(TransferPayload::new(media_type, text))
            }
            Err(e) => {
                tracing::debug!("Ignoring drop payload that is not UTF-8: {}", e);
                None
            }
        }
    };

    let mut planner = state.planner.lock().expect("planner lock poisoned");
    planner.drop_payload(term, payload.as_ref());
    Ok(Json(planner.view()))
}

pub async fn remove_course(
    State(state): State<AppState>,
    Path((term, course_id)): Path<(String, String)>,
) -> Result<Json<PlanView>, ApiError> {
    let term = parse_term(&term)?;

    let mut planner = state.planner.lock().expect("planner lock poisoned");
    planner.remove_course(course_id.trim(), term);
    Ok(Json(planner.view()))
}
