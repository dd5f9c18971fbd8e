//! HTTP client for the remote course API.
//!
//! Requests can be routed through a URL-prefix proxy (the kind used to get
//! around CORS in a browser), configured via `GAUCHO_PROXY_URL`.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::catalog::CourseDirectory;
use crate::config::AppConfig;
use crate::models::{Course, CourseRecord, CourseResponse, Quarter};

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Unexpected API structure: {0}")]
    MalformedPayload(String),
}

/// A course as returned by the query endpoint, before normalization.
///
/// Every field but the id and title is optional upstream.
#[derive(Debug, Deserialize)]
struct WireCourse {
    course_id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    subject_area: Option<String>,
    #[serde(default)]
    units: Option<f64>,
    #[serde(default)]
    general_ed: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    prerequisites: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    unlocks: Option<Vec<serde_json::Value>>,
}

impl WireCourse {
    fn into_course(self, quarter: Quarter) -> Course {
        let general_ed = self
            .general_ed
            .unwrap_or_default()
            .into_iter()
            .map(|tag| match tag {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();

        Course {
            course_id: self.course_id.trim().to_string(),
            title: self.title,
            description: self.description.unwrap_or_default(),
            department: self.subject_area.unwrap_or_default(),
            units: self.units,
            general_ed,
            prerequisites: self.prerequisites.unwrap_or_default(),
            unlocks: self.unlocks.unwrap_or_default(),
            term: vec![quarter.term],
        }
    }
}

/// Normalize a query response body into planner courses.
///
/// Fails when `courses` is missing or not an array. Individual entries that
/// do not parse are skipped with a warning.
pub fn parse_query_response(
    body: &serde_json::Value,
    quarter: Quarter,
) -> Result<Vec<Course>, ClientError> {
    let entries = body
        .get("courses")
        .and_then(|c| c.as_array())
        .ok_or_else(|| {
            ClientError::MalformedPayload("expected a `courses` array".to_string())
        })?;

    let mut courses = Vec::with_capacity(entries.len());
    for entry in entries {
        match WireCourse::deserialize(entry) {
            Ok(wire) => courses.push(wire.into_course(quarter)),
            Err(e) => tracing::warn!(%quarter, "Skipping unparseable course entry: {}", e),
        }
    }
    Ok(courses)
}

#[derive(Debug, Clone)]
pub struct CourseClient {
    base_url: String,
    proxy_url: Option<String>,
    client: Client,
}

impl CourseClient {
    pub fn new(base_url: impl Into<String>, proxy_url: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            proxy_url,
            client: Client::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.course_api_url.clone(), config.proxy_url.clone())
    }

    /// Full request URL for an API path, including the proxy prefix.
    pub fn url(&self, path: &str) -> String {
        let target = format!("{}{}", self.base_url, path);
        match &self.proxy_url {
            Some(proxy) => format!("{}{}", proxy, target),
            None => target,
        }
    }

    async fn get_json(&self, path: &str) -> Result<serde_json::Value, ClientError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
                StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(body)),
                _ => Err(ClientError::Server(format!("{}: {}", status, body))),
            }
        }
    }

    /// Fetch every course offered in `quarter`.
    pub async fn query_quarter(&self, quarter: Quarter) -> Result<Vec<Course>, ClientError> {
        let body = self
            .get_json(&format!("/api/course/query?quarter={}", quarter))
            .await?;
        let courses = parse_query_response(&body, quarter)?;
        tracing::info!(%quarter, count = courses.len(), "Fetched courses");
        Ok(courses)
    }

    /// Look up one course by its numeric id.
    pub async fn get_course(&self, id: i64) -> Result<CourseRecord, ClientError> {
        let body = self.get_json(&format!("/api/course/{}", id)).await?;
        let response: CourseResponse = serde_json::from_value(body)
            .map_err(|e| ClientError::MalformedPayload(e.to_string()))?;
        Ok(response.course)
    }

    /// Load `quarter` into `directory`.
    ///
    /// Failures are logged and leave the directory as it was. Returns whether
    /// the directory was replaced.
    pub async fn refresh_directory(
        &self,
        directory: &tokio::sync::Mutex<CourseDirectory>,
        quarter: Quarter,
    ) -> bool {
        let ticket = directory.lock().await.begin_load(quarter);
        let result = self.query_quarter(quarter).await;
        directory.lock().await.complete(ticket, result)
    }
}
