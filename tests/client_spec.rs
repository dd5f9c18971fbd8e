use axum::{routing::get, Json, Router};
use gaucho_graduate::api::create_router;
use gaucho_graduate::catalog::CourseDirectory;
use gaucho_graduate::client::{ClientError, CourseClient};
use gaucho_graduate::db::Database;
use gaucho_graduate::models::*;
use serde_json::json;

const WINTER_2024: Quarter = Quarter {
    year: 2024,
    term: Term::Winter,
};

/// Serve `app` on an ephemeral local port and return its base URL.
async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });
    format!("http://{}", addr)
}

async fn spawn_course_server() -> (String, Vec<CourseRecord>) {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let records = db
        .import_courses(
            WINTER_2024,
            vec![CreateCourseInput {
                course_id: "CMPSC 8 ".to_string(),
                title: "Intro to Computer Science".to_string(),
                description: String::new(),
                subject_area: "CMPSC".to_string(),
                units: Some(4.0),
                general_ed: vec![],
                prerequisites: vec![],
                unlocks: vec![],
            }],
        )
        .expect("Failed to import");
    (spawn(create_router(db)).await, records)
}

mod query_quarter {
    use super::*;

    #[tokio::test]
    async fn fetches_and_normalizes_courses() {
        let (url, _) = spawn_course_server().await;
        let client = CourseClient::new(url, None);

        let courses = client.query_quarter(WINTER_2024).await.expect("Query failed");

        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].course_id, "CMPSC 8");
        assert_eq!(courses[0].department, "CMPSC");
        assert_eq!(courses[0].term, vec![Term::Winter]);
    }

    #[tokio::test]
    async fn rejects_body_without_courses_array() {
        let app = Router::new().route(
            "/api/course/query",
            get(|| async { Json(json!({ "items": [] })) }),
        );
        let client = CourseClient::new(spawn(app).await, None);

        let result = client.query_quarter(WINTER_2024).await;

        assert!(matches!(result, Err(ClientError::MalformedPayload(_))));
    }

    #[tokio::test]
    async fn maps_error_status() {
        let app = Router::new().route(
            "/api/course/query",
            get(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let client = CourseClient::new(spawn(app).await, None);

        let result = client.query_quarter(WINTER_2024).await;

        assert!(matches!(result, Err(ClientError::Server(msg)) if msg.contains("503")));
    }
}

mod get_course {
    use super::*;

    #[tokio::test]
    async fn returns_the_record() {
        let (url, records) = spawn_course_server().await;
        let client = CourseClient::new(url, None);

        let record = client.get_course(records[0].id).await.expect("Lookup failed");

        assert_eq!(record.course_id, "CMPSC 8");
    }

    #[tokio::test]
    async fn maps_404_to_not_found() {
        let (url, _) = spawn_course_server().await;
        let client = CourseClient::new(url, None);

        let result = client.get_course(999_999).await;

        assert!(matches!(result, Err(ClientError::NotFound(_))));
    }
}

mod refresh_directory {
    use super::*;

    #[tokio::test]
    async fn replaces_directory_on_success() {
        let (url, _) = spawn_course_server().await;
        let client = CourseClient::new(url, None);
        let directory = tokio::sync::Mutex::new(CourseDirectory::new());

        assert!(client.refresh_directory(&directory, WINTER_2024).await);

        let directory = directory.lock().await;
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.quarter(), Some(WINTER_2024));
    }

    #[tokio::test]
    async fn keeps_previous_contents_on_failure() {
        let (url, _) = spawn_course_server().await;
        let directory = tokio::sync::Mutex::new(CourseDirectory::new());
        CourseClient::new(url, None)
            .refresh_directory(&directory, WINTER_2024)
            .await;

        let app = Router::new().route(
            "/api/course/query",
            get(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let broken = CourseClient::new(spawn(app).await, None);

        assert!(!broken.refresh_directory(&directory, Quarter::new(2024, Term::Spring)).await);

        let directory = directory.lock().await;
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.quarter(), Some(WINTER_2024));
    }
}
