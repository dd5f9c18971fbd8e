use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gaucho_graduate::catalog::{self, CourseDirectory, FilterState};
use gaucho_graduate::client::CourseClient;
use gaucho_graduate::config::AppConfig;
use gaucho_graduate::models::{Course, CourseRecord, CreateCourseInput, Quarter, Term};
use gaucho_graduate::{api, db};

#[derive(Parser)]
#[command(name = "gauchograd")]
#[command(about = "Course catalog and four-year planner")]
struct Cli {
    /// SQLite database file (overrides GAUCHO_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Replace a quarter's courses with the contents of a JSON file
    Import {
        /// Quarter code, e.g. 20241 for Winter 2024
        #[arg(short, long, value_parser = parse_quarter)]
        quarter: Quarter,

        /// File shaped like a course query response: {"courses": [...]}
        file: PathBuf,
    },
    /// List a quarter's courses, filtered like the catalog panel
    Catalog {
        #[arg(short, long, value_parser = parse_quarter)]
        quarter: Option<Quarter>,

        /// Case-insensitive title search
        #[arg(short, long, default_value = "")]
        search: String,

        #[arg(short, long)]
        department: Option<String>,

        #[arg(short, long, value_parser = parse_term)]
        term: Option<Term>,

        /// Fetch from the remote course API instead of the local database
        #[arg(long)]
        remote: bool,
    },
}

fn parse_quarter(s: &str) -> Result<Quarter, String> {
    Quarter::parse(s).ok_or_else(|| format!("invalid quarter {:?}, expected YYYYQ", s))
}

fn parse_term(s: &str) -> Result<Term, String> {
    Term::from_str(s).ok_or_else(|| format!("invalid term {:?}", s))
}

#[derive(Deserialize)]
struct ImportFile {
    courses: Vec<CreateCourseInput>,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "gaucho_graduate=debug,tower_http=debug".into()),
    );

    // stdout carries command output, so logs go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_database(config: &AppConfig) -> anyhow::Result<db::Database> {
    let db = match &config.db_path {
        Some(path) => db::Database::open(path.clone())?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

async fn serve(config: &AppConfig, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting gaucho-graduate server on port {}", port);

    let db = open_database(config)?;
    let app = api::create_router_with_config(db, config);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("gaucho-graduate listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

fn print_courses(courses: &[Course]) {
    for course in courses {
        let units = course
            .units
            .map(|u| format!("{} units", u))
            .unwrap_or_else(|| "- units".to_string());
        println!("{:<12} {:<48} {}", course.course_id, course.title, units);
    }
    if courses.is_empty() {
        println!("No courses found.");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = AppConfig::from_env();
    if let Some(path) = cli.db {
        config.db_path = Some(path);
    }

    match cli.command {
        Some(Commands::Serve { port }) => serve(&config, port).await?,
        Some(Commands::Import { quarter, file }) => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let parsed: ImportFile = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", file.display()))?;

            let db = open_database(&config)?;
            let records = db.import_courses(quarter, parsed.courses)?;
            println!("Imported {} courses for {}", records.len(), quarter);
        }
        Some(Commands::Catalog {
            quarter,
            search,
            department,
            term,
            remote,
        }) => {
            let quarter = quarter.unwrap_or(config.default_quarter);
            let filters = FilterState {
                search_query: search,
                selected_department: department,
                selected_term: term,
            };

            let courses = if remote {
                let client = CourseClient::from_config(&config);
                let directory = tokio::sync::Mutex::new(CourseDirectory::new());
                if !client.refresh_directory(&directory, quarter).await {
                    anyhow::bail!("Could not load courses for {}", quarter);
                }
                directory.into_inner().courses().to_vec()
            } else {
                open_database(&config)?
                    .get_courses_by_quarter(quarter)?
                    .into_iter()
                    .map(CourseRecord::into_course)
                    .collect()
            };

            print_courses(&catalog::apply_filters(&courses, &filters));
        }
        None => serve(&config, 3000).await?,
    }

    Ok(())
}
