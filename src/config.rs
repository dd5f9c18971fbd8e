//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

use crate::models::{Quarter, Term};

/// Public deployment of the course API.
pub const DEFAULT_COURSE_API_URL: &str = "https://gauchograduate.vercel.app";

/// Quarter shown when none is requested.
pub const DEFAULT_QUARTER: Quarter = Quarter {
    year: 2024,
    term: Term::Winter,
};

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// SQLite file (from GAUCHO_DB_PATH). `None` uses the platform data dir.
    pub db_path: Option<PathBuf>,
    /// Base URL of the remote course API (from GAUCHO_COURSE_API_URL)
    pub course_api_url: String,
    /// Prefix prepended to remote request URLs (from GAUCHO_PROXY_URL), e.g.
    /// `https://thingproxy.freeboard.io/fetch/`
    pub proxy_url: Option<String>,
    /// Allowed CORS origins (from GAUCHO_CORS_ORIGINS, comma-separated).
    /// `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
    /// From GAUCHO_DEFAULT_QUARTER, coded YYYYQ
    pub default_quarter: Quarter,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let default_quarter = match get("GAUCHO_DEFAULT_QUARTER") {
            Some(code) => Quarter::parse(&code).unwrap_or_else(|| {
                tracing::warn!(
                    "Ignoring invalid GAUCHO_DEFAULT_QUARTER {:?}, using {}",
                    code,
                    DEFAULT_QUARTER
                );
                DEFAULT_QUARTER
            }),
            None => DEFAULT_QUARTER,
        };

        Self {
            db_path: get("GAUCHO_DB_PATH").map(PathBuf::from),
            course_api_url: get("GAUCHO_COURSE_API_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_COURSE_API_URL.to_string()),
            proxy_url: get("GAUCHO_PROXY_URL"),
            cors_origins: get("GAUCHO_CORS_ORIGINS").map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
            default_quarter,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = AppConfig::default();
        assert!(config.db_path.is_none());
        assert!(config.proxy_url.is_none());
        assert!(config.cors_origins.is_none());
        assert_eq!(config.course_api_url, DEFAULT_COURSE_API_URL);
        assert_eq!(config.default_quarter.code(), 20241);
    }

    #[test]
    fn reads_all_variables() {
        let config = config_from(&[
            ("GAUCHO_DB_PATH", "/tmp/gg.db"),
            ("GAUCHO_COURSE_API_URL", "http://localhost:3000/"),
            ("GAUCHO_PROXY_URL", "https://proxy.example/fetch/"),
            ("GAUCHO_CORS_ORIGINS", "http://a.test, http://b.test,"),
            ("GAUCHO_DEFAULT_QUARTER", "20234"),
        ]);

        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/gg.db")));
        assert_eq!(config.course_api_url, "http://localhost:3000");
        assert_eq!(config.proxy_url.as_deref(), Some("https://proxy.example/fetch/"));
        assert_eq!(
            config.cors_origins,
            Some(vec!["http://a.test".to_string(), "http://b.test".to_string()])
        );
        assert_eq!(config.default_quarter, Quarter::new(2023, Term::Fall));
    }

    #[test]
    fn invalid_quarter_falls_back_to_default() {
        let config = config_from(&[("GAUCHO_DEFAULT_QUARTER", "fall")]);
        assert_eq!(config.default_quarter, DEFAULT_QUARTER);
    }
}
