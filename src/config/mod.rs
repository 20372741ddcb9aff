use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub display: DisplayConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the portfolio API; resource endpoints are joined onto it
    pub base_url: String,
    pub timeout_secs: u64,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub skill_chunk_size: usize,
    pub skills_per_page: usize,
    pub projects_per_page: usize,
    pub certifications_per_page: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub recent_messages: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("FOLIO_API_URL") {
            if !v.trim().is_empty() {
                self.api.base_url = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("FOLIO_API_TIMEOUT_SECS") {
            self.api.timeout_secs = v.parse().unwrap_or(self.api.timeout_secs);
        }
        if let Ok(v) = env::var("FOLIO_API_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Display overrides; zero sizes are rejected so paging never divides by zero
        if let Ok(v) = env::var("FOLIO_SKILL_CHUNK_SIZE") {
            self.display.skill_chunk_size = positive(&v).unwrap_or(self.display.skill_chunk_size);
        }
        if let Ok(v) = env::var("FOLIO_SKILLS_PER_PAGE") {
            self.display.skills_per_page = positive(&v).unwrap_or(self.display.skills_per_page);
        }
        if let Ok(v) = env::var("FOLIO_PROJECTS_PER_PAGE") {
            self.display.projects_per_page = positive(&v).unwrap_or(self.display.projects_per_page);
        }
        if let Ok(v) = env::var("FOLIO_CERTIFICATIONS_PER_PAGE") {
            self.display.certifications_per_page =
                positive(&v).unwrap_or(self.display.certifications_per_page);
        }

        if let Ok(v) = env::var("FOLIO_RECENT_MESSAGES") {
            self.dashboard.recent_messages = v.parse().unwrap_or(self.dashboard.recent_messages);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8000/api/".to_string(),
                timeout_secs: 30,
                enable_request_logging: true,
            },
            display: DisplayConfig::default(),
            dashboard: DashboardConfig { recent_messages: 3 },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging.example.com/api/".to_string(),
                timeout_secs: 15,
                enable_request_logging: true,
            },
            display: DisplayConfig::default(),
            dashboard: DashboardConfig { recent_messages: 3 },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://app.example.com/api/".to_string(),
                timeout_secs: 10,
                enable_request_logging: false,
            },
            display: DisplayConfig::default(),
            dashboard: DashboardConfig { recent_messages: 3 },
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            skill_chunk_size: 5,
            skills_per_page: 3,
            projects_per_page: 2,
            certifications_per_page: 3,
        }
    }
}

fn positive(v: &str) -> Option<usize> {
    v.trim().parse::<usize>().ok().filter(|n| *n > 0)
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.api.base_url.starts_with("http://localhost"));
        assert!(config.api.enable_request_logging);
        assert_eq!(config.display.skill_chunk_size, 5);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.api.base_url.starts_with("https://"));
        assert!(!config.api.enable_request_logging);
        assert_eq!(config.display.projects_per_page, 2);
        assert_eq!(config.dashboard.recent_messages, 3);
    }

    #[test]
    fn test_positive_rejects_zero_and_garbage() {
        assert_eq!(positive("4"), Some(4));
        assert_eq!(positive("0"), None);
        assert_eq!(positive("many"), None);
    }
}
