//! Server Configuration
//!
//! Settings come from environment variables with documented defaults, read
//! once at startup and passed down explicitly. Malformed numeric values fall
//! back to the default with a warning rather than aborting.

use std::env;
use std::time::Duration;

/// Runtime configuration for the API server.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Listen port (`PORT`, default 8000)
    pub port: u16,
    /// CORS origins (`ALLOWED_ORIGINS`, comma-separated, default `*`)
    pub allowed_origins: Vec<String>,
    /// Requests admitted per client per window (`RATE_LIMIT_PER_MIN`, default 10)
    pub rate_limit: usize,
    /// Admission window (`RATE_LIMIT_WINDOW_SECS`, default 60)
    pub rate_limit_window: Duration,
    /// OpenWeatherMap key (`OPENWEATHER_API_KEY`); absent = demo payloads
    pub openweather_api_key: Option<String>,
    /// Chat provider key (`CHAT_API_KEY`); absent = mock replies
    pub chat_api_key: Option<String>,
    /// OpenAI-compatible endpoint base (`CHAT_BASE_URL`)
    pub chat_base_url: String,
    /// Provider model name (`CHAT_MODEL`)
    pub chat_model: String,
    /// Force mock chat replies even with a key (`MOCK_CHAT`)
    pub mock_chat: bool,
}

const DEFAULT_CHAT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_CHAT_MODEL: &str = "llama-3.3-70b-versatile";

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Self {
        Settings {
            port: parse_var("PORT", 8000),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            rate_limit: parse_var("RATE_LIMIT_PER_MIN", 10),
            rate_limit_window: Duration::from_secs(parse_var("RATE_LIMIT_WINDOW_SECS", 60)),
            openweather_api_key: non_empty_var("OPENWEATHER_API_KEY"),
            chat_api_key: non_empty_var("CHAT_API_KEY"),
            chat_base_url: env::var("CHAT_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_CHAT_BASE_URL.to_string()),
            chat_model: env::var("CHAT_MODEL").unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string()),
            mock_chat: env::var("MOCK_CHAT")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
        }
    }

    /// Whether CORS should allow any origin.
    pub fn allow_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for Settings {
    /// Defaults used by tests: mock chat, no provider keys.
    fn default() -> Self {
        Settings {
            port: 8000,
            allowed_origins: vec!["*".to_string()],
            rate_limit: 10,
            rate_limit_window: Duration::from_secs(60),
            openweather_api_key: None,
            chat_api_key: None,
            chat_base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            mock_chat: true,
        }
    }
}

fn parse_var<T: std::str::FromStr + std::fmt::Display + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("invalid {}={:?}, using default {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_offline() {
        let settings = Settings::default();
        assert!(settings.mock_chat);
        assert!(settings.chat_api_key.is_none());
        assert!(settings.openweather_api_key.is_none());
        assert!(settings.allow_any_origin());
        assert_eq!(settings.rate_limit, 10);
        assert_eq!(settings.rate_limit_window, Duration::from_secs(60));
    }

    #[test]
    fn test_restricted_origins() {
        let settings = Settings {
            allowed_origins: vec!["https://app.example.com".to_string()],
            ..Settings::default()
        };
        assert!(!settings.allow_any_origin());
    }
}
