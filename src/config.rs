use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://libgen.rs";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Settings for one acquisition run. Built once and passed down explicitly.
#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub output_dir: PathBuf,
    pub similarity_threshold: u8,
    pub max_attempts: u32,
    pub min_query_words: usize,
    pub timeout: Duration,
    pub books_per_topic: usize,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from("."),
            similarity_threshold: 70,
            max_attempts: 3,
            min_query_words: 3,
            timeout: Duration::from_secs(30),
            books_per_topic: 10,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: "gpt-3.5-turbo".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            base_url: env::var("BIBLIOFETCH_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            output_dir: env::var("BIBLIOFETCH_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            similarity_threshold: env::var("BIBLIOFETCH_THRESHOLD")
                .ok()
                .and_then(|t| t.parse::<u32>().ok())
                .map(|t| t.min(100) as u8)
                .unwrap_or(defaults.similarity_threshold),
            max_attempts: env::var("BIBLIOFETCH_MAX_ATTEMPTS")
                .ok()
                .and_then(|a| a.parse().ok())
                .unwrap_or(defaults.max_attempts),
            min_query_words: env::var("BIBLIOFETCH_MIN_QUERY_WORDS")
                .ok()
                .and_then(|w| w.parse().ok())
                .filter(|w| *w > 0)
                .unwrap_or(defaults.min_query_words),
            timeout: env::var("BIBLIOFETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            books_per_topic: env::var("BIBLIOFETCH_BOOKS_PER_TOPIC")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.books_per_topic),
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai_base_url),
            openai_model: env::var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.similarity_threshold = threshold.min(100);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_openai(mut self, base_url: &str, api_key: &str) -> Self {
        self.openai_base_url = base_url.trim_end_matches('/').to_string();
        self.openai_api_key = Some(api_key.to_string());
        self
    }

    /// Shared HTTP client for every request of the run
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .user_agent(concat!("bibliofetch/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "BIBLIOFETCH_BASE_URL",
            "BIBLIOFETCH_OUTPUT_DIR",
            "BIBLIOFETCH_THRESHOLD",
            "BIBLIOFETCH_MAX_ATTEMPTS",
            "BIBLIOFETCH_MIN_QUERY_WORDS",
            "BIBLIOFETCH_TIMEOUT_SECS",
            "BIBLIOFETCH_BOOKS_PER_TOPIC",
            "OPENAI_API_KEY",
            "OPENAI_BASE_URL",
            "OPENAI_MODEL",
        ] {
            unsafe { env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_env();
        let config = Config::from_env();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.similarity_threshold, 70);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.min_query_words, 3);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    #[serial]
    fn test_env_overrides_and_clamping() {
        clear_env();
        unsafe {
            env::set_var("BIBLIOFETCH_BASE_URL", "http://mirror.example/");
            env::set_var("BIBLIOFETCH_THRESHOLD", "150");
            env::set_var("BIBLIOFETCH_TIMEOUT_SECS", "5");
            env::set_var("OPENAI_API_KEY", "");
        }
        let config = Config::from_env();
        assert_eq!(config.base_url, "http://mirror.example");
        assert_eq!(config.similarity_threshold, 100);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.openai_api_key.is_none());
        clear_env();
    }
}
