//! Runtime settings with layered overrides

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default GraphQL endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.linear.app/graphql";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for a single CLI invocation
///
/// Built once in `main` and handed to every command; nothing reads process-wide
/// flags after startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Data directory holding `data.json` and `icons/`
    pub home: PathBuf,

    /// GraphQL endpoint
    pub endpoint: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Print machine-readable JSON where a command supports it
    pub json: bool,

    /// Emit request timings
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            home: Self::default_home(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            json: false,
            debug: false,
        }
    }
}

impl Settings {
    /// Load settings from built-in defaults, then environment variables
    pub fn load() -> Self {
        let mut settings = Settings::default();

        if let Ok(home) = std::env::var("LINEAR_HOME") {
            if !home.is_empty() {
                settings.home = PathBuf::from(home);
            }
        }
        if let Ok(endpoint) = std::env::var("LINEAR_API_URL") {
            if !endpoint.is_empty() {
                settings.endpoint = endpoint;
            }
        }
        if let Ok(timeout) = std::env::var("LINEAR_TIMEOUT") {
            match timeout.parse::<u64>() {
                Ok(secs) => settings.timeout = Duration::from_secs(secs),
                Err(_) => tracing::warn!("ignoring invalid LINEAR_TIMEOUT value: {}", timeout),
            }
        }

        settings
    }

    /// Apply command-line overrides (these take precedence over the environment)
    pub fn with_flags(mut self, json: bool, debug: bool, timeout: Option<u64>) -> Self {
        self.json = json;
        self.debug = debug;
        if let Some(secs) = timeout {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }

    /// Settings rooted at an explicit directory
    pub fn with_home(mut self, home: &Path) -> Self {
        self.home = home.to_path_buf();
        self
    }

    /// Path to the cached reference document
    pub fn data_path(&self) -> PathBuf {
        self.home.join("data.json")
    }

    /// Directory holding downloaded avatars
    pub fn icons_dir(&self) -> PathBuf {
        self.home.join("icons")
    }

    /// Avatar path for a user
    pub fn icon_path(&self, user_id: &str) -> PathBuf {
        self.icons_dir().join(format!("{}.png", user_id))
    }

    fn default_home() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".linear"))
            .unwrap_or_else(|| PathBuf::from(".linear"))
    }
}
