use serde::Deserialize;

/// Client configuration loaded from environment variables
///
/// Variables are read with the `MOVIEMATCH_` prefix, e.g. `MOVIEMATCH_API_URL`.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Origin of the MovieMatch API (scheme, host and port)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_user_agent() -> String {
    concat!("moviematch-client/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::prefixed("MOVIEMATCH_")
            .from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        Ok(config.normalized())
    }

    /// Replaces the API origin, e.g. from a command line flag
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self.normalized()
    }

    fn normalized(mut self) -> Self {
        let trimmed = self.api_url.trim_end_matches('/').len();
        self.api_url.truncate(trimmed);
        self
    }
}
