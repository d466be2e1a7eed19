use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/fitness/v1";

#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub secrets_file: PathBuf,
    pub token_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function. This avoids mutating global environment in tests and keeps
    /// `from_env()` small and safe.
    pub fn from_env_with<F>(mut get: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let base_url = get("GFIT_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let secrets_file = get("GFIT_SECRETS_FILE").unwrap_or_else(|| "credentials.json".into());
        let token_file = get("GFIT_TOKEN_FILE").unwrap_or_else(|| "token.json".into());
        Self {
            base_url,
            secrets_file: PathBuf::from(secrets_file),
            token_file: PathBuf::from(token_file),
        }
    }
}
