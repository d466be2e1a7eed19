//! Typed client for the Google Fitness REST API (v1) plus the OAuth
//! installed-app credential lifecycle used to authenticate against it.

use async_trait::async_trait;
use thiserror::Error;

pub mod auth;
pub mod config;
pub mod http_client;
pub mod ids;
pub mod models;

pub use models::{
    AggregateRequest, DataPoint, DataSource, DataValue, Dataset, Session,
};

#[derive(Debug, Error)]
pub enum FitnessError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("authentication error: {0}")]
    Auth(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("api error (status {status}): {body}")]
    Api { status: u16, body: String },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FitnessError {
    /// Map a non-success HTTP status to the matching error variant.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            404 => FitnessError::NotFound(body),
            401 | 403 => FitnessError::Auth(body),
            400 | 422 => FitnessError::InvalidInput(body),
            _ => FitnessError::Api { status, body },
        }
    }

    /// True when the error is a 404 from the remote API. Callers use this to
    /// distinguish "does not exist yet" from real failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FitnessError::NotFound(_))
    }
}

/// Operations against the Fitness REST API. The CLI orchestration depends on
/// this trait rather than the reqwest implementation so it can be unit-tested
/// against a mock.
#[async_trait]
pub trait FitnessClient: Send + Sync + 'static {
    /// Fetch a data source by its stream id. 404 maps to `FitnessError::NotFound`.
    async fn get_data_source(&self, data_source_id: &str) -> Result<DataSource, FitnessError>;

    /// Create a new data source.
    async fn create_data_source(&self, source: &DataSource) -> Result<DataSource, FitnessError>;

    /// List every data source visible to the authenticated user.
    async fn list_data_sources(&self) -> Result<Vec<DataSource>, FitnessError>;

    /// Insert or overwrite the points of a dataset within its time range.
    async fn patch_dataset(
        &self,
        data_source_id: &str,
        dataset_id: &str,
        dataset: &Dataset,
    ) -> Result<(), FitnessError>;

    /// Delete a dataset. The remote answers 404 when it never existed.
    async fn delete_dataset(
        &self,
        data_source_id: &str,
        dataset_id: &str,
    ) -> Result<(), FitnessError>;

    /// Create or replace a session record keyed by its id.
    async fn upsert_session(&self, session: &Session) -> Result<Session, FitnessError>;

    /// List sessions overlapping the given RFC 3339 window.
    async fn list_sessions(
        &self,
        start_time: &str,
        end_time: &str,
    ) -> Result<Vec<Session>, FitnessError>;

    /// Delete a session by id.
    async fn delete_session(&self, session_id: &str) -> Result<(), FitnessError>;

    /// Request server-side aggregation of previously inserted data.
    async fn aggregate(
        &self,
        request: &AggregateRequest,
    ) -> Result<serde_json::Value, FitnessError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_status_maps_not_found() {
        let err = FitnessError::from_status(404, "gone".into());
        assert!(err.is_not_found());
    }

    #[test]
    fn from_status_maps_auth_statuses() {
        assert!(matches!(
            FitnessError::from_status(401, String::new()),
            FitnessError::Auth(_)
        ));
        assert!(matches!(
            FitnessError::from_status(403, String::new()),
            FitnessError::Auth(_)
        ));
    }

    #[test]
    fn from_status_keeps_other_statuses() {
        match FitnessError::from_status(500, "boom".into()) {
            FitnessError::Api { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
