//! HTTP client implementation for the Fitness REST API.
//!
//! This module provides a reqwest-based implementation of the
//! [`FitnessClient`](crate::FitnessClient) trait. All requests target the
//! `users/me` scope of the API and authenticate with a bearer token.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::models::{DataSourceList, SessionList};
use crate::{AggregateRequest, DataSource, Dataset, FitnessClient, FitnessError, Session};

/// Client for the Fitness REST API using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestFitnessClient {
    base_url: String,
    access_token: SecretString,
    client: reqwest::Client,
}

impl ReqwestFitnessClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the Fitness API (e.g., "https://www.googleapis.com/fitness/v1")
    /// * `access_token` - A valid OAuth access token
    pub fn new(base_url: &str, access_token: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("reqwest client build should not fail");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/users/me/{path}", self.base_url)
    }

    /// Build an authenticated GET request.
    fn get_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .bearer_auth(self.access_token.expose_secret())
    }

    /// Build an authenticated POST request.
    fn post_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .bearer_auth(self.access_token.expose_secret())
    }

    /// Build an authenticated PUT request.
    fn put_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .put(url)
            .bearer_auth(self.access_token.expose_secret())
    }

    /// Build an authenticated PATCH request.
    fn patch_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .patch(url)
            .bearer_auth(self.access_token.expose_secret())
    }

    /// Build an authenticated DELETE request.
    fn delete_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .delete(url)
            .bearer_auth(self.access_token.expose_secret())
    }

    /// Execute a request and expect a JSON response.
    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, FitnessError> {
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(error_from_response(resp).await);
        }
        Ok(resp.json::<T>().await?)
    }

    /// Execute a request with no expected response body.
    async fn execute_empty(&self, request: reqwest::RequestBuilder) -> Result<(), FitnessError> {
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        Ok(())
    }
}

/// Extract error information from a failed response.
async fn error_from_response(resp: reqwest::Response) -> FitnessError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let body_snippet: String = body.chars().take(256).collect();
    FitnessError::from_status(status, body_snippet)
}

#[async_trait]
impl FitnessClient for ReqwestFitnessClient {
    async fn get_data_source(&self, data_source_id: &str) -> Result<DataSource, FitnessError> {
        let url = self.url(&format!("dataSources/{data_source_id}"));
        self.execute_json(self.get_request(&url)).await
    }

    async fn create_data_source(&self, source: &DataSource) -> Result<DataSource, FitnessError> {
        let url = self.url("dataSources");
        self.execute_json(self.post_request(&url).json(source)).await
    }

    async fn list_data_sources(&self) -> Result<Vec<DataSource>, FitnessError> {
        let url = self.url("dataSources");
        let list: DataSourceList = self.execute_json(self.get_request(&url)).await?;
        Ok(list.data_source)
    }

    async fn patch_dataset(
        &self,
        data_source_id: &str,
        dataset_id: &str,
        dataset: &Dataset,
    ) -> Result<(), FitnessError> {
        let url = self.url(&format!("dataSources/{data_source_id}/datasets/{dataset_id}"));
        self.execute_empty(self.patch_request(&url).json(dataset))
            .await
    }

    async fn delete_dataset(
        &self,
        data_source_id: &str,
        dataset_id: &str,
    ) -> Result<(), FitnessError> {
        let url = self.url(&format!("dataSources/{data_source_id}/datasets/{dataset_id}"));
        self.execute_empty(self.delete_request(&url)).await
    }

    async fn upsert_session(&self, session: &Session) -> Result<Session, FitnessError> {
        let url = self.url(&format!("sessions/{}", session.id));
        self.execute_json(self.put_request(&url).json(session)).await
    }

    async fn list_sessions(
        &self,
        start_time: &str,
        end_time: &str,
    ) -> Result<Vec<Session>, FitnessError> {
        let url = self.url("sessions");
        let query = [("startTime", start_time), ("endTime", end_time)];
        let list: SessionList = self
            .execute_json(self.get_request(&url).query(&query))
            .await?;
        Ok(list.session)
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), FitnessError> {
        let url = self.url(&format!("sessions/{session_id}"));
        self.execute_empty(self.delete_request(&url)).await
    }

    async fn aggregate(
        &self,
        request: &AggregateRequest,
    ) -> Result<serde_json::Value, FitnessError> {
        let url = self.url("dataset:aggregate");
        self.execute_json(self.post_request(&url).json(request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ReqwestFitnessClient::new(
            "http://localhost/",
            SecretString::new("tok".into()),
        );
        assert_eq!(client.url("dataSources"), "http://localhost/users/me/dataSources");
    }
}
