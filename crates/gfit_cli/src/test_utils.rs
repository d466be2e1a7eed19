//! Shared recording mock for orchestration unit tests.
#![cfg(test)]

use std::sync::Mutex;

use async_trait::async_trait;
use gfit_client::models::DataType;
use gfit_client::{
    AggregateRequest, DataSource, Dataset, FitnessClient, FitnessError, Session,
};

/// A configurable mock that records every call in order and can be told to
/// fail specific operations.
#[derive(Default)]
pub struct RecordingClient {
    pub calls: Mutex<Vec<String>>,
    /// Stream ids `get_data_source` reports as already existing.
    pub existing_sources: Vec<String>,
    /// Data type names whose `create_data_source` fails.
    pub fail_create_for: Vec<String>,
    /// Stream ids whose `patch_dataset` fails.
    pub fail_patch_for: Vec<String>,
    /// Stream ids whose `delete_dataset` answers 404.
    pub missing_datasets: Vec<String>,
    pub fail_upsert_session: bool,
    pub fail_aggregate: bool,
    pub fail_list_sessions: bool,
    pub sources: Vec<DataSource>,
    pub sessions: Vec<Session>,
}

impl RecordingClient {
    pub fn recorded(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn failure() -> FitnessError {
        FitnessError::Api {
            status: 500,
            body: "mock failure".into(),
        }
    }

    pub fn stub_source(data_stream_id: &str) -> DataSource {
        DataSource {
            data_stream_id: data_stream_id.into(),
            data_stream_name: None,
            source_type: "derived".into(),
            application: None,
            data_type: DataType {
                name: "stub".into(),
                field: vec![],
            },
            device: None,
        }
    }
}

#[async_trait]
impl FitnessClient for RecordingClient {
    async fn get_data_source(&self, data_source_id: &str) -> Result<DataSource, FitnessError> {
        self.record(format!("get_data_source:{data_source_id}"));
        if self.existing_sources.iter().any(|s| s == data_source_id) {
            Ok(Self::stub_source(data_source_id))
        } else {
            Err(FitnessError::NotFound("no such source".into()))
        }
    }

    async fn create_data_source(&self, source: &DataSource) -> Result<DataSource, FitnessError> {
        self.record(format!("create_data_source:{}", source.data_type.name));
        if self.fail_create_for.iter().any(|t| *t == source.data_type.name) {
            Err(Self::failure())
        } else {
            Ok(source.clone())
        }
    }

    async fn list_data_sources(&self) -> Result<Vec<DataSource>, FitnessError> {
        self.record("list_data_sources".into());
        Ok(self.sources.clone())
    }

    async fn patch_dataset(
        &self,
        data_source_id: &str,
        dataset_id: &str,
        _dataset: &Dataset,
    ) -> Result<(), FitnessError> {
        self.record(format!("patch_dataset:{data_source_id}:{dataset_id}"));
        if self.fail_patch_for.iter().any(|s| s == data_source_id) {
            Err(Self::failure())
        } else {
            Ok(())
        }
    }

    async fn delete_dataset(
        &self,
        data_source_id: &str,
        dataset_id: &str,
    ) -> Result<(), FitnessError> {
        self.record(format!("delete_dataset:{data_source_id}:{dataset_id}"));
        if self.missing_datasets.iter().any(|s| s == data_source_id) {
            Err(FitnessError::NotFound("dataset does not exist".into()))
        } else {
            Ok(())
        }
    }

    async fn upsert_session(&self, session: &Session) -> Result<Session, FitnessError> {
        self.record(format!("upsert_session:{}", session.id));
        if self.fail_upsert_session {
            Err(Self::failure())
        } else {
            Ok(session.clone())
        }
    }

    async fn list_sessions(
        &self,
        start_time: &str,
        end_time: &str,
    ) -> Result<Vec<Session>, FitnessError> {
        self.record(format!("list_sessions:{start_time}:{end_time}"));
        if self.fail_list_sessions {
            Err(Self::failure())
        } else {
            Ok(self.sessions.clone())
        }
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), FitnessError> {
        self.record(format!("delete_session:{session_id}"));
        Ok(())
    }

    async fn aggregate(
        &self,
        _request: &AggregateRequest,
    ) -> Result<serde_json::Value, FitnessError> {
        self.record("aggregate".into());
        if self.fail_aggregate {
            Err(Self::failure())
        } else {
            Ok(serde_json::json!({"bucket": []}))
        }
    }
}
