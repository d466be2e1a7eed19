//! Wire models for the Fitness REST API.
//!
//! Field names follow the API's camelCase JSON. The API serializes int64
//! values as JSON strings in its responses while accepting plain numbers on
//! input, so timestamp fields deserialize from either form.

use serde::{Deserialize, Deserializer, Serialize};

/// Data type for activity segments (integer `activity` field).
pub const ACTIVITY_SEGMENT: &str = "com.google.activity.segment";
/// Data type for calorie expenditure (float `calories` field).
pub const CALORIES_EXPENDED: &str = "com.google.calories.expended";
/// Data type for step deltas (integer `steps` field).
pub const STEP_COUNT_DELTA: &str = "com.google.step_count.delta";

/// One day expressed in milliseconds, the bucket used for aggregation.
pub const ONE_DAY_MILLIS: i64 = 86_400_000;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DataTypeField {
    pub name: String,
    pub format: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DataType {
    pub name: String,
    #[serde(default)]
    pub field: Vec<DataTypeField>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub uid: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub version: String,
    pub model: String,
    pub manufacturer: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub data_stream_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_stream_name: Option<String>,
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<Application>,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
}

/// A single typed value inside a data point. Exactly one of the fields is
/// set depending on the data type's schema.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub int_val: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fp_val: Option<f64>,
}

impl DataValue {
    pub fn int(value: i64) -> Self {
        Self {
            int_val: Some(value),
            ..Self::default()
        }
    }

    pub fn float(value: f64) -> Self {
        Self {
            fp_val: Some(value),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    #[serde(deserialize_with = "deserialize_i64_lenient")]
    pub start_time_nanos: i64,
    #[serde(deserialize_with = "deserialize_i64_lenient")]
    pub end_time_nanos: i64,
    pub data_type_name: String,
    pub value: Vec<DataValue>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub data_source_id: String,
    #[serde(deserialize_with = "deserialize_i64_lenient")]
    pub min_start_time_ns: i64,
    #[serde(deserialize_with = "deserialize_i64_lenient")]
    pub max_end_time_ns: i64,
    #[serde(default)]
    pub point: Vec<DataPoint>,
}

impl Dataset {
    /// Build a dataset holding a single point covering the full time range.
    pub fn single_point(
        data_source_id: impl Into<String>,
        data_type_name: impl Into<String>,
        start_time_nanos: i64,
        end_time_nanos: i64,
        value: DataValue,
    ) -> Self {
        let data_source_id = data_source_id.into();
        Self {
            data_source_id,
            min_start_time_ns: start_time_nanos,
            max_end_time_ns: end_time_nanos,
            point: vec![DataPoint {
                start_time_nanos,
                end_time_nanos,
                data_type_name: data_type_name.into(),
                value: vec![value],
            }],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_i64_lenient")]
    pub start_time_millis: i64,
    #[serde(deserialize_with = "deserialize_i64_lenient")]
    pub end_time_millis: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<Application>,
    pub activity_type: i64,
}

/// Envelope returned by the session list endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct SessionList {
    #[serde(default)]
    pub session: Vec<Session>,
}

/// Envelope returned by the data source list endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceList {
    #[serde(default)]
    pub data_source: Vec<DataSource>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateBy {
    pub data_type_name: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BucketByTime {
    pub duration_millis: i64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRequest {
    pub aggregate_by: Vec<AggregateBy>,
    pub bucket_by_time: BucketByTime,
    pub start_time_millis: i64,
    pub end_time_millis: i64,
}

impl AggregateRequest {
    /// Day-bucketed aggregation of one data type over a millisecond window.
    pub fn daily(data_type_name: impl Into<String>, start_millis: i64, end_millis: i64) -> Self {
        Self {
            aggregate_by: vec![AggregateBy {
                data_type_name: data_type_name.into(),
            }],
            bucket_by_time: BucketByTime {
                duration_millis: ONE_DAY_MILLIS,
            },
            start_time_millis: start_millis,
            end_time_millis: end_millis,
        }
    }
}

fn deserialize_i64_lenient<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| D::Error::custom(format!("number out of i64 range: {n}"))),
        serde_json::Value::String(s) => s
            .parse::<i64>()
            .map_err(|e| D::Error::custom(format!("invalid int64 string {s:?}: {e}"))),
        other => Err(D::Error::custom(format!(
            "expected number or string, got {other}"
        ))),
    }
}
