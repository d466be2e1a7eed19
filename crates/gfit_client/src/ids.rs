//! Deterministic identifiers and timestamp conversions.
//!
//! Data source ids follow the API's required shape
//! `type:dataTypeName:projectNumber:manufacturer:model:uid:streamName`.
//! The device constants below are the namespace marker for streams this tool
//! owns; cleanup only touches datasets whose stream id carries them.

use chrono::{DateTime, Local, TimeZone};

use crate::models::{
    ACTIVITY_SEGMENT, Application, CALORIES_EXPENDED, DataSource, DataType, DataTypeField, Device,
    STEP_COUNT_DELTA,
};

pub const DEVICE_MANUFACTURER: &str = "microcloud";
pub const DEVICE_MODEL: &str = "gfit-b100";
pub const DEVICE_UID: &str = "1000001";
pub const APPLICATION_NAME: &str = "GFit B100";
pub const APPLICATION_VERSION: &str = "1.0";

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Stream id for one of our derived data sources. Same inputs, same id.
pub fn data_source_id(data_type_name: &str, project_number: &str) -> String {
    format!(
        "derived:{data_type_name}:{project_number}:{DEVICE_MANUFACTURER}:{DEVICE_MODEL}:{DEVICE_UID}:{data_type_name}"
    )
}

/// Dataset id addressing the `[start, end)` nanosecond range.
pub fn dataset_id(start_time_nanos: i64, end_time_nanos: i64) -> String {
    format!("{start_time_nanos}-{end_time_nanos}")
}

/// Session id derived from the start-of-activity millisecond timestamp.
pub fn session_id(start_time_millis: i64) -> String {
    format!("session-{start_time_millis}")
}

/// True when a stream id belongs to this tool's namespace: it must carry both
/// the OAuth project number and our device manufacturer.
pub fn is_our_stream(data_stream_id: &str, project_number: &str) -> bool {
    data_stream_id.contains(project_number) && data_stream_id.contains(DEVICE_MANUFACTURER)
}

pub fn to_nanos<Tz: TimeZone>(t: &DateTime<Tz>) -> i64 {
    t.timestamp() * NANOS_PER_SEC + i64::from(t.timestamp_subsec_nanos())
}

pub fn to_millis<Tz: TimeZone>(t: &DateTime<Tz>) -> i64 {
    t.timestamp_millis()
}

/// Today's local calendar window: `[midnight, midnight + 1 day)`.
pub fn local_day_bounds(now: &DateTime<Local>) -> (DateTime<Local>, DateTime<Local>) {
    let midnight = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time");
    let start = midnight
        .and_local_timezone(Local)
        .earliest()
        .unwrap_or_else(|| now.clone());
    let end = (midnight + chrono::Duration::days(1))
        .and_local_timezone(Local)
        .earliest()
        .unwrap_or_else(|| now.clone());
    (start, end)
}

/// RFC 3339-shaped bound for the session list endpoint (local wall-clock time
/// with a `Z` suffix, matching what the API accepts for day windows).
pub fn session_time_bound<Tz: TimeZone>(t: &DateTime<Tz>) -> String {
    format!("{}Z", t.naive_local().format("%Y-%m-%dT%H:%M:%S"))
}

/// Data source body for one of the three supported data types, with the
/// type-specific field schema attached.
pub fn derived_data_source(data_type_name: &str, project_number: &str) -> DataSource {
    let field = match data_type_name {
        ACTIVITY_SEGMENT => vec![DataTypeField {
            name: "activity".into(),
            format: "integer".into(),
        }],
        CALORIES_EXPENDED => vec![DataTypeField {
            name: "calories".into(),
            format: "floatPoint".into(),
        }],
        STEP_COUNT_DELTA => vec![DataTypeField {
            name: "steps".into(),
            format: "integer".into(),
        }],
        _ => vec![],
    };

    DataSource {
        data_stream_id: data_source_id(data_type_name, project_number),
        data_stream_name: Some(data_type_name.to_string()),
        source_type: "derived".into(),
        application: Some(Application {
            name: APPLICATION_NAME.into(),
            version: Some(APPLICATION_VERSION.into()),
        }),
        data_type: DataType {
            name: data_type_name.to_string(),
            field,
        },
        device: Some(Device {
            uid: DEVICE_UID.into(),
            device_type: "unknown".into(),
            version: "1.0".into(),
            model: DEVICE_MODEL.into(),
            manufacturer: DEVICE_MANUFACTURER.into(),
        }),
    }
}
