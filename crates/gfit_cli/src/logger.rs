//! Activity logging orchestration.
//!
//! Provisions the required data sources, inserts the dataset payloads,
//! creates the session record, and requests aggregation when steps were
//! supplied. Calls run strictly in sequence; each one is caught on its own
//! and there is no rollback of partially written data.

use chrono::{DateTime, Local};
use gfit_client::ids::{self, APPLICATION_NAME};
use gfit_client::models::{ACTIVITY_SEGMENT, Application, CALORIES_EXPENDED, STEP_COUNT_DELTA};
use gfit_client::{AggregateRequest, DataValue, Dataset, FitnessClient, Session};
use tracing::{error, info, warn};

/// Parameters for one `log` invocation.
#[derive(Clone, Debug)]
pub struct LogRequest {
    pub activity_type: i64,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub calories: Option<f64>,
    pub steps: Option<i64>,
}

/// Make sure the data source for `data_type_name` exists remotely, creating
/// it when the existence check answers 404. Returns the stream id, or `None`
/// when the check or the creation failed for that call.
pub async fn ensure_data_source(
    client: &dyn FitnessClient,
    data_type_name: &str,
    project_number: &str,
) -> Option<String> {
    let id = ids::data_source_id(data_type_name, project_number);
    match client.get_data_source(&id).await {
        Ok(_) => {
            info!("data source {id} already exists");
            Some(id)
        }
        Err(e) if e.is_not_found() => {
            info!("creating data source {id}");
            let source = ids::derived_data_source(data_type_name, project_number);
            match client.create_data_source(&source).await {
                Ok(created) => {
                    info!("data source created: {}", created.data_stream_id);
                    Some(id)
                }
                Err(e) => {
                    error!("creating data source {id}: {e}");
                    None
                }
            }
        }
        Err(e) => {
            error!("checking data source {id}: {e}");
            None
        }
    }
}

/// Log one activity. Returns whether every performed call succeeded; a
/// failed optional data source is skipped rather than treated as failure.
pub async fn log_activity(
    client: &dyn FitnessClient,
    project_number: &str,
    request: &LogRequest,
) -> bool {
    let activity_source = ensure_data_source(client, ACTIVITY_SEGMENT, project_number).await;
    let calories_source = match request.calories {
        Some(_) => ensure_data_source(client, CALORIES_EXPENDED, project_number).await,
        None => None,
    };
    let steps_source = match request.steps {
        Some(_) => ensure_data_source(client, STEP_COUNT_DELTA, project_number).await,
        None => None,
    };

    let Some(activity_source) = activity_source else {
        error!("failed to provision the activity data source");
        return false;
    };

    let start_ns = ids::to_nanos(&request.start_time);
    let end_ns = ids::to_nanos(&request.end_time);
    let dataset_id = ids::dataset_id(start_ns, end_ns);
    let mut ok = true;

    let activity_dataset = Dataset::single_point(
        activity_source.as_str(),
        ACTIVITY_SEGMENT,
        start_ns,
        end_ns,
        DataValue::int(request.activity_type),
    );
    if let Err(e) = client
        .patch_dataset(&activity_source, &dataset_id, &activity_dataset)
        .await
    {
        error!("inserting activity segment: {e}");
        ok = false;
    }

    match (request.calories, calories_source.as_deref()) {
        (Some(calories), Some(source)) => {
            let dataset = Dataset::single_point(
                source,
                CALORIES_EXPENDED,
                start_ns,
                end_ns,
                DataValue::float(calories),
            );
            if let Err(e) = client.patch_dataset(source, &dataset_id, &dataset).await {
                error!("inserting calories: {e}");
                ok = false;
            }
        }
        (Some(_), None) => warn!("skipping calories, data source unavailable"),
        _ => {}
    }

    match (request.steps, steps_source.as_deref()) {
        (Some(steps), Some(source)) => {
            let dataset = Dataset::single_point(
                source,
                STEP_COUNT_DELTA,
                start_ns,
                end_ns,
                DataValue::int(steps),
            );
            if let Err(e) = client.patch_dataset(source, &dataset_id, &dataset).await {
                error!("inserting steps: {e}");
                ok = false;
            }
        }
        (Some(_), None) => warn!("skipping steps, data source unavailable"),
        _ => {}
    }

    let start_ms = ids::to_millis(&request.start_time);
    let end_ms = ids::to_millis(&request.end_time);
    let session = Session {
        id: ids::session_id(start_ms),
        name: Some(format!("{APPLICATION_NAME} Session")),
        description: Some(format!("Activity recorded via {APPLICATION_NAME}")),
        start_time_millis: start_ms,
        end_time_millis: end_ms,
        application: Some(Application {
            name: APPLICATION_NAME.into(),
            version: None,
        }),
        activity_type: request.activity_type,
    };
    match client.upsert_session(&session).await {
        Ok(_) => info!("session {} created", session.id),
        Err(e) => {
            error!("creating session: {e}");
            ok = false;
        }
    }

    // Aggregation nudges the backend into reflecting inserted steps in its
    // day totals, so it is only worth requesting when steps were supplied.
    if request.steps.is_some() {
        let aggregate = AggregateRequest::daily(STEP_COUNT_DELTA, start_ms, end_ms);
        match client.aggregate(&aggregate).await {
            Ok(_) => info!("data aggregation requested"),
            Err(e) => {
                error!("requesting data aggregation: {e}");
                ok = false;
            }
        }
    }

    if ok {
        info!("data points inserted");
    }
    ok
}
