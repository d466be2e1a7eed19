//! Same-day cleanup: delete every session in today's window and, for data
//! sources in this tool's namespace, today's dataset. Best effort; 404s on
//! dataset deletion are benign and everything else is logged and skipped.

use chrono::{DateTime, Local};
use gfit_client::FitnessClient;
use gfit_client::ids;
use tracing::{info, warn};

/// Remove all fitness activities recorded for the calendar day containing
/// `now`. Always runs to completion.
pub async fn clean_up_day(client: &dyn FitnessClient, project_number: &str, now: DateTime<Local>) {
    let (day_start, day_end) = ids::local_day_bounds(&now);
    info!("cleaning up activities from {day_start} to {day_end}");

    let start_bound = ids::session_time_bound(&day_start);
    let end_bound = ids::session_time_bound(&day_end);

    match client.list_sessions(&start_bound, &end_bound).await {
        Ok(sessions) if sessions.is_empty() => info!("no sessions found for today"),
        Ok(sessions) => {
            for session in sessions {
                match client.delete_session(&session.id).await {
                    Ok(()) => info!("deleted session {}", session.id),
                    Err(e) => warn!("deleting session {}: {e}", session.id),
                }
            }
        }
        Err(e) => warn!("listing sessions: {e}"),
    }

    let start_ns = ids::to_nanos(&day_start);
    let end_ns = ids::to_nanos(&day_end);
    let dataset_id = ids::dataset_id(start_ns, end_ns);

    match client.list_data_sources().await {
        Ok(sources) if sources.is_empty() => info!("no data sources found"),
        Ok(sources) => {
            for source in sources {
                // Only touch streams this tool created.
                if !ids::is_our_stream(&source.data_stream_id, project_number) {
                    continue;
                }
                match client
                    .delete_dataset(&source.data_stream_id, &dataset_id)
                    .await
                {
                    Ok(()) => info!("deleted dataset for {}", source.data_stream_id),
                    Err(e) if e.is_not_found() => {}
                    Err(e) => warn!("deleting dataset for {}: {e}", source.data_stream_id),
                }
            }
        }
        Err(e) => warn!("listing data sources: {e}"),
    }

    info!("cleanup completed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingClient;
    use gfit_client::Session;
    use gfit_client::models::{ACTIVITY_SEGMENT, STEP_COUNT_DELTA};

    const PROJECT: &str = "394921715331";

    fn session(id: &str) -> Session {
        Session {
            id: id.into(),
            name: None,
            description: None,
            start_time_millis: 0,
            end_time_millis: 0,
            application: None,
            activity_type: 8,
        }
    }

    #[tokio::test]
    async fn deletes_every_listed_session() {
        let client = RecordingClient {
            sessions: vec![session("session-1"), session("session-2")],
            ..RecordingClient::default()
        };
        clean_up_day(&client, PROJECT, Local::now()).await;

        let calls = client.recorded();
        assert!(calls.iter().any(|c| c == "delete_session:session-1"));
        assert!(calls.iter().any(|c| c == "delete_session:session-2"));
    }

    #[tokio::test]
    async fn only_deletes_datasets_in_our_namespace() {
        let ours = ids::data_source_id(ACTIVITY_SEGMENT, PROJECT);
        let foreign = "derived:com.google.step_count.delta:99999:phoneapp:pixel:1:steps";
        let client = RecordingClient {
            sources: vec![
                RecordingClient::stub_source(&ours),
                RecordingClient::stub_source(foreign),
            ],
            ..RecordingClient::default()
        };
        clean_up_day(&client, PROJECT, Local::now()).await;

        let calls = client.recorded();
        assert!(calls.iter().any(|c| c.starts_with(&format!("delete_dataset:{ours}"))));
        assert!(!calls.iter().any(|c| c.starts_with(&format!("delete_dataset:{foreign}"))));
    }

    #[tokio::test]
    async fn missing_dataset_is_benign_and_cleanup_continues() {
        let first = ids::data_source_id(ACTIVITY_SEGMENT, PROJECT);
        let second = ids::data_source_id(STEP_COUNT_DELTA, PROJECT);
        let client = RecordingClient {
            sources: vec![
                RecordingClient::stub_source(&first),
                RecordingClient::stub_source(&second),
            ],
            missing_datasets: vec![first.clone()],
            ..RecordingClient::default()
        };
        clean_up_day(&client, PROJECT, Local::now()).await;

        let calls = client.recorded();
        assert!(calls.iter().any(|c| c.starts_with(&format!("delete_dataset:{second}"))));
    }

    #[tokio::test]
    async fn session_listing_failure_still_cleans_datasets() {
        let ours = ids::data_source_id(ACTIVITY_SEGMENT, PROJECT);
        let client = RecordingClient {
            fail_list_sessions: true,
            sources: vec![RecordingClient::stub_source(&ours)],
            ..RecordingClient::default()
        };
        clean_up_day(&client, PROJECT, Local::now()).await;

        let calls = client.recorded();
        assert!(calls.iter().any(|c| c == "list_data_sources"));
        assert!(calls.iter().any(|c| c.starts_with("delete_dataset:")));
    }

    #[tokio::test]
    async fn dataset_id_covers_the_whole_day() {
        let ours = ids::data_source_id(ACTIVITY_SEGMENT, PROJECT);
        let client = RecordingClient {
            sources: vec![RecordingClient::stub_source(&ours)],
            ..RecordingClient::default()
        };
        let now = Local::now();
        clean_up_day(&client, PROJECT, now).await;

        let (start, end) = ids::local_day_bounds(&now);
        let expected = ids::dataset_id(ids::to_nanos(&start), ids::to_nanos(&end));
        let calls = client.recorded();
        assert!(calls.iter().any(|c| c.ends_with(&expected)));
    }
}
