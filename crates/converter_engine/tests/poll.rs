mod support;

use std::sync::Arc;
use std::time::Duration;

use converter_core::{ErrorOrigin, JobHandle, JobStatus};
use converter_engine::{start_polling, ClientError, EngineEvent, StopReason};
use support::{RecordingSink, ScriptedClient};

const INTERVAL: Duration = Duration::from_millis(1000);

fn polled_statuses(events: &[EngineEvent]) -> Vec<Result<JobStatus, ClientError>> {
    events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::Polled { result, .. } => Some(result.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn loop_ends_on_conversion_id_not_on_full_progress() {
    let client = Arc::new(ScriptedClient::new().statuses(
        "t1",
        vec![
            Ok(JobStatus::running(1)),
            Ok(JobStatus::running(3)),
            Ok(JobStatus::finished(3, "c1")),
        ],
    ));
    let sink = RecordingSink::new();

    let handle = start_polling(
        client.clone(),
        7,
        JobHandle::new("t1"),
        INTERVAL,
        Arc::new(sink.clone()),
    );
    handle.wait().await;

    let events = sink.take();
    assert_eq!(
        polled_statuses(&events),
        vec![
            Ok(JobStatus::running(1)),
            Ok(JobStatus::running(3)),
            Ok(JobStatus::finished(3, "c1")),
        ]
    );
    assert_eq!(
        events.last(),
        Some(&EngineEvent::PollStopped {
            submission: 7,
            reason: StopReason::Finished,
        })
    );

    tokio::time::sleep(INTERVAL * 5).await;
    assert_eq!(client.poll_count("t1"), 3);
}

#[tokio::test(start_paused = true)]
async fn poll_failures_do_not_stop_the_loop() {
    let client = Arc::new(ScriptedClient::new().statuses(
        "t1",
        vec![
            Err(ClientError::new(ErrorOrigin::NoResponse, "connection reset")),
            Err(ClientError::rejected(500, "boom")),
            Ok(JobStatus::finished(2, "c1")),
        ],
    ));
    let sink = RecordingSink::new();

    let handle = start_polling(
        client.clone(),
        1,
        JobHandle::new("t1"),
        INTERVAL,
        Arc::new(sink.clone()),
    );
    handle.wait().await;

    let statuses = polled_statuses(&sink.take());
    assert_eq!(statuses.len(), 3);
    assert_eq!(statuses[0].as_ref().unwrap_err().origin, ErrorOrigin::NoResponse);
    assert_eq!(
        statuses[1].as_ref().unwrap_err().origin,
        ErrorOrigin::ServerRejected
    );
    assert_eq!(statuses[2], Ok(JobStatus::finished(2, "c1")));
}

#[tokio::test(start_paused = true)]
async fn first_poll_waits_one_interval() {
    let client = Arc::new(ScriptedClient::new().statuses("t1", vec![Ok(JobStatus::running(0))]));
    let sink = RecordingSink::new();

    let _handle = start_polling(
        client.clone(),
        1,
        JobHandle::new("t1"),
        INTERVAL,
        Arc::new(sink.clone()),
    );

    tokio::time::sleep(INTERVAL / 2).await;
    assert_eq!(client.poll_count("t1"), 0);

    tokio::time::sleep(INTERVAL).await;
    assert_eq!(client.poll_count("t1"), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_further_polls() {
    let client = Arc::new(ScriptedClient::new().statuses("t1", vec![Ok(JobStatus::running(1))]));
    let sink = RecordingSink::new();

    let handle = start_polling(
        client.clone(),
        3,
        JobHandle::new("t1"),
        INTERVAL,
        Arc::new(sink.clone()),
    );
    tokio::time::sleep(INTERVAL * 2 + INTERVAL / 2).await;
    let polls_before_cancel = client.poll_count("t1");
    assert_eq!(polls_before_cancel, 2);

    handle.cancel();
    tokio::time::sleep(INTERVAL * 5).await;

    assert!(handle.is_finished());
    assert_eq!(client.poll_count("t1"), polls_before_cancel);
    assert_eq!(
        sink.take().last(),
        Some(&EngineEvent::PollStopped {
            submission: 3,
            reason: StopReason::Cancelled,
        })
    );
}

#[tokio::test(start_paused = true)]
async fn result_arriving_after_cancel_is_discarded() {
    let client = Arc::new(
        ScriptedClient::new()
            .with_poll_delay(Duration::from_millis(500))
            .statuses("t1", vec![Ok(JobStatus::finished(2, "c1"))]),
    );
    let sink = RecordingSink::new();

    let handle = start_polling(
        client.clone(),
        4,
        JobHandle::new("t1"),
        INTERVAL,
        Arc::new(sink.clone()),
    );
    // Past the first tick, with the status request still in flight.
    tokio::time::sleep(INTERVAL + Duration::from_millis(100)).await;
    assert_eq!(client.poll_count("t1"), 1);

    handle.cancel();
    handle.wait().await;

    let events = sink.take();
    assert!(polled_statuses(&events).is_empty());
    assert_eq!(
        events,
        vec![EngineEvent::PollStopped {
            submission: 4,
            reason: StopReason::Cancelled,
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_cancels_the_loop() {
    let client = Arc::new(ScriptedClient::new().statuses("t1", vec![Ok(JobStatus::running(1))]));
    let sink = RecordingSink::new();

    let handle = start_polling(
        client.clone(),
        5,
        JobHandle::new("t1"),
        INTERVAL,
        Arc::new(sink.clone()),
    );
    tokio::time::sleep(INTERVAL + INTERVAL / 2).await;
    drop(handle);
    tokio::time::sleep(INTERVAL * 4).await;

    assert_eq!(client.poll_count("t1"), 1);
}
