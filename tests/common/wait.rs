//! Helpers for waiting on a running search

use keysearch::{Event, SearchController, StatusSnapshot};
use std::time::Duration;
use tokio::sync::broadcast;

/// Default upper bound for any single search in these tests
pub const TEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Poll `status()` until the job completes
pub async fn wait_for_completion(controller: &SearchController) -> StatusSnapshot {
    tokio::time::timeout(TEST_TIMEOUT, async {
        loop {
            let status = controller.status();
            if status.completed {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("search did not complete in time")
}

/// Wait for the next `SearchFinished` event
pub async fn wait_for_finished_event(events: &mut broadcast::Receiver<Event>) -> Event {
    tokio::time::timeout(TEST_TIMEOUT, async {
        loop {
            match events.recv().await {
                Ok(event @ Event::SearchFinished { .. }) => return event,
                Ok(_) => continue,
                Err(e) => panic!("event channel failed: {e}"),
            }
        }
    })
    .await
    .expect("no SearchFinished event in time")
}
