use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use chrono_tz::UTC;
use pretty_assertions::assert_eq;
use tokio::{
    sync::oneshot,
    time::{Instant, sleep_until},
};
use vitalog_db::mock::{memory::InMemoryStore, repositories::MockReminderRepo};
use vitalog_reminders::{
    ReminderDispatcher,
    mock::{MockChat, MockMailer},
    scheduler::{run_scheduler, run_scheduler_at},
};

const HOUR: Duration = Duration::from_secs(3600);

fn dispatcher_over(reminders: MockReminderRepo) -> Arc<ReminderDispatcher> {
    Arc::new(ReminderDispatcher::new(
        Arc::new(reminders),
        Arc::new(InMemoryStore::new()),
        Arc::new(MockMailer::new()),
        Arc::new(MockChat::new()),
        UTC,
    ))
}

#[tokio::test]
async fn test_scheduler_stops_on_shutdown() {
    let store = Arc::new(InMemoryStore::new());
    let dispatcher = Arc::new(ReminderDispatcher::new(
        store.clone(),
        store,
        Arc::new(MockMailer::new()),
        Arc::new(MockChat::new()),
        UTC,
    ));

    let finished = tokio::time::timeout(
        Duration::from_secs(5),
        run_scheduler(dispatcher, HOUR, async {}),
    )
    .await;

    assert!(finished.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_runs_one_cycle_per_interval() {
    let cycles = Arc::new(AtomicUsize::new(0));
    let mut reminders = MockReminderRepo::new();
    let counter = cycles.clone();
    reminders.expect_list_all().times(3).returning(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    });

    let start = Instant::now() + Duration::from_secs(600);
    let (stop, stopped) = oneshot::channel::<()>();
    let scheduler = tokio::spawn(run_scheduler_at(dispatcher_over(reminders), start, HOUR, async {
        let _ = stopped.await;
    }));

    // Nothing runs before the first boundary
    sleep_until(start - Duration::from_secs(1)).await;
    assert_eq!(cycles.load(Ordering::SeqCst), 0);

    sleep_until(start + Duration::from_secs(1)).await;
    assert_eq!(cycles.load(Ordering::SeqCst), 1);

    sleep_until(start + HOUR * 2 + Duration::from_secs(1)).await;
    assert_eq!(cycles.load(Ordering::SeqCst), 3);

    stop.send(()).unwrap();
    // Dropping the mock inside the task checks the expected call count
    scheduler.await.unwrap();
    assert_eq!(cycles.load(Ordering::SeqCst), 3);
}
