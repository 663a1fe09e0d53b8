//! Behavioral tests for the habit registry, driven on a paused Tokio clock
//! so interval arithmetic is exact and the suite runs in milliseconds.

use std::time::Duration;

use botones_habits::{HabitError, HabitNotice, HabitRegistry, InstallOutcome};
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};

#[tokio::test(start_paused = true)]
async fn interval_below_one_minute_is_rejected() {
    let (tx, _rx) = mpsc::channel(8);
    let registry = HabitRegistry::new(tx);

    let err = registry.create_or_replace("beber agua", 0, 1).unwrap_err();
    assert!(matches!(err, HabitError::BadInterval { minutes: 0 }));
    assert!(registry.is_empty());

    let err = registry.schedule_once("parquimetro", -5, 1).unwrap_err();
    assert!(matches!(err, HabitError::BadInterval { minutes: -5 }));
}

#[tokio::test(start_paused = true)]
async fn habit_fires_one_full_interval_apart() {
    let (tx, mut rx) = mpsc::channel(8);
    let registry = HabitRegistry::new(tx);

    let outcome = registry.create_or_replace("estirar", 1, 42).unwrap();
    assert_eq!(outcome, InstallOutcome::Created);

    let start = Instant::now();
    let notice = rx.recv().await.unwrap();
    assert_eq!(
        notice,
        HabitNotice {
            key: "estirar".into(),
            channel_id: 42
        }
    );
    assert_eq!(start.elapsed(), Duration::from_secs(60));

    rx.recv().await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_secs(120));
}

#[tokio::test(start_paused = true)]
async fn replace_silences_the_old_loop() {
    let (tx, mut rx) = mpsc::channel(8);
    let registry = HabitRegistry::new(tx);

    registry.create_or_replace("pastillas", 1, 7).unwrap();
    // Let the first tick arrive so the old loop is demonstrably live.
    let first = rx.recv().await.unwrap();
    assert_eq!(first.channel_id, 7);

    let outcome = registry.create_or_replace("pastillas", 5, 9).unwrap();
    assert_eq!(outcome, InstallOutcome::Replaced);
    assert_eq!(registry.len(), 1);

    // The next notice must come from the 5-minute replacement, not the
    // old 1-minute loop.
    let start = Instant::now();
    let next = rx.recv().await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_secs(300));
    assert_eq!(next.channel_id, 9);
}

#[tokio::test(start_paused = true)]
async fn stale_cleanup_never_removes_a_replacement() {
    let (tx, _rx) = mpsc::channel(8);
    let registry = HabitRegistry::new(tx);

    registry.create_or_replace("regar plantas", 1, 3).unwrap();
    registry.create_or_replace("regar plantas", 2, 3).unwrap();

    // Give the cancelled first loop every chance to run its cleanup.
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    let habits = registry.list();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0].interval_minutes, 2);
}

#[tokio::test(start_paused = true)]
async fn delete_signals_not_found_on_unknown_key() {
    let (tx, _rx) = mpsc::channel(8);
    let registry = HabitRegistry::new(tx);

    registry.create_or_replace("leer", 1, 5).unwrap();

    let info = registry.delete("leer").unwrap();
    assert_eq!(info.interval_minutes, 1);
    assert!(registry.is_empty());

    let err = registry.delete("leer").unwrap_err();
    assert!(matches!(err, HabitError::NotFound { .. }));
}

#[tokio::test(start_paused = true)]
async fn deleted_habit_stops_firing() {
    let (tx, mut rx) = mpsc::channel(8);
    let registry = HabitRegistry::new(tx);

    registry.create_or_replace("cafe", 1, 5).unwrap();
    rx.recv().await.unwrap();

    registry.delete("cafe").unwrap();

    // With the loop cancelled no further notice can arrive; the timeout
    // itself elapses on the paused clock.
    let res = timeout(Duration::from_secs(600), rx.recv()).await;
    assert!(res.is_err());
}

#[tokio::test(start_paused = true)]
async fn distinct_keys_run_independently() {
    let (tx, mut rx) = mpsc::channel(8);
    let registry = HabitRegistry::new(tx);

    registry.create_or_replace("agua", 1, 1).unwrap();
    registry.create_or_replace("pausa", 5, 2).unwrap();
    assert_eq!(registry.len(), 2);

    // Minutes 1-4 belong to the fast habit alone.
    for _ in 0..4 {
        assert_eq!(rx.recv().await.unwrap().key, "agua");
    }

    // Removing one habit must not disturb the other.
    registry.delete("agua").unwrap();
    let notice = rx.recv().await.unwrap();
    assert_eq!(notice.key, "pausa");
    assert_eq!(notice.channel_id, 2);
}

#[tokio::test(start_paused = true)]
async fn list_is_sorted_by_key() {
    let (tx, _rx) = mpsc::channel(8);
    let registry = HabitRegistry::new(tx);

    registry.create_or_replace("zanahoria", 3, 1).unwrap();
    registry.create_or_replace("apio", 3, 1).unwrap();
    registry.create_or_replace("miel", 3, 1).unwrap();

    let keys: Vec<String> = registry.list().into_iter().map(|h| h.key).collect();
    assert_eq!(keys, vec!["apio", "miel", "zanahoria"]);
}

#[tokio::test(start_paused = true)]
async fn one_shot_reminder_fires_exactly_once() {
    let (tx, mut rx) = mpsc::channel(8);
    let registry = HabitRegistry::new(tx);

    registry.schedule_once("sacar la basura", 2, 11).unwrap();
    // Reminders are not registered.
    assert!(registry.is_empty());

    let start = Instant::now();
    let notice = rx.recv().await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_secs(120));
    assert_eq!(notice.key, "sacar la basura");
    assert_eq!(notice.channel_id, 11);

    let res = timeout(Duration::from_secs(600), rx.recv()).await;
    assert!(res.is_err());
}
