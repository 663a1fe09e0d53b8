//! The registry itself: one cancelable interval loop per habit key.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use dashmap::{mapref::entry::Entry, DashMap};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{HabitError, Result};

/// Notification emitted when a habit interval elapses or a one-shot
/// reminder comes due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitNotice {
    /// The habit's message text (doubles as its identifier).
    pub key: String,
    /// Channel the habit was created from, where the notice is announced.
    pub channel_id: u64,
}

/// Snapshot of one registered habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitInfo {
    pub key: String,
    pub interval_minutes: u64,
}

/// Whether `create_or_replace` found an existing entry under the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Created,
    Replaced,
}

struct HabitEntry {
    interval_minutes: u64,
    channel_id: u64,
    /// Installation epoch. Loop cleanup may only remove the entry it was
    /// installed with; a replacement under the same key carries a newer
    /// epoch and is left alone.
    epoch: u64,
    cancel: CancellationToken,
}

/// In-memory registry of recurring habit loops.
///
/// All mutation goes through the map's entry and removal locks, so each key
/// has a single writer at a time. The registry is shared behind an `Arc`;
/// loops hold a clone so the map outlives every loop that can touch it.
pub struct HabitRegistry {
    entries: DashMap<String, HabitEntry>,
    notice_tx: mpsc::Sender<HabitNotice>,
    epoch: AtomicU64,
}

impl HabitRegistry {
    /// Create an empty registry. Fired notices are sent on `notice_tx`.
    pub fn new(notice_tx: mpsc::Sender<HabitNotice>) -> Arc<Self> {
        Arc::new(Self {
            entries: DashMap::new(),
            notice_tx,
            epoch: AtomicU64::new(0),
        })
    }

    /// Register a habit under `key`, replacing (and cancelling) any previous
    /// habit with the same key. The first notice arrives one full interval
    /// after registration.
    ///
    /// # Errors
    ///
    /// `BadInterval` — `interval_minutes < 1`; nothing is spawned or stored.
    pub fn create_or_replace(
        self: &Arc<Self>,
        key: &str,
        interval_minutes: i64,
        channel_id: u64,
    ) -> Result<InstallOutcome> {
        if interval_minutes < 1 {
            return Err(HabitError::BadInterval {
                minutes: interval_minutes,
            });
        }
        let interval_minutes = interval_minutes as u64;

        let epoch = self.epoch.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let entry = HabitEntry {
            interval_minutes,
            channel_id,
            epoch,
            cancel: cancel.clone(),
        };

        // The old loop must be cancelled before the new entry becomes
        // visible, and both happen under the key's entry lock.
        let outcome = match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut slot) => {
                slot.get().cancel.cancel();
                slot.insert(entry);
                InstallOutcome::Replaced
            }
            Entry::Vacant(slot) => {
                slot.insert(entry);
                InstallOutcome::Created
            }
        };

        let registry = Arc::clone(self);
        let key = key.to_string();
        info!(%key, interval_minutes, ?outcome, "habit installed");
        tokio::spawn(async move {
            registry
                .run_habit_loop(key, epoch, interval_minutes, channel_id, cancel)
                .await;
        });

        Ok(outcome)
    }

    /// Snapshot of all registered habits, sorted by key.
    pub fn list(&self) -> Vec<HabitInfo> {
        let mut habits: Vec<HabitInfo> = self
            .entries
            .iter()
            .map(|entry| HabitInfo {
                key: entry.key().clone(),
                interval_minutes: entry.value().interval_minutes,
            })
            .collect();
        habits.sort_by(|a, b| a.key.cmp(&b.key));
        habits
    }

    /// Remove the habit under `key` and cancel its loop.
    ///
    /// # Errors
    ///
    /// `NotFound` — no habit with that key. This is a signal for the caller
    /// to relay, not a fault.
    pub fn delete(&self, key: &str) -> Result<HabitInfo> {
        match self.entries.remove(key) {
            Some((key, entry)) => {
                entry.cancel.cancel();
                info!(%key, "habit removed");
                Ok(HabitInfo {
                    key,
                    interval_minutes: entry.interval_minutes,
                })
            }
            None => Err(HabitError::NotFound {
                key: key.to_string(),
            }),
        }
    }

    /// Schedule a one-shot reminder: sleep `minutes`, send one notice, done.
    /// Reminders are not registered and cannot be listed or cancelled.
    ///
    /// # Errors
    ///
    /// `BadInterval` — `minutes < 1`; nothing is spawned.
    pub fn schedule_once(&self, text: &str, minutes: i64, channel_id: u64) -> Result<()> {
        if minutes < 1 {
            return Err(HabitError::BadInterval { minutes });
        }

        let tx = self.notice_tx.clone();
        let notice = HabitNotice {
            key: text.to_string(),
            channel_id,
        };
        let delay = std::time::Duration::from_secs(minutes as u64 * 60);
        info!(minutes, "one-shot reminder scheduled");
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(notice).await.is_err() {
                warn!("notice channel closed; reminder dropped");
            }
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One habit's loop: wait a full interval, emit a notice, repeat until
    /// cancelled. Cancellation is observed at the select boundary, so a
    /// notice in flight is never interrupted mid-send.
    async fn run_habit_loop(
        self: Arc<Self>,
        key: String,
        epoch: u64,
        interval_minutes: u64,
        channel_id: u64,
        cancel: CancellationToken,
    ) {
        let period = std::time::Duration::from_secs(interval_minutes * 60);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(period) => {
                    let notice = HabitNotice { key: key.clone(), channel_id };
                    // A failed delivery must not kill the habit.
                    if self.notice_tx.send(notice).await.is_err() {
                        warn!(%key, "notice channel closed; notification dropped");
                    }
                }
            }
        }

        self.entries.remove_if(&key, |_, entry| entry.epoch == epoch);
        debug!(%key, epoch, "habit loop exited");
    }
}
