//! Recurring daily schedules — durable rows materialized into live timers.
//!
//! Each schedule row owns at most one timer task, registered here by
//! schedule id. The registry is private to the Scheduler: rows and timers
//! move in lockstep through create/cancel, and startup reconciliation is
//! the only path that turns a bare row back into a running timer.

use chrono::NaiveDateTime;
use parrot_core::{error::ParrotError, message::OutgoingMessage, traits::Channel};
use parrot_store::{schedule_id, Schedule, Store};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Owns the durable schedule table's runtime counterpart: one abortable
/// timer task per active schedule.
pub struct Scheduler {
    store: Store,
    channels: HashMap<String, Arc<dyn Channel>>,
    /// Name of the channel scheduled sends go out through.
    secondary: String,
    send_timeout: Duration,
    /// Live timers keyed by schedule id. Never exposed outside this type.
    timers: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(
        store: Store,
        channels: HashMap<String, Arc<dyn Channel>>,
        secondary: &str,
        send_timeout: Duration,
    ) -> Self {
        Self {
            store,
            channels,
            secondary: secondary.to_string(),
            send_timeout,
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Create (or replace) a schedule: persist the row first, then swap in a
    /// fresh timer. If persistence fails no timer is touched — a timer must
    /// never run for an unpersisted schedule.
    pub async fn create(
        &self,
        contact_id: &str,
        message: &str,
        hour: u8,
        minute: u8,
    ) -> Result<Schedule, ParrotError> {
        let schedule = self
            .store
            .upsert_schedule(contact_id, message, hour, minute)
            .await?;

        let handle = self.spawn_timer(schedule.clone())?;
        let mut timers = self.timers.lock().await;
        if let Some(old) = timers.insert(schedule.id.clone(), handle) {
            // Replace-not-duplicate: the previous timer for this id dies now.
            old.abort();
        }
        drop(timers);

        info!(
            "schedule {} active: daily at {:02}:{:02}",
            schedule.id, schedule.hour, schedule.minute
        );
        Ok(schedule)
    }

    /// Cancel a schedule: stop the timer, then delete the row. Reports
    /// NotFound when no such schedule exists. After this returns, no new
    /// fire can start for the id.
    pub async fn cancel(&self, contact_id: &str, hour: u8, minute: u8) -> Result<(), ParrotError> {
        let id = schedule_id(contact_id, hour, minute);

        let had_timer = {
            let mut timers = self.timers.lock().await;
            match timers.remove(&id) {
                Some(handle) => {
                    handle.abort();
                    true
                }
                None => false,
            }
        };

        let had_row = self.store.delete_schedule(&id).await?;
        if !had_row && !had_timer {
            return Err(ParrotError::NotFound(format!("schedule {id}")));
        }

        info!("schedule {id} cancelled");
        Ok(())
    }

    /// Startup reconciliation: re-materialize every durable row into a live
    /// timer. One broken row must not block the rest — failures are logged
    /// and skipped. Returns the number of timers now running.
    pub async fn reconcile(&self) -> Result<usize, ParrotError> {
        let schedules = self.store.list_schedules().await?;
        let mut timers = self.timers.lock().await;

        for schedule in schedules {
            let id = schedule.id.clone();
            match self.spawn_timer(schedule) {
                Ok(handle) => {
                    if let Some(old) = timers.insert(id, handle) {
                        old.abort();
                    }
                }
                Err(e) => {
                    error!("failed to materialize schedule {id}: {e}");
                }
            }
        }

        Ok(timers.len())
    }

    /// Number of live timers (for status reporting).
    pub async fn timer_count(&self) -> usize {
        self.timers.lock().await.len()
    }

    /// Abort every live timer. Rows are untouched — the next startup
    /// reconciliation brings them back.
    pub async fn shutdown(&self) {
        let mut timers = self.timers.lock().await;
        for (_, handle) in timers.drain() {
            handle.abort();
        }
    }

    /// Spawn the daily timer task for one schedule.
    fn spawn_timer(&self, schedule: Schedule) -> Result<JoinHandle<()>, ParrotError> {
        if schedule.hour > 23 || schedule.minute > 59 {
            return Err(ParrotError::Validation(format!(
                "schedule {} has invalid time {:02}:{:02}",
                schedule.id, schedule.hour, schedule.minute
            )));
        }

        let channels = self.channels.clone();
        let secondary = self.secondary.clone();
        let send_timeout = self.send_timeout;

        Ok(tokio::spawn(async move {
            loop {
                let now = chrono::Local::now().naive_local();
                let Some(wait) = secs_until(schedule.hour, schedule.minute, now) else {
                    error!(
                        "schedule {}: time arithmetic failed, timer exiting",
                        schedule.id
                    );
                    return;
                };
                tokio::time::sleep(Duration::from_secs(wait)).await;
                fire(&channels, &secondary, &schedule, send_timeout).await;
            }
        }))
    }
}

/// Deliver one scheduled send. A failed or skipped fire is not retried —
/// the timer simply waits for the next day's trigger.
pub(super) async fn fire(
    channels: &HashMap<String, Arc<dyn Channel>>,
    secondary: &str,
    schedule: &Schedule,
    send_timeout: Duration,
) {
    let Some(channel) = channels.get(secondary) else {
        warn!(
            "scheduler: no channel '{secondary}' for schedule {}",
            schedule.id
        );
        return;
    };

    if !channel.is_ready().await {
        warn!(
            "scheduler: {secondary} not ready, skipping {} until tomorrow",
            schedule.id
        );
        return;
    }

    let msg = OutgoingMessage::to_target(schedule.contact_id.clone(), schedule.message.clone());
    match tokio::time::timeout(send_timeout, channel.send(msg)).await {
        Ok(Ok(())) => info!("delivered schedule {}", schedule.id),
        Ok(Err(e)) => error!("failed to deliver schedule {}: {e}", schedule.id),
        Err(_) => error!(
            "schedule {} send timed out after {}s",
            schedule.id,
            send_timeout.as_secs()
        ),
    }
}

/// Seconds from `now` until the next local occurrence of `hour:minute`.
///
/// Today's occurrence when it is still ahead, otherwise tomorrow's. Local
/// wall-clock arithmetic with no timezone field — the deploying host's
/// timezone is implicitly the schedule's timezone.
fn secs_until(hour: u8, minute: u8, now: NaiveDateTime) -> Option<u64> {
    let today = now.date().and_hms_opt(hour as u32, minute as u32, 0)?;
    let target = if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    };
    Some((target - now).num_seconds().max(0) as u64)
}
