//! Named timer registry.
//!
//! Schedules one-shot or repeating async actions under a caller-chosen id and
//! cancels them by the same id. Built on the tokio runtime the caller is
//! running in.
//!
//! # Main types
//!
//! - [`TimerRegistry`]: The registry.
//! - [`TimerAction`]: Boxed form of a scheduled action.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use parking_lot::Mutex;
use robochat_core::RobochatResult;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// A zero-argument async action.
pub type TimerAction = Arc<dyn Fn() -> BoxFuture<'static, RobochatResult<()>> + Send + Sync>;

/// Smallest period accepted for repeating timers.
const MIN_PERIOD: Duration = Duration::from_millis(1);

struct TimerEntry {
    /// Distinguishes this registration from a later one under the same id.
    token: Uuid,
    repeating: bool,
    delay: Duration,
    handle: JoinHandle<()>,
}

type Entries = Arc<Mutex<HashMap<String, TimerEntry>>>;

/// Registry of pending timers keyed by id.
///
/// Scheduling an id that is already registered cancels the previous timer
/// before registering the new one. A one-shot entry is removed before its
/// action runs; a repeating entry stays until cancelled. Errors and panics
/// inside actions stop at the firing boundary and are only logged.
///
/// Dropping the registry cancels every pending timer.
pub struct TimerRegistry {
    entries: Entries,
}

impl TimerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Run `action` once after `delay`.
    pub fn schedule_once<F, Fut>(&self, id: impl Into<String>, delay: Duration, action: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RobochatResult<()>> + Send + 'static,
    {
        self.schedule(id, delay, false, action);
    }

    /// Run `action` every `period`, first after one full period.
    pub fn schedule_repeating<F, Fut>(&self, id: impl Into<String>, period: Duration, action: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RobochatResult<()>> + Send + 'static,
    {
        self.schedule(id, period, true, action);
    }

    /// Register a timer under `id`, replacing any timer with the same id.
    ///
    /// Never fails: without a tokio runtime the request is logged and dropped.
    pub fn schedule<F, Fut>(
        &self,
        id: impl Into<String>,
        delay: Duration,
        repeating: bool,
        action: F,
    ) where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RobochatResult<()>> + Send + 'static,
    {
        let action: TimerAction = Arc::new(move || action().boxed());
        self.schedule_action(id.into(), delay, repeating, action);
    }

    /// Same as [`TimerRegistry::schedule`] for an already boxed action.
    pub fn schedule_action(
        &self,
        id: String,
        delay: Duration,
        repeating: bool,
        action: TimerAction,
    ) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!(timer = %id, error = %e, "No async runtime, timer not scheduled");
                return;
            }
        };

        let token = Uuid::new_v4();
        let previous = {
            let mut entries = self.entries.lock();
            let previous = entries.remove(&id);
            let handle = if repeating {
                runtime.spawn(run_repeating(self.entries.clone(), id.clone(), token, delay, action))
            } else {
                runtime.spawn(run_once(self.entries.clone(), id.clone(), token, delay, action))
            };
            entries.insert(
                id.clone(),
                TimerEntry {
                    token,
                    repeating,
                    delay,
                    handle,
                },
            );
            previous
        };

        // Aborting may drop the old action, which must not happen under the lock.
        if let Some(previous) = previous {
            debug!(timer = %id, "Replaced existing timer");
            previous.handle.abort();
        }
    }

    /// Cancel and remove the timer `id`. Returns `false` if there was none.
    pub fn cancel(&self, id: &str) -> bool {
        let removed = self.entries.lock().remove(id);
        match removed {
            Some(entry) => {
                entry.handle.abort();
                debug!(
                    timer = %id,
                    repeating = entry.repeating,
                    delay_ms = entry.delay.as_millis() as u64,
                    "Timer cancelled"
                );
                true
            }
            None => false,
        }
    }

    /// Cancel every pending timer.
    pub fn cancel_all(&self) {
        let drained: Vec<(String, TimerEntry)> = self.entries.lock().drain().collect();
        for (_, entry) in drained {
            entry.handle.abort();
        }
    }

    /// Whether a timer with this id is pending.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.lock().contains_key(id)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// `true` when no timer is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for TimerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TimerRegistry {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Removes the entry for `id` only if it still belongs to `token`.
fn take_if_current(entries: &Entries, id: &str, token: Uuid) -> bool {
    let mut entries = entries.lock();
    match entries.get(id) {
        Some(entry) if entry.token == token => {
            entries.remove(id);
            true
        }
        _ => false,
    }
}

fn is_current(entries: &Entries, id: &str, token: Uuid) -> bool {
    entries.lock().get(id).is_some_and(|e| e.token == token)
}

async fn run_once(entries: Entries, id: String, token: Uuid, delay: Duration, action: TimerAction) {
    tokio::time::sleep(delay).await;
    if !take_if_current(&entries, &id, token) {
        return;
    }
    fire(&id, &action).await;
}

async fn run_repeating(
    entries: Entries,
    id: String,
    token: Uuid,
    period: Duration,
    action: TimerAction,
) {
    let period = period.max(MIN_PERIOD);
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if !is_current(&entries, &id, token) {
            return;
        }
        fire(&id, &action).await;
    }
}

/// Runs one action, swallowing its error or panic.
async fn fire(id: &str, action: &TimerAction) {
    let outcome = AssertUnwindSafe(async { action().await })
        .catch_unwind()
        .await;
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(timer = %id, error = %e, "Timer action failed"),
        Err(_) => warn!(timer = %id, "Timer action panicked"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use robochat_core::RobochatError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    fn bump(count: &Arc<AtomicUsize>) -> impl Fn() -> BoxFuture<'static, RobochatResult<()>> {
        let count = count.clone();
        move || {
            let count = count.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Ok::<(), RobochatError>(())
            }
            .boxed()
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(120)).await;
    }

    #[tokio::test]
    async fn one_shot_fires_once_and_unregisters() {
        let timers = TimerRegistry::new();
        let count = counter();
        timers.schedule_once("X", Duration::from_millis(5), bump(&count));
        assert!(timers.contains("X"));

        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!timers.contains("X"));
    }

    #[tokio::test]
    async fn cancel_before_firing_prevents_execution() {
        let timers = TimerRegistry::new();
        let count = counter();
        timers.schedule_once("X", Duration::from_millis(1), bump(&count));
        assert!(timers.cancel("X"));

        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(timers.is_empty());
    }

    #[tokio::test]
    async fn cancel_unknown_id_is_noop() {
        let timers = TimerRegistry::new();
        assert!(!timers.cancel("missing"));
    }

    #[tokio::test]
    async fn same_id_replaces_previous_timer() {
        let timers = TimerRegistry::new();
        let first = counter();
        let second = counter();
        timers.schedule_once("X", Duration::from_millis(20), bump(&first));
        timers.schedule_once("X", Duration::from_millis(20), bump(&second));
        assert_eq!(timers.len(), 1);

        settle().await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_action_leaves_no_stale_entry() {
        let timers = TimerRegistry::new();
        timers.schedule_once("bad", Duration::from_millis(1), || async {
            Err(RobochatError::Transport("boom".into()))
        });

        settle().await;
        assert!(!timers.contains("bad"));
    }

    #[tokio::test]
    async fn panicking_repeating_action_keeps_running() {
        let timers = TimerRegistry::new();
        let count = counter();
        let inner = count.clone();
        timers.schedule_repeating("flaky", Duration::from_millis(10), move || {
            let inner = inner.clone();
            async move {
                let n = inner.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    panic!("first tick explodes");
                }
                Ok::<(), RobochatError>(())
            }
        });

        settle().await;
        assert!(count.load(Ordering::SeqCst) >= 2);
        assert!(timers.contains("flaky"));
        timers.cancel("flaky");
    }

    #[tokio::test]
    async fn repeating_timer_stops_after_cancel() {
        let timers = TimerRegistry::new();
        let count = counter();
        timers.schedule_repeating("poll", Duration::from_millis(10), bump(&count));

        settle().await;
        let fired = count.load(Ordering::SeqCst);
        assert!(fired >= 2, "fired {fired} times");
        assert!(timers.contains("poll"));

        timers.cancel("poll");
        let after_cancel = count.load(Ordering::SeqCst);
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), after_cancel);
    }

    #[test]
    fn scheduling_without_runtime_is_logged_not_fatal() {
        let timers = TimerRegistry::new();
        let count = counter();
        timers.schedule_once("X", Duration::from_millis(1), bump(&count));
        assert!(timers.is_empty());
    }

    #[tokio::test]
    async fn drop_cancels_pending_timers() {
        let count = counter();
        {
            let timers = TimerRegistry::new();
            timers.schedule_once("X", Duration::from_millis(10), bump(&count));
        }
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
