//! Single-shot, cancelable timer scheduling
//!
//! Notes debounce their autosave through this seam: a timer service
//! schedules one callback after a delay and can cancel it again. The
//! production implementation runs on tokio; [`MockTimerService`] fires
//! callbacks on demand so debounce behavior can be tested without
//! timing races.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Callback invoked when a scheduled timer fires
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a scheduled timer, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// Trait for single-shot timer scheduling
///
/// Scheduling hands ownership of the callback to the service; canceling
/// a token that has already fired (or was never issued) is a no-op.
pub trait TimerService: Send + Sync {
    /// Schedule `callback` to run once, `delay` from now
    fn schedule_once(&self, delay: Duration, callback: TimerCallback) -> TimerToken;

    /// Cancel a previously scheduled timer, if it has not fired yet
    fn cancel(&self, token: TimerToken);
}

/// Timer service backed by spawned tokio tasks
///
/// Each scheduled timer is a task sleeping for the delay; the join
/// handle is kept so cancellation can abort the sleep. Must be used
/// from within a tokio runtime.
#[derive(Default)]
pub struct TokioTimerService {
    tasks: Arc<Mutex<HashMap<u64, tokio::task::JoinHandle<()>>>>,
    next_token: AtomicU64,
}

impl TokioTimerService {
    /// Create a new timer service
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers currently pending
    pub fn pending_count(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }
}

impl TimerService for TokioTimerService {
    fn schedule_once(&self, delay: Duration, callback: TimerCallback) -> TimerToken {
        let id = self.next_token.fetch_add(1, Ordering::Relaxed);
        let tasks = Arc::clone(&self.tasks);
        // Hold the registry lock across the spawn so the task cannot
        // fire before its handle is registered.
        let mut registry = self.tasks.lock().unwrap();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Unregister before running; a cancel that lost the race to
            // the sleep finds the entry already gone and does nothing.
            if tasks.lock().unwrap().remove(&id).is_none() {
                return;
            }
            callback();
        });
        registry.insert(id, handle);
        TimerToken(id)
    }

    fn cancel(&self, token: TimerToken) {
        if let Some(handle) = self.tasks.lock().unwrap().remove(&token.0) {
            handle.abort();
        }
    }
}

struct PendingTimer {
    token: TimerToken,
    delay: Duration,
    callback: TimerCallback,
}

/// Mock timer service for testing
///
/// Records scheduled callbacks instead of running them, and fires them
/// only when the test asks. Cancellation removes the pending entry, so
/// a burst of reschedules collapses to the single surviving callback.
#[derive(Clone, Default)]
pub struct MockTimerService {
    pending: Arc<Mutex<Vec<PendingTimer>>>,
    next_token: Arc<AtomicU64>,
}

impl MockTimerService {
    /// Create a new mock timer service
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers currently pending
    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Delay of the earliest pending timer, if any
    pub fn next_delay(&self) -> Option<Duration> {
        self.pending.lock().unwrap().first().map(|p| p.delay)
    }

    /// Fire the earliest pending timer; returns false if none was pending
    pub fn fire_next(&self) -> bool {
        let next = {
            let mut pending = self.pending.lock().unwrap();
            if pending.is_empty() {
                return false;
            }
            pending.remove(0)
        };
        (next.callback)();
        true
    }

    /// Fire every currently pending timer, in scheduling order
    ///
    /// Callbacks scheduled while firing are left pending for a later
    /// call, matching how a real event loop would queue them.
    pub fn fire_all(&self) -> usize {
        let drained: Vec<PendingTimer> = std::mem::take(&mut *self.pending.lock().unwrap());
        let count = drained.len();
        for timer in drained {
            (timer.callback)();
        }
        count
    }
}

impl TimerService for MockTimerService {
    fn schedule_once(&self, delay: Duration, callback: TimerCallback) -> TimerToken {
        let token = TimerToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        self.pending.lock().unwrap().push(PendingTimer {
            token,
            delay,
            callback,
        });
        token
    }

    fn cancel(&self, token: TimerToken) {
        self.pending.lock().unwrap().retain(|p| p.token != token);
    }
}
