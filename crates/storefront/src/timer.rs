//! Cancellable one-shot timers.
//!
//! A timer is a spawned Tokio task that sleeps and then runs a callback. The
//! owning component keeps the [`TimerHandle`]; dropping or cancelling the
//! handle aborts the task, so a callback never fires after its owner is gone.

use std::time::Duration;

use tokio::task::JoinHandle;

/// Handle to a scheduled callback. Aborts the callback when dropped.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Cancel the callback if it has not run yet.
    pub fn cancel(self) {
        drop(self);
    }

    /// Whether the callback has run (or the task was aborted).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Run `callback` after `delay`.
///
/// # Panics
///
/// Panics if called outside of a Tokio runtime.
pub fn schedule<F>(delay: Duration, callback: F) -> TimerHandle
where
    F: FnOnce() + Send + 'static,
{
    let task = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        callback();
    });
    TimerHandle { task }
}

/// Holds at most one pending timer; scheduling replaces the previous one.
#[derive(Debug, Default)]
pub struct TimerSlot {
    pending: Option<TimerHandle>,
}

impl TimerSlot {
    /// Create an empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Cancel any pending timer and schedule `callback` after `delay`.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn replace<F>(&mut self, delay: Duration, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.pending = Some(schedule(delay, callback));
    }

    /// Cancel the pending timer, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.cancel();
        }
    }

    /// Whether a timer is scheduled and has not fired yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> usize) {
        let count = Arc::new(AtomicUsize::new(0));
        let reader = Arc::clone(&count);
        (count, move || reader.load(Ordering::SeqCst))
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_fires_after_delay() {
        let (count, fired) = counter();
        let _handle = schedule(Duration::from_millis(100), move || {
            count.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert_eq!(fired(), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(fired(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_never_fires() {
        let (count, fired) = counter();
        let handle = schedule(Duration::from_millis(100), move || {
            count.fetch_add(1, Ordering::SeqCst);
        });
        handle.cancel();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(fired(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slot_replaces_pending_timer() {
        let (count, fired) = counter();
        let mut slot = TimerSlot::new();

        for _ in 0..3 {
            let count = Arc::clone(&count);
            slot.replace(Duration::from_millis(100), move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(slot.is_pending());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired(), 1);
        assert!(!slot.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slot_cancel() {
        let (count, fired) = counter();
        let mut slot = TimerSlot::new();
        slot.replace(Duration::from_millis(10), move || {
            count.fetch_add(1, Ordering::SeqCst);
        });
        slot.cancel();
        assert!(!slot.is_pending());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fired(), 0);
    }
}
