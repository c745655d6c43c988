//! Single-question countdown timer.
//!
//! A [`QuestionTimer`] arms exactly one expiry callback per `start`. The
//! countdown runs on a spawned tokio task so expiry fires on the host's
//! own clock whether or not a client request ever arrives. `remaining()`
//! is for display only; timeout scoring always charges the resolved time
//! budget, never observed remaining time.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

/// A single-shot countdown.
///
/// At most one expiry callback fires per `start`. Cancelling before the
/// countdown elapses guarantees the callback never runs; cancelling after
/// expiry, or repeatedly, is a harmless no-op. A callback racing with a
/// late cancel must re-check liveness against the session state it is
/// about to mutate (the session host does this under the session lock).
#[derive(Debug)]
pub struct QuestionTimer {
    deadline: Instant,
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl QuestionTimer {
    /// Arm a countdown of `budget`, invoking `on_expire` when it elapses.
    pub fn start<F, Fut>(budget: Duration, on_expire: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let deadline = Instant::now() + budget;
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if !flag.load(Ordering::Acquire) {
                on_expire().await;
            }
        });
        Self {
            deadline,
            cancelled,
            task,
        }
    }

    /// Disarm the countdown. Idempotent; safe after expiry.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.task.abort();
    }

    /// Time left on the countdown, for display. Zero once expired.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// The instant the countdown expires.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

impl Drop for QuestionTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{task, time};

    async fn settle() {
        // Let the woken timer task run to completion.
        for _ in 0..10 {
            task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_exactly_once_on_expiry() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let _timer = QuestionTimer::start(Duration::from_secs(15), move || async move {
            assert!(!flag.swap(true, Ordering::SeqCst), "fired twice");
        });

        time::advance(Duration::from_secs(14)).await;
        settle().await;
        assert!(!fired.load(Ordering::SeqCst));

        time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_expiry_suppresses_callback() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let timer = QuestionTimer::start(Duration::from_secs(15), move || async move {
            flag.store(true, Ordering::SeqCst);
        });

        time::advance(Duration::from_secs(5)).await;
        timer.cancel();
        time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent_and_safe_after_expiry() {
        let timer = QuestionTimer::start(Duration::from_secs(1), || async {});
        time::advance(Duration::from_secs(2)).await;
        settle().await;
        timer.cancel();
        timer.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_counts_down_to_zero() {
        let timer = QuestionTimer::start(Duration::from_secs(15), || async {});
        assert_eq!(timer.remaining(), Duration::from_secs(15));

        time::advance(Duration::from_secs(6)).await;
        assert_eq!(timer.remaining(), Duration::from_secs(9));

        time::advance(Duration::from_secs(20)).await;
        assert_eq!(timer.remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_releases_the_countdown() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let timer = QuestionTimer::start(Duration::from_secs(15), move || async move {
            flag.store(true, Ordering::SeqCst);
        });
        drop(timer);

        time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert!(!fired.load(Ordering::SeqCst));
    }
}
