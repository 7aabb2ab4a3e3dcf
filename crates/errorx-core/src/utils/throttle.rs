//! Leading + trailing edge throttle for async actions.

use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

type Action = Box<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Runs `action` at most once per window.
///
/// The first call in a quiet period fires immediately. Calls landing inside
/// the window collapse into a single trailing fire at the end of it.
/// Must be called from within a tokio runtime.
#[derive(Clone)]
pub struct Throttle {
    inner: Arc<ThrottleInner>,
}

struct ThrottleInner {
    window: Duration,
    action: Action,
    state: Mutex<ThrottleState>,
}

#[derive(Default)]
struct ThrottleState {
    last_fired: Option<Instant>,
    trailing_scheduled: bool,
}

impl Throttle {
    pub fn new<F, Fut>(window: Duration, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let action: Action = Box::new(move || Box::pin(action()));
        Self {
            inner: Arc::new(ThrottleInner {
                window,
                action,
                state: Mutex::new(ThrottleState::default()),
            }),
        }
    }

    pub fn window(&self) -> Duration {
        self.inner.window
    }

    pub fn call(&self) {
        let now = Instant::now();
        let mut state = self.inner.state.lock();

        if let Some(last) = state.last_fired {
            let due = last + self.inner.window;
            if now < due {
                if !state.trailing_scheduled {
                    state.trailing_scheduled = true;
                    let inner = Arc::clone(&self.inner);
                    tokio::spawn(async move {
                        tokio::time::sleep_until(due).await;
                        inner.fire_trailing().await;
                    });
                }
                return;
            }
        }

        state.last_fired = Some(now);
        drop(state);
        tokio::spawn((self.inner.action)());
    }
}

impl ThrottleInner {
    async fn fire_trailing(&self) {
        {
            let mut state = self.state.lock();
            state.trailing_scheduled = false;
            state.last_fired = Some(Instant::now());
        }
        (self.action)().await;
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle").field("window", &self.inner.window).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(window_ms: u64) -> (Throttle, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let throttle = Throttle::new(Duration::from_millis(window_ms), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        (throttle, fired)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_leading_and_trailing() {
        let (throttle, fired) = counting(2000);

        for _ in 0..10 {
            throttle.call();
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        // 1.5s elapsed, only the leading fire so far
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_call_fires_once() {
        let (throttle, fired) = counting(2000);
        throttle.call();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_in_separate_windows_each_fire() {
        let (throttle, fired) = counting(2000);
        throttle.call();
        tokio::time::sleep(Duration::from_millis(2100)).await;
        throttle.call();
        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
