//! Trailing-edge debouncer on top of tokio timers.
//!
//! Each `schedule` aborts the pending timer task before starting a new one,
//! so a burst of calls produces a single delivery carrying the last value.
//! A scheduled delivery keeps running even if the debouncer is dropped;
//! call `cancel` to discard it.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::trace;

type Sink<T> = Arc<dyn Fn(T) + Send + Sync>;

pub struct Debouncer<T> {
    delay: Duration,
    sink: Sink<T>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, sink: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            delay,
            sink: Arc::new(sink),
            pending: Mutex::new(None),
        }
    }

    /// Replace any pending delivery with `value`, restarting the quiet interval.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn schedule(&self, value: T) {
        let mut pending = self.pending.lock().await;
        if let Some(handle) = pending.take() {
            handle.abort();
            trace!("Cancelled pending debounced delivery");
        }

        let sink = Arc::clone(&self.sink);
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            sink(value);
        }));
    }

    /// Drop the pending delivery, if any.
    pub async fn cancel(&self) {
        if let Some(handle) = self.pending.lock().await.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    fn recording() -> (Arc<StdMutex<Vec<u32>>>, impl Fn(u32) + Send + Sync + 'static) {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink = move |v| {
            if let Ok(mut guard) = sink_seen.lock() {
                guard.push(v);
            }
        };
        (seen, sink)
    }

    fn seen_values(seen: &StdMutex<Vec<u32>>) -> Vec<u32> {
        seen.lock().map(|g| g.clone()).unwrap_or_default()
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_last_value() {
        let (seen, sink) = recording();
        let debouncer = Debouncer::new(Duration::from_millis(1000), sink);

        debouncer.schedule(2).await;
        tokio::time::sleep(Duration::from_millis(300)).await;
        debouncer.schedule(3).await;
        tokio::time::sleep(Duration::from_millis(300)).await;
        debouncer.schedule(4).await;

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(seen_values(&seen).is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(seen_values(&seen), vec![4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_calls_each_fire() {
        let (seen, sink) = recording();
        let debouncer = Debouncer::new(Duration::from_millis(100), sink);

        debouncer.schedule(1).await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        debouncer.schedule(2).await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(seen_values(&seen), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_delivery() {
        let (seen, sink) = recording();
        let debouncer = Debouncer::new(Duration::from_millis(100), sink);

        debouncer.schedule(7).await;
        debouncer.cancel().await;
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(seen_values(&seen).is_empty());
    }
}
