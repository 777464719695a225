//! Poll-until-predicate loop shared by every client-side wait.

use std::{fmt::Display, future::Future, time::Duration};

use futures::Stream;
use tokio::{
    task::JoinHandle,
    time::{Interval, MissedTickBehavior, interval, timeout},
};
use tracing::{debug, warn};

use crate::config::AppConfig;

/// Fixed-interval poller with a per-request timeout budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    interval: Duration,
    request_timeout: Duration,
}

/// How a spawned poll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The predicate held and the callback ran.
    Satisfied {
        /// Queries issued, the accepted one included.
        attempts: u32,
    },
    /// The loop was cancelled before the predicate held.
    Cancelled,
}

impl Poller {
    /// Poller ticking every `interval`, giving each query `request_timeout` to answer.
    ///
    /// Zero durations are raised to one millisecond.
    pub fn new(interval: Duration, request_timeout: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            request_timeout: request_timeout.max(Duration::from_millis(1)),
        }
    }

    /// Poller using the cadence configured for the application.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.poll_interval, config.poll_timeout)
    }

    /// Time between two queries.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Budget of a single query.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Query immediately and then on every tick until `predicate` accepts a result.
    ///
    /// Failed and timed out queries are logged and retried on the next tick. Dropping the
    /// returned future stops polling.
    pub async fn until<Q, Fut, T, E, P>(&self, label: &str, query: Q, predicate: P) -> T
    where
        Q: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        P: FnMut(&T) -> bool,
    {
        self.run(label, query, predicate).await.0
    }

    /// Yield every successful query result, one tick apart.
    ///
    /// Failures and timeouts are logged and skipped. The stream never ends on its own;
    /// dropping it stops polling.
    pub fn stream<'a, Q, Fut, T, E>(self, label: &'a str, mut query: Q) -> impl Stream<Item = T> + 'a
    where
        Q: FnMut() -> Fut + 'a,
        Fut: Future<Output = Result<T, E>> + 'a,
        T: 'a,
        E: Display + 'a,
    {
        async_stream::stream! {
            let mut ticks = Ticks::new(self, label);
            loop {
                yield ticks.next_success(&mut query).await;
            }
        }
    }

    /// Run the poll loop in a background task and call `on_satisfied` exactly once with the
    /// first result accepted by `predicate`. No query is issued after that.
    ///
    /// The loop lives as long as the returned [`PollHandle`].
    pub fn spawn<Q, Fut, T, E, P, F>(
        &self,
        label: &'static str,
        query: Q,
        predicate: P,
        on_satisfied: F,
    ) -> PollHandle
    where
        Q: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send + 'static,
        E: Display + Send,
        P: FnMut(&T) -> bool + Send + 'static,
        F: FnOnce(T) + Send + 'static,
    {
        let poller = *self;
        let task = tokio::spawn(async move {
            let (value, attempts) = poller.run(label, query, predicate).await;
            debug!(label, attempts, "poll condition satisfied");
            on_satisfied(value);
            PollOutcome::Satisfied { attempts }
        });
        PollHandle { task }
    }

    async fn run<Q, Fut, T, E, P>(&self, label: &str, mut query: Q, mut predicate: P) -> (T, u32)
    where
        Q: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        P: FnMut(&T) -> bool,
    {
        let mut ticks = Ticks::new(*self, label);
        loop {
            let value = ticks.next_success(&mut query).await;
            if predicate(&value) {
                return (value, ticks.attempts);
            }
        }
    }
}

/// Tick state of one poll loop.
struct Ticks<'a> {
    ticker: Interval,
    request_timeout: Duration,
    label: &'a str,
    attempts: u32,
}

impl<'a> Ticks<'a> {
    fn new(poller: Poller, label: &'a str) -> Self {
        let mut ticker = interval(poller.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            ticker,
            request_timeout: poller.request_timeout,
            label,
            attempts: 0,
        }
    }

    /// Wait for the next tick and query, until one query succeeds in time.
    async fn next_success<Q, Fut, T, E>(&mut self, query: &mut Q) -> T
    where
        Q: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        loop {
            self.ticker.tick().await;
            self.attempts = self.attempts.saturating_add(1);
            let label = self.label;
            let attempts = self.attempts;

            match timeout(self.request_timeout, query()).await {
                Ok(Ok(value)) => return value,
                Ok(Err(err)) => {
                    warn!(label, attempts, error = %err, "poll request failed; retrying next tick");
                }
                Err(_) => {
                    warn!(
                        label,
                        attempts,
                        timeout_ms = self.request_timeout.as_millis() as u64,
                        "poll request timed out; retrying next tick"
                    );
                }
            }
        }
    }
}

/// Owner of a spawned poll loop. Dropping it cancels the loop.
#[derive(Debug)]
pub struct PollHandle {
    task: JoinHandle<PollOutcome>,
}

impl PollHandle {
    /// Stop polling. The callback will not run if it has not already.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Whether the loop has ended, by satisfaction or cancellation.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the loop to end.
    pub async fn finished(&mut self) -> PollOutcome {
        match (&mut self.task).await {
            Ok(outcome) => outcome,
            Err(_) => PollOutcome::Cancelled,
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use futures::StreamExt;
    use tokio::time::sleep;

    use super::*;

    fn fast_poller() -> Poller {
        Poller::new(Duration::from_millis(5), Duration::from_millis(50))
    }

    #[tokio::test]
    async fn fires_callback_once_and_stops_polling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fired = Arc::new(AtomicUsize::new(0));

        let query_calls = calls.clone();
        let callback_fired = fired.clone();
        let mut handle = fast_poller().spawn(
            "test",
            move || {
                let calls = query_calls.clone();
                async move { Ok::<_, String>(calls.fetch_add(1, Ordering::SeqCst) + 1) }
            },
            |count: &usize| *count >= 3,
            move |count| {
                assert_eq!(count, 3);
                callback_fired.fetch_add(1, Ordering::SeqCst);
            },
        );

        assert_eq!(handle.finished().await, PollOutcome::Satisfied { attempts: 3 });
        sleep(Duration::from_millis(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_and_timeouts_are_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let query_calls = calls.clone();

        let value = fast_poller()
            .until(
                "test",
                move || {
                    let call = query_calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        match call {
                            0 => Err("unreachable".to_string()),
                            1 => {
                                sleep(Duration::from_millis(200)).await;
                                Ok(true)
                            }
                            _ => Ok(true),
                        }
                    }
                },
                |ready: &bool| *ready,
            )
            .await;

        assert!(value);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn dropping_the_handle_stops_polling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let query_calls = calls.clone();

        let handle = fast_poller().spawn(
            "test",
            move || {
                let calls = query_calls.clone();
                async move { Ok::<_, String>(calls.fetch_add(1, Ordering::SeqCst)) }
            },
            |_: &usize| false,
            |_| panic!("predicate never holds"),
        );

        sleep(Duration::from_millis(30)).await;
        drop(handle);
        let seen = calls.load(Ordering::SeqCst);
        assert!(seen > 0);

        sleep(Duration::from_millis(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), seen);
    }

    #[tokio::test]
    async fn stream_skips_failed_queries() {
        let mut calls = 0u32;
        let values: Vec<u32> = fast_poller()
            .stream("test", move || {
                calls += 1;
                let call = calls;
                async move {
                    if call % 2 == 0 {
                        Err(format!("call {call} failed"))
                    } else {
                        Ok(call)
                    }
                }
            })
            .take(3)
            .collect()
            .await;

        assert_eq!(values, vec![1, 3, 5]);
    }

    #[tokio::test]
    async fn cancelled_handle_reports_cancellation() {
        let mut handle = fast_poller().spawn(
            "test",
            || async { Ok::<_, String>(()) },
            |_: &()| false,
            |_| {},
        );
        handle.cancel();
        assert_eq!(handle.finished().await, PollOutcome::Cancelled);
    }
}
