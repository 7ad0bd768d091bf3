//! Cancellable polling tasks exposing a `{data, loading, error}` triad.
//!
//! A [`PollingHook`] owns one background task that fetches immediately and
//! then once per interval. Every (re)start bumps a generation counter; a fetch
//! only applies its result while its generation is still current, so results
//! that arrive after [`PollingHook::stop`], a reconfigure, or drop are
//! discarded.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::future::BoxFuture;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::error::FetchError;

pub type FetchFuture<T> = BoxFuture<'static, Result<T, FetchError>>;
pub type Fetcher<T> = Arc<dyn Fn() -> FetchFuture<T> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HookState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for HookState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }
}

#[derive(Debug)]
struct Slot<T> {
    state: HookState<T>,
    generation: u64,
}

/// Read side of a hook, cheap to clone and hand to other tasks.
#[derive(Debug)]
pub struct HookHandle<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Clone for HookHandle<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T: Clone> HookHandle<T> {
    pub fn snapshot(&self) -> HookState<T> {
        self.lock().state.clone()
    }
}

impl<T> HookHandle<T> {
    fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                state: HookState::default(),
                generation: 0,
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Invalidates every fetch started so far and returns the new generation.
    fn advance(&self) -> u64 {
        let mut slot = self.lock();
        slot.generation += 1;
        slot.state.loading = false;
        slot.generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock().generation == generation
    }

    fn begin(&self, generation: u64) -> bool {
        let mut slot = self.lock();
        if slot.generation != generation {
            return false;
        }
        slot.state.loading = true;
        true
    }

    fn finish(&self, generation: u64, result: Result<T, FetchError>) -> bool {
        let mut slot = self.lock();
        if slot.generation != generation {
            return false;
        }
        slot.state.loading = false;
        match result {
            Ok(data) => {
                slot.state.data = Some(data);
                slot.state.error = None;
            }
            Err(err) => {
                slot.state.data = None;
                slot.state.error = Some(err.to_string());
            }
        }
        true
    }
}

async fn fetch_once<T: Send + 'static>(
    label: &str,
    handle: &HookHandle<T>,
    fetcher: &Fetcher<T>,
    generation: u64,
) {
    if !handle.begin(generation) {
        return;
    }
    let result = fetcher().await;
    if let Err(err) = &result {
        tracing::warn!(hook = label, "fetch failed: {}", err);
    }
    if !handle.finish(generation, result) {
        tracing::debug!(hook = label, "discarding result of superseded fetch");
    }
}

pub struct PollingHook<T> {
    label: String,
    handle: HookHandle<T>,
    fetcher: Fetcher<T>,
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> PollingHook<T> {
    /// Starts polling right away. Must be called inside a tokio runtime.
    pub fn start(label: impl Into<String>, period: Duration, fetcher: Fetcher<T>) -> Self {
        let mut hook = Self {
            label: label.into(),
            handle: HookHandle::new(),
            fetcher,
            period,
            task: None,
        };
        hook.restart();
        hook
    }

    pub fn handle(&self) -> HookHandle<T> {
        self.handle.clone()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Swaps in new parameters: cancels the current loop and starts over with
    /// an immediate fetch.
    pub fn reconfigure(&mut self, period: Duration, fetcher: Fetcher<T>) {
        self.period = period;
        self.fetcher = fetcher;
        self.restart();
    }

    /// Fires one extra fetch outside the polling loop. It is not serialised
    /// against the loop; whichever finishes last wins.
    pub fn refetch(&self) -> JoinHandle<()> {
        let generation = self.handle.lock().generation;
        let handle = self.handle.clone();
        let fetcher = self.fetcher.clone();
        let label = self.label.clone();
        tokio::spawn(async move {
            fetch_once(&label, &handle, &fetcher, generation).await;
        })
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn stop(&mut self) {
        self.handle.advance();
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!(hook = %self.label, "polling stopped");
        }
    }

    fn restart(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        let generation = self.handle.advance();
        let handle = self.handle.clone();
        let fetcher = self.fetcher.clone();
        let label = self.label.clone();
        let period = self.period;
        tracing::debug!(hook = %label, ?period, generation, "polling started");

        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // First tick completes immediately.
                ticker.tick().await;
                if !handle.is_current(generation) {
                    break;
                }
                fetch_once(&label, &handle, &fetcher, generation).await;
            }
        }));
    }
}

impl<T: Clone> PollingHook<T> {
    pub fn snapshot(&self) -> HookState<T> {
        self.handle.snapshot()
    }
}

impl<T> Drop for PollingHook<T> {
    fn drop(&mut self) {
        self.handle.advance();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Boxes an async closure into a [`Fetcher`].
pub fn fetcher<T, F, Fut>(f: F) -> Fetcher<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<T, FetchError>> + Send + 'static,
{
    Arc::new(move || -> FetchFuture<T> { Box::pin(f()) })
}
