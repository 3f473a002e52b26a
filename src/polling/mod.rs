//! Fixed-interval polling with snapshot replacement.
//!
//! A [`Subscription`] fetches once on `start()` and again on every tick of a
//! fixed interval. Each fetch runs as its own task, so a slow request never
//! delays the next tick and requests may overlap. Every fetch is tagged with a
//! sequence number; only the result of the most recently issued fetch is
//! applied. `stop()` cancels the timer and guarantees no further state writes.

use futures::future::BoxFuture;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::RequestError;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(String),
}

impl<T> ViewState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("{0} is required")]
    MissingParameter(&'static str),
}

impl ViewError {
    /// Message shown in place of the view's data.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ViewError::MissingParameter(_) => self.to_string(),
            ViewError::Request(_) => fallback.to_string(),
        }
    }
}

pub type FetchFuture<T> = BoxFuture<'static, Result<T, ViewError>>;
pub type Fetcher<T> = Arc<dyn Fn() -> FetchFuture<T> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Applied,
    Stale,
    Stopped,
}

struct Shared<T> {
    name: &'static str,
    error_message: String,
    /// Latest issued sequence number. Held while checking `token` and writing state.
    issued: Mutex<u64>,
    token: CancellationToken,
    tx: watch::Sender<ViewState<T>>,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, u64> {
        self.issued.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self) -> Option<u64> {
        let mut issued = self.lock();
        if self.token.is_cancelled() {
            return None;
        }
        *issued += 1;
        self.tx.send_replace(ViewState::Loading);
        Some(*issued)
    }

    fn finish(&self, seq: u64, result: Result<T, ViewError>) -> Outcome {
        let issued = self.lock();
        if self.token.is_cancelled() {
            debug!("{}: dropping result #{} after stop", self.name, seq);
            return Outcome::Stopped;
        }
        if seq != *issued {
            debug!("{}: dropping stale result #{} (latest #{})", self.name, seq, *issued);
            return Outcome::Stale;
        }

        let next = match result {
            Ok(data) => ViewState::Ready(data),
            Err(e) => {
                warn!("{}: poll failed: {}", self.name, e);
                ViewState::Error(e.user_message(&self.error_message))
            }
        };
        self.tx.send_replace(next);
        Outcome::Applied
    }

    fn stop(&self) {
        let _issued = self.lock();
        self.token.cancel();
    }
}

pub struct Subscription<T> {
    shared: Arc<Shared<T>>,
    interval: Duration,
    fetcher: Option<Fetcher<T>>,
    task: Option<JoinHandle<()>>,
    rx: watch::Receiver<ViewState<T>>,
}

impl<T: Send + Sync + 'static> Subscription<T> {
    pub fn new(
        name: &'static str,
        interval: Duration,
        error_message: impl Into<String>,
        fetcher: Fetcher<T>,
    ) -> Self {
        let (tx, rx) = watch::channel(ViewState::Idle);
        Self {
            shared: Arc::new(Shared {
                name,
                error_message: error_message.into(),
                issued: Mutex::new(0),
                token: CancellationToken::new(),
                tx,
            }),
            interval: interval.max(MIN_INTERVAL),
            fetcher: Some(fetcher),
            task: None,
            rx,
        }
    }

    /// A subscription that is already in its error state and never fetches.
    pub fn failed(name: &'static str, error: ViewError) -> Self {
        let message = error.user_message(&error.to_string());
        warn!("{}: {}", name, message);
        let (tx, rx) = watch::channel(ViewState::Error(message.clone()));
        Self {
            shared: Arc::new(Shared {
                name,
                error_message: message,
                issued: Mutex::new(0),
                token: CancellationToken::new(),
                tx,
            }),
            interval: MIN_INTERVAL,
            fetcher: None,
            task: None,
            rx,
        }
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.task.is_some() && !self.shared.token.is_cancelled()
    }

    /// Issue the first fetch now and arm the timer. No-op if already started or stopped.
    pub fn start(&mut self) {
        if self.task.is_some() || self.shared.token.is_cancelled() {
            return;
        }
        let Some(fetcher) = self.fetcher.clone() else {
            return;
        };

        let shared = self.shared.clone();
        let interval = self.interval;
        debug!("{}: polling every {:?}", shared.name, interval);

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = shared.token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let Some(seq) = shared.begin() else {
                    break;
                };
                let request = fetcher();
                let shared = shared.clone();
                tokio::spawn(async move {
                    let result = request.await;
                    shared.finish(seq, result);
                });
            }
        }));
    }

    /// Cancel the timer. Results of requests still in flight are dropped.
    pub fn stop(&mut self) {
        self.shared.stop();
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("{}: stopped", self.shared.name);
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<T>> {
        self.rx.clone()
    }

    pub fn state(&self) -> watch::Ref<'_, ViewState<T>> {
        self.rx.borrow()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.shared.stop();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
