//! Convoy feed: loads active convoys and recovers from rejected tokens.
//!
//! The feed owns the observable state a convoy list view renders (the
//! convoys, an error message and a loading flag) and publishes every change
//! through a [`tokio::sync::watch`] channel.
//!
//! A read rejected because of the session is retried after refreshing the
//! session, at most [`RetryPolicy::max_retries`] times with a fixed delay. The
//! retry runs on a spawned task whose handle the feed keeps, so starting a new
//! fetch, calling [`ConvoyFeed::cancel_pending_retry`] or dropping the feed
//! cancels it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use log::{debug, error, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::convoys_model::Convoy;
use super::convoys_traits::ConvoyRepositoryTrait;
use super::retry_policy::RetryPolicy;
use crate::errors::StoreError;
use crate::session::SessionProviderTrait;

/// Message shown when a failed read carries no message of its own.
pub const DEFAULT_FETCH_ERROR: &str = "Failed to load convoys";

/// State published to views.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    /// Active convoys, earliest departure first.
    pub convoys: Vec<Convoy>,
    /// Message of the last terminal failure, cleared when a fetch starts.
    pub error: Option<String>,
    pub loading: bool,
    /// No usable session was available and a refresh was requested.
    ///
    /// `loading` stays true on that path; this flag lets a view show
    /// "signing in" instead of an endless spinner.
    pub awaiting_session: bool,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            convoys: Vec::new(),
            error: None,
            loading: true,
            awaiting_session: false,
        }
    }
}

/// How a single fetch invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Rows were read and published.
    Loaded { count: usize },
    /// No usable session; a refresh was requested and nothing was read.
    AwaitingSession,
    /// The token was rejected; a retry will run after `delay`.
    RetryScheduled { attempt: u32, delay: Duration },
    /// The failure was published as the error message.
    Failed { message: String },
    /// A newer fetch started while this one was in flight; nothing was published.
    Superseded,
}

/// Loads active convoys for one view and keeps the result observable.
///
/// Not `Clone`: the feed is the owner of its pending retry, and dropping it
/// cancels that retry. Share state with [`ConvoyFeed::subscribe`].
pub struct ConvoyFeed {
    inner: Arc<FeedInner>,
}

struct FeedInner {
    repository: Arc<dyn ConvoyRepositoryTrait>,
    sessions: Arc<dyn SessionProviderTrait>,
    policy: RetryPolicy,
    state: watch::Sender<FeedState>,
    pending_retry: Mutex<Option<JoinHandle<()>>>,
    /// Incremented whenever a new fetch chain starts; older chains stop publishing.
    chain: AtomicU64,
}

impl ConvoyFeed {
    /// Creates a feed with the default retry policy.
    pub fn new(
        repository: Arc<dyn ConvoyRepositoryTrait>,
        sessions: Arc<dyn SessionProviderTrait>,
    ) -> Self {
        Self::with_policy(repository, sessions, RetryPolicy::default())
    }

    pub fn with_policy(
        repository: Arc<dyn ConvoyRepositoryTrait>,
        sessions: Arc<dyn SessionProviderTrait>,
        policy: RetryPolicy,
    ) -> Self {
        let (state, _) = watch::channel(FeedState::default());
        Self {
            inner: Arc::new(FeedInner {
                repository,
                sessions,
                policy,
                state,
                pending_retry: Mutex::new(None),
                chain: AtomicU64::new(0),
            }),
        }
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.inner.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> FeedState {
        self.inner.state.borrow().clone()
    }

    /// Starts a new fetch chain from a retry count of zero.
    pub async fn refetch(&self) -> FetchOutcome {
        self.fetch(0).await
    }

    /// Starts a new fetch chain at `retry_count`.
    ///
    /// Any retry still pending from an earlier chain is cancelled first.
    pub async fn fetch(&self, retry_count: u32) -> FetchOutcome {
        self.cancel_pending_retry();
        let chain = self.inner.chain.fetch_add(1, Ordering::SeqCst) + 1;
        Arc::clone(&self.inner).run(chain, retry_count).await
    }

    /// Reacts to the session provider gaining or losing a session.
    ///
    /// With a usable session a new fetch chain starts. Without one the
    /// loading flag is cleared and nothing is read.
    pub async fn session_changed(&self) -> Option<FetchOutcome> {
        let usable = self
            .inner
            .sessions
            .current_session()
            .is_some_and(|session| session.is_usable());

        if usable {
            return Some(self.refetch().await);
        }

        self.cancel_pending_retry();
        self.inner.chain.fetch_add(1, Ordering::SeqCst);
        self.inner.state.send_modify(|state| {
            state.loading = false;
            state.awaiting_session = true;
        });
        None
    }

    /// Whether a retry is scheduled and has not run yet.
    pub fn has_pending_retry(&self) -> bool {
        self.inner
            .pending_slot()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Cancels the scheduled retry, if any.
    pub fn cancel_pending_retry(&self) {
        if let Some(handle) = self.inner.pending_slot().take() {
            debug!("[ConvoyFeed] Cancelling pending retry");
            handle.abort();
        }
    }
}

impl Drop for ConvoyFeed {
    fn drop(&mut self) {
        self.cancel_pending_retry();
        self.inner.chain.fetch_add(1, Ordering::SeqCst);
    }
}

impl FeedInner {
    fn pending_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending_retry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, chain: u64) -> bool {
        self.chain.load(Ordering::SeqCst) == chain
    }

    /// One attempt of a fetch chain.
    ///
    /// Boxed because a scheduled retry re-enters this function from a
    /// spawned task.
    fn run(self: Arc<Self>, chain: u64, retry_count: u32) -> BoxFuture<'static, FetchOutcome> {
        async move {
            if !self.is_current(chain) {
                return FetchOutcome::Superseded;
            }

            self.state.send_modify(|state| {
                state.loading = true;
                state.error = None;
                state.awaiting_session = false;
            });

            let session = match self.sessions.current_session() {
                Some(session) if session.is_usable() => session,
                _ => {
                    info!("[ConvoyFeed] No usable session, requesting a refresh");
                    self.state.send_modify(|state| state.awaiting_session = true);
                    if let Err(e) = self.sessions.refresh_session().await {
                        warn!("[ConvoyFeed] Session refresh failed: {}", e);
                    }
                    return FetchOutcome::AwaitingSession;
                }
            };

            debug!("[ConvoyFeed] Fetching active convoys (retry {})", retry_count);
            let result = self.repository.list_active(&session).await;

            if !self.is_current(chain) {
                debug!("[ConvoyFeed] Dropping result of superseded fetch");
                return FetchOutcome::Superseded;
            }

            match result {
                Ok(rows) => {
                    let convoys: Vec<Convoy> = rows.into_iter().map(Convoy::from).collect();
                    let count = convoys.len();
                    self.state.send_modify(|state| {
                        state.convoys = convoys;
                        state.error = None;
                        state.loading = false;
                    });
                    debug!("[ConvoyFeed] Loaded {} convoys", count);
                    FetchOutcome::Loaded { count }
                }
                Err(err) if self.policy.should_retry(&err, retry_count) => {
                    self.recover_session(chain, retry_count, &err).await
                }
                Err(err) => {
                    let message = display_message(&err);
                    error!("[ConvoyFeed] Failed to fetch convoys ({}): {}", err.kind, message);
                    self.state.send_modify(|state| {
                        state.error = Some(message.clone());
                        state.loading = false;
                    });
                    FetchOutcome::Failed { message }
                }
            }
        }
        .boxed()
    }

    /// Refreshes the session and schedules the next attempt of `chain`.
    ///
    /// Published state is left untouched; the scheduled attempt publishes
    /// the outcome.
    async fn recover_session(
        self: &Arc<Self>,
        chain: u64,
        retry_count: u32,
        err: &StoreError,
    ) -> FetchOutcome {
        let attempt = retry_count + 1;
        let delay = self.policy.retry_delay;
        info!(
            "[ConvoyFeed] Token rejected ({}), refreshing session before retry {}/{}",
            err, attempt, self.policy.max_retries
        );

        // A failed refresh still retries: the next read either succeeds with a
        // token refreshed elsewhere or spends the remaining budget.
        if let Err(e) = self.sessions.refresh_session().await {
            warn!("[ConvoyFeed] Session refresh failed: {}", e);
        }

        if !self.is_current(chain) {
            return FetchOutcome::Superseded;
        }

        // The slot stays locked until the handle is stored, so the task can
        // never observe the slot before its own handle is in it.
        let mut slot = self.pending_slot();
        let inner = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detach our own handle before running so the next attempt can
            // store its retry in the slot.
            drop(inner.pending_slot().take());
            inner.run(chain, attempt).await;
        });
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
        drop(slot);

        FetchOutcome::RetryScheduled { attempt, delay }
    }
}

fn display_message(err: &StoreError) -> String {
    if err.message.trim().is_empty() {
        DEFAULT_FETCH_ERROR.to_string()
    } else {
        err.message.clone()
    }
}
