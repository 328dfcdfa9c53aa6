//! Tests for the convoy feed and its session-recovery retries.
//!
//! Timing assertions run on a paused tokio clock, so the retry delay is
//! checked to the millisecond without sleeping.

#[cfg(test)]
mod tests {
    use crate::convoys::{
        ConvoyFeed, ConvoyRepositoryTrait, ConvoyRow, FeedState, FetchOutcome, RetryPolicy,
        DEFAULT_FETCH_ERROR,
    };
    use crate::errors::{Error, Result, StoreError};
    use crate::session::{Session, SessionProviderTrait};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    // =========================================================================
    // Mock convoy store
    // =========================================================================

    /// In-memory `convoys` table that filters and orders like the backend.
    #[derive(Default)]
    struct MockConvoyRepository {
        rows: Mutex<Vec<ConvoyRow>>,
        failures: Mutex<VecDeque<StoreError>>,
        always_fail: Mutex<Option<StoreError>>,
        calls: AtomicUsize,
        tokens: Mutex<Vec<String>>,
    }

    impl MockConvoyRepository {
        fn with_rows(rows: Vec<ConvoyRow>) -> Self {
            Self {
                rows: Mutex::new(rows),
                ..Self::default()
            }
        }

        fn failing_once(self, error: StoreError) -> Self {
            self.failures.lock().unwrap().push_back(error);
            self
        }

        fn failing_always(self, error: StoreError) -> Self {
            *self.always_fail.lock().unwrap() = Some(error);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ConvoyRepositoryTrait for MockConvoyRepository {
        async fn list_active(
            &self,
            session: &Session,
        ) -> std::result::Result<Vec<ConvoyRow>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.tokens
                .lock()
                .unwrap()
                .push(session.access_token.clone());

            if let Some(err) = self.failures.lock().unwrap().pop_front() {
                return Err(err);
            }
            if let Some(err) = self.always_fail.lock().unwrap().clone() {
                return Err(err);
            }

            let mut rows: Vec<ConvoyRow> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|row| row.is_active)
                .cloned()
                .collect();
            rows.sort_by(|a, b| a.departure_date.cmp(&b.departure_date));
            Ok(rows)
        }
    }

    // =========================================================================
    // Mock session provider
    // =========================================================================

    struct MockSessionProvider {
        session: Mutex<Option<Session>>,
        /// Session installed by a successful refresh; `None` makes refresh fail.
        next_session: Option<Session>,
        refresh_calls: AtomicUsize,
    }

    impl MockSessionProvider {
        fn signed_in() -> Self {
            Self {
                session: Mutex::new(Some(Session::new("token-0"))),
                next_session: Some(Session::new("token-refreshed")),
                refresh_calls: AtomicUsize::new(0),
            }
        }

        fn signed_out() -> Self {
            Self {
                session: Mutex::new(None),
                next_session: None,
                refresh_calls: AtomicUsize::new(0),
            }
        }

        fn refresh_calls(&self) -> usize {
            self.refresh_calls.load(Ordering::SeqCst)
        }

        fn sign_in(&self, session: Session) {
            *self.session.lock().unwrap() = Some(session);
        }
    }

    #[async_trait]
    impl SessionProviderTrait for MockSessionProvider {
        fn current_session(&self) -> Option<Session> {
            self.session.lock().unwrap().clone()
        }

        async fn refresh_session(&self) -> Result<Session> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            match &self.next_session {
                Some(next) => {
                    *self.session.lock().unwrap() = Some(next.clone());
                    Ok(next.clone())
                }
                None => Err(Error::Session("No refresh token available".to_string())),
            }
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn row(id: &str, departure_date: &str, is_active: bool) -> ConvoyRow {
        ConvoyRow {
            id: id.to_string(),
            departure_date: departure_date.to_string(),
            price_per_kg: Decimal::from(2500),
            carrier_address: format!("Warehouse {}", id),
            carrier_name: "Fast Co".to_string(),
            destination: "Bamako".to_string(),
            available_space: 75.0,
            is_active,
            created_at: None,
            updated_at: None,
        }
    }

    fn sample_rows() -> Vec<ConvoyRow> {
        vec![
            row("c2", "2024-02-15", true),
            row("c3", "2024-01-20", false),
            row("c1", "2024-01-10", true),
        ]
    }

    fn feed(
        repository: &Arc<MockConvoyRepository>,
        sessions: &Arc<MockSessionProvider>,
    ) -> ConvoyFeed {
        ConvoyFeed::new(repository.clone(), sessions.clone())
    }

    /// Lets spawned retry tasks run up to their next timer.
    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    // =========================================================================
    // Successful reads
    // =========================================================================

    #[tokio::test]
    async fn test_loads_only_active_convoys_in_departure_order() {
        let repository = Arc::new(MockConvoyRepository::with_rows(sample_rows()));
        let sessions = Arc::new(MockSessionProvider::signed_in());
        let feed = feed(&repository, &sessions);

        let outcome = feed.refetch().await;

        assert_eq!(outcome, FetchOutcome::Loaded { count: 2 });
        let state = feed.state();
        let ids: Vec<&str> = state.convoys.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert!(!state.awaiting_session);
        assert_eq!(sessions.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_repeated_fetches_are_identical() {
        let repository = Arc::new(MockConvoyRepository::with_rows(sample_rows()));
        let sessions = Arc::new(MockSessionProvider::signed_in());
        let feed = feed(&repository, &sessions);

        feed.refetch().await;
        let first = feed.state().convoys;
        feed.refetch().await;
        let second = feed.state().convoys;

        assert_eq!(first, second);
        assert_eq!(repository.calls(), 2);
    }

    #[tokio::test]
    async fn test_success_clears_previous_error() {
        let repository = Arc::new(
            MockConvoyRepository::with_rows(sample_rows())
                .failing_once(StoreError::network("Network unreachable")),
        );
        let sessions = Arc::new(MockSessionProvider::signed_in());
        let feed = feed(&repository, &sessions);

        feed.refetch().await;
        assert_eq!(feed.state().error.as_deref(), Some("Network unreachable"));

        feed.refetch().await;
        let state = feed.state();
        assert!(state.error.is_none());
        assert_eq!(state.convoys.len(), 2);
    }

    #[tokio::test]
    async fn test_subscribers_observe_published_state() {
        let repository = Arc::new(MockConvoyRepository::with_rows(sample_rows()));
        let sessions = Arc::new(MockSessionProvider::signed_in());
        let feed = feed(&repository, &sessions);
        let mut rx = feed.subscribe();

        assert!(rx.borrow().loading);
        feed.refetch().await;

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.convoys.len(), 2);
        assert!(!state.loading);
    }

    // =========================================================================
    // Session-absent path
    // =========================================================================

    #[tokio::test]
    async fn test_no_session_requests_refresh_without_reading() {
        let repository = Arc::new(MockConvoyRepository::with_rows(sample_rows()));
        let sessions = Arc::new(MockSessionProvider::signed_out());
        let feed = feed(&repository, &sessions);

        assert_eq!(feed.refetch().await, FetchOutcome::AwaitingSession);
        assert_eq!(feed.refetch().await, FetchOutcome::AwaitingSession);

        let state = feed.state();
        assert_eq!(repository.calls(), 0);
        assert_eq!(sessions.refresh_calls(), 2);
        assert!(state.convoys.is_empty());
        assert!(state.loading);
        assert!(state.awaiting_session);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_blank_access_token_counts_as_no_session() {
        let repository = Arc::new(MockConvoyRepository::with_rows(sample_rows()));
        let sessions = Arc::new(MockSessionProvider::signed_out());
        sessions.sign_in(Session::new(""));
        let feed = feed(&repository, &sessions);

        assert_eq!(feed.refetch().await, FetchOutcome::AwaitingSession);
        assert_eq!(repository.calls(), 0);
    }

    #[tokio::test]
    async fn test_session_changed_without_session_stops_loading() {
        let repository = Arc::new(MockConvoyRepository::with_rows(sample_rows()));
        let sessions = Arc::new(MockSessionProvider::signed_out());
        let feed = feed(&repository, &sessions);

        assert!(feed.session_changed().await.is_none());
        let state = feed.state();
        assert!(!state.loading);
        assert!(state.awaiting_session);
        assert_eq!(repository.calls(), 0);
    }

    #[tokio::test]
    async fn test_session_changed_with_session_fetches() {
        let repository = Arc::new(MockConvoyRepository::with_rows(sample_rows()));
        let sessions = Arc::new(MockSessionProvider::signed_out());
        let feed = feed(&repository, &sessions);

        assert_eq!(feed.refetch().await, FetchOutcome::AwaitingSession);
        sessions.sign_in(Session::new("token-late"));

        let outcome = feed.session_changed().await;
        assert_eq!(outcome, Some(FetchOutcome::Loaded { count: 2 }));
        let state = feed.state();
        assert!(!state.awaiting_session);
        assert!(!state.loading);
    }

    // =========================================================================
    // Session recovery
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_auth_failure_retries_after_exactly_one_second() {
        let repository = Arc::new(
            MockConvoyRepository::with_rows(sample_rows())
                .failing_once(StoreError::unknown("JWT expired")),
        );
        let sessions = Arc::new(MockSessionProvider::signed_in());
        let feed = feed(&repository, &sessions);

        let outcome = feed.refetch().await;

        assert_eq!(
            outcome,
            FetchOutcome::RetryScheduled {
                attempt: 1,
                delay: Duration::from_millis(1000),
            }
        );
        assert_eq!(sessions.refresh_calls(), 1);
        // Scheduling publishes nothing beyond the start-of-fetch reset.
        assert_eq!(feed.state(), FeedState::default());
        assert!(feed.has_pending_retry());

        settle().await;
        tokio::time::advance(Duration::from_millis(999)).await;
        settle().await;
        assert_eq!(repository.calls(), 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(repository.calls(), 2);

        let state = feed.state();
        assert_eq!(state.convoys.len(), 2);
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert!(!feed.has_pending_retry());
        assert_eq!(
            *repository.tokens.lock().unwrap(),
            vec!["token-0".to_string(), "token-refreshed".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_failure_surfaces_after_two_retries() {
        let repository = Arc::new(
            MockConvoyRepository::with_rows(sample_rows())
                .failing_always(StoreError::unknown("JWT expired")),
        );
        let sessions = Arc::new(MockSessionProvider::signed_in());
        let feed = feed(&repository, &sessions);

        feed.refetch().await;
        settle().await;
        tokio::time::advance(Duration::from_millis(1000)).await;
        settle().await;
        assert_eq!(repository.calls(), 2);
        assert!(feed.state().loading);

        tokio::time::advance(Duration::from_millis(1000)).await;
        settle().await;
        assert_eq!(repository.calls(), 3);

        let state = feed.state();
        assert_eq!(state.error.as_deref(), Some("JWT expired"));
        assert!(!state.loading);
        assert_eq!(sessions.refresh_calls(), 2);
        assert!(!feed.has_pending_retry());

        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(repository.calls(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_budget_fails_immediately() {
        let repository = Arc::new(
            MockConvoyRepository::with_rows(sample_rows())
                .failing_always(StoreError::unknown("JWT expired")),
        );
        let sessions = Arc::new(MockSessionProvider::signed_in());
        let feed = feed(&repository, &sessions);

        let outcome = feed.fetch(2).await;

        assert_eq!(
            outcome,
            FetchOutcome::Failed {
                message: "JWT expired".to_string()
            }
        );
        assert_eq!(sessions.refresh_calls(), 0);
        assert!(!feed.has_pending_retry());
    }

    #[tokio::test]
    async fn test_non_auth_failure_is_never_retried() {
        for retry_count in 0..3 {
            let repository = Arc::new(
                MockConvoyRepository::with_rows(sample_rows())
                    .failing_always(StoreError::unknown("Network unreachable")),
            );
            let sessions = Arc::new(MockSessionProvider::signed_in());
            let feed = feed(&repository, &sessions);

            let outcome = feed.fetch(retry_count).await;

            assert_eq!(
                outcome,
                FetchOutcome::Failed {
                    message: "Network unreachable".to_string()
                }
            );
            assert_eq!(sessions.refresh_calls(), 0);
            assert!(!feed.has_pending_retry());
            assert!(!feed.state().loading);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_structured_auth_kind_is_retried_regardless_of_wording() {
        let repository = Arc::new(
            MockConvoyRepository::with_rows(sample_rows())
                .failing_once(StoreError::auth_expired("Unauthorized").with_status(401)),
        );
        let sessions = Arc::new(MockSessionProvider::signed_in());
        let feed = feed(&repository, &sessions);

        let outcome = feed.refetch().await;
        assert!(matches!(outcome, FetchOutcome::RetryScheduled { attempt: 1, .. }));

        settle().await;
        tokio::time::advance(Duration::from_millis(1000)).await;
        settle().await;
        assert_eq!(feed.state().convoys.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_still_spends_retry_budget() {
        let repository = Arc::new(
            MockConvoyRepository::with_rows(sample_rows())
                .failing_always(StoreError::unknown("invalid JWT")),
        );
        let sessions = Arc::new(MockSessionProvider {
            session: Mutex::new(Some(Session::new("token-0"))),
            next_session: None,
            refresh_calls: AtomicUsize::new(0),
        });
        let feed = feed(&repository, &sessions);

        feed.refetch().await;
        settle().await;
        tokio::time::advance(Duration::from_millis(2000)).await;
        settle().await;
        tokio::time::advance(Duration::from_millis(1000)).await;
        settle().await;

        assert_eq!(repository.calls(), 3);
        assert_eq!(feed.state().error.as_deref(), Some("invalid JWT"));
    }

    #[tokio::test]
    async fn test_empty_message_uses_fallback() {
        let repository = Arc::new(
            MockConvoyRepository::with_rows(sample_rows()).failing_once(StoreError::unknown("")),
        );
        let sessions = Arc::new(MockSessionProvider::signed_in());
        let feed = feed(&repository, &sessions);

        feed.refetch().await;
        assert_eq!(feed.state().error.as_deref(), Some(DEFAULT_FETCH_ERROR));
    }

    // =========================================================================
    // Cancellation
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_dropping_feed_cancels_pending_retry() {
        let repository = Arc::new(
            MockConvoyRepository::with_rows(sample_rows())
                .failing_once(StoreError::unknown("JWT expired")),
        );
        let sessions = Arc::new(MockSessionProvider::signed_in());
        let feed = feed(&repository, &sessions);

        feed.refetch().await;
        settle().await;
        drop(feed);

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(repository.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refetch_replaces_pending_retry() {
        let repository = Arc::new(
            MockConvoyRepository::with_rows(sample_rows())
                .failing_once(StoreError::unknown("JWT expired")),
        );
        let sessions = Arc::new(MockSessionProvider::signed_in());
        let feed = feed(&repository, &sessions);

        feed.refetch().await;
        settle().await;
        assert!(feed.has_pending_retry());

        assert_eq!(feed.refetch().await, FetchOutcome::Loaded { count: 2 });
        assert!(!feed.has_pending_retry());

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(repository.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_policy_delay_and_budget() {
        let repository = Arc::new(
            MockConvoyRepository::with_rows(sample_rows())
                .failing_always(StoreError::unknown("JWT expired")),
        );
        let sessions = Arc::new(MockSessionProvider::signed_in());
        let feed = ConvoyFeed::with_policy(
            repository.clone(),
            sessions.clone(),
            RetryPolicy {
                max_retries: 1,
                retry_delay: Duration::from_millis(250),
            },
        );

        feed.refetch().await;
        settle().await;
        tokio::time::advance(Duration::from_millis(250)).await;
        settle().await;

        assert_eq!(repository.calls(), 2);
        assert_eq!(feed.state().error.as_deref(), Some("JWT expired"));
    }
}
