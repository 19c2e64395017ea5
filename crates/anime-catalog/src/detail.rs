//! Detail fetcher: one title by identifier, retried while rate limited.

use crate::api::{AnimeDetails, FetchError, HttpTransport, JikanClient, Transport};
use crate::guard::{RequestGuard, Ticket};
use crate::state::{DetailState, FetchStatus};
use shared::JikanConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Linear retry schedule for rate-limited requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &JikanConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Wait before the given retry (1-based): 1x, 2x, 3x the base delay
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(retry)
    }
}

/// Fetches full anime records, one identifier at a time
pub struct DetailFetcher<T = HttpTransport> {
    client: Arc<JikanClient<T>>,
    policy: RetryPolicy,
    guard: RequestGuard,
    state: watch::Sender<DetailState>,
}

impl<T: Transport> DetailFetcher<T> {
    pub fn new(client: Arc<JikanClient<T>>, policy: RetryPolicy) -> Self {
        let (state, _) = watch::channel(DetailState::default());
        Self {
            client,
            policy,
            guard: RequestGuard::new(),
            state,
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> DetailState {
        self.state.borrow().clone()
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    /// Drop interest in any outstanding request and return to idle
    pub fn reset(&self) {
        self.guard.invalidate();
        self.state.send_replace(DetailState::default());
    }

    /// Apply `update` only while `ticket` is current; returns whether it ran
    fn commit(&self, ticket: &Ticket<'_>, update: impl FnOnce(&mut DetailState)) -> bool {
        self.state.send_if_modified(|state| {
            if !ticket.is_current() {
                return false;
            }
            update(state);
            true
        })
    }

    /// Fetch the full record for `id`, superseding any earlier request.
    ///
    /// 404, non-429 statuses and transport failures are terminal at once.
    /// 429 is retried up to `max_retries` times after linearly growing
    /// delays. A superseded call returns [`FetchError::Superseded`] without
    /// touching the state.
    pub async fn fetch_detail(&self, id: &str) -> Result<AnimeDetails, FetchError> {
        let ticket = self.guard.issue();
        info!(id = id, generation = ticket.generation(), "Fetching anime details");

        self.commit(&ticket, |state| {
            *state = DetailState {
                id: Some(id.to_string()),
                status: FetchStatus::LoadingInitial,
                anime: None,
                retry_count: 0,
            };
        });

        let mut retry_count = 0;
        loop {
            if !ticket.is_current() {
                debug!(id = id, "Detail request superseded before sending");
                return Err(FetchError::Superseded);
            }

            match self.client.get_anime_full(id).await {
                Ok(anime) => {
                    let committed = self.commit(&ticket, |state| {
                        state.status = FetchStatus::Success;
                        state.anime = Some(anime.clone());
                    });
                    if !committed {
                        debug!(id = id, "Discarding superseded detail response");
                        return Err(FetchError::Superseded);
                    }
                    debug!(id = id, retries = retry_count, "Detail request successful");
                    return Ok(anime);
                }
                Err(err) if err.is_retryable() && retry_count < self.policy.max_retries => {
                    retry_count += 1;
                    let delay = self.policy.delay_for(retry_count);
                    warn!(
                        id = id,
                        error = %err,
                        retry = retry_count,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited by server, waiting"
                    );

                    if !self.commit(&ticket, |state| state.retry_count = retry_count) {
                        return Err(FetchError::Superseded);
                    }
                    sleep(delay).await;
                }
                Err(err) => {
                    warn!(id = id, error = %err, retries = retry_count, "Detail request failed");
                    let committed = self.commit(&ticket, |state| {
                        state.status = FetchStatus::Error(err.to_string());
                    });
                    if !committed {
                        return Err(FetchError::Superseded);
                    }
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::testing::{Reply, ScriptedTransport};
    use tokio::time::Instant;

    const COWBOY_BEBOP: &str = r#"{ "data": { "mal_id": 1, "title": "Cowboy Bebop" } }"#;
    const TRIGUN: &str = r#"{ "data": { "mal_id": 6, "title": "Trigun" } }"#;

    fn fetcher(transport: ScriptedTransport) -> DetailFetcher<ScriptedTransport> {
        let client = JikanClient::new("http://jikan.test", 24, transport).unwrap();
        DetailFetcher::new(Arc::new(client), RetryPolicy::default())
    }

    #[test]
    fn test_linear_delays() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(3));
    }

    #[test]
    fn test_delay_saturates_instead_of_overflowing() {
        let policy = RetryPolicy {
            max_retries: u32::MAX,
            base_delay: Duration::from_millis(u64::MAX),
        };
        assert_eq!(policy.delay_for(u32::MAX), Duration::MAX);
    }

    #[test]
    fn test_policy_from_config() {
        let config = JikanConfig {
            max_retries: 5,
            retry_delay_ms: 20,
            ..Default::default()
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.delay_for(2), Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_success_stores_entity() {
        let transport = ScriptedTransport::new().on("/anime/1/full", [Reply::ok(COWBOY_BEBOP)]);
        let fetcher = fetcher(transport.clone());

        let anime = fetcher.fetch_detail("1").await.unwrap();
        assert_eq!(anime.title, "Cowboy Bebop");

        let state = fetcher.state();
        assert_eq!(state.status, FetchStatus::Success);
        assert_eq!(state.id.as_deref(), Some("1"));
        assert_eq!(state.anime.unwrap().mal_id, 1);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_terminal_without_retry() {
        let transport = ScriptedTransport::new().on("/anime/999/full", [Reply::status(404)]);
        let fetcher = fetcher(transport.clone());

        let err = fetcher.fetch_detail("999").await.unwrap_err();
        assert_eq!(err, FetchError::NotFound);
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(
            fetcher.state().status,
            FetchStatus::Error("Anime not found".to_string())
        );
    }

    #[tokio::test]
    async fn test_server_error_is_terminal_with_status() {
        let transport = ScriptedTransport::new().on("/anime/1/full", [Reply::status(503)]);
        let fetcher = fetcher(transport.clone());

        let err = fetcher.fetch_detail("1").await.unwrap_err();
        assert_eq!(err, FetchError::Http { status: 503 });
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(
            fetcher.state().status.error_message(),
            Some("Failed to fetch anime details: 503")
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_terminal() {
        let transport =
            ScriptedTransport::new().on("/anime/1/full", [Reply::Fail("reset".to_string())]);
        let fetcher = fetcher(transport.clone());

        assert!(matches!(
            fetcher.fetch_detail("1").await,
            Err(FetchError::Transport(_))
        ));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_gives_up_after_three_retries() {
        let transport = ScriptedTransport::new().on("/anime/1/full", [Reply::status(429)]);
        let fetcher = fetcher(transport.clone());

        let err = fetcher.fetch_detail("1").await.unwrap_err();
        assert_eq!(err, FetchError::RateLimited);

        let times = transport.request_times();
        assert_eq!(times.len(), 4);
        for (i, pair) in times.windows(2).enumerate() {
            let gap = pair[1] - pair[0];
            assert!(
                gap >= Duration::from_millis(1000 * (i as u64 + 1)),
                "gap {} was {:?}",
                i,
                gap
            );
        }

        let state = fetcher.state();
        assert_eq!(state.retry_count, 3);
        assert_eq!(
            state.status.error_message(),
            Some("Too many requests. Please try again in a few seconds.")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_then_success() {
        let transport = ScriptedTransport::new().on(
            "/anime/1/full",
            [Reply::status(429), Reply::status(429), Reply::ok(COWBOY_BEBOP)],
        );
        let fetcher = fetcher(transport.clone());
        let start = Instant::now();

        let anime = fetcher.fetch_detail("1").await.unwrap();
        assert_eq!(anime.mal_id, 1);
        assert_eq!(transport.requests().len(), 3);
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert_eq!(fetcher.state().retry_count, 2);
        assert_eq!(fetcher.state().status, FetchStatus::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_identifier_wins_over_pending_retry() {
        let transport = ScriptedTransport::new()
            .on("/anime/1/full", [Reply::status(429), Reply::ok(COWBOY_BEBOP)])
            .on("/anime/6/full", [Reply::ok(TRIGUN)]);
        let fetcher = fetcher(transport.clone());

        let (stale, fresh) = tokio::join!(fetcher.fetch_detail("1"), async {
            // Let the first request hit its rate limit and start waiting
            sleep(Duration::from_millis(10)).await;
            fetcher.fetch_detail("6").await
        });

        assert_eq!(stale.unwrap_err(), FetchError::Superseded);
        assert_eq!(fresh.unwrap().title, "Trigun");

        let state = fetcher.state();
        assert_eq!(state.id.as_deref(), Some("6"));
        assert_eq!(state.anime.unwrap().title, "Trigun");
        assert_eq!(state.retry_count, 0);

        // The stale chain never re-issued its request
        let stale_requests = transport
            .requests()
            .iter()
            .filter(|url| url.path() == "/anime/1/full")
            .count();
        assert_eq!(stale_requests, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_for_older_identifier_is_discarded() {
        let transport = ScriptedTransport::new()
            .on(
                "/anime/1/full",
                [Reply::ok(COWBOY_BEBOP).after(Duration::from_millis(100))],
            )
            .on("/anime/6/full", [Reply::status(404)]);
        let fetcher = fetcher(transport);

        // "6" settles at ~10ms, the response for "1" lands at ~100ms
        let (stale, fresh) = tokio::join!(fetcher.fetch_detail("1"), async {
            sleep(Duration::from_millis(10)).await;
            fetcher.fetch_detail("6").await
        });

        assert_eq!(stale.unwrap_err(), FetchError::Superseded);
        assert_eq!(fresh.unwrap_err(), FetchError::NotFound);

        let state = fetcher.state();
        assert_eq!(state.id.as_deref(), Some("6"));
        assert!(state.anime.is_none());
        assert_eq!(state.status, FetchStatus::Error("Anime not found".to_string()));
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let transport = ScriptedTransport::new().on("/anime/1/full", [Reply::ok(COWBOY_BEBOP)]);
        let fetcher = fetcher(transport);
        let mut rx = fetcher.subscribe();

        fetcher.fetch_detail("1").await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().status, FetchStatus::Success);

        fetcher.reset();
        assert_eq!(rx.borrow_and_update().status, FetchStatus::Idle);
        assert!(fetcher.state().anime.is_none());
    }
}
