//! List fetcher: ranked browse or search, with cumulative "load more".

use crate::api::{
    AnimeSummary, FetchError, Genre, HttpTransport, JikanClient, ListQuery, Transport,
};
use crate::guard::{RequestGuard, Ticket};
use crate::state::{FetchStatus, ListRequest, ListState};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Message shown when a list request fails, whatever the cause
pub const LIST_ERROR_MESSAGE: &str = "Failed to load anime. Please try again later.";

/// Shortlist offered as quick genre filters
pub const POPULAR_GENRES: [&str; 4] = ["Action", "Adventure", "Comedy", "Drama"];

/// Result of a committed list request
#[derive(Debug, Clone)]
pub struct ListPage {
    /// Full accumulated sequence after this request
    pub items: Vec<AnimeSummary>,
    pub has_more: bool,
    pub page: u32,
}

/// Map genre names to taxonomy identifiers, case-insensitively.
///
/// Names missing from the taxonomy are logged and skipped.
pub fn resolve_genres<S: AsRef<str>>(available: &[Genre], names: &[S]) -> Vec<u32> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref().trim();
        match available.iter().find(|g| g.name.eq_ignore_ascii_case(name)) {
            Some(genre) if !ids.contains(&genre.mal_id) => ids.push(genre.mal_id),
            Some(_) => {}
            None => warn!(genre = name, "Unknown genre, ignoring"),
        }
    }
    ids
}

/// Fetches pages of anime into one growing, ordered sequence
pub struct ListFetcher<T = HttpTransport> {
    client: Arc<JikanClient<T>>,
    guard: RequestGuard,
    state: watch::Sender<ListState>,
}

impl<T: Transport> ListFetcher<T> {
    pub fn new(client: Arc<JikanClient<T>>) -> Self {
        let (state, _) = watch::channel(ListState::default());
        Self {
            client,
            guard: RequestGuard::new(),
            state,
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.subscribe()
    }

    /// Fetch one page. `append` extends the current sequence, otherwise it is
    /// replaced. A newer call supersedes this one; superseded calls return
    /// [`FetchError::Superseded`] and leave the state alone.
    pub async fn fetch_list(
        &self,
        query: &str,
        genres: &[u32],
        page: u32,
        append: bool,
    ) -> Result<ListPage, FetchError> {
        let request = ListRequest {
            query: ListQuery::new(query, genres.to_vec()),
            page: page.max(1),
            append,
        };
        let ticket = self.guard.issue();
        self.state.send_modify(|state| {
            state.status = loading_status(request.page);
            state.last_request = Some(request.clone());
        });
        self.run(ticket, request).await
    }

    /// Start over at page one with a new query
    pub async fn search(&self, query: &str, genres: &[u32]) -> Result<ListPage, FetchError> {
        self.fetch_list(query, genres, 1, false).await
    }

    /// Append the next page. Returns `None` without issuing a request when
    /// there is no further page or a load is already in flight.
    pub async fn load_more(&self) -> Option<Result<ListPage, FetchError>> {
        let mut next = None;
        self.state.send_if_modified(|state| {
            if !state.has_more || state.status.is_loading() {
                return false;
            }
            let request = ListRequest {
                query: state.query.clone(),
                page: state.page + 1,
                append: true,
            };
            state.status = loading_status(request.page);
            state.last_request = Some(request.clone());
            next = Some(request);
            true
        });

        let Some(request) = next else {
            debug!("Nothing more to load");
            return None;
        };
        let ticket = self.guard.issue();
        Some(self.run(ticket, request).await)
    }

    /// Re-issue the last request, typically after an error
    pub async fn retry(&self) -> Option<Result<ListPage, FetchError>> {
        let request = self.state.borrow().last_request.clone()?;
        Some(
            self.fetch_list(
                &request.query.query,
                &request.query.genres,
                request.page,
                request.append,
            )
            .await,
        )
    }

    /// Fetch the genre taxonomy for the filter options.
    ///
    /// Failure is not fatal: it is logged and leaves the options empty.
    pub async fn fetch_genres(&self) -> Vec<Genre> {
        let genres = match self.client.get_genres().await {
            Ok(genres) => genres,
            Err(e) => {
                warn!(error = %e, "Failed to fetch genres, filter list left empty");
                Vec::new()
            }
        };
        self.state
            .send_modify(|state| state.available_genres = genres.clone());
        genres
    }

    async fn run(&self, ticket: Ticket<'_>, request: ListRequest) -> Result<ListPage, FetchError> {
        info!(
            query = %request.query.query,
            genres = ?request.query.genres,
            page = request.page,
            append = request.append,
            "Fetching anime list"
        );

        let result = self.client.get_anime_list(&request.query, request.page).await;
        match result {
            Ok(response) => {
                let has_more = response.has_next_page();
                let received = response.data.len();
                let mut committed = None;
                self.state.send_if_modified(|state| {
                    if !ticket.is_current() {
                        return false;
                    }
                    if request.append {
                        state.items.extend(response.data);
                    } else {
                        state.items = response.data;
                    }
                    state.page = request.page;
                    state.has_more = has_more;
                    state.query = request.query;
                    state.status = FetchStatus::Success;
                    committed = Some(ListPage {
                        items: state.items.clone(),
                        has_more,
                        page: state.page,
                    });
                    true
                });

                match committed {
                    Some(page) => {
                        debug!(
                            received = received,
                            total = page.items.len(),
                            has_more = has_more,
                            "List request successful"
                        );
                        Ok(page)
                    }
                    None => {
                        debug!("Discarding superseded list response");
                        Err(FetchError::Superseded)
                    }
                }
            }
            Err(err) => {
                error!(error = %err, page = request.page, "Error fetching anime list");
                let committed = self.state.send_if_modified(|state| {
                    if !ticket.is_current() {
                        return false;
                    }
                    state.status = FetchStatus::Error(LIST_ERROR_MESSAGE.to_string());
                    true
                });
                if committed {
                    Err(err)
                } else {
                    Err(FetchError::Superseded)
                }
            }
        }
    }
}

fn loading_status(page: u32) -> FetchStatus {
    if page <= 1 {
        FetchStatus::LoadingInitial
    } else {
        FetchStatus::LoadingMore
    }
}
