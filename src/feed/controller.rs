use crate::events::api::{APIError, EventRepository};
use crate::events::model::EventSummary;
use crate::feed::cache::{DateEventCache, FetchResult, FetchTicket, SharedFetch};
use crate::feed::date_key::DateKey;
use crate::gesture::DayStep;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

#[derive(strum::IntoStaticStr, Debug, Clone, PartialEq)]
pub enum FeedViewState {
    Loading,
    Ready(Arc<[EventSummary]>),
    Failed(APIError),
}

/// What happened to a fetch result once it landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer `set_date` happened while the fetch was in flight; the result was dropped
    Superseded,
}

/// Tags every `set_date` so a landing fetch can tell whether it is still wanted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FeedRequest {
    date_key: DateKey,
    generation: u64,
}

struct FeedState {
    cache: DateEventCache,
    target: Option<FeedRequest>,
    generation: u64,
}

/// Owns the date cursor of the feed.
///
/// All methods are synchronous and never block on the network: cache hits are
/// published immediately, misses publish [`FeedViewState::Loading`] and finish on a
/// task spawned on the current tokio runtime. Only the most recent `set_date` may
/// change the published state.
#[derive(Clone)]
pub struct DateFeedController {
    repository: Arc<dyn EventRepository>,
    state: Arc<Mutex<FeedState>>,
    view: Arc<watch::Sender<FeedViewState>>,
}

impl DateFeedController {
    pub fn new(repository: Arc<dyn EventRepository>) -> Self {
        let (view, _) = watch::channel(FeedViewState::Loading);

        Self {
            repository,
            state: Arc::new(Mutex::new(FeedState {
                cache: DateEventCache::new(),
                target: None,
                generation: 0,
            })),
            view: Arc::new(view),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedViewState> {
        self.view.subscribe()
    }

    pub fn view_state(&self) -> FeedViewState {
        self.view.borrow().clone()
    }

    pub fn current_date(&self) -> Option<DateKey> {
        lock(&self.state).target.map(|request| request.date_key)
    }

    pub fn is_cached(&self, date: DateKey) -> bool {
        lock(&self.state).cache.get(&date).is_some()
    }

    /// Misses are finished on the current tokio runtime. Without one the date fails
    /// with [`APIError::Network`] and nothing is fetched.
    #[instrument(skip(self, date), fields(date = tracing::field::Empty))]
    pub fn set_date(&self, date: impl Into<DateKey>) {
        let date_key = date.into();
        tracing::Span::current().record("date", tracing::field::display(date_key));

        let (runtime, request, fetch) = {
            let mut state = lock(&self.state);

            state.generation += 1;
            let request = FeedRequest {
                date_key,
                generation: state.generation,
            };
            state.target = Some(request);

            if let Some(entry) = state.cache.get(&date_key) {
                debug!("Serving {} cached events", entry.events.len());
                self.publish(FeedViewState::Ready(Arc::clone(&entry.events)));
                return;
            }

            let runtime = match Handle::try_current() {
                Ok(runtime) => runtime,
                Err(err) => {
                    warn!("Can't fetch events for {} without a runtime: {}", date_key, err);
                    self.publish(FeedViewState::Failed(APIError::Network(err.to_string())));
                    return;
                }
            };

            self.publish(FeedViewState::Loading);

            let fetch = state
                .cache
                .join_or_start_fetch(date_key, |ticket| self.start_fetch(ticket));

            (runtime, request, fetch)
        };

        let controller = self.clone();
        runtime.spawn(async move {
            controller.await_fetch(request, fetch).await;
        });
    }

    pub fn step(&self, step: DayStep) {
        let current = self.current_date().unwrap_or_else(DateKey::today);

        self.set_date(match step {
            DayStep::Advance => current.succ(),
            DayStep::Retreat => current.pred(),
        });
    }

    pub fn next_day(&self) {
        self.step(DayStep::Advance);
    }

    pub fn previous_day(&self) {
        self.step(DayStep::Retreat);
    }

    /// Asks again for the current date. A failed date is always fetched afresh.
    pub fn retry(&self) {
        match self.current_date() {
            Some(date) => self.set_date(date),
            None => warn!("Nothing to retry, no date was requested yet"),
        }
    }

    /// Forgets the cached feed for `date`; the next visit fetches it again
    pub fn invalidate(&self, date: DateKey) {
        if lock(&self.state).cache.invalidate(&date).is_some() {
            info!("Invalidated feed for {}", date);
        }
    }

    /// Waits until the published state is no longer [`FeedViewState::Loading`].
    /// Returns the current state right away when no date was requested yet.
    pub async fn settled(&self) -> FeedViewState {
        if self.current_date().is_none() {
            return self.view_state();
        }

        let mut receiver = self.subscribe();

        let settled = receiver
            .wait_for(|state| *state != FeedViewState::Loading)
            .await
            .map(|state| state.clone());

        settled.unwrap_or_else(|_| self.view_state())
    }

    fn start_fetch(&self, ticket: FetchTicket) -> BoxFuture<'static, FetchResult> {
        info!("Fetching events for {}", ticket.date_key);

        let request = self.repository.fetch_events_by_date(ticket.date_key);
        let state = Arc::clone(&self.state);

        async move {
            let result = request.await.map(Arc::from);

            lock(&state).cache.complete_fetch(ticket, &result);

            result
        }
        .boxed()
    }

    async fn await_fetch(&self, request: FeedRequest, fetch: SharedFetch) -> FetchOutcome {
        let result = fetch.await;

        let state = lock(&self.state);

        if state.target != Some(request) {
            debug!("Discarding superseded result for {}", request.date_key);
            return FetchOutcome::Superseded;
        }

        match result {
            Ok(events) => {
                info!("Loaded {} events for {}", events.len(), request.date_key);
                self.publish(FeedViewState::Ready(events));
            }
            Err(err) => {
                warn!("Failed loading events for {}: {}", request.date_key, err);
                self.publish(FeedViewState::Failed(err));
            }
        }

        FetchOutcome::Applied
    }

    fn publish(&self, next: FeedViewState) {
        let variant: &'static str = (&next).into();

        let changed = self.view.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });

        if changed {
            debug!("View state is now {}", variant);
        }
    }
}

fn lock(state: &Mutex<FeedState>) -> MutexGuard<'_, FeedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
