use crate::events::api::APIError;
use crate::events::model::EventSummary;
use crate::feed::date_key::DateKey;
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

pub type FetchResult = Result<Arc<[EventSummary]>, APIError>;

/// A fetch that any number of waiters can await; the underlying request runs once
pub type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

/// One cached feed. Replaced as a whole on refetch, never edited in place.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub date_key: DateKey,
    pub events: Arc<[EventSummary]>,
    pub fetched_at: DateTime<Utc>,
}

/// Identifies one started fetch so that its completion can tell whether it is still
/// the fetch the cache is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub date_key: DateKey,
    id: u64,
}

struct InFlight {
    id: u64,
    fetch: SharedFetch,
    /// Cleared by an invalidation while the fetch runs
    store_result: bool,
}

/// Session-scoped feed cache.
///
/// Entries never expire on their own: once a date is loaded it is served from memory
/// until [`DateEventCache::invalidate`] is called for it. Failures are never stored.
#[derive(Default)]
pub struct DateEventCache {
    entries: HashMap<DateKey, FeedEntry>,
    in_flight: HashMap<DateKey, InFlight>,
    next_fetch_id: u64,
}

impl DateEventCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date_key: &DateKey) -> Option<&FeedEntry> {
        self.entries.get(date_key)
    }

    /// Last write wins
    pub fn put(&mut self, date_key: DateKey, events: impl Into<Arc<[EventSummary]>>) -> &FeedEntry {
        let entry = FeedEntry {
            date_key,
            events: events.into(),
            fetched_at: Utc::now(),
        };

        trace!("Storing {} events for {}", entry.events.len(), date_key);

        self.entries.insert(date_key, entry);
        &self.entries[&date_key]
    }

    /// Drops the entry. A fetch in flight for the date keeps running and can still be
    /// joined, but its result will not be stored when it lands.
    pub fn invalidate(&mut self, date_key: &DateKey) -> Option<FeedEntry> {
        if let Some(in_flight) = self.in_flight.get_mut(date_key) {
            debug!("Fetch in flight for {} will not be stored", date_key);
            in_flight.store_result = false;
        }

        self.entries.remove(date_key)
    }

    pub fn is_fetching(&self, date_key: &DateKey) -> bool {
        self.in_flight.contains_key(date_key)
    }

    /// Returns the fetch already in flight for the date or, if there is none, starts
    /// one with `start`. At most one fetch per date is ever in flight.
    pub fn join_or_start_fetch<F>(&mut self, date_key: DateKey, start: F) -> SharedFetch
    where
        F: FnOnce(FetchTicket) -> BoxFuture<'static, FetchResult>,
    {
        if let Some(in_flight) = self.in_flight.get(&date_key) {
            debug!("Joining fetch in flight for {}", date_key);
            return in_flight.fetch.clone();
        }

        let id = self.next_fetch_id;
        self.next_fetch_id += 1;

        let fetch = start(FetchTicket { date_key, id }).shared();

        self.in_flight.insert(
            date_key,
            InFlight {
                id,
                fetch: fetch.clone(),
                store_result: true,
            },
        );

        fetch
    }

    /// Settles a fetch started by [`Self::join_or_start_fetch`]. Successful results are
    /// stored unless the date was invalidated while the fetch ran. Returns whether the
    /// result was stored.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: &FetchResult) -> bool {
        let store_result = match self.in_flight.get(&ticket.date_key) {
            Some(in_flight) if in_flight.id == ticket.id => in_flight.store_result,
            _ => {
                debug!("Fetch for {} was already settled", ticket.date_key);
                return false;
            }
        };

        self.in_flight.remove(&ticket.date_key);

        match result {
            Ok(events) if store_result => {
                self.put(ticket.date_key, Arc::clone(events));
                true
            }
            Ok(_) => {
                debug!(
                    "Date {} was invalidated while fetching, not storing it",
                    ticket.date_key
                );
                false
            }
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
