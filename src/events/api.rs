use super::dto::{parse_event_details, parse_events};
use super::model::{EventDetails, EventId, EventSummary};
use crate::feed::date_key::DateKey;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use thiserror::Error;
use tracing::{debug, error, info, Instrument};

const EVENTS_BY_DATE_PATH: &str = "api/v1/events/by-date";
const EVENT_DETAILS_PATH: &str = "api/v1/events";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum APIError {
    #[error("Request failed: {0}")]
    Network(String),

    #[error("Request failed with status {0}")]
    Status(u16),

    #[error("Received invalid response: {0}")]
    InvalidResponse(String),
}

impl APIError {
    /// Transport and status failures, as opposed to malformed payloads
    pub fn is_network_failure(&self) -> bool {
        matches!(self, APIError::Network(_) | APIError::Status(_))
    }
}

/// Remote source of events. Implementations normalize whatever the wire sends into
/// the canonical model and do no caching of their own.
pub trait EventRepository: Send + Sync {
    fn fetch_events_by_date(
        &self,
        date: DateKey,
    ) -> BoxFuture<'static, Result<Vec<EventSummary>, APIError>>;

    fn fetch_event_details(
        &self,
        event_id: EventId,
        date: DateKey,
    ) -> BoxFuture<'static, Result<EventDetails, APIError>>;
}

#[derive(Clone)]
pub struct EventsAPI {
    client: ClientWithMiddleware,
    base_url: String,
}

impl EventsAPI {
    pub fn new(base_url: &str, max_retries: u32) -> Self {
        let client = ClientBuilder::new(Client::new())
            .with(RetryTransientMiddleware::new_with_policy(
                ExponentialBackoff::builder().build_with_max_retries(max_retries),
            ))
            .build();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn events_by_date_url(&self, date: DateKey) -> String {
        format!(
            "{}/{}?search_date={}",
            self.base_url, EVENTS_BY_DATE_PATH, date
        )
    }

    pub fn event_details_url(&self, event_id: EventId, date: DateKey) -> String {
        format!(
            "{}/{}/{}?search_date={}",
            self.base_url, EVENT_DETAILS_PATH, event_id, date
        )
    }

    async fn get_text(client: ClientWithMiddleware, url: String) -> Result<String, APIError> {
        debug!("GET {}", url);

        let response = client.get(&url).send().await.map_err(|err| {
            error!("Error sending request: {:?}", err);
            APIError::Network(err.to_string())
        })?;

        let status = response.status();
        let response = response.error_for_status().map_err(|err| {
            error!("Request failed with {}: {:?}", status, err);
            APIError::Status(status.as_u16())
        })?;

        response.text().await.map_err(|err| {
            error!("Failed reading response body: {:?}", err);
            APIError::Network(err.to_string())
        })
    }
}

impl EventRepository for EventsAPI {
    fn fetch_events_by_date(
        &self,
        date: DateKey,
    ) -> BoxFuture<'static, Result<Vec<EventSummary>, APIError>> {
        let client = self.client.clone();
        let url = self.events_by_date_url(date);

        async move {
            info!("Getting events");

            let events = parse_events(&Self::get_text(client, url).await?)?;

            info!("Got {} events", events.len());

            Ok(events)
        }
        .instrument(tracing::info_span!("fetch_events_by_date", %date))
        .boxed()
    }

    fn fetch_event_details(
        &self,
        event_id: EventId,
        date: DateKey,
    ) -> BoxFuture<'static, Result<EventDetails, APIError>> {
        let client = self.client.clone();
        let url = self.event_details_url(event_id, date);

        async move {
            info!("Getting event details");

            let details = parse_event_details(&Self::get_text(client, url).await?)?;

            info!("Got details with {} images", details.images.len());

            Ok(details)
        }
        .instrument(tracing::info_span!("fetch_event_details", %event_id, %date))
        .boxed()
    }
}
