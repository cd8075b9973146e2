use crate::carousel::MediaCarouselController;
use crate::events::api::{APIError, EventRepository};
use crate::events::model::{EventDetails, EventId};
use crate::feed::date_key::DateKey;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailViewState {
    Loading,
    Ready(EventDetails),
    Failed(APIError),
}

/// State of one open detail screen. A new screen shows [`DetailViewState::Loading`]
/// until [`EventDetailScreen::load`] settles it. Details are dropped with the screen.
pub struct EventDetailScreen {
    pub event_id: EventId,
    pub date: DateKey,
    details: DetailViewState,
    pub carousel: MediaCarouselController,
}

impl EventDetailScreen {
    pub fn new(event_id: EventId, date: DateKey) -> Self {
        Self {
            event_id,
            date,
            details: DetailViewState::Loading,
            carousel: MediaCarouselController::new(Vec::new()),
        }
    }

    /// Builds the screen and loads its details
    pub async fn mount(repository: &dyn EventRepository, event_id: EventId, date: DateKey) -> Self {
        let mut screen = Self::new(event_id, date);

        screen.load(repository).await;

        screen
    }

    /// Fetches the details unless they are already shown. A failed load can be retried.
    #[instrument(skip(self, repository), fields(event_id = %self.event_id, date = %self.date))]
    pub async fn load(&mut self, repository: &dyn EventRepository) {
        if matches!(self.details, DetailViewState::Ready(_)) {
            debug!("Details already loaded");
            return;
        }

        self.details = DetailViewState::Loading;

        let result = repository
            .fetch_event_details(self.event_id, self.date)
            .await;

        self.apply(result);
    }

    pub fn details(&self) -> &DetailViewState {
        &self.details
    }

    fn apply(&mut self, result: Result<EventDetails, APIError>) {
        match result {
            Ok(details) => {
                info!("Showing '{}' with {} images", details.title, details.images.len());
                self.carousel.set_images(details.images.clone());
                self.details = DetailViewState::Ready(details);
            }
            Err(err) => {
                warn!("Failed loading details: {}", err);
                self.details = DetailViewState::Failed(err);
            }
        }
    }
}
