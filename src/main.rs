use afisha::config::env_loader::load_config;
use afisha::events::api::EventsAPI;
use afisha::feed::controller::{DateFeedController, FeedViewState};
use afisha::feed::date_key::DateKey;
use afisha::gesture::GestureDateNavigator;
use afisha::tracing::setup_loki;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = load_config();
    let _loki = setup_loki(config.loki_url.as_deref()).await;

    let api = EventsAPI::new(&config.api_config.base_url, config.api_config.max_retries);
    let image_base = api.base_url().to_string();
    let feed = DateFeedController::new(Arc::new(api));
    let mut navigator = GestureDateNavigator::new(config.swipe_config);

    let start = config.debug_config.start_date.unwrap_or_else(DateKey::today);
    feed.set_date(start);
    log_feed(&feed, &image_base).await;

    // Finger travelling right to left: next day
    let swipe = -(config.swipe_config.threshold + 1.0);
    navigator.begin();
    navigator.drag(swipe, 0.0);
    if let Some(step) = navigator.end(swipe) {
        feed.step(step);
        log_feed(&feed, &image_base).await;
    }
}

async fn log_feed(feed: &DateFeedController, image_base: &str) {
    let Some(date) = feed.current_date() else {
        return;
    };

    match feed.settled().await {
        FeedViewState::Ready(events) if events.is_empty() => {
            info!("No events for {} ({})", date.day_month_label(), date.weekday_label());
        }
        FeedViewState::Ready(events) => {
            info!("{} ({})", date.day_month_label(), date.weekday_label());

            events.iter().for_each(|event| {
                info!(
                    "{} {} @ {} [{}] {} {}",
                    event.start_time_label(),
                    event.title,
                    event.location_name,
                    event.category,
                    event.price_label(),
                    event
                        .image
                        .as_ref()
                        .map(|image| image.url(image_base))
                        .unwrap_or_else(|| <&str>::from(event.icon()).to_string())
                )
            });
        }
        FeedViewState::Failed(err) => error!("Couldn't load events for {}: {}", date, err),
        FeedViewState::Loading => {}
    }
}
