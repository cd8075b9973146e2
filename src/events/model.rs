use chrono::{DateTime, Local, NaiveTime};
use std::fmt::{Display, Formatter};

const STATIC_IMAGES_PATH: &str = "static/images";
const CURRENCY_SIGN: char = '₽';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(pub u64);

impl Display for EventId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Path of an image relative to the static assets folder of the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef(String);

impl ImageRef {
    /// Returns `None` for blank paths
    pub fn new(path: &str) -> Option<Self> {
        let path = path.trim().trim_start_matches('/');

        if path.is_empty() {
            None
        } else {
            Some(Self(path.to_string()))
        }
    }

    pub fn path(&self) -> &str {
        &self.0
    }

    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/{}",
            base_url.trim_end_matches('/'),
            STATIC_IMAGES_PATH,
            self.0
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventSummary {
    pub id: EventId,
    pub title: String,
    pub category: String,
    pub location_name: String,
    /// 0 means free
    pub price: f64,
    pub starts_at: DateTime<Local>,
    pub image: Option<ImageRef>,
}

impl EventSummary {
    pub fn is_free(&self) -> bool {
        self.price == 0.0
    }

    pub fn price_label(&self) -> String {
        if self.is_free() {
            "Free".to_string()
        } else {
            format!("{}{}", CURRENCY_SIGN, self.price)
        }
    }

    pub fn start_time_label(&self) -> String {
        self.starts_at.format("%H:%M").to_string()
    }

    pub fn icon(&self) -> EventIcon {
        EventIcon::for_category(&self.category)
    }
}

/// Placeholder shown when an event has no image
#[derive(strum::IntoStaticStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventIcon {
    Movie,
    Theater,
    Exhibition,
    Generic,
}

impl EventIcon {
    pub fn for_category(category: &str) -> Self {
        match category.trim().to_lowercase().as_str() {
            "кино" => EventIcon::Movie,
            "мультфильм" => EventIcon::Theater,
            "выставка" | "интерактивная выставка" => EventIcon::Exhibition,
            _ => EventIcon::Generic,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub city: Option<String>,
    pub street: Option<String>,
    pub house: Option<String>,
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let street = [&self.street, &self.house]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<&str>>()
            .join(" ");

        let parts = [Some(street).filter(|s| !s.is_empty()), self.city.clone()]
            .into_iter()
            .flatten()
            .collect::<Vec<String>>();

        write!(f, "{}", parts.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub lunch_break: Option<BreakWindow>,
}

impl OpeningHours {
    pub fn is_open_at(&self, time: NaiveTime) -> bool {
        let within_hours = if self.open <= self.close {
            time >= self.open && time < self.close
        } else {
            // Closes after midnight
            time >= self.open || time < self.close
        };

        let on_break = self
            .lunch_break
            .is_some_and(|pause| time >= pause.start && time < pause.end);

        within_hours && !on_break
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventDetails {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub address: Address,
    pub opening_hours: Option<OpeningHours>,
    pub images: Vec<ImageRef>,
}
