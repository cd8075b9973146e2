use super::api::APIError;
use super::model::{
    Address, BreakWindow, EventDetails, EventId, EventSummary, ImageRef, OpeningHours,
};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use itertools::Itertools;
use serde::{de, Deserialize, Deserializer};
use serde_either::SingleOrVec;
use serde_json::Value;
use tracing::{error, warn};

const NAIVE_TIMESTAMP_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];
const FREE_PRICE_LABELS: [&str; 2] = ["free", "бесплатно"];

// Older API versions used `event_title`, `category` and `location`; both shapes are accepted
#[derive(Debug, Deserialize)]
pub struct EventResponse {
    pub event_id: u64,
    #[serde(alias = "event_title")]
    pub title: String,
    #[serde(alias = "category", default, deserialize_with = "deserialize_str")]
    pub category_name: String,
    #[serde(alias = "location", default, deserialize_with = "deserialize_str")]
    pub location_name: String,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub price: f64,
    #[serde(alias = "start_date")]
    pub date: String,
    #[serde(default, deserialize_with = "deserialize_str")]
    pub img_path: String,
}

impl EventResponse {
    pub fn to_model(&self) -> Result<EventSummary, APIError> {
        let starts_at = parse_timestamp(&self.date).ok_or_else(|| {
            APIError::InvalidResponse(format!(
                "event {} has an invalid date '{}'",
                self.event_id, self.date
            ))
        })?;

        Ok(EventSummary {
            id: EventId(self.event_id),
            title: self.title.trim().to_string(),
            category: self.category_name.trim().to_string(),
            location_name: self.location_name.trim().to_string(),
            price: self.price,
            starts_at,
            image: ImageRef::new(&self.img_path),
        })
    }
}

/// Parses a by-date listing, ordered by start time
pub fn parse_events(json: &str) -> Result<Vec<EventSummary>, APIError> {
    let responses = serde_json::from_str::<Vec<EventResponse>>(json).map_err(|err| {
        error!("Response parse failed: {:?}", err);
        APIError::InvalidResponse(err.to_string())
    })?;

    let events = responses
        .iter()
        .map(EventResponse::to_model)
        .collect::<Result<Vec<EventSummary>, APIError>>()?;

    Ok(events
        .into_iter()
        .sorted_by_key(|event| event.starts_at)
        .collect())
}

#[derive(Debug, Deserialize)]
pub struct EventDetailsResponse {
    pub event_id: u64,
    #[serde(alias = "event_title")]
    pub title: String,
    #[serde(default)]
    pub description: Option<SingleOrVec<String>>,
    #[serde(default)]
    pub address: Option<AddressResponse>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHoursResponse>,
    #[serde(default)]
    pub images: Option<SingleOrVec<String>>,
}

impl EventDetailsResponse {
    pub fn to_model(&self) -> Result<EventDetails, APIError> {
        let description = match self.description.clone() {
            None => String::new(),
            Some(SingleOrVec::Single(paragraph)) => strip_markup(&paragraph),
            Some(SingleOrVec::Vec(paragraphs)) => paragraphs
                .iter()
                .map(|paragraph| strip_markup(paragraph))
                .filter(|paragraph| !paragraph.is_empty())
                .join("\n\n"),
        };

        let images = match self.images.clone() {
            None => Vec::new(),
            Some(SingleOrVec::Single(path)) => vec![path],
            Some(SingleOrVec::Vec(paths)) => paths,
        }
        .iter()
        .filter_map(|path| ImageRef::new(path))
        .collect();

        let opening_hours = match &self.opening_hours {
            None => None,
            Some(hours) => Some(hours.to_model().ok_or_else(|| {
                APIError::InvalidResponse(format!(
                    "event {} has invalid opening hours {:?}",
                    self.event_id, hours
                ))
            })?),
        };

        Ok(EventDetails {
            id: EventId(self.event_id),
            title: self.title.trim().to_string(),
            description,
            address: self
                .address
                .as_ref()
                .map(AddressResponse::to_model)
                .unwrap_or_default(),
            opening_hours,
            images,
        })
    }
}

pub fn parse_event_details(json: &str) -> Result<EventDetails, APIError> {
    serde_json::from_str::<EventDetailsResponse>(json)
        .map_err(|err| {
            error!("Details parse failed: {:?}", err);
            APIError::InvalidResponse(err.to_string())
        })?
        .to_model()
}

#[derive(Debug, Deserialize)]
pub struct AddressResponse {
    #[serde(default, deserialize_with = "deserialize_str")]
    pub city: String,
    #[serde(default, deserialize_with = "deserialize_str")]
    pub street: String,
    #[serde(default, deserialize_with = "deserialize_str")]
    pub house: String,
}

impl AddressResponse {
    fn to_model(&self) -> Address {
        let non_blank = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        Address {
            city: non_blank(&self.city),
            street: non_blank(&self.street),
            house: non_blank(&self.house),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OpeningHoursResponse {
    pub open: String,
    pub close: String,
    #[serde(default)]
    pub break_start: Option<String>,
    #[serde(default)]
    pub break_end: Option<String>,
}

impl OpeningHoursResponse {
    fn to_model(&self) -> Option<OpeningHours> {
        let lunch_break = match (&self.break_start, &self.break_end) {
            (Some(start), Some(end)) => Some(BreakWindow {
                start: parse_time(start)?,
                end: parse_time(end)?,
            }),
            (None, None) => None,
            _ => {
                warn!("Break window is missing one of its ends (ignoring it)");
                None
            }
        };

        Some(OpeningHours {
            open: parse_time(&self.open)?,
            close: parse_time(&self.close)?,
            lunch_break,
        })
    }
}

fn strip_markup(text: &str) -> String {
    voca_rs::strip::strip_tags(text).trim().to_string()
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value.trim(), format).ok())
}

/// Accepts RFC 3339, naive local timestamps and bare dates (midnight)
fn parse_timestamp(value: &str) -> Option<DateTime<Local>> {
    let value = value.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Local));
    }

    let naive = NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    Local.from_local_datetime(&naive).earliest()
}

fn deserialize_str<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn deserialize_price<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(d)? {
        Value::Null => Ok(0.0),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| de::Error::custom(format!("price {n} is out of range"))),
        Value::String(s) => {
            let s = s.trim();

            if s.is_empty() || FREE_PRICE_LABELS.contains(&s.to_lowercase().as_str()) {
                return Ok(0.0);
            }

            s.parse::<f64>()
                .map_err(|_| de::Error::custom(format!("'{s}' is not a valid price")))
        }
        unknown => Err(de::Error::custom(format!(
            "Found an unknown price type: {unknown}"
        ))),
    }
}
