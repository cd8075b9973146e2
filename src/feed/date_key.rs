use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Weekday};
use std::fmt::{Display, Formatter};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Russian month names in the genitive case, as used after a day number ("10 марта")
const RUSSIAN_MONTHS: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

const RUSSIAN_WEEKDAYS: [&str; 7] = [
    "понедельник",
    "вторник",
    "среда",
    "четверг",
    "пятница",
    "суббота",
    "воскресенье",
];

/// A calendar day in the device's local calendar.
///
/// Two instants on the same local day always produce the same key, whatever their
/// time of day. The canonical text form is `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Truncates to the calendar day as seen in `date`'s own timezone.
    pub fn from_datetime<Tz: TimeZone>(date: &DateTime<Tz>) -> Self {
        Self(date.date_naive())
    }

    pub fn today() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn parse(value: &str) -> Result<Self, chrono::ParseError> {
        NaiveDate::parse_from_str(value.trim(), DATE_KEY_FORMAT).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The following day, saturating at the end of the supported calendar
    pub fn succ(&self) -> Self {
        Self(self.0.succ_opt().unwrap_or(self.0))
    }

    /// The preceding day, saturating at the start of the supported calendar
    pub fn pred(&self) -> Self {
        Self(self.0.pred_opt().unwrap_or(self.0))
    }

    /// Header label, e.g. "10 марта"
    pub fn day_month_label(&self) -> String {
        format!(
            "{} {}",
            self.0.day(),
            RUSSIAN_MONTHS[self.0.month0() as usize]
        )
    }

    /// Header sub-label, e.g. "понедельник"
    pub fn weekday_label(&self) -> &'static str {
        weekday_to_russian_display(self.0.weekday())
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Display for DateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

pub fn weekday_to_russian_display(weekday: Weekday) -> &'static str {
    RUSSIAN_WEEKDAYS[weekday.num_days_from_monday() as usize]
}
