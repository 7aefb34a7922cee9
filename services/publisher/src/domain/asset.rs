/// Asset metadata stored in the assets table
///
/// One row per generated content item, keyed by (section, date).
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// Section whose pages are full interactive documents
///
/// The generic loader page cannot host them, so listings link straight to the blob.
pub const GAME_SECTION: &str = "game";

/// Storage format of a publish date (`YYYYMMDD`)
const DATE_KEY_FORMAT: &str = "%Y%m%d";

/// Display format of a publish date on listing pages
const DATE_DISPLAY_FORMAT: &str = "%Y-%m-%d";

/// Error returned when a publish date cannot be parsed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid publish date (expected YYYYMMDD): {0}")]
pub struct InvalidDateError(pub String);

/// Publish date of an asset
///
/// Serialized as `YYYYMMDD`, which also sorts chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublishDate(NaiveDate);

impl PublishDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse a `YYYYMMDD` key
    pub fn parse(value: &str) -> Result<Self, InvalidDateError> {
        // chrono accepts a leading sign and more digits for %Y, so pin the shape first
        if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidDateError(value.to_string()));
        }

        NaiveDate::parse_from_str(value, DATE_KEY_FORMAT)
            .map(Self)
            .map_err(|_| InvalidDateError(value.to_string()))
    }

    /// Today's date in UTC
    pub fn today() -> Self {
        Self(chrono::Utc::now().date_naive())
    }

    /// `YYYYMMDD` form used in table keys and object keys
    pub fn key(&self) -> String {
        self.0.format(DATE_KEY_FORMAT).to_string()
    }

    /// `YYYY-MM-DD` form used in page headings
    pub fn display(&self) -> String {
        self.0.format(DATE_DISPLAY_FORMAT).to_string()
    }
}

impl fmt::Display for PublishDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// One generated content item as stored in the table
///
/// `title` and `description` are optional because early rows were written
/// without them; rendering rejects such rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub section: String,
    pub date: PublishDate,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl AssetRecord {
    pub fn new(
        section: impl Into<String>,
        date: PublishDate,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            section: section.into(),
            date,
            title: Some(title.into()),
            description: Some(description.into()),
        }
    }

    /// Whether this asset belongs to the game section
    pub fn is_game(&self) -> bool {
        self.section == GAME_SECTION
    }
}
