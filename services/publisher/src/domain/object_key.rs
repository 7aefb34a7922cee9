/// Object-store key layout of the published site
use crate::domain::PublishDate;

/// Content type of every published object
pub const HTML_CONTENT_TYPE: &str = "text/html";

/// Site home page
pub const HOME_INDEX_KEY: &str = "index.html";

/// `{section}/{date}.html`
pub fn section_dated_key(section: &str, date: &PublishDate) -> String {
    format!("{}/{}.html", section, date.key())
}

/// `{section}/index.html`, the latest-for-section alias
pub fn section_index_key(section: &str) -> String {
    format!("{}/index.html", section)
}

/// `{date}.html`, the archived home page of that day
pub fn home_dated_key(date: &PublishDate) -> String {
    format!("{}.html", date.key())
}
