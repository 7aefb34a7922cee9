/// Parsing of the text returned by the text-generation API
use regex::Regex;
use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Matches a whole HTML document inside free-form model output
static HTML_DOCUMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<html[\s\S]*</html>").unwrap());

/// Error returned when the model output does not have the expected shape
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Output is not a JSON object
    #[error("Response is not a valid JSON object: {0}")]
    InvalidJson(String),

    /// A required field is absent
    #[error("Response is missing required field: {0}")]
    MissingField(&'static str),

    /// A required field is present but not a string
    #[error("Response field is not a string: {0}")]
    NotAString(&'static str),

    /// Legacy output contains no `<html>...</html>` document
    #[error("Response does not contain an HTML document")]
    HtmlNotFound,
}

/// Contract the model output is expected to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// JSON envelope `{title, description, html}`
    #[default]
    Json,
    /// Raw HTML document somewhere in the text (legacy)
    Html,
}

impl FromStr for ResponseFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "json" => Ok(ResponseFormat::Json),
            "html" => Ok(ResponseFormat::Html),
            other => Err(other.to_string()),
        }
    }
}

/// Content item produced by the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedContent {
    pub title: String,
    pub description: String,
    pub html: String,
}

impl GeneratedContent {
    /// Parse a JSON envelope
    ///
    /// A single surrounding Markdown code fence is tolerated. Extra fields are ignored.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let body = strip_code_fence(text);
        let value: Value =
            serde_json::from_str(body).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

        let Value::Object(object) = value else {
            return Err(ParseError::InvalidJson("top-level value is not an object".to_string()));
        };

        Ok(Self {
            title: required_string(&object, "title")?,
            description: required_string(&object, "description")?,
            html: required_string(&object, "html")?,
        })
    }
}

fn required_string(object: &Map<String, Value>, field: &'static str) -> Result<String, ParseError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(ParseError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ParseError::NotAString(field)),
    }
}

/// Remove one surrounding ```` ``` ```` / ```` ```json ```` fence, if any
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // drop the info string (e.g. "json") on the opening line
    match inner.split_once('\n') {
        Some((_, body)) => body.trim(),
        None => inner.trim(),
    }
}

/// Extract the HTML document from legacy free-form output
pub fn extract_html(text: &str) -> Result<String, ParseError> {
    HTML_DOCUMENT
        .find(text)
        .map(|m| m.as_str().to_string())
        .ok_or(ParseError::HtmlNotFound)
}
