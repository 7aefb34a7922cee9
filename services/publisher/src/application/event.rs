/// 起動イベントの解析
///
/// スケジューラーから渡されるJSONペイロードを型付きのリクエストに変換する。
use serde_json::Value;
use thiserror::Error;

use crate::domain::{PublishDate, ResponseFormat};

/// 起動イベントのエラー型
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    /// 必須フィールドが欠落、または文字列でない
    #[error("Missing required event field: {0}")]
    MissingField(&'static str),

    /// 日付がYYYYMMDD形式でない
    #[error("Invalid date in event: {0}")]
    InvalidDate(String),

    /// formatが未知の値
    #[error("Unknown response format: {0}")]
    InvalidFormat(String),
}

fn required_str<'a>(event: &'a Value, field: &'static str) -> Result<&'a str, EventError> {
    event
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or(EventError::MissingField(field))
}

/// `null`は未指定として扱う
fn optional_field<'a>(event: &'a Value, field: &str) -> Option<&'a Value> {
    event.get(field).filter(|v| !v.is_null())
}

/// Content Generatorへのリクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub bucket: String,
    pub section: String,
    pub prompt: String,
    pub format: ResponseFormat,
}

impl GenerateRequest {
    /// `{bucket, folder | section, prompt, format?}` を解析
    ///
    /// `folder`と`section`は同義。両方ある場合は`folder`を優先する。
    pub fn from_event(event: &Value) -> Result<Self, EventError> {
        let bucket = required_str(event, "bucket")?;
        let section = required_str(event, "folder")
            .or_else(|_| required_str(event, "section"))
            .map_err(|_| EventError::MissingField("folder"))?;
        let prompt = required_str(event, "prompt")?;

        let format = match optional_field(event, "format") {
            None => ResponseFormat::default(),
            Some(Value::String(s)) => s
                .parse::<ResponseFormat>()
                .map_err(EventError::InvalidFormat)?,
            Some(other) => return Err(EventError::InvalidFormat(other.to_string())),
        };

        Ok(Self {
            bucket: bucket.to_string(),
            section: section.to_string(),
            prompt: prompt.to_string(),
            format,
        })
    }
}

/// Page Rendererへのリクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub bucket: String,
    /// 未指定なら実行日
    pub date: Option<PublishDate>,
}

impl RenderRequest {
    pub fn from_event(event: &Value) -> Result<Self, EventError> {
        let bucket = required_str(event, "bucket")?;

        let date = match optional_field(event, "date") {
            None => None,
            Some(Value::String(s)) => {
                Some(PublishDate::parse(s).map_err(|_| EventError::InvalidDate(s.clone()))?)
            }
            Some(other) => return Err(EventError::InvalidDate(other.to_string())),
        };

        Ok(Self {
            bucket: bucket.to_string(),
            date,
        })
    }

    /// 対象日を確定（未指定なら`today`）
    pub fn date_or(&self, today: PublishDate) -> PublishDate {
        self.date.unwrap_or(today)
    }
}
