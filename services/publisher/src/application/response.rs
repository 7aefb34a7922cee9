use serde::Serialize;

/// 成功時のレスポンス本文
pub const SUCCESS_BODY: &str = "File uploaded successfully.";

/// Lambdaの戻り値
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    pub fn uploaded() -> Self {
        Self {
            status_code: 200,
            body: SUCCESS_BODY.to_string(),
        }
    }
}
