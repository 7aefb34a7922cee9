// テキスト生成APIクライアント
//
// OpenAI互換のchat completionsエンドポイントにプロンプトを送り、
// `choices[0].message.content` を返す。再試行は行わない。

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument};

/// サンプリング温度（固定）
pub const TEMPERATURE: f64 = 0.7;

/// テキスト生成のエラー型
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TextGeneratorError {
    /// HTTPエラー（ステータスコード付き）
    #[error("HTTPエラー: status={status}, message={message}")]
    HttpError { status: u16, message: String },

    /// ネットワークエラー
    #[error("ネットワークエラー: {0}")]
    NetworkError(String),

    /// レスポンスのデシリアライズエラー
    #[error("デシリアライズエラー: {0}")]
    DeserializationError(String),

    /// choicesが空、またはcontentがない
    #[error("生成結果が空です")]
    EmptyResponse,
}

/// テキスト生成トレイト（テスト用の抽象化）
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// プロンプトを送信し、生成テキストを返す
    async fn generate(&self, prompt: &str, api_token: &str) -> Result<String, TextGeneratorError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// OpenAI chat completionsクライアント
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint, model)
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
        }
    }

    /// レスポンスボディから`choices[0].message.content`を取り出す
    fn first_content(body: &str) -> Result<String, TextGeneratorError> {
        let response: ChatCompletionResponse = serde_json::from_str(body)
            .map_err(|e| TextGeneratorError::DeserializationError(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(TextGeneratorError::EmptyResponse)
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    #[instrument(skip(self, prompt, api_token), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str, api_token: &str) -> Result<String, TextGeneratorError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_token)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "テキスト生成リクエスト失敗");
                TextGeneratorError::NetworkError(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TextGeneratorError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!(status = %status, body = %body, "テキスト生成APIエラー");
            return Err(TextGeneratorError::HttpError {
                status: status.as_u16(),
                message: body,
            });
        }

        let content = Self::first_content(&body)?;
        info!(content_len = content.len(), "テキスト生成に成功");
        Ok(content)
    }
}
