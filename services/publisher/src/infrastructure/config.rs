/// Lambdaプロセス設定
///
/// 起動イベントに含まれない値（テーブル名、モデル名など）を環境変数から読み込む。
use thiserror::Error;

/// テキスト生成APIのデフォルトエンドポイント
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// デフォルトのモデルID
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// デフォルトのシークレット名
pub const DEFAULT_SECRET_NAME: &str = "openai";

/// 公開日で引くGSIのデフォルト名
pub const DEFAULT_DATE_INDEX: &str = "date-index";

/// 設定読み込みのエラー型
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// Generator / Renderer 共通の設定
///
/// 環境変数:
/// - ASSETS_TABLE: アセットメタデータ用DynamoDBテーブル名（必須）
/// - ASSETS_DATE_INDEX: 公開日GSI名（省略時 `date-index`）
/// - OPENAI_SECRET_NAME: APIトークンのシークレット名（省略時 `openai`）
/// - OPENAI_MODEL: モデルID（省略時 `gpt-4o-mini`）
/// - OPENAI_API_URL: chat completionsエンドポイント
/// - SECRET_REGION: シークレット取得時のみ使うリージョン（任意）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    assets_table: String,
    date_index: String,
    secret_name: String,
    model: String,
    api_url: String,
    secret_region: Option<String>,
}

impl PublisherConfig {
    /// 明示的な値で作成（テスト用）。省略可能な項目はデフォルト値になる
    pub fn new(assets_table: impl Into<String>) -> Self {
        Self {
            assets_table: assets_table.into(),
            date_index: DEFAULT_DATE_INDEX.to_string(),
            secret_name: DEFAULT_SECRET_NAME.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            secret_region: None,
        }
    }

    /// 環境変数から設定を読み込み
    pub fn from_env() -> Result<Self, ConfigError> {
        let assets_table = std::env::var("ASSETS_TABLE")
            .map_err(|_| ConfigError::MissingEnvVar("ASSETS_TABLE".to_string()))?;

        Ok(Self {
            assets_table,
            date_index: env_or("ASSETS_DATE_INDEX", DEFAULT_DATE_INDEX),
            secret_name: env_or("OPENAI_SECRET_NAME", DEFAULT_SECRET_NAME),
            model: env_or("OPENAI_MODEL", DEFAULT_MODEL),
            api_url: env_or("OPENAI_API_URL", DEFAULT_API_URL),
            secret_region: std::env::var("SECRET_REGION")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        })
    }

    pub fn assets_table(&self) -> &str {
        &self.assets_table
    }

    pub fn date_index(&self) -> &str {
        &self.date_index
    }

    pub fn secret_name(&self) -> &str {
        &self.secret_name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn secret_region(&self) -> Option<&str> {
        self.secret_region.as_deref()
    }
}

/// 空文字は未設定として扱う
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
