//! シークレット取得モジュール
//!
//! テキスト生成APIのトークンはSecrets Managerに置かれている。
//! SSM Parameter Storeの `/aws/reference/secretsmanager/` 参照経由で取得する。

use async_trait::async_trait;
use aws_sdk_ssm::Client as SsmClient;
use thiserror::Error;
use tracing::{info, warn};

/// Secrets Manager参照用のパラメータ名プレフィックス
pub const SECRETS_MANAGER_REFERENCE_PREFIX: &str = "/aws/reference/secretsmanager/";

/// シークレット取得のエラー型
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SecretStoreError {
    /// AWS SDK エラー
    #[error("AWS SSM APIエラー: {0}")]
    AwsSdkError(String),
    /// 値が空、または存在しない
    #[error("シークレットが見つかりません: {0}")]
    NotFound(String),
}

/// シークレット取得トレイト（テスト用の抽象化）
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// 名前でシークレット文字列を取得
    async fn get_secret(&self, name: &str) -> Result<String, SecretStoreError>;
}

/// SSM経由でSecrets Managerのシークレットを読む実装
pub struct SsmSecretStore {
    client: SsmClient,
}

impl SsmSecretStore {
    pub fn new(client: SsmClient) -> Self {
        Self { client }
    }

    /// 共通のSDK設定から作成。`region`指定時はシークレット取得のみそのリージョンを使う
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig, region: Option<&str>) -> Self {
        let mut builder = aws_sdk_ssm::config::Builder::from(sdk_config);
        if let Some(region) = region {
            builder = builder.region(aws_sdk_ssm::config::Region::new(region.to_string()));
        }
        Self::new(SsmClient::from_conf(builder.build()))
    }

    /// シークレット名をSSMパラメータ名に変換
    ///
    /// すでにパス形式（`/`始まり）の場合はそのまま使う。
    pub fn parameter_name(secret_name: &str) -> String {
        if secret_name.starts_with('/') {
            secret_name.to_string()
        } else {
            format!("{}{}", SECRETS_MANAGER_REFERENCE_PREFIX, secret_name)
        }
    }
}

#[async_trait]
impl SecretStore for SsmSecretStore {
    async fn get_secret(&self, name: &str) -> Result<String, SecretStoreError> {
        let parameter_name = Self::parameter_name(name);

        let response = self
            .client
            .get_parameter()
            .name(&parameter_name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                warn!(parameter = %parameter_name, error = %service_error, "GetParameterエラー");
                SecretStoreError::AwsSdkError(service_error.to_string())
            })?;

        let value = response
            .parameter()
            .and_then(|p| p.value())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SecretStoreError::NotFound(name.to_string()))?;

        info!(secret = %name, "シークレットを取得");
        Ok(value.to_string())
    }
}
