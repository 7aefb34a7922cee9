/// 静的サイト用バケットへのオブジェクト書き込み
///
/// 既存キーへの書き込みは上書き（バージョニングなし）。
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use thiserror::Error;
use tracing::info;

/// オブジェクト書き込みのエラー型
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObjectStoreError {
    #[error("Failed to write s3://{bucket}/{key}: {message}")]
    WriteFailed {
        bucket: String,
        key: String,
        message: String,
    },
}

/// オブジェクトストア操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &str,
        content_type: &str,
    ) -> Result<(), ObjectStoreError>;
}

/// S3実装
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &str,
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body.as_bytes().to_vec()))
            .send()
            .await
            .map_err(|e| ObjectStoreError::WriteFailed {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: e.into_service_error().to_string(),
            })?;

        info!(bucket = %bucket, key = %key, bytes = body.len(), "オブジェクトを書き込み");
        Ok(())
    }
}
