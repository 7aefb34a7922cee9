/// DynamoDBでアセットメタデータを管理するリポジトリ
///
/// テーブル構成:
/// - パーティションキー `section`、ソートキー `date`（YYYYMMDD）
/// - GSI（デフォルト `date-index`）: パーティションキー `date`
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::domain::{AssetRecord, PublishDate};

/// リポジトリ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepositoryError {
    /// DynamoDBへの書き込みに失敗
    #[error("Write error: {0}")]
    WriteError(String),

    /// DynamoDBからの読み取りに失敗
    #[error("Read error: {0}")]
    ReadError(String),

    /// 項目の変換に失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// アセットメタデータ永続化用トレイト
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// (section, date)をキーにアセットを保存する。既存項目は上書き
    async fn put(&self, record: &AssetRecord) -> Result<(), RepositoryError>;

    /// セクションの新しい順に最大`limit`件を取得
    async fn recent_by_section(
        &self,
        section: &str,
        limit: i32,
    ) -> Result<Vec<AssetRecord>, RepositoryError>;

    /// 公開日が一致する全セクションのアセットを取得（GSI経由）
    async fn find_by_date(&self, date: &PublishDate) -> Result<Vec<AssetRecord>, RepositoryError>;
}

/// AssetRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoAssetRepository {
    client: DynamoDbClient,
    table_name: String,
    date_index: String,
}

impl DynamoAssetRepository {
    pub fn new(client: DynamoDbClient, table_name: String, date_index: String) -> Self {
        Self {
            client,
            table_name,
            date_index,
        }
    }

    /// DynamoDB項目をAssetRecordに変換
    ///
    /// `section`と`date`はキーなので必須。`title`/`description`は旧スキーマでは欠落しうる
    fn record_from_item(
        item: &HashMap<String, AttributeValue>,
    ) -> Result<AssetRecord, RepositoryError> {
        let section = item
            .get("section")
            .and_then(|v| v.as_s().ok())
            .ok_or_else(|| {
                RepositoryError::SerializationError("Missing section field".to_string())
            })?
            .clone();

        let date = item
            .get("date")
            .and_then(|v| v.as_s().ok())
            .ok_or_else(|| RepositoryError::SerializationError("Missing date field".to_string()))?;
        let date = PublishDate::parse(date)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        let optional_string = |name: &str| item.get(name).and_then(|v| v.as_s().ok()).cloned();

        Ok(AssetRecord {
            section,
            date,
            title: optional_string("title"),
            description: optional_string("description"),
        })
    }

    fn records_from_items(
        items: Option<Vec<HashMap<String, AttributeValue>>>,
    ) -> Result<Vec<AssetRecord>, RepositoryError> {
        items
            .unwrap_or_default()
            .iter()
            .map(Self::record_from_item)
            .collect()
    }
}

#[async_trait]
impl AssetRepository for DynamoAssetRepository {
    async fn put(&self, record: &AssetRecord) -> Result<(), RepositoryError> {
        let mut request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item("section", AttributeValue::S(record.section.clone()))
            .item("date", AttributeValue::S(record.date.key()));

        if let Some(title) = &record.title {
            request = request.item("title", AttributeValue::S(title.clone()));
        }
        if let Some(description) = &record.description {
            request = request.item("description", AttributeValue::S(description.clone()));
        }

        request
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(e.into_service_error().to_string()))?;

        Ok(())
    }

    async fn recent_by_section(
        &self,
        section: &str,
        limit: i32,
    ) -> Result<Vec<AssetRecord>, RepositoryError> {
        // section / date はどちらもDynamoDBの予約語
        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("#section = :section")
            .expression_attribute_names("#section", "section")
            .expression_attribute_values(":section", AttributeValue::S(section.to_string()))
            .limit(limit)
            .scan_index_forward(false) // date降順
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(e.into_service_error().to_string()))?;

        let records = Self::records_from_items(result.items)?;
        debug!(section = %section, count = records.len(), "セクションのアセットを取得");
        Ok(records)
    }

    async fn find_by_date(&self, date: &PublishDate) -> Result<Vec<AssetRecord>, RepositoryError> {
        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(&self.date_index)
            .key_condition_expression("#date = :date")
            .expression_attribute_names("#date", "date")
            .expression_attribute_values(":date", AttributeValue::S(date.key()))
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(e.into_service_error().to_string()))?;

        let records = Self::records_from_items(result.items)?;
        debug!(date = %date, count = records.len(), "公開日のアセットを取得");
        Ok(records)
    }
}
