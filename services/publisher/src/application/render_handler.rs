/// Page Rendererハンドラー
///
/// テーブルの内容から一覧ページを生成してバケットに書き込む。
/// ホームページ（公開日単位）を書いた後、その日に現れたセクションの一覧ページを更新する。
use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument};

use crate::application::{EventError, HandlerResponse, RenderRequest};
use crate::domain::object_key::{
    home_dated_key, section_index_key, HOME_INDEX_KEY, HTML_CONTENT_TYPE,
};
use crate::domain::{render_page, AssetRecord, PageKind, PublishDate, RenderError};
use crate::infrastructure::{AssetRepository, ObjectStore, ObjectStoreError, RepositoryError};

/// セクションページに載せる最大件数
pub const SECTION_PAGE_LIMIT: i32 = 100;

/// Rendererハンドラーのエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderHandlerError {
    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    ObjectStore(#[from] ObjectStoreError),
}

/// 一覧ページ生成ハンドラー
pub struct RenderHandler<AR, OS>
where
    AR: AssetRepository,
    OS: ObjectStore,
{
    asset_repo: AR,
    object_store: OS,
}

impl<AR, OS> RenderHandler<AR, OS>
where
    AR: AssetRepository,
    OS: ObjectStore,
{
    pub fn new(asset_repo: AR, object_store: OS) -> Self {
        Self {
            asset_repo,
            object_store,
        }
    }

    /// 起動イベントを処理
    ///
    /// # 処理フロー
    /// 1. 対象日（未指定なら`today`）のアセットを公開日インデックスから取得
    /// 2. ホームページを `index.html` と `{date}.html` に書き込み
    /// 3. 対象日に現れたセクションごとに `{section}/index.html` を再生成
    ///
    /// 描画・書き込みのいずれかが失敗した時点で残りは中断する。
    #[instrument(skip(self, event))]
    pub async fn handle(
        &self,
        event: &Value,
        today: PublishDate,
    ) -> Result<HandlerResponse, RenderHandlerError> {
        let request = RenderRequest::from_event(event)?;
        let date = request.date_or(today);
        info!(bucket = %request.bucket, date = %date, "ページ生成開始");

        let records = self.asset_repo.find_by_date(&date).await?;
        let html = render_page(&PageKind::Home(date), &records)?;

        for key in [HOME_INDEX_KEY.to_string(), home_dated_key(&date)] {
            self.object_store
                .put_object(&request.bucket, &key, &html, HTML_CONTENT_TYPE)
                .await?;
        }
        info!(date = %date, assets = records.len(), "ホームページを書き込み");

        for section in distinct_sections(&records) {
            self.render_section(&request.bucket, section).await?;
        }

        info!(date = %date, "ページ生成完了");
        Ok(HandlerResponse::uploaded())
    }

    /// セクションの一覧ページを `{section}/index.html` に書き込み
    pub async fn render_section(&self, bucket: &str, section: &str) -> Result<(), RenderHandlerError> {
        let records = self
            .asset_repo
            .recent_by_section(section, SECTION_PAGE_LIMIT)
            .await?;
        let html = render_page(&PageKind::Section(section.to_string()), &records)?;

        self.object_store
            .put_object(bucket, &section_index_key(section), &html, HTML_CONTENT_TYPE)
            .await?;
        info!(section = %section, assets = records.len(), "セクションページを書き込み");
        Ok(())
    }
}

/// 出現順で重複を除いたセクション名
fn distinct_sections(records: &[AssetRecord]) -> Vec<&str> {
    let mut sections: Vec<&str> = Vec::new();
    for record in records {
        if !sections.contains(&record.section.as_str()) {
            sections.push(&record.section);
        }
    }
    sections
}
