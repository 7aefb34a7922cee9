/// Content Generatorハンドラー
///
/// LLMにコンテンツを生成させ、HTMLを静的サイト用バケットに書き込み、
/// メタデータをテーブルに保存する。
use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument};

use crate::application::{EventError, GenerateRequest, HandlerResponse};
use crate::domain::object_key::{section_dated_key, section_index_key, HTML_CONTENT_TYPE};
use crate::domain::{
    compose_prompt, extract_html, AssetRecord, GeneratedContent, ParseError, PublishDate,
    ResponseFormat, HISTORY_LIMIT,
};
use crate::infrastructure::{
    AssetRepository, ObjectStore, ObjectStoreError, RepositoryError, SecretStore,
    SecretStoreError, TextGenerator, TextGeneratorError,
};

/// Generatorハンドラーのエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerateHandlerError {
    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Secret(#[from] SecretStoreError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    TextGeneration(#[from] TextGeneratorError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    ObjectStore(#[from] ObjectStoreError),
}

/// コンテンツ生成ハンドラー
pub struct GenerateHandler<SS, AR, TG, OS>
where
    SS: SecretStore,
    AR: AssetRepository,
    TG: TextGenerator,
    OS: ObjectStore,
{
    secret_store: SS,
    asset_repo: AR,
    text_generator: TG,
    object_store: OS,
    /// APIトークンのシークレット名
    secret_name: String,
}

impl<SS, AR, TG, OS> GenerateHandler<SS, AR, TG, OS>
where
    SS: SecretStore,
    AR: AssetRepository,
    TG: TextGenerator,
    OS: ObjectStore,
{
    pub fn new(
        secret_store: SS,
        asset_repo: AR,
        text_generator: TG,
        object_store: OS,
        secret_name: impl Into<String>,
    ) -> Self {
        Self {
            secret_store,
            asset_repo,
            text_generator,
            object_store,
            secret_name: secret_name.into(),
        }
    }

    /// 起動イベントを処理
    ///
    /// # 処理フロー
    /// 1. シークレットストアからAPIトークンを取得
    /// 2. セクションの直近履歴をプロンプトに追加（旧形式では省略）
    /// 3. テキスト生成APIを呼び出し、レスポンスを解析
    /// 4. `{section}/{today}.html` と `{section}/index.html` を書き込み
    /// 5. アセットを保存（旧形式では省略）
    ///
    /// 途中で失敗した場合のロールバックは行わない。
    #[instrument(skip(self, event))]
    pub async fn handle(
        &self,
        event: &Value,
        today: PublishDate,
    ) -> Result<HandlerResponse, GenerateHandlerError> {
        let request = GenerateRequest::from_event(event)?;
        info!(
            bucket = %request.bucket,
            section = %request.section,
            format = ?request.format,
            "コンテンツ生成開始"
        );

        let api_token = self.secret_store.get_secret(&self.secret_name).await?;

        let prompt = match request.format {
            ResponseFormat::Json => {
                let history = self
                    .asset_repo
                    .recent_by_section(&request.section, HISTORY_LIMIT)
                    .await?;
                info!(section = %request.section, history = history.len(), "履歴を取得");
                compose_prompt(&request.prompt, &history)
            }
            ResponseFormat::Html => request.prompt.clone(),
        };

        let completion = self.text_generator.generate(&prompt, &api_token).await?;

        match request.format {
            ResponseFormat::Json => {
                let content = GeneratedContent::parse(&completion)?;
                self.publish(&request, &today, &content.html).await?;

                let record = AssetRecord::new(
                    request.section.as_str(),
                    today,
                    content.title,
                    content.description,
                );
                self.asset_repo.put(&record).await?;
                info!(section = %record.section, date = %record.date, "アセットを保存");
            }
            ResponseFormat::Html => {
                let html = extract_html(&completion)?;
                self.publish(&request, &today, &html).await?;
            }
        }

        info!(section = %request.section, date = %today, "コンテンツ生成完了");
        Ok(HandlerResponse::uploaded())
    }

    /// 日付付きキー、セクションindexの順に書き込み
    async fn publish(
        &self,
        request: &GenerateRequest,
        date: &PublishDate,
        html: &str,
    ) -> Result<(), ObjectStoreError> {
        for key in [
            section_dated_key(&request.section, date),
            section_index_key(&request.section),
        ] {
            self.object_store
                .put_object(&request.bucket, &key, html, HTML_CONTENT_TYPE)
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::asset_repository::tests::MockAssetRepository;
    use crate::infrastructure::logging::init_test_logging;
    use crate::infrastructure::object_store::tests::RecordingObjectStore;
    use crate::infrastructure::secret_store::tests::MockSecretStore;
    use crate::infrastructure::text_generator::tests::ScriptedTextGenerator;
    use serde_json::json;

    const ENVELOPE: &str = r#"{"title":"Snake","description":"Eat apples","html":"<html><body>snake</body></html>"}"#;

    type TestHandler = GenerateHandler<
        MockSecretStore,
        MockAssetRepository,
        ScriptedTextGenerator,
        RecordingObjectStore,
    >;

    struct Fixture {
        secrets: MockSecretStore,
        repo: MockAssetRepository,
        generator: ScriptedTextGenerator,
        store: RecordingObjectStore,
    }

    impl Fixture {
        fn new(generator: ScriptedTextGenerator) -> Self {
            init_test_logging();
            Self {
                secrets: MockSecretStore::new().with_secret("openai", "sk-test"),
                repo: MockAssetRepository::new(),
                generator,
                store: RecordingObjectStore::new(),
            }
        }

        fn handler(&self) -> TestHandler {
            GenerateHandler::new(
                self.secrets.clone(),
                self.repo.clone(),
                self.generator.clone(),
                self.store.clone(),
                "openai",
            )
        }
    }

    fn date(value: &str) -> PublishDate {
        PublishDate::parse(value).unwrap()
    }

    fn articles_event() -> Value {
        json!({"bucket": "b", "folder": "articles", "prompt": "write X"})
    }

    // ==================== 正常系 ====================

    #[tokio::test]
    async fn test_generates_and_publishes_article() {
        let fixture = Fixture::new(ScriptedTextGenerator::new().respond_with(ENVELOPE));

        let response = fixture
            .handler()
            .handle(&articles_event(), date("20240101"))
            .await
            .unwrap();

        assert_eq!(response, HandlerResponse::uploaded());
        assert_eq!(
            fixture.store.keys(),
            vec!["articles/20240101.html", "articles/index.html"]
        );
        for write in fixture.store.writes() {
            assert_eq!(write.bucket, "b");
            assert_eq!(write.body, "<html><body>snake</body></html>");
            assert_eq!(write.content_type, "text/html");
        }
        assert_eq!(
            fixture.repo.get("articles", "20240101"),
            Some(AssetRecord::new("articles", date("20240101"), "Snake", "Eat apples"))
        );
    }

    #[tokio::test]
    async fn test_prompt_carries_token_and_json_instruction() {
        let fixture = Fixture::new(ScriptedTextGenerator::new().respond_with(ENVELOPE));

        fixture
            .handler()
            .handle(&articles_event(), date("20240101"))
            .await
            .unwrap();

        let prompts = fixture.generator.prompts();
        assert_eq!(prompts.len(), 1);
        let (prompt, token) = &prompts[0];
        assert!(prompt.starts_with("write X"));
        assert!(prompt.contains("\"title\""));
        assert!(prompt.contains("\"html\""));
        assert_eq!(token, "sk-test");
    }

    #[tokio::test]
    async fn test_history_is_limited_and_fed_into_prompt() {
        let fixture = Fixture::new(ScriptedTextGenerator::new().respond_with(ENVELOPE));
        fixture.repo.seed(AssetRecord::new(
            "articles",
            date("20231231"),
            "Rust tips",
            "Borrowing explained",
        ));
        fixture.repo.seed(AssetRecord::new(
            "game",
            date("20231231"),
            "Tetris",
            "Falling blocks",
        ));

        fixture
            .handler()
            .handle(&articles_event(), date("20240101"))
            .await
            .unwrap();

        assert_eq!(fixture.repo.section_limits(), vec![50]);
        let (prompt, _) = &fixture.generator.prompts()[0];
        assert!(prompt.contains("- Rust tips: Borrowing explained"));
        assert!(!prompt.contains("Tetris"));
    }

    #[tokio::test]
    async fn test_code_fenced_envelope_is_accepted() {
        let fenced = format!("```json\n{}\n```", ENVELOPE);
        let fixture = Fixture::new(ScriptedTextGenerator::new().respond_with(fenced));

        fixture
            .handler()
            .handle(&articles_event(), date("20240101"))
            .await
            .unwrap();

        assert_eq!(
            fixture.store.body("articles/index.html").as_deref(),
            Some("<html><body>snake</body></html>")
        );
    }

    #[tokio::test]
    async fn test_same_day_rerun_overwrites() {
        let fixture = Fixture::new(
            ScriptedTextGenerator::new()
                .respond_with(ENVELOPE)
                .respond_with(r#"{"title":"Pong","description":"Paddles","html":"<html>pong</html>"}"#),
        );
        let handler = fixture.handler();

        handler.handle(&articles_event(), date("20240101")).await.unwrap();
        handler.handle(&articles_event(), date("20240101")).await.unwrap();

        assert_eq!(fixture.repo.row_count(), 1);
        assert_eq!(
            fixture.repo.get("articles", "20240101").unwrap().title.as_deref(),
            Some("Pong")
        );
        assert_eq!(
            fixture.store.body("articles/20240101.html").as_deref(),
            Some("<html>pong</html>")
        );
    }

    // ==================== 旧形式 ====================

    #[tokio::test]
    async fn test_legacy_html_format() {
        let fixture = Fixture::new(
            ScriptedTextGenerator::new()
                .respond_with("Here you go:\n<html><body>legacy</body></html>\nEnjoy!"),
        );
        let event = json!({"bucket": "b", "folder": "game", "prompt": "make a game", "format": "html"});

        fixture
            .handler()
            .handle(&event, date("20240101"))
            .await
            .unwrap();

        let (prompt, _) = &fixture.generator.prompts()[0];
        assert_eq!(prompt, "make a game");
        assert!(fixture.repo.section_limits().is_empty());
        assert_eq!(fixture.store.keys(), vec!["game/20240101.html", "game/index.html"]);
        assert_eq!(
            fixture.store.body("game/index.html").as_deref(),
            Some("<html><body>legacy</body></html>")
        );
        assert_eq!(fixture.repo.put_count(), 0);
    }

    #[tokio::test]
    async fn test_legacy_without_html_document() {
        let fixture = Fixture::new(ScriptedTextGenerator::new().respond_with("Sorry, I can't."));
        let event = json!({"bucket": "b", "folder": "game", "prompt": "p", "format": "html"});

        let result = fixture.handler().handle(&event, date("20240101")).await;

        assert_eq!(result, Err(GenerateHandlerError::Parse(ParseError::HtmlNotFound)));
        assert!(fixture.store.writes().is_empty());
    }

    // ==================== 異常系 ====================

    #[tokio::test]
    async fn test_invalid_json_writes_nothing() {
        let fixture = Fixture::new(ScriptedTextGenerator::new().respond_with("Sure! Here is a story..."));

        let result = fixture
            .handler()
            .handle(&articles_event(), date("20240101"))
            .await;

        assert!(matches!(
            result,
            Err(GenerateHandlerError::Parse(ParseError::InvalidJson(_)))
        ));
        assert!(fixture.store.writes().is_empty());
        assert_eq!(fixture.repo.put_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_envelope_field_writes_nothing() {
        let fixture = Fixture::new(
            ScriptedTextGenerator::new().respond_with(r#"{"title":"Snake","description":"d"}"#),
        );

        let result = fixture
            .handler()
            .handle(&articles_event(), date("20240101"))
            .await;

        assert_eq!(
            result,
            Err(GenerateHandlerError::Parse(ParseError::MissingField("html")))
        );
        assert!(fixture.store.writes().is_empty());
        assert_eq!(fixture.repo.put_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_secret_skips_generation() {
        let mut fixture = Fixture::new(ScriptedTextGenerator::new().respond_with(ENVELOPE));
        fixture.secrets = MockSecretStore::new();

        let result = fixture
            .handler()
            .handle(&articles_event(), date("20240101"))
            .await;

        assert!(matches!(result, Err(GenerateHandlerError::Secret(_))));
        assert!(fixture.generator.prompts().is_empty());
        assert!(fixture.store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_text_generation_error_propagates() {
        let fixture = Fixture::new(ScriptedTextGenerator::new().fail_with(
            TextGeneratorError::HttpError {
                status: 429,
                message: "rate limited".to_string(),
            },
        ));

        let result = fixture
            .handler()
            .handle(&articles_event(), date("20240101"))
            .await;

        assert!(matches!(
            result,
            Err(GenerateHandlerError::TextGeneration(TextGeneratorError::HttpError { status: 429, .. }))
        ));
        assert!(fixture.store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_index_write_failure_leaves_dated_blob_without_record() {
        let fixture = Fixture::new(ScriptedTextGenerator::new().respond_with(ENVELOPE));
        fixture.store.fail_on_key("articles/index.html");

        let result = fixture
            .handler()
            .handle(&articles_event(), date("20240101"))
            .await;

        assert!(matches!(result, Err(GenerateHandlerError::ObjectStore(_))));
        assert_eq!(fixture.store.keys(), vec!["articles/20240101.html"]);
        assert_eq!(fixture.repo.put_count(), 0);
    }

    #[tokio::test]
    async fn test_record_write_failure_after_publish() {
        let fixture = Fixture::new(ScriptedTextGenerator::new().respond_with(ENVELOPE));
        let handler = GenerateHandler::new(
            fixture.secrets.clone(),
            FailingPutRepository,
            fixture.generator.clone(),
            fixture.store.clone(),
            "openai",
        );

        let result = handler.handle(&articles_event(), date("20240101")).await;

        assert_eq!(
            result,
            Err(GenerateHandlerError::Repository(RepositoryError::WriteError(
                "throttled".to_string()
            )))
        );
        assert_eq!(
            fixture.store.keys(),
            vec!["articles/20240101.html", "articles/index.html"]
        );
    }

    #[tokio::test]
    async fn test_invalid_event_touches_nothing() {
        let fixture = Fixture::new(ScriptedTextGenerator::new().respond_with(ENVELOPE));

        let result = fixture
            .handler()
            .handle(&json!({"bucket": "b", "prompt": "p"}), date("20240101"))
            .await;

        assert_eq!(
            result,
            Err(GenerateHandlerError::Event(EventError::MissingField("folder")))
        );
        assert_eq!(fixture.secrets.call_count(), 0);
    }

    /// 読み取りは空、書き込みは常に失敗するリポジトリ
    #[derive(Debug, Default)]
    struct FailingPutRepository;

    #[async_trait::async_trait]
    impl AssetRepository for FailingPutRepository {
        async fn put(&self, _record: &AssetRecord) -> Result<(), RepositoryError> {
            Err(RepositoryError::WriteError("throttled".to_string()))
        }

        async fn recent_by_section(
            &self,
            _section: &str,
            _limit: i32,
        ) -> Result<Vec<AssetRecord>, RepositoryError> {
            Ok(vec![])
        }

        async fn find_by_date(
            &self,
            _date: &PublishDate,
        ) -> Result<Vec<AssetRecord>, RepositoryError> {
            Ok(vec![])
        }
    }
}
