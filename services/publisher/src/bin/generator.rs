/// Content Generator Lambda
///
/// スケジューラーから `{bucket, folder, prompt}` を受け取り、
/// LLMでコンテンツを生成してバケットとテーブルに保存する。
use lambda_runtime::{service_fn, Error, LambdaEvent};
use publisher::application::GenerateHandler;
use publisher::domain::PublishDate;
use publisher::infrastructure::{
    init_logging, ConfigError, DynamoAssetRepository, OpenAiClient, PublisherConfig,
    S3ObjectStore, SsmSecretStore,
};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{error, info};

type Handler = GenerateHandler<SsmSecretStore, DynamoAssetRepository, OpenAiClient, S3ObjectStore>;

/// warm start時にAWSクライアントとHTTPクライアントを再利用する
static HANDLER: OnceCell<Handler> = OnceCell::const_new();

async fn get_handler() -> Result<&'static Handler, ConfigError> {
    HANDLER
        .get_or_try_init(|| async {
            let config = PublisherConfig::from_env()?;
            let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

            let asset_repo = DynamoAssetRepository::new(
                aws_sdk_dynamodb::Client::new(&sdk_config),
                config.assets_table().to_string(),
                config.date_index().to_string(),
            );

            Ok(GenerateHandler::new(
                SsmSecretStore::from_sdk_config(&sdk_config, config.secret_region()),
                asset_repo,
                OpenAiClient::new(config.api_url(), config.model()),
                S3ObjectStore::new(aws_sdk_s3::Client::new(&sdk_config)),
                config.secret_name(),
            ))
        })
        .await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    let func = service_fn(handler);
    lambda_runtime::run(func).await?;
    Ok(())
}

async fn handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    info!(request_id = %event.context.request_id, "Generator起動");

    let generate_handler = get_handler().await.map_err(|err| {
        error!(error = %err, "設定読み込み失敗");
        err
    })?;

    match generate_handler.handle(&event.payload, PublishDate::today()).await {
        Ok(response) => Ok(serde_json::to_value(response)?),
        Err(err) => {
            error!(error = %err, "コンテンツ生成失敗");
            Err(err.into())
        }
    }
}
