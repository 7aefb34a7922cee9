/// Page Renderer Lambda
///
/// `{bucket, date?}` を受け取り、ホームページと該当セクションの一覧ページを再生成する。
use lambda_runtime::{service_fn, Error, LambdaEvent};
use publisher::application::RenderHandler;
use publisher::domain::PublishDate;
use publisher::infrastructure::{
    init_logging, ConfigError, DynamoAssetRepository, PublisherConfig, S3ObjectStore,
};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{error, info};

type Handler = RenderHandler<DynamoAssetRepository, S3ObjectStore>;

static HANDLER: OnceCell<Handler> = OnceCell::const_new();

async fn get_handler() -> Result<&'static Handler, ConfigError> {
    HANDLER
        .get_or_try_init(|| async {
            let config = PublisherConfig::from_env()?;
            let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

            Ok(RenderHandler::new(
                DynamoAssetRepository::new(
                    aws_sdk_dynamodb::Client::new(&sdk_config),
                    config.assets_table().to_string(),
                    config.date_index().to_string(),
                ),
                S3ObjectStore::new(aws_sdk_s3::Client::new(&sdk_config)),
            ))
        })
        .await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    let func = service_fn(handler);
    lambda_runtime::run(func).await?;
    Ok(())
}

async fn handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    info!(request_id = %event.context.request_id, "Renderer起動");

    let render_handler = get_handler().await.map_err(|err| {
        error!(error = %err, "設定読み込み失敗");
        err
    })?;

    match render_handler.handle(&event.payload, PublishDate::today()).await {
        Ok(response) => Ok(serde_json::to_value(response)?),
        Err(err) => {
            error!(error = %err, "ページ生成失敗");
            Err(err.into())
        }
    }
}
