/// ログ基盤モジュール
///
/// CloudWatch向けにJSON形式の構造化ログを出力する。
use std::sync::Once;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// `RUST_LOG`未設定時のフィルター
///
/// AWS SDKとHTTPスタックの内部ログはwarn以上に絞る。
pub const DEFAULT_LOG_DIRECTIVES: &str =
    "info,aws_config=warn,aws_smithy_runtime=warn,aws_smithy_runtime_api=warn,hyper=warn,rustls=warn";

fn env_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// Lambda環境向けのログサブスクライバーを初期化する
///
/// 複数回呼び出しても最初の1回のみ初期化する。
pub fn init_logging() {
    INIT.call_once(|| {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .flatten_event(true)
            .with_current_span(false);

        tracing_subscriber::registry()
            .with(env_filter(DEFAULT_LOG_DIRECTIVES))
            .with(json_layer)
            .init();
    });
}

/// テスト用のログサブスクライバーを初期化する（人間が読みやすい形式）
#[cfg(test)]
pub fn init_test_logging() {
    static TEST_INIT: Once = Once::new();

    TEST_INIT.call_once(|| {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(env_filter("debug"))
            .with(fmt_layer)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_logging_idempotent() {
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_default_directives_parse() {
        let filter = EnvFilter::try_new(DEFAULT_LOG_DIRECTIVES);
        assert!(filter.is_ok());
    }

    #[test]
    fn test_log_with_context() {
        init_test_logging();

        tracing::info!(section = "articles", date = "20240101", "アセット生成開始");
        tracing::debug!(key = "articles/index.html", "オブジェクト書き込み");
    }
}
