// アプリケーション層モジュール
pub mod event;
pub mod generate_handler;
pub mod render_handler;
pub mod response;

// 再エクスポート
pub use event::{EventError, GenerateRequest, RenderRequest};
pub use generate_handler::{GenerateHandler, GenerateHandlerError};
pub use render_handler::{RenderHandler, RenderHandlerError, SECTION_PAGE_LIMIT};
pub use response::HandlerResponse;
