// Domain layer modules
pub mod asset;
pub mod generated_content;
pub mod object_key;
pub mod page;
pub mod prompt;

// Re-exports
pub use asset::{AssetRecord, InvalidDateError, PublishDate, GAME_SECTION};
pub use generated_content::{extract_html, GeneratedContent, ParseError, ResponseFormat};
pub use page::{render_page, PageKind, RenderError};
pub use prompt::{compose_prompt, HISTORY_LIMIT};
