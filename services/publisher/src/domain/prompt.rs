/// Prompt composition for the content generator
use crate::domain::AssetRecord;

/// Number of recent assets fed back into the prompt to avoid repetition
pub const HISTORY_LIMIT: i32 = 50;

const HISTORY_HEADER: &str =
    "The following items were already published in this section. Do not repeat their topics:";

const JSON_INSTRUCTION: &str = "Respond only with a JSON object containing exactly three string fields: \
\"title\" (a short human-readable name), \
\"description\" (a one-paragraph summary) and \
\"html\" (the complete HTML document).";

/// Build the prompt sent to the text-generation API
///
/// `history` is expected newest-first; it is listed in that order.
/// An empty history adds no avoidance section.
pub fn compose_prompt(base_prompt: &str, history: &[AssetRecord]) -> String {
    let mut prompt = base_prompt.to_string();

    let lines: Vec<String> = history.iter().filter_map(history_line).collect();
    if !lines.is_empty() {
        prompt.push_str("\n\n");
        prompt.push_str(HISTORY_HEADER);
        for line in lines {
            prompt.push_str("\n- ");
            prompt.push_str(&line);
        }
    }

    prompt.push_str("\n\n");
    prompt.push_str(JSON_INSTRUCTION);
    prompt
}

fn history_line(record: &AssetRecord) -> Option<String> {
    match (record.title.as_deref(), record.description.as_deref()) {
        (Some(title), Some(description)) => Some(format!("{}: {}", title, description)),
        (Some(title), None) => Some(title.to_string()),
        (None, Some(description)) => Some(description.to_string()),
        (None, None) => None,
    }
}
