use catalog_rag::{Metadata, Response};

const RULE_WIDTH: usize = 50;
const EXCERPT_CHARS: usize = 200;

/// First `max_chars` characters of `text`.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn format_metadata(metadata: &Metadata) -> String {
    let pairs: Vec<String> = metadata.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    format!("{{{}}}", pairs.join(", "))
}

/// Lines printed for one answered question.
pub fn render_response(response: &Response, show_sources: bool) -> Vec<String> {
    let rule = "-".repeat(RULE_WIDTH);
    let mut lines = vec![
        String::new(),
        "📝 Response:".to_string(),
        rule.clone(),
        response.answer.clone(),
        rule,
    ];

    if show_sources && !response.source_nodes.is_empty() {
        lines.push(String::new());
        lines.push("📚 Sources:".to_string());
        for (i, node) in response.source_nodes.iter().enumerate() {
            lines.push(String::new());
            lines.push(format!("{}. Score: {:.3}", i + 1, node.score));
            lines.push(format!("   Content: {}...", excerpt(&node.text, EXCERPT_CHARS)));
            if !node.metadata.is_empty() {
                lines.push(format!("   Metadata: {}", format_metadata(&node.metadata)));
            }
        }
    }
    lines
}
