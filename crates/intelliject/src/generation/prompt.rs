//! Prompt templates for subtopic inference and answer extraction

use regex::Regex;
use std::sync::OnceLock;

/// Prompt builder for the matching pipeline
pub struct PromptBuilder;

impl PromptBuilder {
    /// Ask for a 2-3 word subtopic label for a chunk of notes
    pub fn subtopic_prompt(text: &str) -> String {
        format!(
            "Read the following academic content and suggest the most relevant subtopic \
             (like 'Firewall', 'Water Pollution', etc.) in 2-3 words:\n\n{text}\n\nSubtopic:",
            text = text
        )
    }

    /// Ask for the verbatim sentence(s) of the notes that answer a question
    pub fn answer_extraction_prompt(chunk: &str, question: &str) -> String {
        format!(
            r#"
Given the following notes and a question, extract the exact sentence(s) from the notes that directly answer the question if possible. Only return the excerpt(s), not any explanation.

Notes:
"""{chunk}"""

Question:
"""{question}"""

Answer/excerpt:
"#,
            chunk = chunk,
            question = question
        )
    }
}

fn label_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*(sub\s*-?\s*topic)\s*:\s*").expect("Invalid regex"))
}

/// Normalise a model-generated subtopic; `None` when nothing usable remains
pub fn clean_subtopic(raw: &str) -> Option<String> {
    let first_line = raw.trim().lines().next().unwrap_or("");
    let without_label = label_prefix().replace(first_line, "");
    let cleaned = without_label
        .trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '`' | '*'))
        .trim_end_matches('.')
        .trim();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Normalise an extracted answer excerpt
pub fn clean_answer(raw: &str) -> String {
    raw.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtopic_prompt_contains_text() {
        let prompt = PromptBuilder::subtopic_prompt("A firewall filters packets.");
        assert!(prompt.contains("A firewall filters packets."));
        assert!(prompt.contains("in 2-3 words"));
        assert!(prompt.ends_with("Subtopic:"));
    }

    #[test]
    fn test_answer_prompt_quotes_inputs() {
        let prompt = PromptBuilder::answer_extraction_prompt("Notes body.", "What is X?");
        assert!(prompt.contains("\"\"\"Notes body.\"\"\""));
        assert!(prompt.contains("\"\"\"What is X?\"\"\""));
        assert!(prompt.trim_end().ends_with("Answer/excerpt:"));
    }

    #[test]
    fn test_clean_subtopic() {
        assert_eq!(clean_subtopic("  Firewall Rules \n"), Some("Firewall Rules".to_string()));
        assert_eq!(clean_subtopic("Subtopic: \"Water Pollution\""), Some("Water Pollution".to_string()));
        assert_eq!(clean_subtopic("sub-topic: Network Security."), Some("Network Security".to_string()));
        assert_eq!(clean_subtopic("   "), None);
        assert_eq!(clean_subtopic("\"\""), None);
    }

    #[test]
    fn test_clean_answer() {
        assert_eq!(clean_answer("\n  A firewall filters traffic.  "), "A firewall filters traffic.");
    }
}
