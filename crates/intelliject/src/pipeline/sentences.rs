//! Sentence splitting for answer fragments and free-text notes

use unicode_segmentation::UnicodeSegmentation;

/// Split text into trimmed, non-empty sentences
///
/// Uses UAX-29 sentence boundaries, which also break after abbreviations
/// ("Dr. Smith" becomes two sentences). Each piece is still a substring of
/// the input, so highlight matching is unaffected.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.unicode_sentences()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Group sentences into chunks of at most `max_sentences`, joined by spaces
pub fn chunk_by_sentences(text: &str, max_sentences: usize) -> Vec<String> {
    let max_sentences = max_sentences.max(1);
    split_sentences(text)
        .chunks(max_sentences)
        .map(|group| group.join(" "))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("A firewall filters traffic. It uses rules!  Is it stateful?\n");
        assert_eq!(
            sentences,
            vec!["A firewall filters traffic.", "It uses rules!", "Is it stateful?"]
        );
    }

    #[test]
    fn test_abbreviation_pieces_stay_substrings() {
        let text = "Dr. Smith designed the firewall. It blocks ports.";
        let sentences = split_sentences(text);
        assert!(sentences.len() >= 2);
        assert!(sentences.iter().all(|s| text.contains(s.as_str())));
        assert_eq!(sentences.last().unwrap(), "It blocks ports.");
    }

    #[test]
    fn test_split_empty() {
        assert!(split_sentences("   \n ").is_empty());
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn test_chunk_by_sentences() {
        let text = "One. Two. Three. Four. Five. Six. Seven.";
        let chunks = chunk_by_sentences(text, 5);
        assert_eq!(chunks, vec!["One. Two. Three. Four. Five.", "Six. Seven."]);
    }

    #[test]
    fn test_chunk_zero_treated_as_one() {
        assert_eq!(chunk_by_sentences("One. Two.", 0), vec!["One.", "Two."]);
    }
}
