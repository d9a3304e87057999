use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

const STOP_WORDS: &[&str] = &[
    "that", "this", "with", "from", "have", "been", "were", "will", "would", "could", "should",
    "about", "their", "there",
];

/// Top `top_n` words (4+ ASCII letters, lower-cased, stop words removed) by
/// descending frequency. Ties keep first-occurrence order.
pub fn extract_keywords(text: &str, top_n: usize) -> Vec<String> {
    static WORD_RE: OnceLock<Regex> = OnceLock::new();
    let word_re = WORD_RE.get_or_init(|| Regex::new(r"\b[a-zA-Z]{4,}\b").unwrap());

    let lowered = text.to_lowercase();
    let mut order: Vec<(&str, usize)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for m in word_re.find_iter(&lowered) {
        let word = m.as_str();
        if STOP_WORDS.contains(&word) {
            continue;
        }
        match slots.get(word) {
            Some(&slot) => order[slot].1 += 1,
            None => {
                slots.insert(word, order.len());
                order.push((word, 1));
            }
        }
    }

    // Stable sort: equal counts stay in first-seen order.
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
        .into_iter()
        .take(top_n)
        .map(|(word, _)| word.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_keywords() {
        assert!(extract_keywords("", 10).is_empty());
    }

    #[test]
    fn ranks_by_frequency_then_first_seen() {
        let text = "Rust rust RUST. Tokio async tokio. Serde rocks, serde derive. Async.";
        assert_eq!(
            extract_keywords(text, 10),
            vec!["rust", "tokio", "async", "serde", "rocks", "derive"]
        );
    }

    #[test]
    fn drops_short_words_stop_words_and_digits() {
        let text = "this that with from cat dog 1234 abc4 there their would plastic";
        assert_eq!(extract_keywords(text, 10), vec!["plastic"]);
    }

    #[test]
    fn truncates_to_top_n() {
        let text = "alpha beta gamma delta alpha beta alpha";
        assert_eq!(extract_keywords(text, 2), vec!["alpha", "beta"]);
        assert!(extract_keywords(text, 0).is_empty());
    }
}
