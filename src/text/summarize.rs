use std::sync::OnceLock;

use regex::Regex;

const SENTENCE_SUFFIX: &str = ". ";
const ELLIPSIS: &str = "...";

/// Extractive summary: leading sentences, each followed by ". ", as long as the
/// running length stays within `max_length` characters. Stops at the first
/// sentence that would overflow.
///
/// When no sentence is taken from non-empty input, falls back to the first `max_length`
/// characters cut back to the last whole word, plus "...".
pub fn summarize(text: &str, max_length: usize) -> String {
    static TERMINATOR_RE: OnceLock<Regex> = OnceLock::new();
    let terminators = TERMINATOR_RE.get_or_init(|| Regex::new(r"[.!?]+").unwrap());

    let mut summary = String::new();
    let mut summary_len = 0usize;
    for sentence in terminators.split(text) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }
        let sentence_len = sentence.chars().count();
        if summary_len + sentence_len + SENTENCE_SUFFIX.len() > max_length {
            break;
        }
        summary.push_str(sentence);
        summary.push_str(SENTENCE_SUFFIX);
        summary_len += sentence_len + SENTENCE_SUFFIX.len();
    }

    if summary.is_empty() && !text.is_empty() {
        log::debug!(
            "no sentence fits in {} chars, truncating at a word boundary",
            max_length
        );
        return truncate_at_word(text, max_length);
    }
    summary.trim().to_string()
}

fn truncate_at_word(text: &str, max_length: usize) -> String {
    let head: String = text.chars().take(max_length).collect();
    let kept = match head.rfind(' ') {
        Some(idx) => &head[..idx],
        None => head.as_str(),
    };
    format!("{}{}", kept, ELLIPSIS).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "Climate change is one of the most pressing challenges of our time. \
        Rising temperatures, extreme weather events, and environmental degradation require urgent action! \
        What can we do?";

    #[test]
    fn takes_leading_sentences_that_fit() {
        let summary = summarize(TEXT, 300);
        assert_eq!(
            summary,
            "Climate change is one of the most pressing challenges of our time. \
             Rising temperatures, extreme weather events, and environmental degradation require urgent action. \
             What can we do."
        );
    }

    #[test]
    fn stops_at_first_overflowing_sentence() {
        let summary = summarize(TEXT, 80);
        assert_eq!(
            summary,
            "Climate change is one of the most pressing challenges of our time."
        );
    }

    #[test]
    fn falls_back_to_word_truncation() {
        let summary = summarize(TEXT, 20);
        assert_eq!(summary, "Climate change is...");
    }

    #[test]
    fn fallback_without_spaces_keeps_whole_prefix() {
        assert_eq!(summarize("abcdefghijklmnop", 5), "abcde...");
    }

    #[test]
    fn output_respects_length_bound() {
        for max_length in [1usize, 5, 17, 40, 66, 67, 68, 69, 120, 500] {
            let summary = summarize(TEXT, max_length);
            assert!(
                summary.chars().count() <= max_length + ELLIPSIS.len(),
                "max_length {max_length}: {summary:?}"
            );
        }
    }

    #[test]
    fn empty_blank_and_terminator_only_inputs() {
        assert_eq!(summarize("", 100), "");
        assert_eq!(summarize("...!?", 100), "...!?...");
    }

    #[test]
    fn whitespace_only_input_takes_the_fallback() {
        assert_eq!(summarize("   ", 100), "...");
        assert_eq!(summarize("   \n", 100), "...");
    }

    #[test]
    fn text_without_terminators_is_one_sentence() {
        assert_eq!(summarize("no terminator here", 100), "no terminator here.");
    }
}
