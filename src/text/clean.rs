use std::sync::OnceLock;

use regex::Regex;

/// Strip characters outside word characters, whitespace and `.,!?;:-'"()`,
/// collapse whitespace runs to one space, and trim.
///
/// Stripping runs before collapsing so that removing a symbol between two
/// spaces cannot leave a double space behind; this keeps `clean` idempotent.
pub fn clean(text: &str) -> String {
    static DISALLOWED_RE: OnceLock<Regex> = OnceLock::new();
    static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();
    let disallowed = DISALLOWED_RE.get_or_init(|| Regex::new(r#"[^\w\s.,!?;:\-'"()]"#).unwrap());
    let whitespace = WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").unwrap());

    let stripped = disallowed.replace_all(text, "");
    let collapsed = whitespace.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_and_strips() {
        assert_eq!(
            clean("  Hello,\t\tworld!!  <b>bold</b> #tag\n"),
            "Hello, world!! bboldb tag"
        );
    }

    #[test]
    fn keeps_allowed_punctuation() {
        let s = r#"It's "fine" (really): yes; no - maybe?"#;
        assert_eq!(clean(s), s);
    }

    #[test]
    fn symbol_between_spaces_leaves_single_space() {
        assert_eq!(clean("a @ b"), "a b");
    }

    #[test]
    fn idempotent_on_varied_inputs() {
        let samples = [
            "",
            "   ",
            "a @ b",
            "tabs\tand\nnewlines\r\n",
            "émigré café — naïve ★ text",
            "$$$ 100% @@@ done ...",
            " ( x ) [y] {z} ",
        ];
        for s in samples {
            let once = clean(s);
            assert_eq!(clean(&once), once, "input {s:?}");
        }
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(clean(""), "");
        assert_eq!(clean(" \n\t "), "");
    }
}
