//! Text sanitization for noisy social-media style input.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+|www\.\S+").expect("valid URL regex"));

static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(@|u/)[\w_]+").expect("valid mention regex"));

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Zero-width space, injected by copy-paste and some keyboards.
const ZERO_WIDTH_SPACE: char = '\u{200b}';

/// Normalize one text value:
///
/// - URL-like substrings (with or without scheme) become a single space
/// - `@name` / `u/name` mentions become a single space
/// - zero-width spaces are stripped
/// - whitespace runs collapse to one space, then the ends are trimmed
///
/// A missing value normalizes to the empty string; the length filter
/// removes it later.
pub fn clean_text(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    let no_urls = URL_RE.replace_all(raw, " ");
    let no_mentions = MENTION_RE.replace_all(&no_urls, " ");
    let no_zero_width: String = no_mentions
        .chars()
        .filter(|c| *c != ZERO_WIDTH_SPACE)
        .collect();
    WHITESPACE_RE
        .replace_all(&no_zero_width, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_removes_url_mention_and_collapses_whitespace() {
        let raw = "Check this out https://example.com/x @someone  multiple   spaces";
        assert_eq!(clean_text(Some(raw)), "Check this out multiple spaces");
    }

    #[test]
    fn test_removes_schemeless_url() {
        assert_eq!(clean_text(Some("see www.example.org/page now")), "see now");
    }

    #[test]
    fn test_removes_reddit_style_mention() {
        assert_eq!(clean_text(Some("thanks u/some_user for this")), "thanks for this");
    }

    #[test]
    fn test_strips_zero_width_space() {
        assert_eq!(clean_text(Some("စိတ်\u{200b}ပင်ပန်း")), "စိတ်ပင်ပန်း");
    }

    #[test]
    fn test_missing_value_becomes_empty() {
        assert_eq!(clean_text(None), "");
    }

    #[test]
    fn test_trims_and_collapses_only_whitespace_input() {
        assert_eq!(clean_text(Some("   \t \n ")), "");
    }
}
