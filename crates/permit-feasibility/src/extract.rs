//! Parsing of free-text reasoning responses.

use lazy_static::lazy_static;
use regex::Regex;

/// Items kept from a bulleted response
pub const MAX_ITEMS: usize = 5;

lazy_static! {
    static ref SCORE: Regex = Regex::new(r"\d{1,3}").unwrap();
    static ref BULLET: Regex = Regex::new(r"^\s*(?:[-*•–]|\d{1,2}[.)])\s+(.*\S)\s*$").unwrap();
    static ref NO_ISSUES: Regex =
        Regex::new(r"(?i)\bno\s+(?:significant\s+|major\s+|critical\s+|obvious\s+)?issues\b").unwrap();
}

/// First 1-3 digit integer in the text, clamped to 100.
pub fn extract_score(text: &str) -> Option<u8> {
    SCORE
        .find(text)
        .and_then(|m| m.as_str().parse::<u16>().ok())
        .map(|n| n.min(100) as u8)
}

/// Bulleted lines, marker stripped, at most `MAX_ITEMS`.
pub fn extract_bullets(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| BULLET.captures(line))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .take(MAX_ITEMS)
        .collect()
}

/// Issue list, empty when the response states there are none.
pub fn extract_issues(text: &str) -> Vec<String> {
    if NO_ISSUES.is_match(text) {
        return Vec::new();
    }
    extract_bullets(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_integer_wins() {
        assert_eq!(extract_score("Score: 82/100"), Some(82));
        assert_eq!(extract_score("I'd say 7 out of 10"), Some(7));
        assert_eq!(extract_score("0"), Some(0));
    }

    #[test]
    fn test_score_bounded() {
        assert_eq!(extract_score("999"), Some(100));
        assert_eq!(extract_score("1234"), Some(100));
        assert_eq!(extract_score("looks fine"), None);
    }

    #[test]
    fn test_bullets_stripped_and_capped() {
        let text = "Issues found:\n- Undersized conductor\n* Missing rapid shutdown\n• String too long\n1. No label\n2) Setback\n- Sixth item";
        let items = extract_bullets(text);
        assert_eq!(items.len(), 5);
        assert_eq!(items[0], "Undersized conductor");
        assert_eq!(items[2], "String too long");
        assert_eq!(items[4], "Setback");
    }

    #[test]
    fn test_no_issues_phrase() {
        assert!(extract_issues("No significant issues found.\n- but check labels").is_empty());
        assert!(extract_issues("There are no issues with this design").is_empty());
        assert_eq!(extract_issues("- Roof age unknown").len(), 1);
    }
}
