//! Citation anchoring for resolved datasheets
use permit_core::{hash_bytes, EvidenceCitation};

/// Longest quote kept from candidate text
pub const MAX_QUOTE_WORDS: usize = 25;

/// Anchor a datasheet to the query that found it and the bytes downloaded.
pub fn cite(source_url: &str, query: &str, text: Option<&str>, content: &[u8]) -> EvidenceCitation {
    EvidenceCitation {
        source_url: source_url.to_string(),
        query: query.to_string(),
        quote: quote(text.unwrap_or_default()),
        content_hash: hash_bytes(content),
    }
}

pub fn quote(text: &str) -> String {
    text.split_whitespace()
        .take(MAX_QUOTE_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_quote_length(citation: &EvidenceCitation) -> bool {
    citation.quote.split_whitespace().count() <= MAX_QUOTE_WORDS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_is_capped() {
        let text = (1..=40).map(|n| n.to_string()).collect::<Vec<_>>().join(" ");
        let citation = cite("https://a.example/x.pdf", "x datasheet", Some(&text), b"%PDF-1.7");
        assert!(validate_quote_length(&citation));
        assert!(citation.quote.starts_with("1 2 3"));
        assert!(citation.quote.ends_with("25"));
        assert!(citation.content_hash.starts_with("blake3:"));
    }

    #[test]
    fn test_hash_tracks_content_not_quote() {
        let a = cite("u", "q", Some("same"), b"one");
        let b = cite("u", "q", Some("same"), b"two");
        assert_ne!(a.content_hash, b.content_hash);
        assert_eq!(cite("u", "q", None, b"").quote, "");
    }
}
