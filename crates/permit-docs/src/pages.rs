//! Page estimates for stored documents.

use lazy_static::lazy_static;
use regex::bytes::Regex;

/// Lines per printed page for text documents
pub const TEXT_PAGE_LINES: usize = 50;

lazy_static! {
    static ref PDF_PAGE: Regex = Regex::new(r"/Type\s*/Page\b").unwrap();
}

/// Pages in a document, never less than one.
pub fn count_pages(mime: &str, bytes: &[u8]) -> u32 {
    let pages = if mime.starts_with("application/pdf") || bytes.starts_with(b"%PDF") {
        PDF_PAGE.find_iter(bytes).count()
    } else if mime.starts_with("text/") {
        let lines = bytes.split(|b| *b == b'\n').count();
        (lines + TEXT_PAGE_LINES - 1) / TEXT_PAGE_LINES
    } else {
        1
    };
    pages.max(1) as u32
}
