//! Independent datasheet validation
//!
//! A search hit is only a candidate. The reasoning service must answer a
//! strict yes/no question before its URL may be attached to a component.

use permit_core::{Component, SearchHit};

/// Characters of candidate text shown to the validator
const EXCERPT_CHARS: usize = 1500;

pub fn validation_prompt(component: &Component, hit: &SearchHit) -> String {
    let excerpt: String = hit
        .text
        .as_deref()
        .unwrap_or("")
        .chars()
        .take(EXCERPT_CHARS)
        .collect();

    format!(
        "You check whether a web page is the manufacturer datasheet for one specific product.\n\n\
         Product:\n\
         - Manufacturer: {manufacturer}\n\
         - Part number: {part_number}\n\
         - Part name: {part_name}\n\
         - Category: {category}\n\n\
         Candidate:\n\
         - URL: {url}\n\
         - Title: {title}\n\
         - Excerpt: {excerpt}\n\n\
         A catalog, a listing of many products, a store page, a forum post, or a datasheet \
         for a different model does not count.\n\
         Answer with exactly YES or NO.",
        manufacturer = component.manufacturer,
        part_number = component.part_number,
        part_name = component.part_name,
        category = component.category,
        url = hit.url,
        title = hit.title.as_deref().unwrap_or("(none)"),
        excerpt = if excerpt.is_empty() { "(none)" } else { excerpt.as_str() },
    )
}

/// Strict reading of the validator's answer. Anything but a bare "yes" is a no.
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    let answer = answer.strip_suffix('.').unwrap_or(answer).trim();
    answer.eq_ignore_ascii_case("yes")
}
