//! Announcement texts.

use super::CommentBook;
use crate::verdict::{ExpectedItems, Verdict};

/// Sorting instructions for a freshly classified item.
pub fn instructions(expected: &ExpectedItems) -> String {
    let parts: Vec<String> = expected
        .iter()
        .map(|item| format!("the {} goes in {}", item.display_name, item.expected_bin))
        .collect();

    match parts.as_slice() {
        [] => "I couldn't find anything to sort.".to_string(),
        [only] => format!("Please sort your item: {}.", only),
        [rest @ .., last] => format!("Please sort your item: {} and {}.", rest.join(", "), last),
    }
}

/// Verdict announcement, prefixed with a comment from `comments`.
pub fn verdict_message(verdict: &Verdict, comments: &CommentBook) -> String {
    let comment = comments.pick(verdict.correctness);
    let body = if !verdict.is_identified() {
        format!("I couldn't tell what went into {}.", verdict.bin_name)
    } else if verdict.is_correct() {
        format!("The {} goes in {}.", verdict.item, verdict.bin_name)
    } else if let Some(expected) = &verdict.expected_bin {
        format!(
            "The {} belongs in {}, not {}.",
            verdict.item, expected, verdict.bin_name
        )
    } else {
        format!("The {} was not part of your item.", verdict.item)
    };

    if comment.is_empty() {
        body
    } else {
        format!("{} {}", comment, body)
    }
}
