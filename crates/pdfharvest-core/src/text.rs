//! Cleanup of extracted text.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ASCII_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\x00-\x7F]+").expect("static regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Normalize extracted text: replace non-ASCII runs with spaces, then trim
/// and collapse whitespace runs (including line breaks inserted between text
/// blocks) into single spaces.
pub fn clean_text(raw: &str) -> String {
    let ascii = NON_ASCII_RUN.replace_all(raw, " ");
    WHITESPACE_RUN.replace_all(ascii.trim(), " ").into_owned()
}
