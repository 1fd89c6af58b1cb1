//! Light cleanup of extracted text before it is sent for translation.
//!
//! Applied exactly once per block, right before the dispatcher hands the text
//! to the translation service. Translated text never goes through here.

use std::sync::LazyLock;

use regex::Regex;

/// Runs of two or more plain spaces. Tabs and newlines are left alone.
#[allow(clippy::expect_used)]
static MULTI_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("static regex is valid"));

/// Normalize extracted text:
/// - `\r\n` and lone `\r` become `\n`
/// - an apostrophe squeezed between two letters is dropped (`medic'ion` -> `medicion`),
///   an artifact of some PDF font encodings
/// - runs of spaces collapse to a single space
pub fn normalize(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = strip_infix_apostrophes(&text);
    MULTI_SPACE.replace_all(&text, " ").into_owned()
}

/// [`normalize`] for optional input; `None` yields an empty string.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// Drop every `'` whose left neighbour (after earlier removals) and right
/// neighbour are both alphabetic. Handles chains like `medic'i'on`.
fn strip_infix_apostrophes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\''
            && out.chars().next_back().is_some_and(char::is_alphabetic)
            && chars.peek().is_some_and(|next| next.is_alphabetic())
        {
            continue;
        }
        out.push(c);
    }

    out
}
