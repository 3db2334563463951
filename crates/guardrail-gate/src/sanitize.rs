//! User content sanitization.

use std::borrow::Cow;

/// Characters removed from user content before it reaches an agent.
pub const INJECTION_CHARS: [char; 11] = ['<', '>', '{', '}', '|', '\\', '^', '~', '[', ']', '`'];

/// Maximum length of a user item, in characters.
pub const MAX_USER_ITEM_CHARS: usize = 500;

/// Remove every injection character.
#[must_use]
pub fn strip_injection_chars(input: &str) -> Cow<'_, str> {
    if input.contains(&INJECTION_CHARS[..]) {
        Cow::Owned(input.chars().filter(|c| !INJECTION_CHARS.contains(c)).collect())
    } else {
        Cow::Borrowed(input)
    }
}

/// Keep at most `max` characters.
#[must_use]
pub fn truncate_chars(input: &str, max: usize) -> Cow<'_, str> {
    match input.char_indices().nth(max) {
        Some((byte_idx, _)) => Cow::Borrowed(&input[..byte_idx]),
        None => Cow::Borrowed(input),
    }
}

/// Strip injection characters, then cap the length.
///
/// Applying it twice gives the same result as applying it once.
#[must_use]
pub fn sanitize_user_content(input: &str) -> String {
    let stripped = strip_injection_chars(input);
    truncate_chars(&stripped, MAX_USER_ITEM_CHARS).into_owned()
}
