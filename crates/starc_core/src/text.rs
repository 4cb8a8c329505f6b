//! Text counters and normalization helpers.

/// Word and character counts for an editor buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextCounts {
    pub words: usize,
    pub chars: usize,
}

impl TextCounts {
    /// Count words and characters in `text`.
    ///
    /// Words are runs of non-whitespace after trimming; characters are Unicode
    /// scalar values, including whitespace.
    pub fn of(text: &str) -> Self {
        Self {
            words: count_words(text),
            chars: count_chars(text),
        }
    }
}

/// Count whitespace-separated words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Count characters (Unicode scalar values).
pub fn count_chars(text: &str) -> usize {
    text.chars().count()
}

/// Trim an optional string and drop empty values.
///
/// # Returns
/// `None` when the input is missing or whitespace-only; otherwise the trimmed
/// string.
pub fn normalize_optional_nonempty(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Return at most `max_chars` characters of `text`, with `...` appended when
/// anything was cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
