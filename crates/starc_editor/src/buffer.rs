//! Editor text buffer with live word/character counters.

use starc_core::text::TextCounts;

/// Which counter the status line shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountMode {
    #[default]
    Words,
    Characters,
}

/// Text being edited plus counters that are recomputed on every change.
#[derive(Debug, Clone, Default)]
pub struct EditorBuffer {
    text: String,
    counts: TextCounts,
    mode: CountMode,
    revision: u64,
}

impl EditorBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            counts: TextCounts::of(&text),
            text,
            mode: CountMode::default(),
            revision: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the buffer contents.
    ///
    /// # Returns
    /// `true` when the text actually changed.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text == self.text {
            return false;
        }
        self.counts = TextCounts::of(&text);
        self.text = text;
        self.revision = self.revision.wrapping_add(1);
        true
    }

    pub fn counts(&self) -> TextCounts {
        self.counts
    }

    /// Monotonic change counter; bumps once per effective edit.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn count_mode(&self) -> CountMode {
        self.mode
    }

    pub fn toggle_count_mode(&mut self) -> CountMode {
        self.mode = match self.mode {
            CountMode::Words => CountMode::Characters,
            CountMode::Characters => CountMode::Words,
        };
        self.mode
    }

    /// Counter text for the status line, e.g. `2 words` or `11 characters`.
    pub fn count_label(&self) -> String {
        let (count, noun) = match self.mode {
            CountMode::Words => (self.counts.words, "word"),
            CountMode::Characters => (self.counts.chars, "character"),
        };
        if count == 1 {
            format!("1 {}", noun)
        } else {
            format!("{} {}s", count, noun)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CountMode, EditorBuffer};

    #[test]
    fn counters_follow_every_change() {
        let mut buffer = EditorBuffer::default();
        assert_eq!(buffer.counts().words, 0);
        assert_eq!(buffer.counts().chars, 0);

        assert!(buffer.set_text("hello world"));
        assert_eq!(buffer.counts().words, 2);
        assert_eq!(buffer.counts().chars, 11);

        assert!(buffer.set_text("  spaced   out\nlines "));
        assert_eq!(buffer.counts().words, 3);
    }

    #[test]
    fn unchanged_text_keeps_revision() {
        let mut buffer = EditorBuffer::new("same");
        let before = buffer.revision();
        assert!(!buffer.set_text("same"));
        assert_eq!(buffer.revision(), before);
        assert!(buffer.set_text("different"));
        assert_eq!(buffer.revision(), before + 1);
    }

    #[test]
    fn count_label_respects_mode_and_plurals() {
        let mut buffer = EditorBuffer::new("hello world");
        assert_eq!(buffer.count_label(), "2 words");
        assert_eq!(buffer.toggle_count_mode(), CountMode::Characters);
        assert_eq!(buffer.count_label(), "11 characters");
        buffer.set_text("a");
        assert_eq!(buffer.count_label(), "1 character");
    }
}
