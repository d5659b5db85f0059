//! A UI-free snapshot of the input widget being completed.

/// Text and cursor of the completion target at one instant.
///
/// The cursor is a character index, not a byte index, and is clamped to the
/// text length at construction so slicing helpers never land inside a
/// multi-byte character.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TargetState {
    text: String,
    cursor_position: usize,
}

impl TargetState {
    /// Snapshot with an explicit cursor. Out-of-range cursors clamp to the
    /// end of the text.
    #[must_use]
    pub fn new(text: impl Into<String>, cursor_position: usize) -> Self {
        let text = text.into();
        let cursor_position = cursor_position.min(text.chars().count());
        Self {
            text,
            cursor_position,
        }
    }

    /// Snapshot with the cursor after the last character.
    #[must_use]
    pub fn at_end(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor_position = text.chars().count();
        Self {
            text,
            cursor_position,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in characters.
    #[must_use]
    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    /// Everything before the cursor.
    #[must_use]
    pub fn text_before_cursor(&self) -> &str {
        &self.text[..self.byte_of(self.cursor_position)]
    }

    /// The run of word characters ending at the cursor.
    ///
    /// Word characters are alphanumerics plus `$`, `_` and `-`, the set an
    /// identifier-or-flag token is made of. Used by completion over larger
    /// buffers where only the word being typed is the query.
    #[must_use]
    pub fn word_before_cursor(&self) -> &str {
        let before = self.text_before_cursor();
        let start = before
            .char_indices()
            .rev()
            .take_while(|&(_, c)| is_word_char(c))
            .last()
            .map_or(before.len(), |(byte, _)| byte);
        &before[start..]
    }

    fn byte_of(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(byte, _)| byte)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '$' | '_' | '-')
}
