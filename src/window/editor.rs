use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Text buffer behind a note window. Every mutating call reports whether the
/// buffer actually changed.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    buffer: String,
    cursor: usize,
    preferred_column: Option<usize>,
}

impl EditorState {
    pub fn new(buffer: String) -> Self {
        let cursor = buffer.len();
        Self {
            buffer,
            cursor,
            preferred_column: None,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert_char(&mut self, ch: char) -> bool {
        let mut scratch = [0u8; 4];
        let encoded = ch.encode_utf8(&mut scratch);
        self.buffer.insert_str(self.cursor, encoded);
        self.cursor += encoded.len();
        self.preferred_column = None;
        true
    }

    pub fn insert_newline(&mut self) -> bool {
        self.buffer.insert(self.cursor, '\n');
        self.cursor += 1;
        self.preferred_column = Some(0);
        true
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = prev_grapheme_boundary(&self.buffer, self.cursor);
        self.buffer.drain(prev..self.cursor);
        self.cursor = prev;
        self.preferred_column = None;
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.buffer.len() {
            return false;
        }
        let next = next_grapheme_boundary(&self.buffer, self.cursor);
        if next == self.cursor {
            return false;
        }
        self.buffer.drain(self.cursor..next);
        self.preferred_column = None;
        true
    }

    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor = prev_grapheme_boundary(&self.buffer, self.cursor);
        self.preferred_column = None;
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.cursor >= self.buffer.len() {
            return false;
        }
        let next = next_grapheme_boundary(&self.buffer, self.cursor);
        if next == self.cursor {
            return false;
        }
        self.cursor = next;
        self.preferred_column = None;
        true
    }

    pub fn move_home(&mut self) -> bool {
        let line_start = line_start(&self.buffer, self.cursor);
        if self.cursor == line_start {
            return false;
        }
        self.cursor = line_start;
        self.preferred_column = Some(0);
        true
    }

    pub fn move_end(&mut self) -> bool {
        let line_end = line_end(&self.buffer, self.cursor);
        if self.cursor == line_end {
            return false;
        }
        self.cursor = line_end;
        self.preferred_column = Some(column_at(
            &self.buffer,
            line_start(&self.buffer, self.cursor),
            self.cursor,
        ));
        true
    }

    pub fn move_up(&mut self) -> bool {
        let current_line_start = line_start(&self.buffer, self.cursor);
        let current_column = self
            .preferred_column
            .unwrap_or_else(|| column_at(&self.buffer, current_line_start, self.cursor));
        if current_line_start == 0 {
            if self.cursor == 0 {
                return false;
            }
            self.cursor = 0;
            self.preferred_column = Some(current_column);
            return true;
        }
        let prev_line_start = line_start(&self.buffer, current_line_start - 1);
        let target = position_for_column(&self.buffer, prev_line_start, current_column);
        self.cursor = target;
        self.preferred_column = Some(current_column);
        true
    }

    pub fn move_down(&mut self) -> bool {
        let current_line_start = line_start(&self.buffer, self.cursor);
        let current_column = self
            .preferred_column
            .unwrap_or_else(|| column_at(&self.buffer, current_line_start, self.cursor));
        let current_line_end = line_end(&self.buffer, self.cursor);
        if current_line_end == self.buffer.len() {
            if self.cursor == self.buffer.len() {
                return false;
            }
            self.cursor = self.buffer.len();
            self.preferred_column = Some(current_column);
            return true;
        }
        let target = position_for_column(&self.buffer, current_line_end + 1, current_column);
        self.cursor = target;
        self.preferred_column = Some(current_column);
        true
    }

    pub fn move_word_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let mut idx = self.cursor;
        while idx > 0 {
            let prev = prev_grapheme_boundary(&self.buffer, idx);
            if self.buffer[prev..idx].trim().is_empty() {
                idx = prev;
            } else {
                break;
            }
        }
        while idx > 0 {
            let prev = prev_grapheme_boundary(&self.buffer, idx);
            if self.buffer[prev..idx].trim().is_empty() {
                break;
            }
            idx = prev;
        }
        self.cursor = idx;
        self.preferred_column = None;
        true
    }

    pub fn move_word_right(&mut self) -> bool {
        let len = self.buffer.len();
        if self.cursor >= len {
            return false;
        }
        let mut idx = self.cursor;
        while idx < len {
            let next = next_grapheme_boundary(&self.buffer, idx);
            if self.buffer[idx..next].trim().is_empty() {
                break;
            }
            idx = next;
        }
        while idx < len {
            let next = next_grapheme_boundary(&self.buffer, idx);
            if self.buffer[idx..next].trim().is_empty() {
                idx = next;
            } else {
                break;
            }
        }
        if idx == self.cursor {
            return false;
        }
        self.cursor = idx;
        self.preferred_column = None;
        true
    }

    /// Row and display column of the cursor when the buffer is wrapped at
    /// `width` cells.
    pub fn cursor_position(&self, width: usize) -> (usize, usize) {
        let width = width.max(1);
        let mut row = 0;
        let mut col = 0;
        for grapheme in self.buffer[..self.cursor].graphemes(true) {
            if grapheme == "\n" {
                row += 1;
                col = 0;
                continue;
            }
            let glyph_width = UnicodeWidthStr::width(grapheme);
            if glyph_width > 0 && col + glyph_width > width {
                row += 1;
                col = 0;
            }
            col += glyph_width;
        }
        if col >= width {
            row += 1;
            col = 0;
        }
        (row, col)
    }
}

fn prev_grapheme_boundary(text: &str, cursor: usize) -> usize {
    text[..cursor]
        .grapheme_indices(true)
        .last()
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn next_grapheme_boundary(text: &str, cursor: usize) -> usize {
    if cursor >= text.len() {
        return text.len();
    }
    text[cursor..]
        .graphemes(true)
        .next()
        .map(|grapheme| cursor + grapheme.len())
        .unwrap_or(text.len())
}

fn line_start(text: &str, cursor: usize) -> usize {
    text[..cursor].rfind('\n').map(|idx| idx + 1).unwrap_or(0)
}

fn line_end(text: &str, cursor: usize) -> usize {
    text[cursor..]
        .find('\n')
        .map(|idx| cursor + idx)
        .unwrap_or(text.len())
}

fn column_at(text: &str, line_start: usize, cursor: usize) -> usize {
    text[line_start..cursor].graphemes(true).count()
}

fn position_for_column(text: &str, line_start: usize, column: usize) -> usize {
    let line_end = line_end(text, line_start);
    text[line_start..line_end]
        .grapheme_indices(true)
        .nth(column)
        .map(|(idx, _)| line_start + idx)
        .unwrap_or(line_end)
}

#[cfg(test)]
mod tests {
    use super::EditorState;

    #[test]
    fn typing_and_deleting_respects_graphemes() {
        let mut editor = EditorState::new("cafe\u{301}".to_string());
        assert!(editor.backspace());
        assert_eq!(editor.buffer(), "caf");
        assert!(editor.insert_char('é'));
        assert!(editor.insert_newline());
        assert!(editor.insert_char('x'));
        assert_eq!(editor.buffer(), "café\nx");
        assert!(!editor.delete());
    }

    #[test]
    fn vertical_movement_keeps_preferred_column() {
        let mut editor = EditorState::new("abcdef\nab\nabcdef".to_string());
        assert!(editor.move_up());
        assert_eq!(editor.cursor(), 9); // end of "ab"
        assert!(editor.move_up());
        assert_eq!(editor.cursor(), 6); // column 6 restored on the first line
        assert!(editor.move_down());
        assert!(editor.move_down());
        assert_eq!(editor.cursor(), editor.buffer().len());
        assert!(!editor.move_down());
    }

    #[test]
    fn word_navigation_skips_whitespace() {
        let mut editor = EditorState::new("alpha  beta".to_string());
        assert!(editor.move_word_left());
        assert_eq!(editor.cursor(), 7);
        assert!(editor.move_word_left());
        assert_eq!(editor.cursor(), 0);
        assert!(editor.move_word_right());
        assert_eq!(editor.cursor(), 7);
    }

    #[test]
    fn home_end_stay_on_line() {
        let mut editor = EditorState::new("one\ntwo".to_string());
        assert!(editor.move_home());
        assert_eq!(editor.cursor(), 4);
        assert!(!editor.move_home());
        assert!(editor.move_end());
        assert_eq!(editor.cursor(), 7);
    }

    #[test]
    fn cursor_position_wraps_long_lines() {
        let editor = EditorState::new("abcdefgh\nxy".to_string());
        assert_eq!(editor.cursor_position(5), (2, 2));
        let editor = EditorState::new("abcde".to_string());
        assert_eq!(editor.cursor_position(5), (1, 0));
    }
}
