/// Single-line editor with a byte cursor that always sits on a char boundary.
#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    text: String,
    cursor: usize,
}

impl LineEditor {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the contents and park the cursor at the end.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    pub fn left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        while self.cursor > 0 && !self.text.is_char_boundary(self.cursor) {
            self.cursor -= 1;
        }
    }

    pub fn right(&mut self) {
        if self.cursor >= self.text.len() {
            return;
        }
        self.cursor += 1;
        while self.cursor < self.text.len() && !self.text.is_char_boundary(self.cursor) {
            self.cursor += 1;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn insert(&mut self, ch: char) {
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let mut prev = self.cursor - 1;
        while prev > 0 && !self.text.is_char_boundary(prev) {
            prev -= 1;
        }
        self.text.drain(prev..self.cursor);
        self.cursor = prev;
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.text.len() {
            return;
        }
        let mut end = self.cursor + 1;
        while end < self.text.len() && !self.text.is_char_boundary(end) {
            end += 1;
        }
        self.text.drain(self.cursor..end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_respect_multibyte_chars() {
        let mut ed = LineEditor::default();
        for ch in "café".chars() {
            ed.insert(ch);
        }
        ed.left();
        assert_eq!(ed.cursor(), 3);
        ed.insert('x');
        assert_eq!(ed.text(), "cafxé");
        ed.delete();
        assert_eq!(ed.text(), "cafx");
        ed.end();
        ed.backspace();
        ed.home();
        ed.delete();
        assert_eq!(ed.text(), "af");
    }

    #[test]
    fn set_and_take_move_the_cursor() {
        let mut ed = LineEditor::default();
        ed.set("dogs");
        assert_eq!(ed.cursor(), 4);
        assert_eq!(ed.take(), "dogs");
        assert_eq!(ed.cursor(), 0);
        ed.backspace();
        ed.left();
        assert_eq!(ed.text(), "");
    }
}
