// ABOUTME: In-memory document editor for running actions outside an editor host
// ABOUTME: Tracks a byte-range selection and cursor over a Markdown document

use anyhow::{bail, Result};
use std::ops::Range;

use crate::host::{Cursor, Editor};

#[derive(Debug, Clone)]
pub struct DocumentEditor {
    text: String,
    selection: Range<usize>,
    cursor: Cursor,
}

impl DocumentEditor {
    /// Whole document selected, cursor at the end
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = end_cursor(&text);
        Self {
            selection: 0..text.len(),
            text,
            cursor,
        }
    }

    /// Select lines `first..=last` (1-based), including the final line break
    pub fn select_lines(&mut self, first: usize, last: usize) -> Result<()> {
        if first == 0 || last < first {
            bail!("Invalid line range {}:{}", first, last);
        }

        let starts = line_starts(&self.text);
        if first > starts.len() {
            bail!("Line {} is past the end of the document", first);
        }

        let start = starts[first - 1];
        let end = starts.get(last).copied().unwrap_or(self.text.len());
        self.selection = start..end;
        Ok(())
    }

    pub fn selected_range(&self) -> Range<usize> {
        self.selection.clone()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    fn offset_of(&self, cursor: Cursor) -> usize {
        let starts = line_starts(&self.text);
        let Some(&line_start) = starts.get(cursor.line) else {
            return self.text.len();
        };

        let line_end = starts
            .get(cursor.line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let line = &self.text[line_start..line_end];

        line.char_indices()
            .nth(cursor.ch)
            .map(|(idx, _)| line_start + idx)
            .unwrap_or(line_end)
    }
}

impl Editor for DocumentEditor {
    fn selection(&self) -> String {
        self.text[self.selection.clone()].to_string()
    }

    fn replace_selection(&mut self, text: &str) {
        let start = self.selection.start;
        self.text.replace_range(self.selection.clone(), text);
        self.selection = start..start + text.len();
    }

    fn cursor(&self) -> Cursor {
        self.cursor
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn replace_range(&mut self, text: &str, at: Cursor) {
        let offset = self.offset_of(at);
        self.text.insert_str(offset, text);

        if self.selection.start >= offset {
            self.selection.start += text.len();
        }
        if self.selection.end >= offset {
            self.selection.end += text.len();
        }
    }
}

fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
        .collect()
}

fn end_cursor(text: &str) -> Cursor {
    let line = text.matches('\n').count();
    let ch = text.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0);
    Cursor { line, ch }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_lines() {
        let mut editor = DocumentEditor::new("one\ntwo\nthree\n");
        editor.select_lines(2, 3).unwrap();
        assert_eq!(editor.selection(), "two\nthree\n");

        editor.replace_selection("2\n");
        assert_eq!(editor.text(), "one\n2\n");
        assert_eq!(editor.selection(), "2\n");
    }

    #[test]
    fn test_select_lines_out_of_range() {
        let mut editor = DocumentEditor::new("one");
        assert!(editor.select_lines(0, 1).is_err());
        assert!(editor.select_lines(3, 4).is_err());
    }

    #[test]
    fn test_replace_range_inserts_at_cursor() {
        let mut editor = DocumentEditor::new("héllo\nworld");
        editor.replace_range("X", Cursor { line: 0, ch: 2 });
        assert_eq!(editor.text(), "héXllo\nworld");

        editor.replace_range("!", Cursor { line: 1, ch: 99 });
        assert_eq!(editor.text(), "héXllo\nworld!");
    }

    #[test]
    fn test_new_cursor_at_end() {
        let editor = DocumentEditor::new("a\nbc");
        assert_eq!(editor.cursor(), Cursor { line: 1, ch: 2 });
    }
}
