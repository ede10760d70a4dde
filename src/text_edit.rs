//! Single-line editing buffer shared by the cell editor and the command
//! palette. Offsets are UTF-8 byte offsets into `text`; the platform input
//! handler speaks UTF-16, so conversions live here too.

use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditBuffer {
    text: String,
    selected: Range<usize>,
    reversed: bool,
    marked: Option<Range<usize>>,
}

impl EditBuffer {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selected_range(&self) -> Range<usize> {
        self.selected.clone()
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn marked_range(&self) -> Option<Range<usize>> {
        self.marked.clone()
    }

    pub fn unmark(&mut self) {
        self.marked = None;
    }

    /// Replace everything and put the cursor at the end
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        let end = self.text.len();
        self.selected = end..end;
        self.reversed = false;
        self.marked = None;
    }

    pub fn cursor(&self) -> usize {
        if self.reversed {
            self.selected.start
        } else {
            self.selected.end
        }
    }

    pub fn selected_text(&self) -> &str {
        &self.text[self.selected.clone()]
    }

    pub fn move_to(&mut self, offset: usize) {
        let offset = offset.min(self.text.len());
        self.selected = offset..offset;
        self.reversed = false;
    }

    pub fn select_to(&mut self, offset: usize) {
        let offset = offset.min(self.text.len());
        if self.reversed {
            self.selected.start = offset;
        } else {
            self.selected.end = offset;
        }
        if self.selected.end < self.selected.start {
            self.reversed = !self.reversed;
            self.selected = self.selected.end..self.selected.start;
        }
    }

    pub fn select_all(&mut self) {
        self.selected = 0..self.text.len();
        self.reversed = false;
    }

    pub fn move_left(&mut self) {
        if self.selected.is_empty() {
            self.move_to(self.previous_boundary(self.cursor()));
        } else {
            self.move_to(self.selected.start);
        }
    }

    pub fn move_right(&mut self) {
        if self.selected.is_empty() {
            self.move_to(self.next_boundary(self.cursor()));
        } else {
            self.move_to(self.selected.end);
        }
    }

    /// Delete the selection, or the grapheme before the cursor
    pub fn backspace(&mut self) {
        if self.selected.is_empty() {
            self.select_to(self.previous_boundary(self.cursor()));
        }
        self.replace(None, "");
    }

    /// Delete the selection, or the grapheme after the cursor
    pub fn delete(&mut self) {
        if self.selected.is_empty() {
            self.select_to(self.next_boundary(self.cursor()));
        }
        self.replace(None, "");
    }

    /// Replace `range` (or the marked text, or the selection) with `new_text`
    pub fn replace(&mut self, range: Option<Range<usize>>, new_text: &str) {
        let range = range
            .or_else(|| self.marked.clone())
            .unwrap_or_else(|| self.selected.clone());
        self.text.replace_range(range.clone(), new_text);
        let end = range.start + new_text.len();
        self.selected = end..end;
        self.reversed = false;
        self.marked = None;
    }

    /// IME composition: replace and keep the new text marked
    pub fn replace_and_mark(
        &mut self,
        range: Option<Range<usize>>,
        new_text: &str,
        new_selected: Option<Range<usize>>,
    ) {
        let range = range
            .or_else(|| self.marked.clone())
            .unwrap_or_else(|| self.selected.clone());
        self.text.replace_range(range.clone(), new_text);
        self.marked = Some(range.start..range.start + new_text.len());
        self.selected = match new_selected {
            Some(sel) => range.start + sel.start..range.start + sel.end,
            None => {
                let end = range.start + new_text.len();
                end..end
            }
        };
        self.reversed = false;
    }

    pub fn previous_boundary(&self, offset: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .rev()
            .find_map(|(idx, _)| (idx < offset).then_some(idx))
            .unwrap_or(0)
    }

    pub fn next_boundary(&self, offset: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .find_map(|(idx, _)| (idx > offset).then_some(idx))
            .unwrap_or(self.text.len())
    }

    pub fn offset_from_utf16(&self, offset: usize) -> usize {
        let mut utf8 = 0;
        let mut utf16 = 0;
        for ch in self.text.chars() {
            if utf16 >= offset {
                break;
            }
            utf16 += ch.len_utf16();
            utf8 += ch.len_utf8();
        }
        utf8
    }

    pub fn offset_to_utf16(&self, offset: usize) -> usize {
        self.text[..offset.min(self.text.len())]
            .chars()
            .map(char::len_utf16)
            .sum()
    }

    pub fn range_from_utf16(&self, range: &Range<usize>) -> Range<usize> {
        self.offset_from_utf16(range.start)..self.offset_from_utf16(range.end)
    }

    pub fn range_to_utf16(&self, range: &Range<usize>) -> Range<usize> {
        self.offset_to_utf16(range.start)..self.offset_to_utf16(range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> EditBuffer {
        let mut b = EditBuffer::default();
        b.set_text(text);
        b
    }

    #[test]
    fn typing_replaces_selection() {
        let mut b = buffer("aa:bb");
        b.move_to(2);
        b.select_to(5);
        assert_eq!(b.selected_text(), ":bb");

        b.replace(None, "-cc");
        assert_eq!(b.text(), "aa-cc");
        assert_eq!(b.cursor(), 5);
    }

    #[test]
    fn selecting_backwards_flips_direction() {
        let mut b = buffer("serial");
        b.move_to(3);
        b.select_to(1);
        assert!(b.is_reversed());
        assert_eq!(b.selected_range(), 1..3);
        assert_eq!(b.cursor(), 1);
    }

    #[test]
    fn backspace_and_delete_respect_graphemes() {
        let mut b = buffer("e\u{301}x");
        b.move_to(b.text().len() - 1);
        b.backspace();
        assert_eq!(b.text(), "x");

        let mut b = buffer("ab");
        b.move_to(0);
        b.delete();
        assert_eq!(b.text(), "b");
        b.move_left();
        b.move_right();
        assert_eq!(b.cursor(), 1);
    }

    #[test]
    fn utf16_offsets_convert_both_ways() {
        let b = buffer("a😀b");
        assert_eq!(b.offset_to_utf16(5), 3);
        assert_eq!(b.offset_from_utf16(3), 5);
        assert_eq!(b.range_to_utf16(&(0..6)), 0..4);
        assert_eq!(b.range_from_utf16(&(1..3)), 1..5);
    }

    #[test]
    fn marked_text_is_replaced_by_next_input() {
        let mut b = buffer("id ");
        b.replace_and_mark(None, "ka", None);
        assert_eq!(b.marked_range(), Some(3..5));

        b.replace(None, "カ");
        assert_eq!(b.text(), "id カ");
        assert_eq!(b.marked_range(), None);
    }
}
