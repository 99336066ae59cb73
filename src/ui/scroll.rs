use std::ops::Range;

/// Cursor and scroll offset over a list taller than the viewport.
///
/// `cursor` is relative to the first visible row; the selected index is
/// `scroll + cursor`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    cursor: usize,
    scroll: usize,
    total: usize,
    height: usize,
}

impl ScrollState {
    pub fn new(height: usize) -> Self {
        Self {
            height,
            ..Self::default()
        }
    }

    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.clamp();
    }

    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        self.clamp();
    }

    pub fn selected(&self) -> Option<usize> {
        let index = self.scroll + self.cursor;
        (index < self.total).then_some(index)
    }

    pub fn cursor_row(&self) -> usize {
        self.cursor
    }

    pub fn visible(&self) -> Range<usize> {
        self.scroll..(self.scroll + self.height).min(self.total)
    }

    pub fn move_down(&mut self) {
        if self.cursor == self.max_cursor() {
            if self.scroll == self.max_scroll() {
                self.cursor = 0;
                self.scroll = 0;
            } else {
                self.scroll_by(1);
            }
        } else {
            self.cursor += 1;
            self.clamp();
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        } else if self.scroll > 0 {
            self.scroll_by(-1);
        } else {
            // Wrap to the last row.
            self.scroll = usize::MAX;
            self.cursor = usize::MAX;
            self.clamp();
        }
    }

    pub fn page_down(&mut self) {
        self.scroll_by(self.height as isize);
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-(self.height as isize));
    }

    /// Home and End scroll by the whole list; the cursor row is kept.
    pub fn home(&mut self) {
        self.scroll_by(-(self.total as isize));
    }

    pub fn end(&mut self) {
        self.scroll_by(self.total as isize);
    }

    fn scroll_by(&mut self, lines: isize) {
        self.scroll = if lines < 0 {
            self.scroll.saturating_sub(lines.unsigned_abs())
        } else {
            self.scroll.saturating_add(lines as usize)
        };
        self.clamp();
    }

    fn max_scroll(&self) -> usize {
        self.total.saturating_sub(self.height)
    }

    fn max_cursor(&self) -> usize {
        self.total
            .saturating_sub(self.scroll + 1)
            .min(self.height.saturating_sub(1))
    }

    fn clamp(&mut self) {
        self.scroll = self.scroll.min(self.max_scroll());
        self.cursor = self.cursor.min(self.max_cursor());
    }
}
