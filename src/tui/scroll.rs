// Selection and scroll state for the history list
//
// The list is selection-driven: the cursor moves, and the scroll offset
// follows so the cursor is always inside [offset, offset + viewport).
//
// Invariants after every public call:
// - selected is in [0, max(0, total - 1)]
// - offset <= selected < offset + viewport (when total > 0 and viewport > 0)

/// Cursor plus scroll offset over a list of `total` rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListWindow {
    /// Index of the highlighted row
    selected: usize,

    /// Index of the first visible row
    offset: usize,

    /// Number of rows in the list
    total: usize,

    /// Number of rows that fit on screen
    viewport: usize,
}

impl ListWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the row count (after a reload), keeping the selection in bounds
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.clamp();
    }

    /// Update the visible height (on resize / each render)
    pub fn set_viewport(&mut self, viewport: usize) {
        self.viewport = viewport;
        self.clamp();
    }

    /// Move the cursor by `delta` rows, clamped to the list
    pub fn move_by(&mut self, delta: isize) {
        let target = if delta < 0 {
            self.selected.saturating_sub(delta.unsigned_abs())
        } else {
            self.selected.saturating_add(delta as usize)
        };
        self.select(target);
    }

    pub fn page_up(&mut self) {
        self.move_by(-(self.page() as isize));
    }

    pub fn page_down(&mut self) {
        self.move_by(self.page() as isize);
    }

    pub fn select_first(&mut self) {
        self.select(0);
    }

    pub fn select_last(&mut self) {
        self.select(self.total.saturating_sub(1));
    }

    /// Put the cursor on `index`, clamped to the list
    pub fn select(&mut self, index: usize) {
        self.selected = index;
        self.clamp();
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn total(&self) -> usize {
        self.total
    }

    #[cfg(test)]
    pub fn viewport(&self) -> usize {
        self.viewport
    }

    /// Rows to draw: (start, end) with end exclusive
    pub fn visible_range(&self) -> (usize, usize) {
        let end = (self.offset + self.viewport).min(self.total);
        (self.offset.min(end), end)
    }

    fn page(&self) -> usize {
        self.viewport.max(1)
    }

    /// Re-establish both invariants
    fn clamp(&mut self) {
        self.selected = self.selected.min(self.total.saturating_sub(1));

        if self.selected < self.offset {
            self.offset = self.selected;
        }
        if self.viewport > 0 && self.selected >= self.offset + self.viewport {
            self.offset = self.selected + 1 - self.viewport;
        }
        self.offset = self.offset.min(self.total.saturating_sub(1));
    }
}
