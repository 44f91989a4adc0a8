//! Offset/rows pagination.

use std::ops::Range;

/// A page request: skip `offset` items, then take at most `rows`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Page {
    offset: usize,
    rows: Option<usize>,
}

impl Page {
    /// Creates a page. `rows == 0` means "no row limit".
    pub const fn new(offset: usize, rows: usize) -> Self {
        Self {
            offset,
            rows: if rows == 0 { None } else { Some(rows) },
        }
    }

    /// Everything, from the first item on.
    pub const fn unpaged() -> Self {
        Self {
            offset: 0,
            rows: None,
        }
    }

    /// Number of items to skip.
    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Row limit, `None` when unbounded.
    #[inline]
    pub const fn limit(&self) -> Option<usize> {
        self.rows
    }

    /// Index range selected from a list of `len` items.
    ///
    /// `None` when the list is shorter than the offset.
    pub fn window(&self, len: usize) -> Option<Range<usize>> {
        if len < self.offset {
            return None;
        }
        let end = match self.rows {
            Some(rows) => self.offset.saturating_add(rows).min(len),
            None => len,
        };
        Some(self.offset..end)
    }

    /// Applies the window to a vector, dropping everything outside of it.
    pub fn apply<T>(&self, mut items: Vec<T>) -> Vec<T> {
        match self.window(items.len()) {
            Some(range) => {
                items.truncate(range.end);
                items.drain(..range.start);
                items
            }
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_inside() {
        assert_eq!(Page::new(3, 4).window(10), Some(3..7));
    }

    #[test]
    fn test_window_clamped_to_len() {
        assert_eq!(Page::new(8, 4).window(10), Some(8..10));
    }

    #[test]
    fn test_window_beyond_len() {
        assert_eq!(Page::new(12, 4).window(10), None);
        assert_eq!(Page::new(10, 4).window(10), Some(10..10));
    }

    #[test]
    fn test_zero_rows_is_unbounded() {
        assert_eq!(Page::new(2, 0).limit(), None);
        assert_eq!(Page::new(2, 0).window(5), Some(2..5));
    }

    #[test]
    fn test_apply() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(Page::new(3, 4).apply(items.clone()), vec![3, 4, 5, 6]);
        assert!(Page::new(12, 4).apply(items).is_empty());
    }
}
