//! Linear undo/redo history of named image snapshots.
//!
//! The history owns private copies of every image it stores. Adding a new
//! entry while the cursor is not at the end discards the redo branch.
//!
//! ```
//! use imagetoolkit::{EditHistory, PixelBuffer};
//!
//! let mut history = EditHistory::new();
//! history.add(&PixelBuffer::filled(2, 2, [0, 0, 0, 255]).unwrap(), "open");
//! history.add(&PixelBuffer::filled(2, 2, [255, 255, 255, 255]).unwrap(), "invert");
//!
//! let previous = history.undo().unwrap().unwrap();
//! assert_eq!(previous.pixel(0, 0), Some([0, 0, 0, 255]));
//! assert_eq!(history.name().unwrap(), "open");
//! ```

use log::debug;

use crate::buffer::PixelBuffer;
use crate::error::{EngineError, Result};

/// A named snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    name: String,
    image: PixelBuffer,
}

impl HistoryEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &PixelBuffer {
        &self.image
    }
}

/// Undo/redo stack for one editing session.
///
/// Invariant: when non-empty, `cursor < entries.len()` and denotes the
/// current image.
#[derive(Clone, Debug, Default)]
pub struct EditHistory {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Index of the current entry, `None` when empty.
    pub fn cursor(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.cursor)
    }

    /// Store a copy of `image` as the new current entry.
    ///
    /// Entries after the cursor are dropped first.
    pub fn add(&mut self, image: &PixelBuffer, name: impl Into<String>) {
        let name = name.into();
        if !self.is_empty() {
            let discarded = self.entries.len() - self.cursor - 1;
            if discarded > 0 {
                debug!("history: discarding {discarded} redo entries");
            }
            self.entries.truncate(self.cursor + 1);
        }
        debug!("history: add `{name}` ({}x{})", image.width(), image.height());
        self.entries.push(HistoryEntry {
            name,
            image: image.clone(),
        });
        self.cursor = self.entries.len() - 1;
    }

    pub fn can_undo(&self) -> bool {
        !self.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.is_empty() && self.cursor + 1 < self.entries.len()
    }

    /// Step back one entry.
    ///
    /// Returns `Ok(None)` when already at the first entry.
    pub fn undo(&mut self) -> Result<Option<&PixelBuffer>> {
        self.ensure_not_empty()?;
        if !self.can_undo() {
            debug!("history: nothing to undo");
            return Ok(None);
        }
        self.cursor -= 1;
        Ok(Some(&self.entries[self.cursor].image))
    }

    /// Step forward one entry.
    ///
    /// Returns `Ok(None)` when already at the last entry.
    pub fn redo(&mut self) -> Result<Option<&PixelBuffer>> {
        self.ensure_not_empty()?;
        if !self.can_redo() {
            debug!("history: nothing to redo");
            return Ok(None);
        }
        self.cursor += 1;
        Ok(Some(&self.entries[self.cursor].image))
    }

    /// Drop everything but the first entry and make it current.
    ///
    /// This cannot be undone.
    pub fn reset(&mut self) -> Result<&PixelBuffer> {
        self.ensure_not_empty()?;
        debug!("history: reset, dropping {} entries", self.entries.len() - 1);
        self.entries.truncate(1);
        self.cursor = 0;
        Ok(&self.entries[0].image)
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        debug!("history: clear");
        self.entries.clear();
        self.cursor = 0;
    }

    pub fn current(&self) -> Result<&HistoryEntry> {
        self.entries.get(self.cursor).ok_or(EngineError::EmptyHistory)
    }

    pub fn current_image(&self) -> Result<&PixelBuffer> {
        self.current().map(HistoryEntry::image)
    }

    /// Name of the current entry.
    pub fn name(&self) -> Result<&str> {
        self.current().map(HistoryEntry::name)
    }

    /// Most recent entry, regardless of the cursor.
    pub fn top(&self) -> Result<&HistoryEntry> {
        self.entries.last().ok_or(EngineError::EmptyHistory)
    }

    /// Entry names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(HistoryEntry::name)
    }

    fn ensure_not_empty(&self) -> Result<()> {
        if self.is_empty() {
            return Err(EngineError::EmptyHistory);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(v: u8) -> PixelBuffer {
        PixelBuffer::filled(2, 2, [v, v, v, 255]).unwrap()
    }

    fn history_of(values: &[u8]) -> EditHistory {
        let mut history = EditHistory::new();
        for &v in values {
            history.add(&image(v), format!("step {v}"));
        }
        history
    }

    #[test]
    fn test_empty_history_errors() {
        let mut history = EditHistory::new();
        assert!(matches!(history.current(), Err(EngineError::EmptyHistory)));
        assert!(matches!(history.name(), Err(EngineError::EmptyHistory)));
        assert!(matches!(history.undo(), Err(EngineError::EmptyHistory)));
        assert!(matches!(history.redo(), Err(EngineError::EmptyHistory)));
        assert!(matches!(history.reset(), Err(EngineError::EmptyHistory)));
        assert!(matches!(history.top(), Err(EngineError::EmptyHistory)));
        assert_eq!(history.cursor(), None);
    }

    #[test]
    fn test_undo_redo_walk() {
        let mut history = history_of(&[1, 2, 3]);
        assert_eq!(history.undo().unwrap(), Some(&image(2)));
        assert_eq!(history.undo().unwrap(), Some(&image(1)));
        assert_eq!(history.undo().unwrap(), None);
        assert_eq!(history.redo().unwrap(), Some(&image(2)));
        assert_eq!(history.name().unwrap(), "step 2");
        assert_eq!(history.cursor(), Some(1));
    }

    #[test]
    fn test_add_discards_redo_branch() {
        let mut history = history_of(&[1, 2]);
        history.undo().unwrap();
        history.add(&image(4), "step 4");

        assert_eq!(history.len(), 2);
        assert_eq!(history.redo().unwrap(), None);
        assert_eq!(history.current_image().unwrap(), &image(4));
        assert_eq!(history.names().collect::<Vec<_>>(), ["step 1", "step 4"]);
    }

    #[test]
    fn test_reset_keeps_first_entry() {
        let mut history = history_of(&[1, 2, 3]);
        assert_eq!(history.reset().unwrap(), &image(1));
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo().unwrap(), None);
        assert_eq!(history.redo().unwrap(), None);
    }

    #[test]
    fn test_clear_empties() {
        let mut history = history_of(&[1, 2]);
        history.clear();
        assert!(history.is_empty());
        assert!(history.current().is_err());
    }

    #[test]
    fn test_stored_image_is_a_copy() {
        let mut source = image(9);
        let mut history = EditHistory::new();
        history.add(&source, "open");
        source = crate::filters::invert(&source);

        assert_eq!(history.current_image().unwrap(), &image(9));
        assert_ne!(history.current_image().unwrap(), &source);
    }

    #[test]
    fn test_top_ignores_cursor() {
        let mut history = history_of(&[1, 2, 3]);
        history.undo().unwrap();
        assert_eq!(history.top().unwrap().name(), "step 3");
        assert!(history.can_redo());
        assert!(history.can_undo());
    }
}
