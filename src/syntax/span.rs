//! Character spans over normalized source

use serde::{Deserialize, Serialize};

/// Half-open character range `[start, end)` into LF-normalized source.
///
/// Offsets count characters, not bytes, so they line up with the positions
/// reported by the cursor and the line-offset cache. Nodes built
/// programmatically carry no span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}
