//! Core types for offset provenance

use serde::{Deserialize, Serialize};

/// A half-open byte-offset range `[start, end)` into some text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Range {
    /// Create a range from start and end byte offsets
    pub fn new(start: usize, end: usize) -> Self {
        Range { start, end }
    }

    /// Length of the range in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when the range covers no bytes
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A location in source text (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// Byte offset from start of source
    pub offset: usize,
    /// Row number (0-indexed)
    pub row: usize,
    /// Column number (0-indexed)
    pub column: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_len() {
        let range = Range::new(3, 10);
        assert_eq!(range.len(), 7);
        assert!(!range.is_empty());
        assert!(Range::new(5, 5).is_empty());
    }

    #[test]
    fn test_location_ordering() {
        let loc1 = Location {
            offset: 0,
            row: 0,
            column: 0,
        };
        let loc2 = Location {
            offset: 5,
            row: 0,
            column: 5,
        };
        let loc3 = Location {
            offset: 10,
            row: 1,
            column: 0,
        };

        assert!(loc1 < loc2);
        assert!(loc2 < loc3);
    }

    #[test]
    fn test_serialization_range() {
        let range = Range::new(0, 50);
        let json = serde_json::to_string(&range).unwrap();
        let deserialized: Range = serde_json::from_str(&json).unwrap();
        assert_eq!(range, deserialized);
    }

    #[test]
    fn test_serialization_location() {
        let loc = Location {
            offset: 100,
            row: 5,
            column: 10,
        };
        let json = serde_json::to_string(&loc).unwrap();
        let deserialized: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(loc, deserialized);
    }
}
