//! Offset based windowing over folder listings.
//!
//! No cursor is held between calls: every page request re-lists the
//! parent prefix and re-applies the offset. Pages are only stable while
//! the backing prefix and its listing order stay unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ConnectorError;

/// Describes the window of a folder's children that has not been emitted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    /// Offset of the first child not yet emitted
    pub offset: usize,
    /// Page size to request the next window with
    pub size: usize,
    /// Number of children beyond the emitted window.
    ///
    /// This is not the folder's total child count: it equals the total
    /// minus `offset`. Hosts wanting the total of the listing add `offset`
    /// back.
    pub remaining: usize,
}

/// The result of applying a window to an ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window<T> {
    pub emitted: Vec<T>,
    pub next_offset: usize,
    pub total: usize,
}

impl<T> Window<T> {
    /// The descriptor for the next page, if anything is left.
    pub fn next_page(&self, size: usize) -> Option<PageDescriptor> {
        (self.next_offset < self.total).then(|| PageDescriptor {
            offset: self.next_offset,
            size,
            remaining: self.total - self.next_offset,
        })
    }
}

/// Emit the items with `offset <= index < offset + size`.
pub fn page<T>(items: Vec<T>, offset: usize, size: usize) -> Window<T> {
    let total = items.len();
    let emitted: Vec<T> = items.into_iter().skip(offset).take(size).collect();
    let next_offset = offset.min(total) + emitted.len();
    Window {
        emitted,
        next_offset,
        total,
    }
}

/// Addresses one page of a folder's children: `parentId#offset#blockSize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageKey {
    pub parent_id: String,
    pub offset: usize,
    pub block_size: usize,
}

impl PageKey {
    pub fn new(parent_id: impl Into<String>, offset: usize, block_size: usize) -> Self {
        Self {
            parent_id: parent_id.into(),
            offset,
            block_size,
        }
    }

    /// The key of the page following a descriptor attached to `parent_id`.
    pub fn from_descriptor(parent_id: impl Into<String>, page: &PageDescriptor) -> Self {
        Self::new(parent_id, page.offset, page.size)
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}#{}", self.parent_id, self.offset, self.block_size)
    }
}

impl FromStr for PageKey {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConnectorError::InvalidPageKey(s.to_string());

        // parent ids may themselves contain '#', so split from the right
        let mut parts = s.rsplitn(3, '#');
        let block_size = parts.next().ok_or_else(invalid)?;
        let offset = parts.next().ok_or_else(invalid)?;
        let parent_id = parts.next().ok_or_else(invalid)?;

        if parent_id.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            parent_id: parent_id.to_string(),
            offset: offset.parse().map_err(|_| invalid())?,
            block_size: block_size.parse().map_err(|_| invalid())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_first_window() {
        let window = page(vec!["a", "b", "c"], 0, 1);
        assert_eq!(window.emitted, vec!["a"]);
        assert_eq!(window.next_offset, 1);
        assert_eq!(window.total, 3);
        assert_eq!(
            window.next_page(1),
            Some(PageDescriptor {
                offset: 1,
                size: 1,
                remaining: 2
            })
        );
    }

    #[test]
    fn test_page_last_window_has_no_descriptor() {
        let window = page(vec!["a", "b", "c"], 2, 5);
        assert_eq!(window.emitted, vec!["c"]);
        assert_eq!(window.next_page(5), None);
    }

    #[test]
    fn test_page_past_the_end() {
        let window = page(vec!["a"], 10, 5);
        assert!(window.emitted.is_empty());
        assert_eq!(window.next_offset, 1);
        assert_eq!(window.next_page(5), None);
    }

    #[test]
    fn test_page_empty() {
        let window: Window<&str> = page(Vec::new(), 0, 20);
        assert!(window.emitted.is_empty());
        assert_eq!(window.next_page(20), None);
    }

    #[test]
    fn test_adjacent_pages_concatenate() {
        let items: Vec<u32> = (0..7).collect();
        for n in 1..5 {
            let first = page(items.clone(), 0, n);
            let second = page(items.clone(), n, n);
            let double = page(items.clone(), 0, 2 * n);

            let mut joined = first.emitted.clone();
            joined.extend(second.emitted);
            assert_eq!(joined, double.emitted, "page size {n}");
        }
    }

    #[test]
    fn test_page_key_round_trip() {
        let key = PageKey::new("/docs", 20, 20);
        assert_eq!(key.to_string(), "/docs#20#20");
        assert_eq!("/docs#20#20".parse::<PageKey>().unwrap(), key);

        let hashed = PageKey::new("/a#b", 1, 2);
        assert_eq!(hashed.to_string().parse::<PageKey>().unwrap(), hashed);
    }

    #[test]
    fn test_page_key_rejects_garbage() {
        assert!("/docs".parse::<PageKey>().is_err());
        assert!("/docs#x#1".parse::<PageKey>().is_err());
        assert!("#1#1".parse::<PageKey>().is_err());
    }
}
