use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::errors::{PatreonixError, PatreonixResult};

/// One page of results plus enough context to request the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of items the creator has, not just on this page.
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn empty(total: u64, page: u64, page_size: u64) -> Self {
        Self {
            items: Vec::new(),
            total,
            page,
            page_size,
            has_more: false,
        }
    }
}

/// Index range covered by `page` (0-based) when `total` items exist.
///
/// Returns `None` when the page starts at or past the end. `page_size` must be
/// non-zero.
pub fn page_window(total: u64, page: u64, page_size: u64) -> PatreonixResult<Option<Range<u64>>> {
    if page_size == 0 {
        return Err(PatreonixError::invalid_input("page_size must be greater than zero"));
    }
    let Some(start) = page.checked_mul(page_size) else {
        return Ok(None);
    };
    if start >= total {
        return Ok(None);
    }
    let end = start.saturating_add(page_size).min(total);
    Ok(Some(start..end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn twenty_five_items_in_pages_of_ten() {
        assert_eq!(page_window(25, 0, 10).unwrap(), Some(0..10));
        assert_eq!(page_window(25, 1, 10).unwrap(), Some(10..20));
        assert_eq!(page_window(25, 2, 10).unwrap(), Some(20..25));
        assert_eq!(page_window(25, 3, 10).unwrap(), None);
    }

    #[test]
    fn zero_page_size_rejected() {
        assert!(page_window(5, 0, 0).is_err());
    }

    #[test]
    fn huge_page_does_not_overflow() {
        assert_eq!(page_window(10, u64::MAX, 2).unwrap(), None);
        assert_eq!(page_window(u64::MAX, 0, u64::MAX).unwrap(), Some(0..u64::MAX));
    }

    proptest! {
        #[test]
        fn windows_tile_the_index_space(total in 0u64..500, size in 1u64..50) {
            let mut seen = 0u64;
            let mut page = 0u64;
            while let Some(r) = page_window(total, page, size).unwrap() {
                prop_assert_eq!(r.start, seen);
                prop_assert!(r.end - r.start <= size);
                seen = r.end;
                page += 1;
            }
            prop_assert_eq!(seen, total);
        }
    }
}
