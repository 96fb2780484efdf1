//! Fixed-size slicing of an ordered item list into feed pages.

use serde::Serialize;

/// Feed items per page, process-wide.
pub const POSTS_PER_PAGE: usize = 10;

/// 1-based page number taken from a `?page=` query parameter.
///
/// Anything that does not parse as a positive integer falls back to the
/// first page; numbers past the end are clamped by [`paginate`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub struct PageNumber(usize);

impl PageNumber {
    pub const FIRST: PageNumber = PageNumber(1);

    /// Clamps to the 1-based range; `0` becomes the first page.
    #[must_use]
    pub fn new(number: usize) -> Self {
        PageNumber(number.max(1))
    }

    #[must_use]
    pub fn from_query(raw: Option<&str>) -> Self {
        raw.and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|&number| number >= 1)
            .map_or(Self::FIRST, PageNumber)
    }

    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

/// One page of an ordered sequence plus the metadata a pager needs.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Slices `items` into the requested page of [`POSTS_PER_PAGE`] entries.
///
/// Out-of-range requests clamp to the nearest valid page; an empty input
/// still yields a single empty page.
#[must_use]
pub fn paginate<T>(items: Vec<T>, requested: PageNumber) -> Page<T> {
    let total_pages = items.len().div_ceil(POSTS_PER_PAGE).max(1);
    let number = requested.get().min(total_pages);

    let items = items
        .into_iter()
        .skip((number - 1) * POSTS_PER_PAGE)
        .take(POSTS_PER_PAGE)
        .collect();

    Page {
        items,
        number,
        total_pages,
        has_next: number < total_pages,
        has_previous: number > 1,
    }
}

#[cfg(test)]
mod tests {
    use crate::pagination::{PageNumber, paginate};

    fn thirteen() -> Vec<u32> {
        (0..13).collect()
    }

    #[test]
    fn thirteen_items_split_ten_three() {
        let first = paginate(thirteen(), PageNumber::from_query(Some("1")));
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.number, 1);
        assert_eq!(first.total_pages, 2);
        assert!(first.has_next);
        assert!(!first.has_previous);

        let second = paginate(thirteen(), PageNumber::from_query(Some("2")));
        assert_eq!(second.items, vec![10, 11, 12]);
        assert!(!second.has_next);
        assert!(second.has_previous);
    }

    #[test]
    fn out_of_range_pages_clamp() {
        let below = paginate(thirteen(), PageNumber::from_query(Some("0")));
        assert_eq!(below.number, 1);

        let beyond = paginate(thirteen(), PageNumber::from_query(Some("99")));
        assert_eq!(beyond.number, 2);
        assert_eq!(beyond.items, vec![10, 11, 12]);
    }

    #[test]
    fn garbage_page_input_means_first_page() {
        for raw in [None, Some("abc"), Some("-3"), Some("1.5"), Some("")] {
            assert_eq!(PageNumber::from_query(raw), PageNumber::FIRST);
        }
        assert_eq!(PageNumber::from_query(Some(" 2 ")).get(), 2);
    }

    #[test]
    fn page_number_is_at_least_one() {
        assert_eq!(PageNumber::new(0), PageNumber::FIRST);
        assert_eq!(PageNumber::new(2).get(), 2);
    }

    #[test]
    fn empty_input_is_one_empty_page() {
        let page = paginate(Vec::<u32>::new(), PageNumber::FIRST);
        assert!(page.items.is_empty());
        assert_eq!(page.number, 1);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn order_is_preserved_across_pages() {
        let first = paginate(thirteen(), PageNumber::FIRST);
        assert_eq!(first.items, (0..10).collect::<Vec<_>>());
    }
}
