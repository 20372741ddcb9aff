//! Fixed-size paging with wraparound navigation.
//!
//! Each displayed collection owns its own [`Paginator`]; nothing here is
//! shared. Page counts are derived from the current items and page size on
//! every call, so they can never disagree with what is rendered.

pub mod card;

pub use card::{chunk_by_category, group_by_category, Card, CardPaginator, CategoryGroup, UNCATEGORIZED};

/// One rendered page
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    /// Zero-based
    pub index: usize,
    pub total_pages: usize,
    pub items: &'a [T],
}

impl<T> Page<'_, T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 1-based label, "0 / 0" for an empty collection
    pub fn label(&self) -> String {
        if self.total_pages == 0 {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.index + 1, self.total_pages)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Paginator<T> {
    items: Vec<T>,
    page_size: usize,
    page_index: usize,
}

impl<T> Paginator<T> {
    /// A zero page size is treated as one
    pub fn new(items: Vec<T>, page_size: usize) -> Self {
        Self {
            items,
            page_size: page_size.max(1),
            page_index: 0,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// `ceil(len / page_size)`; zero when there is nothing to show
    pub fn total_pages(&self) -> usize {
        self.items.len().div_ceil(self.page_size)
    }

    /// Navigation is disabled when there is at most one page
    pub fn can_navigate(&self) -> bool {
        self.total_pages() > 1
    }

    pub fn current_page(&self) -> Page<'_, T> {
        let start = (self.page_index * self.page_size).min(self.items.len());
        let end = (start + self.page_size).min(self.items.len());
        Page {
            index: self.page_index,
            total_pages: self.total_pages(),
            items: &self.items[start..end],
        }
    }

    /// Advance with wraparound. Returns false (and does nothing) when disabled.
    pub fn next(&mut self) -> bool {
        let total = self.total_pages();
        if total <= 1 {
            return false;
        }
        self.page_index = (self.page_index + 1) % total;
        true
    }

    pub fn prev(&mut self) -> bool {
        let total = self.total_pages();
        if total <= 1 {
            return false;
        }
        self.page_index = (self.page_index + total - 1) % total;
        true
    }

    /// Go to page `index`; out-of-range indices are ignored
    pub fn jump(&mut self, index: usize) -> bool {
        if index < self.total_pages() {
            self.page_index = index;
            true
        } else {
            false
        }
    }

    /// Replace the collection, keeping the page index when it is still valid
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.clamp();
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.clamp();
    }

    fn clamp(&mut self) {
        let total = self.total_pages();
        if self.page_index >= total {
            self.page_index = total.saturating_sub(1);
        }
    }
}

impl<T> Default for Paginator<T> {
    fn default() -> Self {
        Self::new(Vec::new(), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seven() -> Paginator<u32> {
        Paginator::new((1..=7).collect(), 3)
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(seven().total_pages(), 3);
        assert_eq!(Paginator::new(vec![1, 2, 3, 4, 5, 6], 3).total_pages(), 2);
        assert_eq!(Paginator::<u32>::new(vec![], 3).total_pages(), 0);
    }

    #[test]
    fn next_wraps_to_first_page() {
        let mut p = seven();
        assert!(p.next());
        assert!(p.next());
        assert_eq!(p.current_page().items, &[7]);
        assert!(p.next());
        assert_eq!(p.page_index(), 0);
        assert_eq!(p.current_page().items, &[1, 2, 3]);
    }

    #[test]
    fn prev_from_first_lands_on_last() {
        let mut p = seven();
        assert!(p.prev());
        assert_eq!(p.page_index(), 2);
        assert_eq!(p.current_page().label(), "3 / 3");
    }

    #[test]
    fn jump_ignores_out_of_range() {
        let mut p = seven();
        assert!(p.jump(1));
        assert_eq!(p.current_page().items, &[4, 5, 6]);
        assert!(!p.jump(3));
        assert_eq!(p.page_index(), 1);
    }

    #[test]
    fn single_page_disables_navigation() {
        let mut p = Paginator::new(vec!['a', 'b'], 3);
        assert!(!p.can_navigate());
        assert!(!p.next());
        assert!(!p.prev());
        assert_eq!(p.page_index(), 0);

        let mut empty = Paginator::<char>::new(vec![], 3);
        assert!(!empty.next());
        assert!(empty.current_page().is_empty());
        assert_eq!(empty.current_page().label(), "0 / 0");
    }

    #[test]
    fn shrinking_collection_clamps_index() {
        let mut p = seven();
        p.jump(2);
        p.set_items(vec![1, 2, 3, 4]);
        assert_eq!(p.total_pages(), 2);
        assert_eq!(p.page_index(), 1);
        assert_eq!(p.current_page().items, &[4]);

        p.set_page_size(10);
        assert_eq!(p.page_index(), 0);
        assert_eq!(p.current_page().items.len(), 4);
    }
}
