use std::num::NonZeroUsize;
use std::ops::Range;

/// Default number of questions per page.
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(20) {
    Some(size) => size,
    None => unreachable!(),
};

/// Neighbours shown on each side of the current page in the page bar.
const PAGE_WINDOW: usize = 2;

/// Number of pages needed for `count` items; an empty result is still one page.
#[must_use]
pub fn total_pages(count: usize, page_size: NonZeroUsize) -> usize {
    count.div_ceil(page_size.get()).max(1)
}

/// Current page over a result list of changing length.
///
/// The page is 1-based and always within `1..=total_pages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: NonZeroUsize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    #[must_use]
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self { page: 1, page_size }
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    #[must_use]
    pub fn total_pages(&self, count: usize) -> usize {
        total_pages(count, self.page_size)
    }

    /// Move to page `n`. Out-of-range requests leave the page unchanged.
    ///
    /// Returns `true` if the request was accepted.
    pub fn go_to(&mut self, n: usize, count: usize) -> bool {
        if n < 1 || n > self.total_pages(count) {
            return false;
        }
        self.page = n;
        true
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Pull the page back into range after the result list shrank.
    pub fn clamp(&mut self, count: usize) {
        self.page = self.page.min(self.total_pages(count));
    }

    /// Index range of the current page within a list of `count` items.
    #[must_use]
    pub fn range(&self, count: usize) -> Range<usize> {
        let start = ((self.page - 1) * self.page_size.get()).min(count);
        let end = (start + self.page_size.get()).min(count);
        start..end
    }

    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range(items.len())]
    }
}

/// One entry of the page bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(usize),
    Ellipsis,
}

/// Page bar entries: first, last, and the current page with two neighbours
/// each side. Each gap collapses into a single ellipsis.
#[must_use]
pub fn page_links(current: usize, total: usize) -> Vec<PageLink> {
    let mut links = Vec::new();
    for page in 1..=total {
        let near_current = page + PAGE_WINDOW >= current && page <= current + PAGE_WINDOW;
        if page == 1 || page == total || near_current {
            links.push(PageLink::Page(page));
        } else if links.last() != Some(&PageLink::Ellipsis) {
            links.push(PageLink::Ellipsis);
        }
    }
    links
}
