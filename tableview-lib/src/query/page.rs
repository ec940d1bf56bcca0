//! Client-side pagination over an in-memory collection.

use std::fmt;

use log::warn;

use crate::error::PageError;

/// Page sizes offered by default.
pub const DEFAULT_PAGE_SIZES: [usize; 4] = [10, 25, 50, 100];

/// Most page-number slots shown at once (including ellipses).
pub const MAX_PAGE_SLOTS: usize = 7;

/// A validated, strictly positive page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageSize(usize);

impl PageSize {
    /// Validates a page size.
    pub fn new(size: usize) -> Result<Self, PageError> {
        if size == 0 {
            return Err(PageError::InvalidPageSize(0));
        }
        Ok(Self(size))
    }

    /// Returns the size.
    pub fn get(self) -> usize {
        self.0
    }
}

impl TryFrom<i64> for PageSize {
    type Error = PageError;

    fn try_from(size: i64) -> Result<Self, Self::Error> {
        usize::try_from(size)
            .ok()
            .filter(|s| *s > 0)
            .map(Self)
            .ok_or(PageError::InvalidPageSize(size))
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(DEFAULT_PAGE_SIZES[0])
    }
}

/// What a page request actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageChange {
    /// The requested page was in range.
    Moved(usize),
    /// The request was out of range and was clamped.
    Clamped {
        /// The page that was asked for.
        requested: usize,
        /// The page actually selected.
        actual: usize,
    },
}

impl PageChange {
    /// Returns the page that is now current.
    pub fn page(self) -> usize {
        match self {
            PageChange::Moved(page) => page,
            PageChange::Clamped { actual, .. } => actual,
        }
    }
}

/// Current page and page size.
///
/// `page` is 1-based and is kept within `[1, max(1, total_pages)]` by every
/// operation that knows the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: PageSize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}

impl Pagination {
    /// Starts on page 1.
    pub fn new(page_size: PageSize) -> Self {
        Self { page: 1, page_size }
    }

    /// Returns the current page (1-based).
    pub fn page(&self) -> usize {
        self.page
    }

    /// Returns the page size.
    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    /// Number of pages needed for `total` rows.
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size.get())
    }

    fn last_page(&self, total: usize) -> usize {
        self.total_pages(total).max(1)
    }

    /// Moves to `requested`, clamping into range.
    pub fn set_page(&mut self, requested: usize, total: usize) -> PageChange {
        let actual = requested.clamp(1, self.last_page(total));
        self.page = actual;
        if actual == requested {
            PageChange::Moved(actual)
        } else {
            warn!(
                "page {} out of range for {} row(s), showing page {}",
                requested, total, actual
            );
            PageChange::Clamped { requested, actual }
        }
    }

    /// Re-clamps the current page after the row count changed.
    pub fn clamp(&mut self, total: usize) -> PageChange {
        self.set_page(self.page, total)
    }

    /// Changes the page size and returns to page 1.
    ///
    /// Invalid sizes are logged and leave the state unchanged.
    pub fn set_page_size(&mut self, size: i64) -> Result<(), PageError> {
        match PageSize::try_from(size) {
            Ok(page_size) => {
                self.page_size = page_size;
                self.page = 1;
                Ok(())
            }
            Err(err) => {
                warn!("ignoring page size change: {}", err);
                Err(err)
            }
        }
    }

    /// Returns to page 1 (after a filter or search change).
    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Advances one page if possible.
    pub fn next(&mut self, total: usize) -> PageChange {
        self.set_page(self.page + 1, total)
    }

    /// Goes back one page if possible.
    pub fn prev(&mut self, total: usize) -> PageChange {
        self.set_page(self.page.saturating_sub(1), total)
    }
}

/// One page of rows plus the numbers needed to describe it.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<R> {
    /// Rows on this page.
    pub rows: Vec<R>,
    /// Page shown (after clamping).
    pub page: usize,
    /// Page size used.
    pub page_size: usize,
    /// Total rows across all pages.
    pub total: usize,
    /// Total number of pages (0 when there are no rows).
    pub total_pages: usize,
    /// 1-based index of the first row shown, 0 when empty.
    pub start_item: usize,
    /// 1-based index of the last row shown, 0 when empty.
    pub end_item: usize,
}

impl<R> PageSlice<R> {
    /// `"Showing X to Y of Z results"`.
    pub fn summary(&self) -> String {
        format!(
            "Showing {} to {} of {} results",
            self.start_item, self.end_item, self.total
        )
    }

    /// Returns `true` if there is a previous page.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Returns `true` if there is a next page.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Cuts the current page out of `rows`.
///
/// The page is clamped into range for the slice; it never silently comes
/// back empty because the page index ran past the end.
pub fn paginate<R: Clone>(rows: &[R], pagination: &Pagination) -> PageSlice<R> {
    let total = rows.len();
    let page_size = pagination.page_size();
    let total_pages = pagination.total_pages(total);
    let page = pagination.page().clamp(1, total_pages.max(1));

    let start = ((page - 1) * page_size).min(total);
    let end = (page * page_size).min(total);
    let (start_item, end_item) = if total == 0 { (0, 0) } else { (start + 1, end) };

    PageSlice {
        rows: rows[start..end].to_vec(),
        page,
        page_size,
        total,
        total_pages,
        start_item,
        end_item,
    }
}

/// One slot of the page-number control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    /// A clickable page number.
    Page(usize),
    /// A gap.
    Ellipsis,
}

impl fmt::Display for PageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageItem::Page(n) => write!(f, "{}", n),
            PageItem::Ellipsis => f.write_str("..."),
        }
    }
}

/// Builds the page-number control, at most seven slots wide.
///
/// Seven pages or fewer are all shown. Beyond that the first and last page
/// are always present, and the window depends on where `current` sits:
///
/// ```
/// use tableview_lib::query::{page_numbers, PageItem::{Ellipsis, Page}};
///
/// assert_eq!(page_numbers(2, 10), vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(10)]);
/// assert_eq!(page_numbers(6, 10), vec![Page(1), Ellipsis, Page(5), Page(6), Page(7), Ellipsis, Page(10)]);
/// assert_eq!(page_numbers(8, 10), vec![Page(1), Ellipsis, Page(6), Page(7), Page(8), Page(9), Page(10)]);
/// ```
pub fn page_numbers(current: usize, total_pages: usize) -> Vec<PageItem> {
    if total_pages <= MAX_PAGE_SLOTS {
        return (1..=total_pages).map(PageItem::Page).collect();
    }

    let mut items = vec![PageItem::Page(1)];
    if current <= 4 {
        items.extend((2..=5).map(PageItem::Page));
        items.push(PageItem::Ellipsis);
        items.push(PageItem::Page(total_pages));
    } else if current >= total_pages - 3 {
        items.push(PageItem::Ellipsis);
        items.extend((total_pages - 4..=total_pages).map(PageItem::Page));
    } else {
        items.push(PageItem::Ellipsis);
        items.extend((current - 1..=current + 1).map(PageItem::Page));
        items.push(PageItem::Ellipsis);
        items.push(PageItem::Page(total_pages));
    }
    items
}
