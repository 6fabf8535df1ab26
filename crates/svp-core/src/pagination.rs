//! Cursor-paginated remote sequences as lazy iterators.
//!
//! [`Paginated`] wraps a page fetcher and yields items one at a time. The
//! next page is only requested once the current one is drained, so a
//! consumer that stops early never pays for pages it did not look at.
//!
//! A failed fetch ends the sequence: it is logged and treated as "no more
//! data" rather than surfaced to the consumer.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::repository::RepositoryResult;

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page, in remote order.
    pub items: Vec<T>,
    /// Cursor for the next page, `None` on the last page.
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// A page with no successor.
    pub const fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }
}

/// Lazy iterator over a paginated remote sequence.
///
/// The fetcher receives the cursor of the page to load (`None` for the
/// first page) and returns `Ok(None)` when there is nothing to list at all,
/// for example when a branch does not exist.
pub struct Paginated<T, F> {
    fetch: F,
    buffer: VecDeque<T>,
    cursor: Option<String>,
    exhausted: bool,
    remaining: Option<usize>,
    label: &'static str,
}

impl<T, F> Paginated<T, F>
where
    F: FnMut(Option<&str>) -> RepositoryResult<Option<Page<T>>>,
{
    /// Create a sequence named `label` (used in logs) over `fetch`.
    pub fn new(label: &'static str, max_results: Option<usize>, fetch: F) -> Self {
        Self {
            fetch,
            buffer: VecDeque::new(),
            cursor: None,
            exhausted: false,
            remaining: max_results,
            label,
        }
    }

    fn fetch_next_page(&mut self) {
        debug!(sequence = self.label, cursor = ?self.cursor, "fetching page");
        match (self.fetch)(self.cursor.as_deref()) {
            Ok(Some(page)) => {
                self.buffer.extend(page.items);
                match page.next_cursor {
                    Some(cursor) => self.cursor = Some(cursor),
                    None => self.exhausted = true,
                }
            }
            Ok(None) => {
                debug!(sequence = self.label, "nothing to list");
                self.exhausted = true;
            }
            Err(err) => {
                warn!(sequence = self.label, error = %err, "page fetch failed, ending sequence");
                self.exhausted = true;
            }
        }
    }
}

impl<T, F> Iterator for Paginated<T, F>
where
    F: FnMut(Option<&str>) -> RepositoryResult<Option<Page<T>>>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.remaining == Some(0) {
            return None;
        }
        // An empty page with a cursor is legal; keep going until data or the end.
        while self.buffer.is_empty() && !self.exhausted {
            self.fetch_next_page();
        }
        let item = self.buffer.pop_front()?;
        if let Some(ref mut remaining) = self.remaining {
            *remaining -= 1;
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::repository::RepositoryError;

    fn pages(fetches: &Cell<usize>) -> impl FnMut(Option<&str>) -> RepositoryResult<Option<Page<u32>>> + '_ {
        move |cursor| {
            fetches.set(fetches.get() + 1);
            Ok(Some(match cursor {
                None => Page {
                    items: vec![1, 2],
                    next_cursor: Some("p2".into()),
                },
                Some("p2") => Page {
                    items: vec![3, 4],
                    next_cursor: Some("p3".into()),
                },
                Some(_) => Page::last(vec![5]),
            }))
        }
    }

    #[test]
    fn yields_all_pages_in_order() {
        let fetches = Cell::new(0);
        let items: Vec<u32> = Paginated::new("test", None, pages(&fetches)).collect();
        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(fetches.get(), 3);
    }

    #[test]
    fn stops_fetching_when_consumer_stops() {
        let fetches = Cell::new(0);
        let first: Vec<u32> = Paginated::new("test", None, pages(&fetches)).take(2).collect();
        assert_eq!(first, vec![1, 2]);
        assert_eq!(fetches.get(), 1);
    }

    #[test]
    fn respects_max_results() {
        let fetches = Cell::new(0);
        let items: Vec<u32> = Paginated::new("test", Some(3), pages(&fetches)).collect();
        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(fetches.get(), 2);
    }

    #[test]
    fn failed_fetch_ends_sequence() {
        let mut calls = 0;
        let items: Vec<u32> = Paginated::new("test", None, |_cursor: Option<&str>| {
            calls += 1;
            if calls == 1 {
                Ok(Some(Page {
                    items: vec![1],
                    next_cursor: Some("next".into()),
                }))
            } else {
                Err(RepositoryError::Transport("boom".into()))
            }
        })
        .collect();
        assert_eq!(items, vec![1]);
    }

    #[test]
    fn unknown_listing_is_empty() {
        let items: Vec<u32> =
            Paginated::new("test", None, |_cursor: Option<&str>| Ok(None)).collect();
        assert!(items.is_empty());
    }

    #[test]
    fn skips_empty_intermediate_pages() {
        let items: Vec<u32> = Paginated::new("test", None, |cursor: Option<&str>| {
            Ok(Some(match cursor {
                None => Page {
                    items: vec![],
                    next_cursor: Some("p2".into()),
                },
                Some(_) => Page::last(vec![9]),
            }))
        })
        .collect();
        assert_eq!(items, vec![9]);
    }
}
