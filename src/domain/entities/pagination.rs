use serde::{Deserialize, Serialize};

/// One page of results. `number` is 1-based and always within `1..=num_pages`.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_number(&self) -> i64 {
        (self.number - 1).max(1)
    }

    pub fn next_number(&self) -> i64 {
        (self.number + 1).min(self.num_pages)
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
        }
    }
}

/// `?page=` of paginated listings, kept raw so that garbage clamps instead
/// of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Page count for `total` rows; an empty listing still has one page.
pub fn page_count(total: i64, per_page: i64) -> i64 {
    if total <= 0 || per_page <= 0 {
        1
    } else {
        (total + per_page - 1) / per_page
    }
}

/// Resolves the raw `page` query value. Anything that is not an integer, or
/// is below one, selects the first page; past the end selects the last.
pub fn clamp_page(raw: Option<&str>, total: i64, per_page: i64) -> i64 {
    let last = page_count(total, per_page);
    match raw.map(str::trim).and_then(|p| p.parse::<i64>().ok()) {
        Some(n) if n < 1 => 1,
        Some(n) if n > last => last,
        Some(n) => n,
        None => 1,
    }
}

/// OFFSET for a 1-based page.
pub fn page_offset(page: i64, per_page: i64) -> i64 {
    (page.max(1) - 1) * per_page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_integer_and_small_pages_go_to_first() {
        assert_eq!(clamp_page(None, 50, 10), 1);
        assert_eq!(clamp_page(Some("abc"), 50, 10), 1);
        assert_eq!(clamp_page(Some("0"), 50, 10), 1);
        assert_eq!(clamp_page(Some("-3"), 50, 10), 1);
    }

    #[test]
    fn pages_past_the_end_go_to_last() {
        assert_eq!(clamp_page(Some("99"), 21, 10), 3);
        assert_eq!(clamp_page(Some("2"), 0, 10), 1);
    }

    #[test]
    fn in_range_pages_are_kept() {
        assert_eq!(clamp_page(Some(" 2 "), 21, 10), 2);
        assert_eq!(page_offset(2, 9), 9);
    }

    #[test]
    fn navigation_helpers_stay_in_range() {
        let page = Page { items: vec![1, 2], number: 1, num_pages: 1, total: 2 };
        assert!(!page.has_previous());
        assert!(!page.has_next());
        assert_eq!(page.next_number(), 1);
        assert_eq!(page.map(|n| n * 2).items, vec![2, 4]);
    }
}
