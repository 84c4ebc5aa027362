//! Name search helpers: `LIKE` pattern building and offset paging.

/// Escape character used in `LIKE ... ESCAPE` clauses.
pub const LIKE_ESCAPE: char = '\\';

/// Build a `LIKE` pattern that matches any value containing `term`.
///
/// Wildcards in the term are escaped so it is matched literally.
#[must_use]
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// A one-based page of search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Page number, at least 1.
    pub number: u32,
    /// Maximum rows per page.
    pub size: u32,
}

impl Page {
    /// Create a page, clamping the number to 1.
    #[must_use]
    pub fn new(number: u32, size: u32) -> Self {
        Self {
            number: number.max(1),
            size,
        }
    }

    /// Rows to skip before this page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.size)
    }

    /// Row limit for this page.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    /// The page before this one, if any.
    #[must_use]
    pub fn previous(&self) -> Option<u32> {
        (self.number > 1).then(|| self.number - 1)
    }

    /// The page after this one, offered when this page came back full.
    #[must_use]
    pub fn next(&self, returned: usize) -> Option<u32> {
        let full = self.size > 0 && returned >= self.size as usize;
        full.then(|| self.number.saturating_add(1))
    }
}
