//! Keyset pagination helpers shared by the paged selectors.
//!
//! Selectors fetch `limit + 1` rows ordered by a total sort key (creation
//! time or name, with the id as tiebreaker) starting strictly after the
//! cursor row. `clamp` trims the overshoot row and turns the last id of the
//! trimmed page into the cursor for the next fetch.

use serde::Serialize;

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

/// Trim an over-fetched result set down to `limit` rows.
///
/// `next_cursor` is the id of the last returned row, present only when the
/// fetch produced strictly more than `limit` rows.
pub fn clamp<T>(mut rows: Vec<T>, limit: usize, id: impl Fn(&T) -> &str) -> Page<T> {
    let next_cursor = if rows.len() > limit {
        rows.truncate(limit);
        rows.last().map(|row| id(row).to_string())
    } else {
        None
    };
    Page {
        items: rows,
        next_cursor,
    }
}

/// Resolve the effective page size for an optional `limit` query parameter.
pub fn effective_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("job-{i}")).collect()
    }

    #[test]
    fn test_full_page_yields_cursor_of_last_returned_row() {
        // 25 matching rows, limit 20: page one is rows 1..=20 and the
        // cursor points at the twentieth row.
        let fetched = rows(21); // selector fetches limit + 1
        let page = clamp(fetched, 20, |r| r.as_str());
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.next_cursor.as_deref(), Some("job-20"));
    }

    #[test]
    fn test_final_page_has_no_cursor() {
        let page = clamp(rows(5), 20, |r| r.as_str());
        assert_eq!(page.items.len(), 5);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_exact_fit_has_no_cursor() {
        let page = clamp(rows(20), 20, |r| r.as_str());
        assert_eq!(page.items.len(), 20);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_empty_result() {
        let page = clamp(Vec::<String>::new(), 20, |r| r.as_str());
        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_effective_limit_bounds() {
        assert_eq!(effective_limit(None), DEFAULT_LIMIT);
        assert_eq!(effective_limit(Some(20)), 20);
        assert_eq!(effective_limit(Some(0)), 1);
        assert_eq!(effective_limit(Some(1000)), MAX_LIMIT);
    }
}
