//! Case-insensitive substring search over a decoded page.
//!
//! Search only looks at rows that are already decoded; it never reads the
//! data file. An empty term matches nothing, which a caller can treat as
//! "no active filter".

use crate::record::{Page, Record};

/// Records of `page` whose `field_name` value contains `term`, ignoring case.
///
/// Returns references to the page's own records, in page order. The result
/// is empty when the page is empty, the field name is blank, or the term is
/// empty.
pub fn search<'a>(page: &'a Page, field_name: &str, term: &str) -> Vec<&'a Record> {
    if page.is_empty() || field_name.trim().is_empty() || term.is_empty() {
        return Vec::new();
    }

    let needle = term.to_lowercase();
    page.iter()
        .filter(|record| {
            record
                .get(field_name)
                .is_some_and(|value| value.to_lowercase().contains(&needle))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_page() -> Page {
        Page::new(
            0,
            vec![
                Record::new(0)
                    .with("ID", "101")
                    .with("NAME", "John Doe")
                    .with("CITY", "New York"),
                Record::new(1)
                    .with("ID", "102")
                    .with("NAME", "Jane Smith")
                    .with("CITY", "London"),
                Record::new(2)
                    .with("ID", "103")
                    .with("NAME", "Peter Jones")
                    .with("CITY", "New York"),
                Record::new(3)
                    .with("ID", "104")
                    .with("NAME", "Alice Brown")
                    .with("CITY", "Paris"),
            ],
        )
    }

    fn ids(records: &[&Record]) -> Vec<usize> {
        records.iter().map(|r| r.number()).collect()
    }

    #[test]
    fn test_search_case_insensitive() {
        let page = sample_page();
        assert_eq!(ids(&search(&page, "NAME", "JOHN")), vec![0]);
        assert_eq!(ids(&search(&page, "NAME", "jo")), vec![0, 2]);
    }

    #[test]
    fn test_search_preserves_page_order() {
        let page = sample_page();
        assert_eq!(ids(&search(&page, "CITY", "new york")), vec![0, 2]);
    }

    #[test]
    fn test_search_returns_original_records() {
        let page = sample_page();
        let hits = search(&page, "CITY", "paris");
        assert_eq!(hits.len(), 1);
        assert!(std::ptr::eq(hits[0], &page.rows()[3]));
    }

    #[test]
    fn test_search_no_match() {
        let page = sample_page();
        assert!(search(&page, "NAME", "David").is_empty());
    }

    #[test]
    fn test_search_empty_term_matches_nothing() {
        let page = sample_page();
        assert!(search(&page, "NAME", "").is_empty());
    }

    #[test]
    fn test_search_blank_or_unknown_field() {
        let page = sample_page();
        assert!(search(&page, "", "john").is_empty());
        assert!(search(&page, "   ", "john").is_empty());
        assert!(search(&page, "NOTES", "john").is_empty());
    }

    #[test]
    fn test_search_empty_page() {
        assert!(search(&Page::empty(), "NAME", "john").is_empty());
    }

    #[test]
    fn test_search_is_idempotent() {
        let page = sample_page();
        let first = search(&page, "NAME", "e");
        let second = search(&page, "NAME", "e");
        assert_eq!(first, second);
    }

    #[test]
    fn test_search_non_ascii_case_folding() {
        let page = Page::new(0, vec![Record::new(0).with("CITY", "ZÜRICH")]);
        assert_eq!(search(&page, "CITY", "zür").len(), 1);
    }
}
