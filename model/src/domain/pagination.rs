use std::collections::BTreeMap;

use lazy_regex::regex_captures;
use nutype::nutype;
use serde::Serialize;

#[nutype(derive(Debug, Clone, Copy, PartialEq), validate(greater_or_equal = 1))]
pub struct PerPage(usize);

/// A bounded slice of an ordered collection, ready to be rendered with its
/// page-count metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data:         Vec<T>,
    pub current_page: usize,
    pub total_pages:  usize,
    pub per_page:     usize,
    pub query:        BTreeMap<String, String>,
}

/// Pages past this one are clamped to it.
pub const MAX_PAGE: usize = 1_000_000;

/// Parse a requested page number. Missing or non-numeric input falls back
/// to the first page, a leading number is enough (`"3abc"` is page 3) and
/// the result is clamped to `[1, MAX_PAGE]`.
pub fn parse_page(raw: Option<&str>) -> usize {
    raw.and_then(|raw| regex_captures!(r"^\s*([+-]?)(\d+)", raw))
        .map(|(_, sign, digits)| match digits.parse::<i64>() {
            Ok(number) if sign == "-" => clamp_page(-number),
            Ok(number) => clamp_page(number),
            // Too many digits for an i64
            Err(_) if sign == "-" => 1,
            Err(_) => MAX_PAGE,
        })
        .unwrap_or(1)
}

pub fn clamp_page(page: i64) -> usize {
    usize::try_from(page.clamp(1, MAX_PAGE as i64)).unwrap_or(MAX_PAGE)
}

/// Always at least one page, even for an empty collection.
pub fn total_pages(count: usize, per_page: PerPage) -> usize {
    count.div_ceil(per_page.into_inner()).max(1)
}

/// Copy the requested page out of `items`, which is left untouched. Pages
/// past the end are empty, not an error.
pub fn paginate<T: Clone>(
    items: &[T],
    page: usize,
    per_page: PerPage,
) -> Page<T> {
    let current_page = page.max(1);
    let size = per_page.into_inner();
    let start = (current_page - 1).saturating_mul(size);

    Page {
        data: items.iter().skip(start).take(size).cloned().collect(),
        current_page,
        total_pages: total_pages(items.len(), per_page),
        per_page: size,
        query: BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        missing = {None, 1},
        empty = {Some(""), 1},
        garbage = {Some("abc"), 1},
        plain = {Some("3"), 3},
        leading_number = {Some("3abc"), 3},
        decimal = {Some("2.5"), 2},
        zero = {Some("0"), 1},
        negative = {Some("-4"), 1},
        spaces = {Some("  7"), 7},
        huge = {Some("1000001"), MAX_PAGE},
        overflow = {Some("99999999999999999999999"), MAX_PAGE},
        negative_overflow = {Some("-99999999999999999999999"), 1}
    )]
    fn test_parse_page(raw: Option<&str>, expected: usize) {
        assert_eq!(parse_page(raw), expected);
    }

    #[parameterized(
        empty = {0, 1},
        one = {1, 1},
        exact = {20, 2},
        remainder = {21, 3}
    )]
    fn test_total_pages(count: usize, expected: usize) {
        assert_eq!(total_pages(count, PerPage::try_new(10).unwrap()), expected);
    }

    #[test]
    fn test_paginate() {
        let items = (1..=25).collect::<Vec<_>>();
        let per_page = PerPage::try_new(10).unwrap();

        let page = paginate(&items, 3, per_page);
        assert_eq!(page.data, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.current_page, 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.per_page, 10);

        let page = paginate(&items, 0, per_page);
        assert_eq!(page.data, (1..=10).collect::<Vec<_>>());
        assert_eq!(page.current_page, 1);
    }

    #[test]
    fn test_paginate_out_of_range_is_empty() {
        let items = vec!["a", "b"];
        let page = paginate(&items, 42, PerPage::try_new(10).unwrap());
        assert!(page.data.is_empty());
        assert_eq!(page.current_page, 42);
        assert_eq!(page.total_pages, 1);

        let page = paginate(&items, usize::MAX, PerPage::try_new(10).unwrap());
        assert!(page.data.is_empty());
    }

    #[test]
    fn test_paginate_does_not_consume_input() {
        let items = (1..=15).collect::<Vec<_>>();
        let per_page = PerPage::try_new(10).unwrap();

        let first = paginate(&items, 1, per_page);
        let second = paginate(&items, 1, per_page);
        assert_eq!(first, second);
        assert_eq!(items.len(), 15);
    }

    #[test]
    fn test_per_page_must_be_positive() {
        assert!(PerPage::try_new(0).is_err());
    }
}
