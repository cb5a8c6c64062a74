//! Abstractions for offset-based pagination.

use std::num::ParseIntError;

use derive_more::{Display, Error};

/// Number of items on a [`Page`] when no (or a non-positive) size is
/// requested.
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Number of the [`Page`] returned when no (or a non-positive) page is
/// requested.
pub const FIRST_PAGE: i64 = 1;

/// Pagination arguments resolved from raw client tokens.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Arguments {
    /// One-based number of the requested [`Page`].
    page: i64,

    /// Number of items on the requested [`Page`].
    per_page: i64,
}

impl Arguments {
    /// Resolves [`Arguments`] from the raw `page` and `per_page` tokens.
    ///
    /// Absent, empty and non-positive tokens fall back to [`FIRST_PAGE`] and
    /// [`DEFAULT_PER_PAGE`] respectively.
    ///
    /// # Errors
    ///
    /// If a non-empty token cannot be parsed as an integer.
    pub fn parse(
        page: Option<&str>,
        per_page: Option<&str>,
    ) -> Result<Self, ParameterError> {
        let per_page = token("per_page", per_page)?
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_PER_PAGE);
        let page = token("page", page)?
            .filter(|n| *n > 0)
            .unwrap_or(FIRST_PAGE);

        Ok(Self { page, per_page })
    }

    /// Returns the one-based number of the requested [`Page`], as displayed to
    /// the client.
    #[must_use]
    pub const fn page(&self) -> i64 {
        self.page
    }

    /// Returns the number of items on the requested [`Page`].
    #[must_use]
    pub const fn per_page(&self) -> i64 {
        self.per_page
    }

    /// Returns the maximum number of items to fetch.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.per_page
    }

    /// Returns the number of items to skip before the requested [`Page`].
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            page: FIRST_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Parses the optional raw integer `value` of the `name`d parameter.
fn token(
    name: &'static str,
    value: Option<&str>,
) -> Result<Option<i64>, ParameterError> {
    value
        .filter(|v| !v.is_empty())
        .map(|v| v.parse().map_err(|source| ParameterError { name, source }))
        .transpose()
}

/// Error of a pagination token not being parseable as an integer.
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
#[display("Invalid `{name}` parameter")]
pub struct ParameterError {
    /// Name of the offending parameter.
    pub name: &'static str,

    /// Parsing error.
    pub source: ParseIntError,
}

/// Calculates the number of pages needed to fit `total_count` items by
/// `per_page` items on each.
#[must_use]
pub const fn total_pages(total_count: i64, per_page: i64) -> i64 {
    if per_page <= 0 {
        return 0;
    }
    let full = total_count / per_page;
    if total_count % per_page == 0 {
        full
    } else {
        full + 1
    }
}

/// A page of items.
#[derive(Clone, Debug)]
pub struct Page<T> {
    /// Items on this [`Page`].
    pub items: Vec<T>,

    /// One-based number of this [`Page`].
    pub page: i64,

    /// Requested number of items on this [`Page`].
    pub per_page: i64,

    /// Total number of pages.
    pub total_pages: i64,

    /// Total number of items on all the pages.
    pub total_count: i64,
}

impl<T> Page<T> {
    /// Creates a new [`Page`] out of the provided `items` fetched with the
    /// given [`Arguments`].
    #[must_use]
    pub fn new(
        args: &Arguments,
        items: impl IntoIterator<Item = impl Into<T>>,
        total_count: i64,
    ) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            page: args.page(),
            per_page: args.per_page(),
            total_pages: total_pages(total_count, args.per_page()),
            total_count,
        }
    }

    /// Maps items of this [`Page`] with the provided function.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
            total_count: self.total_count,
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{total_pages, Arguments, Page, DEFAULT_PER_PAGE};

    #[test]
    fn defaults_absent_tokens() {
        let args = Arguments::parse(None, None).unwrap();

        assert_eq!(args.page(), 1);
        assert_eq!(args.per_page(), DEFAULT_PER_PAGE);
        assert_eq!(args.limit(), 10);
        assert_eq!(args.offset(), 0);
        assert_eq!(args, Arguments::default());
    }

    #[test]
    fn defaults_empty_tokens() {
        assert_eq!(
            Arguments::parse(Some(""), Some("")).unwrap(),
            Arguments::default(),
        );
    }

    #[test]
    fn defaults_non_positive_tokens() {
        let args = Arguments::parse(Some("0"), Some("-5")).unwrap();
        assert_eq!(args.page(), 1);
        assert_eq!(args.per_page(), 10);

        let args = Arguments::parse(Some("-1"), Some("0")).unwrap();
        assert_eq!(args.page(), 1);
        assert_eq!(args.per_page(), 10);
    }

    #[test]
    fn calculates_offset() {
        let args = Arguments::parse(Some("3"), Some("25")).unwrap();
        assert_eq!(args.page(), 3);
        assert_eq!(args.limit(), 25);
        assert_eq!(args.offset(), 50);

        let args = Arguments::parse(Some("2"), None).unwrap();
        assert_eq!(args.offset(), 10);

        let args = Arguments::parse(Some("1"), Some("7")).unwrap();
        assert_eq!(args.offset(), 0);
    }

    #[test]
    fn errors_on_non_numeric_token() {
        let err = Arguments::parse(Some("two"), None).unwrap_err();
        assert_eq!(err.name, "page");
        assert_eq!(err.to_string(), "Invalid `page` parameter");

        let err = Arguments::parse(Some("1"), Some("ten")).unwrap_err();
        assert_eq!(err.name, "per_page");

        let err = Arguments::parse(Some("1.5"), Some("10")).unwrap_err();
        assert_eq!(err.name, "page");
    }

    #[test]
    fn calculates_total_pages() {
        assert_eq!(total_pages(21, 10), 3);
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(0, 10), 0);
    }

    #[test]
    fn builds_page() {
        let args = Arguments::parse(Some("2"), Some("10")).unwrap();
        let page = Page::<u8>::new(&args, [1_u8, 2, 3], 13);

        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.page, 2);
        assert_eq!(page.per_page, 10);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.total_count, 13);

        let page = page.map(u16::from);
        assert_eq!(page.items, vec![1_u16, 2, 3]);
    }
}
