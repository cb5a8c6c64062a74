//! Transport-agnostic description of a data-access request.
//!
//! Loosely-typed client input (filters, sort directives, field selections and
//! pagination tokens) is shaped here into an [`Intent`]: a whitelisted,
//! parameterized request which storage adapters render into their native
//! syntax. Nothing in this module produces SQL with values inlined: every
//! value travels separately in [`Params`] and is referenced by name.

use std::{collections::BTreeMap, fmt, str::FromStr};

use derive_more::Display;
use itertools::Itertools as _;

use crate::pagination;

/// Name of the [`Params`] entry holding the maximum number of rows to fetch.
pub const LIMIT: &str = "limit";

/// Name of the [`Params`] entry holding the number of rows to skip.
pub const OFFSET: &str = "offset";

/// Declared field of an [`Entity`].
pub trait Field:
    Copy + Eq + FromStr + AsRef<str> + fmt::Debug + 'static
{
    /// All the declared fields, in their default order.
    const ALL: &'static [Self];
}

/// Entity which can be queried through an [`Intent`].
pub trait Entity {
    /// [`Field`]s clients are allowed to select and order by.
    type Field: Field;

    /// Column whose non-null value marks a row as tombstoned.
    const TOMBSTONE: &'static str;

    /// Order applied when no valid one is requested.
    const DEFAULT_ORDER: &'static str;
}

/// Comparison [`Operator`] of a [`Term`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operator {
    /// Column has no value.
    IsNull,

    /// Column equals the parameter.
    Eq,

    /// Column matches the parameter pattern.
    Like,

    /// Column is greater than or equal to the parameter.
    Ge,

    /// Column is less than or equal to the parameter.
    Le,
}

impl Operator {
    /// Returns SQL representation of this [`Operator`].
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::IsNull => "IS NULL",
            Self::Eq => "=",
            Self::Like => "LIKE",
            Self::Ge => ">=",
            Self::Le => "<=",
        }
    }
}

/// Single condition of a [`Predicate`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Term {
    /// Column this [`Term`] checks.
    pub column: &'static str,

    /// [`Operator`] applied to the column.
    pub operator: Operator,

    /// Name of the parameter the column is compared with, if any.
    pub param: Option<&'static str>,
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.operator.sql())?;
        if let Some(param) = self.param {
            write!(f, " :{param}")?;
        }
        Ok(())
    }
}

/// Ordered conjunction of [`Term`]s.
///
/// Displayed with named parameters, e.g.
/// `deleted_at IS NULL AND name LIKE :name`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Predicate(Vec<Term>);

impl Predicate {
    /// Returns [`Term`]s of this [`Predicate`] in their order.
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.0
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().format(" AND "))
    }
}

/// Value of a named parameter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    /// Plain text.
    Text(String),

    /// Textual timestamp, interpreted by the storage.
    Timestamp(String),

    /// Integer number.
    Integer(i64),
}

/// Named parameters referenced by a [`Predicate`] and pagination.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Params(BTreeMap<&'static str, Value>);

impl Params {
    /// Returns the [`Value`] of the `name`d parameter, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the parameters ordered by their names.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.0.iter().map(|(n, v)| (*n, v))
    }

    /// Sets the `name`d parameter to the provided [`Value`].
    fn set(&mut self, name: &'static str, value: Value) {
        drop(self.0.insert(name, value));
    }
}

/// Builder of a [`Predicate`] along with its [`Params`].
///
/// Always starts with the tombstone exclusion. Optional conditions are added
/// only for non-empty input, in the order they are called.
#[derive(Clone, Debug)]
pub struct Conjunction {
    /// [`Predicate`] being built.
    predicate: Predicate,

    /// [`Params`] referenced by the [`Predicate`].
    params: Params,
}

impl Conjunction {
    /// Starts a new [`Conjunction`] matching live (not tombstoned) rows of the
    /// provided [`Entity`].
    #[must_use]
    pub fn live<E: Entity>() -> Self {
        Self {
            predicate: Predicate(vec![Term {
                column: E::TOMBSTONE,
                operator: Operator::IsNull,
                param: None,
            }]),
            params: Params::default(),
        }
    }

    /// Requires the `column` to be equal to the provided [`Value`].
    #[must_use]
    pub fn equals(
        self,
        column: &'static str,
        param: &'static str,
        value: Value,
    ) -> Self {
        self.term(column, Operator::Eq, param, value)
    }

    /// Requires the `column` to contain the provided text, if it's not empty.
    ///
    /// Backslashes, `%` and `_` of the text are matched literally.
    #[must_use]
    pub fn contains(
        self,
        column: &'static str,
        param: &'static str,
        text: Option<&str>,
    ) -> Self {
        match text.filter(|t| !t.is_empty()) {
            Some(t) => self.term(
                column,
                Operator::Like,
                param,
                Value::Text(format!(
                    "%{}%",
                    t.replace('\\', r"\\")
                        .replace('%', r"\%")
                        .replace('_', r"\_"),
                )),
            ),
            None => self,
        }
    }

    /// Requires the `column` to be at or after the provided timestamp, if it's
    /// not empty.
    #[must_use]
    pub fn not_before(
        self,
        column: &'static str,
        param: &'static str,
        timestamp: Option<&str>,
    ) -> Self {
        self.bound(column, Operator::Ge, param, timestamp)
    }

    /// Requires the `column` to be at or before the provided timestamp, if
    /// it's not empty.
    #[must_use]
    pub fn not_after(
        self,
        column: &'static str,
        param: &'static str,
        timestamp: Option<&str>,
    ) -> Self {
        self.bound(column, Operator::Le, param, timestamp)
    }

    /// Returns the [`Predicate`] built so far.
    #[must_use]
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Returns the [`Params`] built so far.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Splits this [`Conjunction`] into its [`Predicate`] and [`Params`].
    #[must_use]
    pub fn into_parts(self) -> (Predicate, Params) {
        (self.predicate, self.params)
    }

    /// Appends an inclusive timestamp bound, if the `timestamp` is not empty.
    fn bound(
        self,
        column: &'static str,
        operator: Operator,
        param: &'static str,
        timestamp: Option<&str>,
    ) -> Self {
        match timestamp.filter(|t| !t.is_empty()) {
            Some(t) => {
                self.term(column, operator, param, Value::Timestamp(t.into()))
            }
            None => self,
        }
    }

    /// Appends a new [`Term`] along with its parameter [`Value`].
    fn term(
        mut self,
        column: &'static str,
        operator: Operator,
        param: &'static str,
        value: Value,
    ) -> Self {
        self.predicate.0.push(Term {
            column,
            operator,
            param: Some(param),
        });
        self.params.set(param, value);
        self
    }
}

/// Sanitized `column direction` order.
///
/// Only `column`, `column ASC` or `column DESC` of a declared [`Field`] is
/// kept. Anything else, including extra clauses like `NULLS LAST`, falls back
/// to [`Entity::DEFAULT_ORDER`], so no raw client text reaches `ORDER BY`
/// beyond a whitelisted column and direction.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct OrderBy(String);

impl OrderBy {
    /// Sanitizes the raw `column direction` order of the provided [`Entity`].
    ///
    /// The raw order is returned verbatim if its column is a declared
    /// [`Field`] and it's followed by nothing but an optional `ASC` or `DESC`
    /// direction. Otherwise, [`Entity::DEFAULT_ORDER`] is used.
    #[must_use]
    pub fn sanitize<E: Entity>(raw: Option<&str>) -> Self {
        let raw = raw.unwrap_or_default();

        let mut parts = raw.split_whitespace();
        let column = parts.next().and_then(|c| c.parse::<E::Field>().ok());
        let direction = parts.next();
        let is_direction = direction.map_or(true, |d| {
            d.eq_ignore_ascii_case("ASC") || d.eq_ignore_ascii_case("DESC")
        });

        if column.is_some() && is_direction && parts.next().is_none() {
            Self(raw.to_owned())
        } else {
            Self(E::DEFAULT_ORDER.to_owned())
        }
    }

    /// Returns the `column direction` string of this [`OrderBy`].
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Ordered list of [`Field`]s to return.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Projection<F>(Vec<F>);

impl<F: Field> Projection<F> {
    /// Returns a [`Projection`] of all the declared [`Field`]s.
    #[must_use]
    pub fn all() -> Self {
        Self(F::ALL.to_vec())
    }

    /// Keeps the `candidates` naming declared [`Field`]s, in their order.
    ///
    /// Unknown names are dropped. If nothing is left, all the declared
    /// [`Field`]s are projected.
    #[must_use]
    pub fn whitelist<'c>(candidates: impl IntoIterator<Item = &'c str>) -> Self {
        let fields = candidates
            .into_iter()
            .filter_map(|c| c.parse().ok())
            .collect::<Vec<F>>();
        if fields.is_empty() {
            Self::all()
        } else {
            Self(fields)
        }
    }

    /// Sanitizes the raw comma-separated list of field names.
    ///
    /// See [`Projection::whitelist()`] for details.
    #[must_use]
    pub fn sanitize(raw: Option<&str>) -> Self {
        Self::whitelist(raw.unwrap_or_default().split(',').map(str::trim))
    }

    /// Returns the projected [`Field`]s.
    #[must_use]
    pub fn fields(&self) -> &[F] {
        &self.0
    }
}

impl<F: Field> fmt::Display for Projection<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().map(AsRef::as_ref).format(","))
    }
}

/// Canonical description of a paginated list request of an [`Entity`].
///
/// Built fresh for every request and immutable afterwards.
#[derive(Debug)]
pub struct Intent<E: Entity> {
    /// [`Predicate`] selecting the rows.
    predicate: Predicate,

    /// [`Params`] for fetching a page of rows, including [`LIMIT`] and
    /// [`OFFSET`].
    params: Params,

    /// [`Params`] for counting all the matching rows.
    count_params: Params,

    /// Order of the rows.
    order_by: OrderBy,

    /// [`Field`]s to return.
    projection: Projection<E::Field>,

    /// Pagination [`Arguments`].
    ///
    /// [`Arguments`]: pagination::Arguments
    pagination: pagination::Arguments,
}

impl<E: Entity> Intent<E> {
    /// Composes a new [`Intent`] out of the sanitized parts.
    #[must_use]
    pub fn new(
        filter: Conjunction,
        order_by: OrderBy,
        projection: Projection<E::Field>,
        pagination: pagination::Arguments,
    ) -> Self {
        let (predicate, count_params) = filter.into_parts();

        let mut params = count_params.clone();
        params.set(LIMIT, Value::Integer(pagination.limit()));
        params.set(OFFSET, Value::Integer(pagination.offset()));

        Self {
            predicate,
            params,
            count_params,
            order_by,
            projection,
            pagination,
        }
    }

    /// Returns the [`Predicate`] selecting the rows.
    #[must_use]
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Returns the [`Params`] for fetching a page of rows.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns the [`Params`] for counting all the matching rows.
    #[must_use]
    pub fn count_params(&self) -> &Params {
        &self.count_params
    }

    /// Returns the [`OrderBy`] of the rows.
    #[must_use]
    pub fn order_by(&self) -> &OrderBy {
        &self.order_by
    }

    /// Returns the [`Projection`] of the rows.
    #[must_use]
    pub fn projection(&self) -> &Projection<E::Field> {
        &self.projection
    }

    /// Returns the pagination [`Arguments`].
    ///
    /// [`Arguments`]: pagination::Arguments
    #[must_use]
    pub fn pagination(&self) -> &pagination::Arguments {
        &self.pagination
    }

    /// Returns the maximum number of rows to fetch.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.pagination.limit()
    }

    /// Returns the number of rows to skip.
    #[must_use]
    pub fn offset(&self) -> i64 {
        self.pagination.offset()
    }

    /// Returns the one-based number of the page displayed to the client.
    #[must_use]
    pub fn display_page(&self) -> i64 {
        self.pagination.page()
    }
}
