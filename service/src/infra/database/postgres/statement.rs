//! [`Statement`] definition.

use common::query::{Params, Predicate, Value};
use itertools::Itertools as _;
use tokio_postgres::types::ToSql;
use tracerr::Traced;

use crate::infra::database::{self, postgres::Error};

/// Binder of named [`Params`] to positional Postgres parameters.
///
/// Every bound name gets a single `$n` position, reused when the same name is
/// bound again, along with the SQL type cast of its [`Value`].
#[derive(Debug)]
pub struct Statement<'p> {
    /// Named [`Params`] to bind.
    params: &'p Params,

    /// Names bound so far, in their positional order.
    names: Vec<&'static str>,

    /// Values bound so far, in their positional order.
    values: Vec<&'p (dyn ToSql + Sync)>,
}

impl<'p> Statement<'p> {
    /// Creates a new [`Statement`] binding the provided [`Params`].
    #[must_use]
    pub fn new(params: &'p Params) -> Self {
        Self {
            params,
            names: vec![],
            values: vec![],
        }
    }

    /// Binds the `name`d parameter and returns its positional placeholder.
    ///
    /// # Errors
    ///
    /// With [`Error::UnboundParameter`] if there is no such parameter.
    pub fn bind(
        &mut self,
        name: &'static str,
    ) -> Result<String, Traced<database::Error>> {
        let params = self.params;
        let Some(value) = params.get(name) else {
            return Err(tracerr::new!(Error::UnboundParameter(name)))
                .map_err(tracerr::map_from);
        };

        let position = if let Some(i) = self.names.iter().position(|n| *n == name)
        {
            i + 1
        } else {
            self.names.push(name);
            self.values.push(match value {
                Value::Text(s) | Value::Timestamp(s) => s,
                Value::Integer(i) => i,
            });
            self.values.len()
        };

        let cast = match value {
            Value::Text(_) => "VARCHAR",
            Value::Timestamp(_) => "VARCHAR::TIMESTAMPTZ",
            Value::Integer(_) => "INT8",
        };
        Ok(format!("${position}::{cast}"))
    }

    /// Renders the provided [`Predicate`], binding its parameters.
    ///
    /// # Errors
    ///
    /// With [`Error::UnboundParameter`] if any of the [`Predicate`] parameters
    /// has no value.
    pub fn predicate(
        &mut self,
        predicate: &Predicate,
    ) -> Result<String, Traced<database::Error>> {
        let terms = predicate
            .terms()
            .iter()
            .map(|t| {
                let op = t.operator.sql();
                Ok(match t.param {
                    Some(p) => format!("{} {op} {}", t.column, self.bind(p)?),
                    None => format!("{} {op}", t.column),
                })
            })
            .collect::<Result<Vec<_>, Traced<database::Error>>>()?;
        Ok(terms.iter().join(" AND "))
    }

    /// Returns the bound values, in their positional order.
    #[must_use]
    pub fn values(&self) -> &[&'p (dyn ToSql + Sync)] {
        &self.values
    }
}

#[cfg(test)]
mod spec {
    use common::query::{self, Conjunction, Value};

    use crate::{
        domain::User,
        infra::database::{self, postgres},
    };

    use super::Statement;

    #[test]
    fn renders_positional_predicate() {
        let (predicate, params) = Conjunction::live::<User>()
            .contains("name", "name", Some("a"))
            .not_before("created_at", "from", Some("2024-01-01"))
            .into_parts();
        let mut stmt = Statement::new(&params);

        assert_eq!(
            stmt.predicate(&predicate).unwrap(),
            "deleted_at IS NULL \
             AND name LIKE $1::VARCHAR \
             AND created_at >= $2::VARCHAR::TIMESTAMPTZ",
        );
        assert_eq!(stmt.values().len(), 2);
    }

    #[test]
    fn reuses_position_of_same_name() {
        let (_, params) = Conjunction::live::<User>()
            .equals("id", "id", Value::Text("u1".into()))
            .into_parts();
        let mut stmt = Statement::new(&params);

        assert_eq!(stmt.bind("id").unwrap(), "$1::VARCHAR");
        assert_eq!(stmt.bind("id").unwrap(), "$1::VARCHAR");
        assert_eq!(stmt.values().len(), 1);
    }

    #[test]
    fn casts_integers() {
        let intent = query::Intent::<User>::new(
            Conjunction::live::<User>(),
            query::OrderBy::sanitize::<User>(None),
            query::Projection::all(),
            common::pagination::Arguments::default(),
        );
        let mut stmt = Statement::new(intent.params());

        assert_eq!(stmt.bind(query::LIMIT).unwrap(), "$1::INT8");
        assert_eq!(stmt.bind(query::OFFSET).unwrap(), "$2::INT8");
    }

    #[test]
    fn errors_on_unbound_name() {
        let params = query::Params::default();
        let mut stmt = Statement::new(&params);

        let err = stmt.bind("name").unwrap_err();
        assert!(matches!(
            err.as_ref(),
            database::Error::Postgres(postgres::Error::UnboundParameter(
                "name"
            )),
        ));
    }
}
