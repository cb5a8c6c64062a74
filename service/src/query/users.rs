//! [`Query`] collection related to the multiple [`User`]s.

use common::{
    operations::{By, Select},
    pagination::{Page, ParameterError},
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    infra::{database, Database},
    read::user::{
        list::{Intent, Selector, TotalCount},
        View,
    },
    Service,
};

use super::Query;

/// Queries a page of live [`User`]s along with their total count.
///
/// The count is queried with the same filter, but only once the page itself
/// is fetched successfully.
#[derive(Clone, Debug, From)]
pub struct List(pub Selector);

impl<Db> Query<List> for Service<Db>
where
    Db: for<'i> Database<
            Select<By<Vec<View>, &'i Intent>>,
            Ok = Vec<View>,
            Err = Traced<database::Error>,
        > + for<'i> Database<
            Select<By<TotalCount, &'i Intent>>,
            Ok = TotalCount,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Page<View>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, List(selector): List) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let intent =
            selector.intent().map_err(tracerr::from_and_wrap!(=> E))?;

        let views = self
            .database()
            .execute(Select(By::<Vec<View>, _>::new(&intent)))
            .await
            .inspect_err(|e| log::error!("failed to list `User`s: {e}"))
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let total = self
            .database()
            .execute(Select(By::<TotalCount, _>::new(&intent)))
            .await
            .inspect_err(|e| log::error!("failed to count `User`s: {e}"))
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Page::new(intent.pagination(), views, total.into()))
    }
}

/// Error of [`List`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Pagination token is not an integer.
    #[display("{_0}")]
    Pagination(ParameterError),
}
