//! [`Query`] collection related to a single [`User`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::user,
    infra::{database, Database},
    read,
    Service,
};

use super::Query;

/// Queries a live [`User`] by its [`user::Id`].
#[derive(Clone, Debug)]
pub struct ById {
    /// [`user::Id`] of the [`User`].
    pub id: user::Id,

    /// Raw comma-separated list of [`read::user::Column`]s to select.
    pub select_field: Option<String>,
}

impl<Db> Query<ById> for Service<Db>
where
    Db: Database<
        Select<By<Option<read::user::View>, read::user::ById>>,
        Ok = Option<read::user::View>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = read::user::View;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: ById) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ById { id, select_field } = query;

        self.database()
            .execute(Select(By::new(read::user::ById::new(
                id.clone(),
                select_field.as_deref(),
            ))))
            .await
            .inspect_err(|e| log::error!("failed to find `User({id})`: {e}"))
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`ById`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}
