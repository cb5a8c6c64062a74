//! [`Command`] for updating a [`User`].

use common::{
    operations::{By, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for overwriting a [`user::Profile`] of a live [`User`].
#[derive(Clone, Debug)]
pub struct UpdateUser {
    /// ID of the [`User`] to update.
    pub id: user::Id,

    /// New [`user::Form`] of the [`User`].
    pub form: user::Form,
}

impl<Db> Command<UpdateUser> for Service<Db>
where
    Db: Database<
        Update<By<Option<User>, user::Edit>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateUser { id, form } = cmd;

        let profile =
            form.validate().map_err(tracerr::from_and_wrap!(=> E))?;

        self.database()
            .execute(Update(By::new(user::Edit {
                id: id.clone(),
                profile,
                at: DateTime::now().coerce(),
            })))
            .await
            .inspect_err(|e| log::error!("failed to update `User({id})`: {e}"))
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`UpdateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`user::Form`] is invalid.
    #[display("{_0}")]
    Invalid(user::InvalidForm),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}
