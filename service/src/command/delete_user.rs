//! [`Command`] for deleting a [`User`].

use common::{
    operations::{By, Delete, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    read::user::{ById, Column, View},
    Service,
};

use super::Command;

/// [`Command`] for tombstoning a live [`User`].
#[derive(Clone, Debug)]
pub struct DeleteUser {
    /// ID of the [`User`] to delete.
    pub id: user::Id,
}

impl<Db> Command<DeleteUser> for Service<Db>
where
    Db: Database<
            Select<By<Option<View>, ById>>,
            Ok = Option<View>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<User, user::Tombstone>>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = user::Id;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteUser { id } = cmd;

        let exists = self
            .database()
            .execute(Select(By::new(ById::new(
                id.clone(),
                Some(Column::Id.as_ref()),
            ))))
            .await
            .inspect_err(|e| log::error!("failed to find `User({id})`: {e}"))
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .is_some();
        if !exists {
            return Err(tracerr::new!(E::UserNotExists(id)));
        }

        self.database()
            .execute(Delete(By::new(user::Tombstone {
                id: id.clone(),
                at: DateTime::now().coerce(),
            })))
            .await
            .inspect_err(|e| log::error!("failed to delete `User({id})`: {e}"))
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(id)
    }
}

/// Error of [`DeleteUser`] [`Command`] execution.
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

#[cfg(test)]
mod spec {
    use crate::{
        domain::user::{self, Lifecycle},
        infra::database::mock::{self, Call, Mock, Op},
        Service,
    };

    use super::{Command as _, DeleteUser, ExecutionError};

    #[tokio::test]
    async fn tombstones_existing_user() {
        let svc = Service::new(Mock::with_users([mock::user("u1", "Tom")]));

        let id = svc
            .execute(DeleteUser {
                id: user::Id::from("u1"),
            })
            .await
            .unwrap();

        assert_eq!(id, user::Id::from("u1"));
        assert_eq!(
            svc.database().calls(),
            vec![Call::Detail(id.clone()), Call::Tombstone(id)],
        );
        assert!(matches!(
            svc.database().users()[0].lifecycle,
            Lifecycle::Tombstoned(_),
        ));
    }

    #[tokio::test]
    async fn reports_missing_user_without_tombstoning() {
        let svc = Service::new(Mock::default());

        let err = svc
            .execute(DeleteUser {
                id: user::Id::from("ghost"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UserNotExists(_)));
        assert_eq!(
            svc.database().calls(),
            vec![Call::Detail(user::Id::from("ghost"))],
        );
    }

    #[tokio::test]
    async fn treats_tombstoned_user_as_missing() {
        let svc = Service::new(Mock::with_users([mock::user("u1", "Tom")]));
        let delete = || DeleteUser {
            id: user::Id::from("u1"),
        };

        _ = svc.execute(delete()).await.unwrap();
        let err = svc.execute(delete()).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UserNotExists(_)));
    }

    #[tokio::test]
    async fn surfaces_lookup_failure() {
        let svc = Service::new(
            Mock::with_users([mock::user("u1", "Tom")]).failing(Op::Detail),
        );

        let err = svc
            .execute(DeleteUser {
                id: user::Id::from("u1"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Db(_)));
        assert_eq!(svc.database().calls().len(), 1);
    }
}
