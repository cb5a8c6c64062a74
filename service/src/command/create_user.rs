//! [`Command`] for creating a new [`User`].

use common::{operations::Insert, DateTime};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// ID of a new [`User`], generated if not provided.
    pub id: Option<user::Id>,

    /// [`user::Form`] of a new [`User`].
    pub form: user::Form,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: Database<Insert<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser { id, form } = cmd;

        let profile =
            form.validate().map_err(tracerr::from_and_wrap!(=> E))?;

        let user = User::new(
            id.unwrap_or_else(user::Id::new),
            profile,
            DateTime::now().coerce(),
        );

        self.database()
            .execute(Insert(user.clone()))
            .await
            .inspect_err(|e| log::error!("failed to create `User`: {e}"))
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`user::Form`] is invalid.
    #[display("{_0}")]
    Invalid(user::InvalidForm),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::user::{self, Lifecycle, Violation},
        infra::database::{
            self,
            mock::{Call, Mock, Op},
        },
        Service,
    };

    use super::{Command as _, CreateUser, ExecutionError};

    fn form(name: &str, email: &str) -> user::Form {
        user::Form {
            name: name.into(),
            email: email.into(),
            phone: "+62 812 0000 0000".into(),
            address: "Jl. Sudirman 1".into(),
        }
    }

    #[tokio::test]
    async fn creates_live_user_with_generated_id() {
        let svc = Service::new(Mock::default());

        let user = svc
            .execute(CreateUser {
                id: None,
                form: form("Tom", "tom@example.com"),
            })
            .await
            .unwrap();

        assert!(!user.id.as_ref().is_empty());
        assert_eq!(user.name.as_ref(), "Tom");
        assert_eq!(user.lifecycle, Lifecycle::Live);
        assert_eq!(user.created_at, user.updated_at.coerce());
        assert_eq!(svc.database().calls(), vec![Call::Insert(user.id.clone())]);
        assert_eq!(svc.database().users().len(), 1);
    }

    #[tokio::test]
    async fn keeps_provided_id() {
        let svc = Service::new(Mock::default());

        let user = svc
            .execute(CreateUser {
                id: Some(user::Id::from("custom")),
                form: form("Tom", "tom@example.com"),
            })
            .await
            .unwrap();

        assert_eq!(user.id, user::Id::from("custom"));
    }

    #[tokio::test]
    async fn rejects_invalid_form_without_touching_database() {
        let svc = Service::new(Mock::default());

        let err = svc
            .execute(CreateUser {
                id: None,
                form: form("", "not-an-email"),
            })
            .await
            .unwrap_err();

        let ExecutionError::Invalid(invalid) = err.as_ref() else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(
            invalid.violations(),
            &[Violation::EmptyName, Violation::InvalidEmail],
        );
        assert!(svc.database().calls().is_empty());
    }

    #[tokio::test]
    async fn surfaces_database_failure() {
        let svc = Service::new(Mock::default().failing(Op::Insert));

        let err = svc
            .execute(CreateUser {
                id: None,
                form: form("Tom", "tom@example.com"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Db(database::Error::Mocked),
        ));
    }
}
