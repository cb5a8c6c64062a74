//! In-memory [`Database`] recording every operation it executes.

use std::sync::Mutex;

use common::{
    operations::{By, Delete, Insert, Select, Update},
    query::Params,
};
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, Lifecycle},
        User,
    },
    infra::database::{self, Database},
    read::user::{list, ById, View},
};

/// Operation executed by a [`Mock`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Op {
    Detail,
    Fetch,
    Count,
    Insert,
    Update,
    Tombstone,
}

/// Recorded call to a [`Mock`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Call {
    Detail(user::Id),
    Fetch {
        predicate: String,
        params: Params,
        order_by: String,
    },
    Count {
        predicate: String,
        params: Params,
    },
    Insert(user::Id),
    Update(user::Id),
    Tombstone(user::Id),
}

/// In-memory [`Database`] of [`User`]s.
///
/// Ignores predicates, returning every live [`User`] for a list.
#[derive(Debug, Default)]
pub(crate) struct Mock {
    /// Stored [`User`]s.
    users: Mutex<Vec<User>>,

    /// [`Call`]s executed so far.
    calls: Mutex<Vec<Call>>,

    /// [`Op`] failing once called.
    failing: Option<Op>,
}

impl Mock {
    /// Creates a new [`Mock`] storing the provided [`User`]s.
    pub(crate) fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: Mutex::new(users.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Makes the provided [`Op`] fail.
    pub(crate) fn failing(mut self, op: Op) -> Self {
        self.failing = Some(op);
        self
    }

    /// Returns the [`Call`]s executed so far.
    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the stored [`User`]s.
    pub(crate) fn users(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    /// Records the provided [`Call`] of the [`Op`], failing if required.
    fn record(&self, op: Op, call: Call) -> Result<(), Traced<database::Error>> {
        self.calls.lock().unwrap().push(call);
        if self.failing == Some(op) {
            return Err(tracerr::new!(database::Error::Mocked));
        }
        Ok(())
    }

    /// Returns the live [`User`]s.
    fn live(&self) -> Vec<User> {
        self.users()
            .into_iter()
            .filter(|u| u.lifecycle == Lifecycle::Live)
            .collect()
    }
}

impl Database<Select<By<Option<View>, ById>>> for Mock {
    type Ok = Option<View>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<View>, ById>>,
    ) -> Result<Self::Ok, Self::Err> {
        let by_id = by.into_inner();
        self.record(Op::Detail, Call::Detail(by_id.id.clone()))?;

        Ok(self
            .live()
            .iter()
            .find(|u| u.id == by_id.id)
            .map(|u| View::project(u, by_id.projection.fields())))
    }
}

impl<'i> Database<Select<By<Vec<View>, &'i list::Intent>>> for Mock {
    type Ok = Vec<View>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<View>, &'i list::Intent>>,
    ) -> Result<Self::Ok, Self::Err> {
        let intent = by.into_inner();
        self.record(
            Op::Fetch,
            Call::Fetch {
                predicate: intent.predicate().to_string(),
                params: intent.params().clone(),
                order_by: intent.order_by().to_string(),
            },
        )?;

        Ok(self
            .live()
            .iter()
            .skip(usize::try_from(intent.offset()).unwrap())
            .take(usize::try_from(intent.limit()).unwrap())
            .map(|u| View::project(u, intent.projection().fields()))
            .collect())
    }
}

impl<'i> Database<Select<By<list::TotalCount, &'i list::Intent>>> for Mock {
    type Ok = list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::TotalCount, &'i list::Intent>>,
    ) -> Result<Self::Ok, Self::Err> {
        let intent = by.into_inner();
        self.record(
            Op::Count,
            Call::Count {
                predicate: intent.predicate().to_string(),
                params: intent.count_params().clone(),
            },
        )?;

        Ok(i64::try_from(self.live().len()).unwrap().into())
    }
}

impl Database<Insert<User>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.record(Op::Insert, Call::Insert(user.id.clone()))?;

        self.users.lock().unwrap().push(user);
        Ok(())
    }
}

impl Database<Update<By<Option<User>, user::Edit>>> for Mock {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(by): Update<By<Option<User>, user::Edit>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user::Edit { id, profile, at } = by.into_inner();
        self.record(Op::Update, Call::Update(id.clone()))?;

        let mut users = self.users.lock().unwrap();
        Ok(users
            .iter_mut()
            .find(|u| u.id == id && u.lifecycle == Lifecycle::Live)
            .map(|u| {
                u.name = profile.name;
                u.email = profile.email;
                u.phone = profile.phone;
                u.address = profile.address;
                u.updated_at = at;
                u.clone()
            }))
    }
}

impl Database<Delete<By<User, user::Tombstone>>> for Mock {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, user::Tombstone>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user::Tombstone { id, at } = by.into_inner();
        self.record(Op::Tombstone, Call::Tombstone(id.clone()))?;

        let mut users = self.users.lock().unwrap();
        if let Some(u) = users
            .iter_mut()
            .find(|u| u.id == id && u.lifecycle == Lifecycle::Live)
        {
            u.lifecycle = Lifecycle::Tombstoned(at);
        }
        Ok(())
    }
}

/// Creates a new live [`User`] with the provided `id` and `name`.
pub(crate) fn user(id: &str, name: &str) -> User {
    User::new(
        user::Id::from(id),
        user::Form {
            name: name.into(),
            email: format!("{id}@example.com"),
            phone: "+62 812 0000 0000".into(),
            address: "Jl. Sudirman 1".into(),
        }
        .validate()
        .unwrap(),
        common::DateTime::now().coerce(),
    )
}
