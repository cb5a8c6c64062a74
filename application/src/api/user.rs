//! [`User`]-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::{
    domain,
    read::user::{list, View},
};

use crate::Context;

/// A [`User`] of the system, with only the selected fields present.
#[derive(Clone, Debug, From)]
pub struct User(View);

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        Self(user.into())
    }
}

/// A `User` of the system.
///
/// Fields that weren't selected are `null`.
#[graphql_object(context = Context)]
impl User {
    /// Unique identifier of this `User`.
    pub fn id(&self) -> Option<Id> {
        self.0.id.clone().map(Into::into)
    }

    /// Name of this `User`.
    pub fn name(&self) -> Option<String> {
        self.0.name.as_ref().map(ToString::to_string)
    }

    /// Email of this `User`.
    pub fn email(&self) -> Option<String> {
        self.0.email.as_ref().map(ToString::to_string)
    }

    /// Phone of this `User`.
    pub fn phone(&self) -> Option<String> {
        self.0.phone.as_ref().map(ToString::to_string)
    }

    /// Address of this `User`.
    pub fn address(&self) -> Option<String> {
        self.0.address.as_ref().map(ToString::to_string)
    }

    /// `DateTime` when this `User` was created.
    pub fn created_at(&self) -> Option<DateTime> {
        self.0.created_at.map(|at| at.coerce())
    }

    /// `DateTime` when this `User` was last modified.
    pub fn updated_at(&self) -> Option<DateTime> {
        self.0.updated_at.map(|at| at.coerce())
    }
}

/// ID of a `User`.
#[derive(Clone, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq)]
#[graphql(name = "UserId", transparent)]
pub struct Id(String);

impl From<domain::user::Id> for Id {
    fn from(id: domain::user::Id) -> Self {
        Self(id.to_string())
    }
}

impl From<Id> for domain::user::Id {
    fn from(id: Id) -> Self {
        id.0.into()
    }
}

/// Page of [`User`]s.
#[derive(Clone, Debug, From)]
pub struct List(list::Page);

/// Page of `User`s.
#[graphql_object(name = "UserList", context = Context)]
impl List {
    /// One-based number of this page.
    pub fn page(&self) -> i32 {
        saturate(self.0.page)
    }

    /// Requested number of `User`s per page.
    pub fn per_page(&self) -> i32 {
        saturate(self.0.per_page)
    }

    /// Total number of pages.
    pub fn total_page(&self) -> i32 {
        saturate(self.0.total_pages)
    }

    /// Total number of `User`s on all the pages.
    pub fn total_data(&self) -> i32 {
        saturate(self.0.total_count)
    }

    /// `User`s on this page.
    pub fn list(&self) -> Vec<User> {
        self.0.items.iter().cloned().map(User).collect()
    }
}

/// Fits the provided number into a GraphQL `Int`.
fn saturate(n: i64) -> i32 {
    i32::try_from(n).unwrap_or(if n < 0 { i32::MIN } else { i32::MAX })
}
