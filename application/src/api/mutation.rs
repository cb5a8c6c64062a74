//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use service::{command, domain::user, Command as _};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `User`.
    ///
    /// Absent arguments are treated as empty.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `VALIDATION_FAILED` - `name` is empty or `email` is invalid.
    #[tracing::instrument(
        skip_all,
        fields(
            email = ?email,
            gql.name = "createUser",
            name = ?name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user(
        name: Option<String>,
        phone: Option<String>,
        email: Option<String>,
        address: Option<String>,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(command::CreateUser {
                id: None,
                form: form(name, phone, email, address),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the profile of the live `User` with the specified ID.
    ///
    /// Absent arguments are treated as empty.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `VALIDATION_FAILED` - `name` is empty or `email` is invalid;
    /// - `USER_NOT_FOUND` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            email = ?email,
            gql.name = "updateUser",
            id = %id,
            name = ?name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_user(
        id: api::user::Id,
        name: Option<String>,
        phone: Option<String>,
        email: Option<String>,
        address: Option<String>,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(command::UpdateUser {
                id: id.into(),
                form: form(name, phone, email, address),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the live `User` with the specified ID, returning the ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_FOUND` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteUser",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_user(
        id: api::user::Id,
        ctx: &Context,
    ) -> Result<String, Error> {
        ctx.service()
            .execute(command::DeleteUser { id: id.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|id| id.to_string())
    }
}

/// Collects the provided arguments into a [`user::Form`].
fn form(
    name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
) -> user::Form {
    user::Form {
        name: name.unwrap_or_default(),
        email: email.unwrap_or_default(),
        phone: phone.unwrap_or_default(),
        address: address.unwrap_or_default(),
    }
}
