//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, read::user::list, Query as _};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the live `User` with the specified ID.
    ///
    /// `selectField` is a comma-separated list of the fields to fetch,
    /// unknown ones are ignored.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_FOUND` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "user",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn user(
        id: api::user::Id,
        select_field: Option<String>,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(query::user::ById {
                id: id.into(),
                select_field,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of live `User`s.
    ///
    /// `page` and `perPage` are integers, non-positive or absent ones fall
    /// back to the first page of 10 `User`s. `orderBy` is a
    /// `column [ASC|DESC]` pair, defaulting to `created_at DESC`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_PAGINATION_PARAMETER` - `page` or `perPage` is not an
    ///                                    integer.
    #[expect(clippy::too_many_arguments, reason = "GraphQL arguments")]
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "users",
            order_by = ?order_by,
            otel.name = Self::SPAN_NAME,
            page = ?page,
            per_page = ?per_page,
        ),
    )]
    pub async fn users(
        page: Option<String>,
        per_page: Option<String>,
        order_by: Option<String>,
        name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
        created_at_start: Option<String>,
        created_at_end: Option<String>,
        select_field: Option<String>,
        ctx: &Context,
    ) -> Result<api::user::List, Error> {
        let selector = list::Selector {
            filter: list::Filter {
                name,
                email,
                phone,
                created_at_start,
                created_at_end,
            },
            order_by,
            page,
            per_page,
            select_field,
        };

        ctx.service()
            .execute(query::users::List(selector))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}
