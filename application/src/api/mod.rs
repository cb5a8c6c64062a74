//! GraphQL API definitions.

mod mutation;
mod query;
pub mod user;

use juniper::EmptySubscription;

use crate::Context;

pub use self::{mutation::Mutation, query::Query, user::User};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

/// Creates a new [`Schema`].
#[must_use]
pub fn schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}

#[cfg(test)]
mod spec {
    use axum::body::Body;
    use serde_json::json;

    use crate::spec::send;

    fn gql(query: &str, lang: Option<&str>) -> http::Request<Body> {
        let mut req = http::Request::post("/graphql")
            .header(http::header::CONTENT_TYPE, "application/json");
        if let Some(l) = lang {
            req = req.header(http::header::ACCEPT_LANGUAGE, l);
        }
        req.body(Body::from(json!({ "query": query }).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn rejects_invalid_form() {
        let (status, body) = send(gql(
            r#"mutation { createUser(name: "", email: "john") { id } }"#,
            None,
        ))
        .await;

        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body["data"], json!(null));
        assert_eq!(
            body["errors"][0]["extensions"]["code"],
            "VALIDATION_FAILED",
        );
        assert_eq!(
            body["errors"][0]["extensions"]["messages"],
            json!(["Name can't be empty", "Invalid email address"]),
        );
    }

    #[tokio::test]
    async fn localizes_messages() {
        let (_, body) = send(gql(
            r#"mutation { updateUser(id: "u1", name: "John", email: "@") {
                id
            } }"#,
            Some("id"),
        ))
        .await;

        assert_eq!(
            body["errors"][0]["extensions"]["messages"],
            json!(["Alamat email tidak valid"]),
        );
        assert_eq!(body["errors"][0]["message"], "Alamat email tidak valid");
    }

    #[tokio::test]
    async fn fails_unparsable_page_as_internal() {
        let (status, body) = send(gql(
            r#"{ users(page: "1", perPage: "ten") { totalData } }"#,
            None,
        ))
        .await;

        assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["errors"][0]["extensions"]["code"],
            "INVALID_PAGINATION_PARAMETER",
        );
        assert_eq!(
            body["errors"][0]["extensions"]["messages"],
            json!(["Invalid `per_page` parameter"]),
        );
    }

    #[tokio::test]
    async fn hides_store_failure() {
        let (status, body) =
            send(gql(r#"{ user(id: "u1") { name } }"#, None)).await;

        assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["errors"][0]["extensions"]["code"],
            "INTERNAL_SERVER_ERROR",
        );
        assert_eq!(
            body["errors"][0]["message"],
            "Oops! Something went wrong. Please try again later",
        );
    }
}
