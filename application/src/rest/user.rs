//! REST API of [`User`]s.

use axum::{
    extract::{rejection::JsonRejection, Path, Query},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use service::{
    command,
    domain::user,
    query,
    read::user::{list, View},
    Command as _, Query as _,
};
use tracing as log;

use crate::{
    i18n::Lang,
    rest::{self, Reply},
    AsError as _, Service,
};

/// [`User`] as rendered by the REST API.
///
/// Fields that weren't selected are omitted.
#[derive(Debug, Default, Serialize)]
pub struct User {
    /// ID of this [`User`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Name of this [`User`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Email of this [`User`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Phone of this [`User`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Address of this [`User`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Creation time of this [`User`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Last modification time of this [`User`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<View> for User {
    fn from(view: View) -> Self {
        let View {
            id,
            name,
            email,
            phone,
            address,
            created_at,
            updated_at,
        } = view;

        Self {
            id: id.map(|v| v.to_string()),
            name: name.map(|v| v.to_string()),
            email: email.map(|v| v.to_string()),
            phone: phone.map(|v| v.to_string()),
            address: address.map(|v| v.to_string()),
            created_at: created_at.map(|v| v.to_rfc3339()),
            updated_at: updated_at.map(|v| v.to_rfc3339()),
        }
    }
}

impl From<user::User> for User {
    fn from(user: user::User) -> Self {
        View::from(user).into()
    }
}

/// Page of [`User`]s as rendered by the REST API.
#[derive(Debug, Serialize)]
pub struct List {
    /// One-based number of this page.
    pub page: i64,

    /// Requested number of [`User`]s per page.
    pub per_page: i64,

    /// Total number of pages.
    pub total_page: i64,

    /// Total number of [`User`]s on all the pages.
    pub total_data: i64,

    /// [`User`]s on this page.
    pub list: Vec<User>,
}

impl From<list::Page> for List {
    fn from(page: list::Page) -> Self {
        Self {
            page: page.page,
            per_page: page.per_page,
            total_page: page.total_pages,
            total_data: page.total_count,
            list: page.items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Request body of creating or updating a [`User`].
///
/// Missing fields are treated as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Payload {
    /// ID of a new [`User`], generated if empty.
    ///
    /// Ignored on update.
    pub id: Option<String>,

    /// Name of the [`User`].
    pub name: String,

    /// Email of the [`User`].
    pub email: String,

    /// Phone of the [`User`].
    pub phone: String,

    /// Address of the [`User`].
    pub address: String,
}

impl Payload {
    /// Splits this [`Payload`] into the provided [`user::Id`] and the
    /// [`user::Form`] to validate.
    fn into_parts(self) -> (Option<user::Id>, user::Form) {
        let Self {
            id,
            name,
            email,
            phone,
            address,
        } = self;

        (
            id.filter(|id| !id.is_empty()).map(Into::into),
            user::Form {
                name,
                email,
                phone,
                address,
            },
        )
    }
}

/// Query parameters of a single [`User`] request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Detail {
    /// Comma-separated list of fields to select.
    pub select_field: Option<String>,
}

/// Query parameters of a [`User`]s list request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Listing {
    /// Page number.
    pub page: Option<String>,

    /// Number of [`User`]s per page.
    pub per_page: Option<String>,

    /// Order as `column direction`.
    pub order_by: Option<String>,

    /// Comma-separated list of fields to select.
    pub select_field: Option<String>,

    /// Part of the name to search for.
    pub name: Option<String>,

    /// Part of the email to search for.
    pub email: Option<String>,

    /// Part of the phone to search for.
    pub phone: Option<String>,

    /// Earliest creation time, inclusive.
    pub created_at_start: Option<String>,

    /// Latest creation time, inclusive.
    pub created_at_end: Option<String>,
}

impl From<Listing> for list::Selector {
    fn from(listing: Listing) -> Self {
        let Listing {
            page,
            per_page,
            order_by,
            select_field,
            name,
            email,
            phone,
            created_at_start,
            created_at_end,
        } = listing;

        Self {
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
        }
    }
}

/// Extracts the JSON [`Payload`], rejecting a malformed one.
fn payload(
    lang: &Lang,
    body: Result<Json<Payload>, JsonRejection>,
) -> Result<Payload, Reply<()>> {
    body.map(|Json(p)| p).map_err(|e| {
        log::error!("can't get JSON body: {e}");
        Reply::error(lang, e.into_error())
    })
}

/// Creates a new [`User`].
#[tracing::instrument(skip_all, fields(http.handler = "user.create"))]
pub async fn create(
    Extension(service): Extension<Service>,
    lang: Lang,
    body: Result<Json<Payload>, JsonRejection>,
) -> rest::Result<User> {
    let (id, form) = payload(&lang, body)?.into_parts();

    let user = service
        .execute(command::CreateUser { id, form })
        .await
        .map_err(|e| Reply::error(&lang, e.into_error()))?;

    Ok(Reply::ok(
        http::StatusCode::CREATED,
        &lang,
        "Created data successful",
        Some(user.into()),
    ))
}

/// Returns a single live [`User`].
#[tracing::instrument(
    skip_all,
    fields(http.handler = "user.detail", id = %id),
)]
pub async fn detail(
    Extension(service): Extension<Service>,
    lang: Lang,
    Path(id): Path<String>,
    Query(Detail { select_field }): Query<Detail>,
) -> rest::Result<User> {
    let view = service
        .execute(query::user::ById {
            id: id.into(),
            select_field,
        })
        .await
        .map_err(|e| Reply::error(&lang, e.into_error()))?;

    Ok(Reply::ok(http::StatusCode::OK, &lang, "OK", Some(view.into())))
}

/// Returns a page of live [`User`]s.
#[tracing::instrument(skip_all, fields(http.handler = "user.list"))]
pub async fn list(
    Extension(service): Extension<Service>,
    lang: Lang,
    Query(listing): Query<Listing>,
) -> rest::Result<List> {
    let page = service
        .execute(query::users::List(listing.into()))
        .await
        .map_err(|e| Reply::error(&lang, e.into_error()))?;

    Ok(Reply::ok(http::StatusCode::OK, &lang, "OK", Some(page.into())))
}

/// Updates the profile of a live [`User`].
#[tracing::instrument(
    skip_all,
    fields(http.handler = "user.update", id = %id),
)]
pub async fn update(
    Extension(service): Extension<Service>,
    lang: Lang,
    Path(id): Path<String>,
    body: Result<Json<Payload>, JsonRejection>,
) -> rest::Result<User> {
    let (_, form) = payload(&lang, body)?.into_parts();

    let user = service
        .execute(command::UpdateUser {
            id: id.into(),
            form,
        })
        .await
        .map_err(|e| Reply::error(&lang, e.into_error()))?;

    Ok(Reply::ok(
        http::StatusCode::OK,
        &lang,
        "Updated data successful",
        Some(user.into()),
    ))
}

/// Tombstones a live [`User`].
#[tracing::instrument(
    skip_all,
    fields(http.handler = "user.delete", id = %id),
)]
pub async fn delete(
    Extension(service): Extension<Service>,
    lang: Lang,
    Path(id): Path<String>,
) -> rest::Result<()> {
    _ = service
        .execute(command::DeleteUser { id: id.into() })
        .await
        .map_err(|e| Reply::error(&lang, e.into_error()))?;

    Ok(Reply::ok(
        http::StatusCode::OK,
        &lang,
        "Deleted data successful",
        None,
    ))
}

#[cfg(test)]
mod spec {
    use axum::body::Body;
    use serde_json::json;

    use crate::spec::send;

    fn post(body: &'static str, lang: Option<&str>) -> http::Request<Body> {
        let mut req = http::Request::post("/api/v1/user")
            .header(http::header::CONTENT_TYPE, "application/json");
        if let Some(l) = lang {
            req = req.header(http::header::ACCEPT_LANGUAGE, l);
        }
        req.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn rejects_invalid_form() {
        let (status, body) =
            send(post(r#"{"name": "", "email": "john"}"#, None)).await;

        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "status": 400,
                "success": false,
                "messages": ["Name can't be empty", "Invalid email address"],
            }),
        );
    }

    #[tokio::test]
    async fn localizes_messages() {
        let (status, body) =
            send(post(r#"{"email": "john"}"#, Some("id-ID,id;q=0.9"))).await;

        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(
            body["messages"],
            json!(["Nama tidak boleh kosong", "Alamat email tidak valid"]),
        );
    }

    #[tokio::test]
    async fn rejects_malformed_body() {
        let (status, body) = send(post("{\"name\":", None)).await;

        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(
            body["messages"],
            json!(["Oops! Something went wrong with your request"]),
        );
    }

    #[tokio::test]
    async fn validates_update_before_store() {
        let (status, body) = send(
            http::Request::put("/api/v1/user/u1")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name": "John", "email": "@"}"#))
                .unwrap(),
        )
        .await;

        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body["messages"], json!(["Invalid email address"]));
    }

    #[tokio::test]
    async fn fails_unparsable_page_as_internal() {
        let (status, body) = send(
            http::Request::get("/api/v1/user?page=abc&per_page=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], 500);
        assert_eq!(body["messages"], json!(["Invalid `page` parameter"]));
    }

    #[tokio::test]
    async fn hides_store_failure() {
        let (status, body) = send(
            http::Request::get("/api/v1/user/u1")
                .header(http::header::ACCEPT_LANGUAGE, "id")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({
                "status": 500,
                "success": false,
                "messages": ["Ups! Terjadi kesalahan. Silakan coba lagi nanti"],
            }),
        );
    }
}
