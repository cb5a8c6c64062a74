//! Application provides REST and GraphQL APIs for interacting with the
//! [`Service`].

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod args;
pub mod config;
mod context;
pub mod error;
pub mod i18n;
pub mod rest;

use std::sync::Arc;

use axum::{
    response::{IntoResponse, Response},
    routing::{get, on, MethodFilter},
    Extension, Json, Router,
};
use derive_more::Debug;
use http::{header, HeaderValue, Method};
use juniper::{http::GraphQLBatchResponse, DefaultScalarValue, ScalarValue};
use juniper_axum::{extract::JuniperRequest, graphiql};
use tower_http::cors::{AllowOrigin, CorsLayer};
// Used in binary.
use axum_client_ip as _;
use tokio as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    context::Context,
    error::{AsError, Error},
};

/// [`Service`] with filled infrastructure dependencies.
///
/// [`Service`]: service::Service
pub type Service = service::Service<service::infra::Postgres>;

/// [`juniper`] GraphQL response.
#[derive(Debug)]
pub struct JuniperResponse<S = DefaultScalarValue>
where
    S: ScalarValue,
{
    /// Status code of the response.
    pub status_code: http::StatusCode,

    /// Underlying GraphQL response.
    #[debug(skip)]
    pub response: GraphQLBatchResponse<S>,
}

impl<S> IntoResponse for JuniperResponse<S>
where
    S: ScalarValue,
{
    fn into_response(self) -> Response {
        let Self {
            status_code,
            response,
        } = self;

        if response.is_ok() {
            Json(response).into_response()
        } else {
            (status_code, Json(response)).into_response()
        }
    }
}

/// GraphQL API handler.
pub async fn graphql(
    Extension(schema): Extension<Arc<api::Schema>>,
    context: Context,
    JuniperRequest(gql_request): JuniperRequest,
) -> JuniperResponse {
    let response = gql_request.execute(&*schema, &context).await;
    JuniperResponse {
        status_code: context.error_status_code(),
        response,
    }
}

/// Builds the [`CorsLayer`] allowing the provided `origins`.
///
/// `*` among the `origins` allows any origin.
///
/// # Errors
///
/// If any of the `origins` is not a valid header value.
pub fn cors(
    origins: &[String],
) -> Result<CorsLayer, http::header::InvalidHeaderValue> {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .map(|o| o.parse::<HeaderValue>())
                .collect::<Result<Vec<_>, _>>()?,
        )
    };

    Ok(CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ACCEPT_LANGUAGE, header::CONTENT_TYPE])
        .allow_origin(allow_origin))
}

/// Builds the [`Router`] serving both REST and GraphQL APIs on top of the
/// provided [`Service`].
///
/// # Errors
///
/// If any of the configured CORS origins is not a valid header value.
pub fn app(
    service: Service,
    catalog: i18n::Catalog,
    server: &config::Server,
) -> Result<Router, http::header::InvalidHeaderValue> {
    Ok(Router::new()
        .route("/", get(rest::ping))
        .route("/ping", get(rest::ping))
        .route(
            "/api/v1/user",
            get(rest::user::list).post(rest::user::create),
        )
        .route(
            "/api/v1/user/:id",
            get(rest::user::detail)
                .put(rest::user::update)
                .delete(rest::user::delete),
        )
        .route(
            "/graphql",
            on(MethodFilter::GET.or(MethodFilter::POST), graphql),
        )
        .route("/graphiql", get(graphiql("/graphql", None::<&str>)))
        .layer(Extension(Arc::new(api::schema())))
        .layer(Extension(Arc::new(catalog)))
        .layer(Extension(Arc::new(rest::Ping::new(&server.run_mode))))
        .layer(Extension(service))
        .layer(cors(&server.cors.origins)?))
}
