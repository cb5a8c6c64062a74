//! REST API definitions.

pub mod user;

use std::sync::Arc;

use axum::{
    response::{IntoResponse, Response},
    Extension, Json,
};
use common::DateTime;
use serde::Serialize;

use crate::{i18n::Lang, Error};

/// Envelope of every REST API response.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    /// HTTP status code of the response.
    pub status: u16,

    /// Indicator whether the request succeeded.
    pub success: bool,

    /// Localized messages describing the outcome.
    pub messages: Vec<String>,

    /// Payload of a successful response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// REST API response, carrying its [`Envelope`].
#[derive(Debug)]
pub struct Reply<T> {
    /// [`http::StatusCode`] of this [`Reply`].
    status_code: http::StatusCode,

    /// [`Envelope`] of this [`Reply`].
    envelope: Envelope<T>,
}

impl<T> Reply<T> {
    /// Creates a new successful [`Reply`] with the provided `data`.
    ///
    /// The `message` is translated into the requested [`Lang`].
    #[must_use]
    pub fn ok(
        status_code: http::StatusCode,
        lang: &Lang,
        message: &str,
        data: Option<T>,
    ) -> Self {
        Self {
            status_code,
            envelope: Envelope {
                status: status_code.as_u16(),
                success: true,
                messages: vec![lang.translate(message)],
                data,
            },
        }
    }
}

impl Reply<()> {
    /// Creates a new failed [`Reply`] out of the provided [`Error`].
    ///
    /// Messages of the [`Error`] are translated into the requested [`Lang`].
    #[must_use]
    pub fn error(lang: &Lang, err: Error) -> Self {
        Self {
            status_code: err.status_code,
            envelope: Envelope {
                status: err.status_code.as_u16(),
                success: false,
                messages: err
                    .messages
                    .iter()
                    .map(|m| lang.translate(m))
                    .collect(),
                data: None,
            },
        }
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        (self.status_code, Json(self.envelope)).into_response()
    }
}

/// Result of a REST API handler.
pub type Result<T> = std::result::Result<Reply<T>, Reply<()>>;

/// Liveness report of the running server.
#[derive(Clone, Debug, Serialize)]
pub struct Ping {
    /// [`DateTime`] the server started at, in [RFC 3339] format.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub start_time: String,

    /// Version and run mode of the server.
    pub message: String,
}

impl Ping {
    /// Creates a new [`Ping`] of the server started now in the provided
    /// `run_mode`.
    #[must_use]
    pub fn new(run_mode: &str) -> Self {
        Self {
            start_time: DateTime::now().to_rfc3339(),
            message: format!(
                "Version {} run on {run_mode} mode",
                env!("CARGO_PKG_VERSION"),
            ),
        }
    }
}

/// Ping handler.
#[expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]
pub async fn ping(Extension(ping): Extension<Arc<Ping>>) -> Json<Ping> {
    Json(Ping::clone(&ping))
}
