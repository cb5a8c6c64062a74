//! [`Error`]-related definitions.

use std::fmt;

use axum::extract::rejection::JsonRejection;
use common::pagination::ParameterError;
use derive_more::Error as StdError;
use itertools::Itertools as _;
use juniper::IntoFieldError;
use service::{command, domain::user, infra::database, query};
use tracerr::{Trace, Traced};

/// Message shown instead of the details of an internal failure.
pub const INTERNAL_MESSAGE: &str =
    "Oops! Something went wrong. Please try again later";

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            messages: vec![$message.to_owned()],
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "User not found"]
        NotFound,
    }
}

define_error! {
    enum RequestError {
        #[code = "BAD_REQUEST"]
        #[status = BAD_REQUEST]
        #[message = "Oops! Something went wrong with your request"]
        Malformed,
    }
}

/// API [`Error`], rendered by both REST and GraphQL APIs.
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] messages, to be localized before rendering.
    pub messages: Vec<String>,
}

impl Error {
    /// Creates a new [`Error`] representing an internal server error.
    ///
    /// Details of the failure are never exposed, so the caller is expected to
    /// log them.
    #[must_use]
    pub fn internal() -> Self {
        Self {
            code: "INTERNAL_SERVER_ERROR",
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            messages: vec![INTERNAL_MESSAGE.to_owned()],
            backtrace: None,
        }
    }

    /// Maps every message of this [`Error`] with the provided function.
    #[must_use]
    pub fn map_messages(mut self, f: impl FnMut(String) -> String) -> Self {
        self.messages = self.messages.into_iter().map(f).collect();
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            messages,
        } = self;

        write!(
            f,
            "[{code}]: {}{}",
            messages.iter().join("; "),
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

impl<S> IntoFieldError<S> for Error
where
    S: From<String>,
{
    fn into_field_error(self) -> juniper::FieldError<S> {
        let mut ext = juniper::Object::with_capacity(2);
        drop(
            ext.add_field("code", juniper::Value::scalar(self.code.to_owned())),
        );
        drop(
            ext.add_field(
                "messages",
                juniper::Value::list(
                    self.messages
                        .iter()
                        .map(|m| juniper::Value::scalar(m.clone()))
                        .collect(),
                ),
            ),
        );
        juniper::FieldError::new(
            self.messages.iter().join("; "),
            juniper::Value::object(ext),
        )
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    ///
    /// Unclassified errors become [`Error::internal()`].
    fn as_error(&self) -> Error {
        self.try_as_error().unwrap_or_else(Error::internal)
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }

    fn as_error(&self) -> Error {
        let mut error = self.as_ref().as_error();
        error.backtrace = Some(self.trace().clone());
        error
    }
}

impl AsError for JsonRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(RequestError::Malformed.into())
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for user::InvalidForm {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "VALIDATION_FAILED",
            status_code: http::StatusCode::BAD_REQUEST,
            messages: self.violations().iter().map(ToString::to_string).collect(),
            backtrace: None,
        })
    }
}

impl AsError for ParameterError {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "INVALID_PAGINATION_PARAMETER",
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            messages: vec![self.to_string()],
            backtrace: None,
        })
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(UserError::NotFound.into()),
        }
    }
}

impl AsError for command::delete_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(UserError::NotFound.into()),
        }
    }
}

impl AsError for query::user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(UserError::NotFound.into()),
        }
    }
}

impl AsError for query::users::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Pagination(e) => e.try_as_error(),
        }
    }
}

#[cfg(test)]
mod spec {
    use common::pagination;
    use service::{
        command,
        domain::user::{self, Violation},
        infra::{database, postgres},
        query,
    };

    use super::{AsError as _, Error, INTERNAL_MESSAGE};

    #[test]
    fn maps_validation_failure() {
        let err = command::create_user::ExecutionError::Invalid(
            user::InvalidForm(vec![Violation::EmptyName, Violation::InvalidEmail]),
        )
        .as_error();

        assert_eq!(err.code, "VALIDATION_FAILED");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        assert_eq!(
            err.messages,
            ["Name can't be empty", "Invalid email address"],
        );
    }

    #[test]
    fn maps_missing_user() {
        let id = user::Id::from("u1");
        let errors = [
            command::update_user::ExecutionError::UserNotExists(id.clone())
                .as_error(),
            command::delete_user::ExecutionError::UserNotExists(id.clone())
                .as_error(),
            query::user::ExecutionError::UserNotExists(id).as_error(),
        ];

        for err in errors {
            assert_eq!(err.code, "USER_NOT_FOUND");
            assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);
            assert_eq!(err.messages, ["User not found"]);
        }
    }

    #[test]
    fn maps_pagination_failure_to_internal_status() {
        let err = pagination::Arguments::parse(Some("abc"), None).unwrap_err();
        let err = query::users::ExecutionError::Pagination(err).as_error();

        assert_eq!(err.code, "INVALID_PAGINATION_PARAMETER");
        assert_eq!(err.status_code, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.messages, ["Invalid `page` parameter"]);
    }

    #[test]
    fn hides_database_details() {
        let err = tracerr::new!(query::users::ExecutionError::Db(
            database::Error::Postgres(postgres::Error::UnboundParameter(
                "name"
            )),
        ))
        .as_error();

        assert_eq!(err.code, "INTERNAL_SERVER_ERROR");
        assert_eq!(err.status_code, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.messages, [INTERNAL_MESSAGE]);
        assert!(err.backtrace.is_some());
    }

    #[test]
    fn translates_messages() {
        let err = Error::internal().map_messages(|m| m.to_uppercase());

        assert_eq!(err.messages, [INTERNAL_MESSAGE.to_uppercase()]);
    }
}
