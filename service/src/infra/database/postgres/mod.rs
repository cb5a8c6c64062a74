//! Postgres [`Database`] implementation.
//!
//! Reads are served by a replica, while writes go to a primary.

pub mod connection;
mod impls;
mod statement;

use deadpool_postgres::Runtime;
use derive_more::{Display, Error as StdError, From};
use tokio_postgres::NoTls;
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

pub use deadpool_postgres::{
    Config as PoolConfig, PoolConfig as PoolLimits, Timeouts,
};

pub use self::{connection::Connection, statement::Statement};

/// [`Postgres`] configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Configuration of the primary (write) pool.
    pub primary: PoolConfig,

    /// Configuration of the replica (read) pool.
    pub replica: PoolConfig,
}

/// Postgres [`Database`] client.
#[derive(Clone, Debug)]
pub struct Postgres {
    /// [`connection::Pool`] of the primary database, serving writes.
    primary: connection::Pool,

    /// [`connection::Pool`] of the replica database, serving reads.
    replica: connection::Pool,
}

impl Postgres {
    /// Creates a new [`Postgres`] client with the provided [`Config`].
    ///
    /// No connection is established until the first operation.
    ///
    /// # Errors
    ///
    /// If failed to create any of the [`connection::Pool`]s.
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        let pool = |conf: &PoolConfig| -> Result<
            connection::Pool,
            Traced<database::Error>,
        > {
            conf.create_pool(Some(Runtime::Tokio1), NoTls)
                .map_err(tracerr::from_and_wrap!(=> Error))
                .map_err(tracerr::map_from)
        };

        Ok(Self {
            primary: pool(&conf.primary)?,
            replica: pool(&conf.replica)?,
        })
    }

    /// Returns a [`Connection`] to the primary database.
    ///
    /// # Errors
    ///
    /// If failed to get a [`Connection`] from the [`connection::Pool`].
    pub async fn primary(
        &self,
    ) -> Result<connection::Client, Traced<database::Error>> {
        self.primary
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }

    /// Returns a [`Connection`] to the replica database.
    ///
    /// # Errors
    ///
    /// If failed to get a [`Connection`] from the [`connection::Pool`].
    pub async fn replica(
        &self,
    ) -> Result<connection::Client, Traced<database::Error>> {
        self.replica
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

/// Postgres database [`Error`].
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// [`Connection`] error.
    #[display("`Connection` error: {_0}")]
    Connection(connection::Error),

    /// Error of creating a new [`connection::Pool`] client.
    #[display("Failed to create a new `connection::Pool`: {_0}")]
    PoolCreationError(connection::PoolCreationError),

    /// [`connection::Pool`] error.
    #[display("`connection::Pool` error: {_0}")]
    PoolError(connection::PoolError),

    /// Named parameter referenced by a [`Statement`] has no value.
    #[display("Parameter `:{_0}` is not bound")]
    #[from(ignore)]
    UnboundParameter(#[error(not(source))] &'static str),
}
