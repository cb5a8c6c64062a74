//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler.
///
/// Every layer of the service speaks through this trait: commands and queries
/// are [`Handler`]s of the service, storage operations are [`Handler`]s of the
/// database.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
