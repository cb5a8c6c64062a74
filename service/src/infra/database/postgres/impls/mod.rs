//! [`Database`] implementations.
//!
//! [`Database`]: crate::infra::Database

#![expect(
    clippy::items_after_statements,
    reason = "`const SQL` after statements"
)]

mod user;
