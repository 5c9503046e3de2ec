//! Query/command executor contract for the reconciler core.
//!
//! The core speaks to PostgreSQL through the narrow [`Db`] trait: one-shot
//! commands ([`Db::exec`]) and single-row projections ([`Db::scan_one`]).
//! It never issues multi-row queries. [`PgDb`] is the sqlx-backed adapter;
//! [`mock::MockDb`] (feature `test-utils`) is the scripted twin used by the
//! core's tests.
//!
//! Identifier quoting lives here too: every user-controlled string that
//! ends up inside a command must go through [`quote_identifier`].

mod error;
pub mod postgres;
mod query;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::{XsqlError, XsqlResult};
pub use postgres::PgDb;
pub use query::{quote_identifier, Db, Query, Row};
