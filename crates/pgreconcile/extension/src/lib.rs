//! Convergence loop for PostgreSQL extension resources.
//!
//! One cycle of the loop is: the orchestrator calls
//! [`ExternalClient::observe`], and depending on the outcome invokes at
//! most one of [`create`](ExternalClient::create),
//! [`update`](ExternalClient::update) or
//! [`delete`](ExternalClient::delete) before re-observing on its next
//! scheduled pass. This crate owns the decision logic and the command
//! construction; scheduling, retries and persistence of the resource
//! object stay with the orchestrator.
//!
//! The four lifecycle operations are total: `update` in particular is a
//! documented no-op, because no attribute of an installed extension can be
//! changed in place (a version change is drop+recreate, owned by the
//! orchestrator).
//!
//! Cancellation follows the usual async contract: every operation is a
//! future the caller may race against a deadline or drop, and the
//! in-flight command aborts with it.

mod client;
mod compare;
mod connector;
mod error;

pub use client::{ExtensionClient, ExternalClient, Observation};
pub use compare::{late_init, up_to_date};
pub use connector::{
    ConfigError, Connector, InMemoryProviderConfigs, InMemorySecrets, NewDb, ProviderConfigs,
    Secrets,
};
pub use error::{ExtensionError, ExtensionResult};
