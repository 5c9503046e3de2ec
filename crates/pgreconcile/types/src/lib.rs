//! Resource object model for the PostgreSQL extension reconciler.
//!
//! These types are owned by the orchestrator: it constructs an [`Extension`]
//! from user input, hands it to the reconciler core for each cycle, and
//! persists any mutation the core makes (late-initialized spec fields,
//! status readiness). Nothing in this crate talks to a database.

mod extension;
mod provider;

pub use extension::{
    Extension, ExtensionObservation, ExtensionParameters, ExtensionSpec, ExtensionStatus,
    Readiness,
};
pub use provider::{ConnectionDetails, ProviderConfig, SecretRef};
