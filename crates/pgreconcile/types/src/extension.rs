//! The `Extension` managed resource and its desired/observed state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Desired state for a PostgreSQL extension, declared by the user.
///
/// Optional fields left `None` are late-initialized from the live database
/// on the first successful observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionParameters {
    /// Name of the extension. Required, and the resource's immutable
    /// identity inside the database.
    pub extension: String,

    /// Version to install. `None` means whatever the database defaults to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Template consulted only when the extension is created. It has no
    /// live counterpart and is never part of drift comparison.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl ExtensionParameters {
    /// Parameters with only the extension name set.
    pub fn named(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            version: None,
            template: None,
        }
    }
}

/// State of an extension as read from `pg_extension` during one observe
/// cycle. Built fresh every cycle and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionObservation {
    /// Extension name, inferred from the identity used for the lookup.
    pub extension: String,

    /// Installed version reported by the database.
    pub version: Option<String>,
}

/// Spec of the `Extension` resource: the desired parameters plus the name
/// of the provider configuration that supplies database credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionSpec {
    /// Desired state forwarded to the database.
    pub for_provider: ExtensionParameters,

    /// Name of the [`ProviderConfig`](crate::ProviderConfig) to connect with.
    pub provider_config_ref: String,
}

/// Readiness of the live resource as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Readiness {
    /// No successful observation yet.
    #[default]
    Unknown,

    /// The extension exists in the database.
    Available,
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Readiness::Unknown => write!(f, "unknown"),
            Readiness::Available => write!(f, "available"),
        }
    }
}

/// Status reported back to the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionStatus {
    /// Readiness as of the last observe cycle.
    pub readiness: Readiness,

    /// When the resource was last seen in the database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_observed: Option<DateTime<Utc>>,
}

impl ExtensionStatus {
    /// Mark the resource as available in the live system.
    pub fn mark_available(&mut self) {
        self.readiness = Readiness::Available;
        self.last_observed = Some(Utc::now());
    }
}

/// The managed resource handed to the reconciler core each cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    /// Resource name chosen by the user.
    pub name: String,

    /// External-system identity. Falls back to `name` when unset; stable
    /// for the resource's lifetime and never chosen by the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_name: Option<String>,

    /// Desired state and connection wiring.
    pub spec: ExtensionSpec,

    /// Observed status, updated by the core.
    #[serde(default)]
    pub status: ExtensionStatus,
}

impl Extension {
    /// Build a resource with identity defaulted to the resource name.
    pub fn new(name: impl Into<String>, spec: ExtensionSpec) -> Self {
        Self {
            name: name.into(),
            external_name: None,
            spec,
            status: ExtensionStatus::default(),
        }
    }

    /// The identity used for lookups against the database.
    pub fn external_name(&self) -> &str {
        self.external_name.as_deref().unwrap_or(&self.name)
    }
}
