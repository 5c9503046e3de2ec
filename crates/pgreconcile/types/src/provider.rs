//! Provider configuration and credential references.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque credential bytes fetched from a secret, keyed by field name.
///
/// Conventional keys are `username`, `password`, `endpoint`, `port` and
/// optionally `database`. The reconciler core never inspects these beyond
/// handing them to the database-client factory.
pub type ConnectionDetails = BTreeMap<String, Vec<u8>>;

/// Reference to a credentials secret held by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretRef {
    /// Namespace the secret lives in.
    pub namespace: String,

    /// Name of the secret.
    pub name: String,
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Named configuration selecting which database a resource reconciles
/// against and where its credentials come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Config name referenced by `ExtensionSpec::provider_config_ref`.
    pub name: String,

    /// Credentials secret. The schema requires one in practice, but the
    /// reference can be absent on hand-built configs, so the connector
    /// checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<SecretRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_ref_display() {
        let secret_ref = SecretRef {
            namespace: "infra".to_string(),
            name: "pg-creds".to_string(),
        };
        assert_eq!(secret_ref.to_string(), "infra/pg-creds");
    }
}
