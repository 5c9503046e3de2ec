use thiserror::Error;

use pgreconcile_xsql::XsqlError;

use crate::connector::ConfigError;

/// Result type for lifecycle and connector operations.
pub type ExtensionResult<T> = Result<T, ExtensionError>;

/// Fixed error labels attached at the point an operation fails.
///
/// Each variant carries its cause as `source`; the label itself never
/// varies, so callers and operators can match on which operation failed.
/// Absence of the live extension is not represented here: observe reports
/// it as [`Observation::NotFound`](crate::Observation::NotFound).
#[derive(Debug, Error)]
pub enum ExtensionError {
    /// Recording that this resource uses its ProviderConfig failed.
    #[error("cannot track ProviderConfig usage")]
    TrackProviderConfigUsage(#[source] ConfigError),

    /// The referenced ProviderConfig could not be fetched.
    #[error("cannot get ProviderConfig")]
    GetProviderConfig(#[source] ConfigError),

    /// The ProviderConfig carries no credentials secret reference.
    #[error("ProviderConfig does not reference a credentials Secret")]
    NoSecretRef,

    /// The credentials secret could not be fetched.
    #[error("cannot get credentials Secret")]
    GetSecret(#[source] ConfigError),

    /// Credential bytes could not be turned into a database handle.
    #[error("cannot create database client")]
    NewClient(#[source] XsqlError),

    /// The observe lookup failed for a reason other than no rows.
    #[error("cannot select extension")]
    Select(#[source] XsqlError),

    /// The creation command failed.
    #[error("cannot create extension")]
    Create(#[source] XsqlError),

    /// The drop command failed.
    #[error("cannot drop extension")]
    Drop(#[source] XsqlError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_fixed() {
        let err = ExtensionError::Drop(XsqlError::Query("permission denied".to_string()));
        assert_eq!(err.to_string(), "cannot drop extension");

        let err = ExtensionError::Select(XsqlError::Connection("timeout".to_string()));
        assert_eq!(err.to_string(), "cannot select extension");
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error as _;

        let err = ExtensionError::Create(XsqlError::Query("duplicate".to_string()));
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("query error: duplicate"));
    }
}
