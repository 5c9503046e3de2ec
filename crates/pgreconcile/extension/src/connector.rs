//! Credential resolution: from a resource to a connected lifecycle driver.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use pgreconcile_types::{ConnectionDetails, Extension, ProviderConfig, SecretRef};
use pgreconcile_xsql::{Db, PgDb, XsqlResult};

use crate::client::ExtensionClient;
use crate::error::{ExtensionError, ExtensionResult};

/// Errors from the orchestrator-side stores the connector depends on.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The named config or secret does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The store itself failed.
    #[error("store error: {0}")]
    Store(String),
}

/// Access to provider configurations held by the orchestrator.
#[async_trait]
pub trait ProviderConfigs: Send + Sync {
    /// Record that the resource uses its referenced config.
    async fn track_usage(&self, ext: &Extension) -> Result<(), ConfigError>;

    /// Fetch a config by name.
    async fn get(&self, name: &str) -> Result<ProviderConfig, ConfigError>;
}

/// Access to credential secrets held by the orchestrator.
#[async_trait]
pub trait Secrets: Send + Sync {
    /// Fetch the credential bytes a secret reference points at.
    async fn get(&self, secret_ref: &SecretRef) -> Result<ConnectionDetails, ConfigError>;
}

/// Factory turning credential bytes into a database handle.
///
/// Must not perform I/O; connection failures surface on the first command.
pub type NewDb = Arc<dyn Fn(&ConnectionDetails) -> XsqlResult<Arc<dyn Db>> + Send + Sync>;

/// Resolves a resource's credentials and produces a connected
/// [`ExtensionClient`].
///
/// Resolution is a fixed four-step pipeline, each step failing under its
/// own label: track config usage, fetch the config, check it references a
/// secret, fetch the secret. Nothing here is retried; the orchestrator
/// reschedules on failure.
pub struct Connector {
    configs: Arc<dyn ProviderConfigs>,
    secrets: Arc<dyn Secrets>,
    new_db: NewDb,
}

impl Connector {
    /// Connector producing sqlx-backed handles.
    pub fn new(configs: Arc<dyn ProviderConfigs>, secrets: Arc<dyn Secrets>) -> Self {
        Self::with_new_db(
            configs,
            secrets,
            Arc::new(|creds| PgDb::new(creds).map(|db| Arc::new(db) as Arc<dyn Db>)),
        )
    }

    /// Connector with a custom database-handle factory.
    pub fn with_new_db(
        configs: Arc<dyn ProviderConfigs>,
        secrets: Arc<dyn Secrets>,
        new_db: NewDb,
    ) -> Self {
        Self {
            configs,
            secrets,
            new_db,
        }
    }

    /// Resolve credentials for the resource and return a driver bound to
    /// its database.
    pub async fn connect(&self, ext: &Extension) -> ExtensionResult<ExtensionClient> {
        self.configs
            .track_usage(ext)
            .await
            .map_err(ExtensionError::TrackProviderConfigUsage)?;

        let config = self
            .configs
            .get(&ext.spec.provider_config_ref)
            .await
            .map_err(ExtensionError::GetProviderConfig)?;

        let secret_ref = config.credentials.as_ref().ok_or(ExtensionError::NoSecretRef)?;

        let creds = self
            .secrets
            .get(secret_ref)
            .await
            .map_err(ExtensionError::GetSecret)?;

        debug!(
            config = %config.name,
            secret = %secret_ref,
            "resolved credentials"
        );

        let db = (self.new_db)(&creds).map_err(ExtensionError::NewClient)?;
        Ok(ExtensionClient::new(db))
    }
}

/// In-memory [`ProviderConfigs`] for tests and local development.
#[derive(Default)]
pub struct InMemoryProviderConfigs {
    configs: Mutex<HashMap<String, ProviderConfig>>,
    usage: AtomicUsize,
}

impl InMemoryProviderConfigs {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a config.
    pub fn insert(&self, config: ProviderConfig) {
        self.configs
            .lock()
            .unwrap()
            .insert(config.name.clone(), config);
    }

    /// How many times usage tracking was recorded.
    pub fn usage_count(&self) -> usize {
        self.usage.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderConfigs for InMemoryProviderConfigs {
    async fn track_usage(&self, _ext: &Extension) -> Result<(), ConfigError> {
        self.usage.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<ProviderConfig, ConfigError> {
        self.configs
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::NotFound(name.to_string()))
    }
}

/// In-memory [`Secrets`] for tests and local development.
#[derive(Default)]
pub struct InMemorySecrets {
    secrets: Mutex<HashMap<SecretRef, ConnectionDetails>>,
}

impl InMemorySecrets {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a secret.
    pub fn insert(&self, secret_ref: SecretRef, details: ConnectionDetails) {
        self.secrets.lock().unwrap().insert(secret_ref, details);
    }
}

#[async_trait]
impl Secrets for InMemorySecrets {
    async fn get(&self, secret_ref: &SecretRef) -> Result<ConnectionDetails, ConfigError> {
        self.secrets
            .lock()
            .unwrap()
            .get(secret_ref)
            .cloned()
            .ok_or_else(|| ConfigError::NotFound(secret_ref.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgreconcile_types::{ExtensionParameters, ExtensionSpec};
    use pgreconcile_xsql::mock::MockDb;

    fn resource(config_ref: &str) -> Extension {
        Extension::new(
            "pgcrypto",
            ExtensionSpec {
                for_provider: ExtensionParameters::named("pgcrypto"),
                provider_config_ref: config_ref.to_string(),
            },
        )
    }

    fn secret_ref() -> SecretRef {
        SecretRef {
            namespace: "infra".to_string(),
            name: "pg-creds".to_string(),
        }
    }

    fn mock_new_db() -> NewDb {
        Arc::new(|_creds| Ok(Arc::new(MockDb::new()) as Arc<dyn Db>))
    }

    #[tokio::test]
    async fn test_connect_resolves_through_all_steps() {
        let configs = Arc::new(InMemoryProviderConfigs::new());
        configs.insert(ProviderConfig {
            name: "default".to_string(),
            credentials: Some(secret_ref()),
        });
        let secrets = Arc::new(InMemorySecrets::new());
        secrets.insert(secret_ref(), ConnectionDetails::new());

        let connector = Connector::with_new_db(configs.clone(), secrets, mock_new_db());
        assert!(connector.connect(&resource("default")).await.is_ok());
        assert_eq!(configs.usage_count(), 1);
    }

    #[tokio::test]
    async fn test_connect_missing_config_is_labelled() {
        let connector = Connector::with_new_db(
            Arc::new(InMemoryProviderConfigs::new()),
            Arc::new(InMemorySecrets::new()),
            mock_new_db(),
        );

        let err = connector.connect(&resource("absent")).await.unwrap_err();
        assert_eq!(err.to_string(), "cannot get ProviderConfig");
    }

    #[tokio::test]
    async fn test_connect_without_secret_ref_is_labelled() {
        let configs = Arc::new(InMemoryProviderConfigs::new());
        configs.insert(ProviderConfig {
            name: "default".to_string(),
            credentials: None,
        });

        let connector = Connector::with_new_db(
            configs,
            Arc::new(InMemorySecrets::new()),
            mock_new_db(),
        );

        let err = connector.connect(&resource("default")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "ProviderConfig does not reference a credentials Secret"
        );
    }

    #[tokio::test]
    async fn test_connect_missing_secret_is_labelled() {
        let configs = Arc::new(InMemoryProviderConfigs::new());
        configs.insert(ProviderConfig {
            name: "default".to_string(),
            credentials: Some(secret_ref()),
        });

        let connector = Connector::with_new_db(
            configs,
            Arc::new(InMemorySecrets::new()),
            mock_new_db(),
        );

        let err = connector.connect(&resource("default")).await.unwrap_err();
        assert_eq!(err.to_string(), "cannot get credentials Secret");
    }
}
