//! The lifecycle driver: observe, create, update, delete.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use pgreconcile_types::{Extension, ExtensionObservation};
use pgreconcile_xsql::{quote_identifier, Db, Query};

use crate::compare::{late_init, up_to_date};
use crate::error::{ExtensionError, ExtensionResult};

const SELECT_EXTENSION: &str = "SELECT extversion FROM pg_extension WHERE extname = $1";

/// Outcome of one observe cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// No extension with the resource's identity exists. Drives the create
    /// path; never an error.
    NotFound,

    /// The extension exists.
    Found {
        /// Whether observe filled unset desired fields from the live state.
        /// The orchestrator must persist the mutated spec before the next
        /// cycle.
        late_initialized: bool,

        /// Whether the live state already matches the (merged) desired
        /// state, i.e. no corrective action is needed.
        up_to_date: bool,
    },
}

impl Observation {
    /// Whether the live extension exists.
    pub fn resource_exists(&self) -> bool {
        matches!(self, Observation::Found { .. })
    }

    /// Whether desired state was mutated during observation.
    pub fn late_initialized(&self) -> bool {
        matches!(
            self,
            Observation::Found {
                late_initialized: true,
                ..
            }
        )
    }

    /// Whether no corrective action is needed.
    pub fn up_to_date(&self) -> bool {
        matches!(
            self,
            Observation::Found {
                up_to_date: true,
                ..
            }
        )
    }
}

/// The four lifecycle entry points the orchestrator drives.
///
/// All four are total over any well-formed [`Extension`]; each issues at
/// most one command against the database and is idempotent at the
/// database's level. The caller guarantees at most one operation in flight
/// per identity; this trait provides no internal mutual exclusion.
#[async_trait]
pub trait ExternalClient: Send + Sync {
    /// Look up the live extension and judge drift.
    ///
    /// On a successful find this mutates the resource: status is marked
    /// available and unset spec fields are late-initialized from the live
    /// state, in that order, before the up-to-date verdict is computed.
    async fn observe(&self, ext: &mut Extension) -> ExtensionResult<Observation>;

    /// Create the extension from desired state.
    async fn create(&self, ext: &Extension) -> ExtensionResult<()>;

    /// Correct drift in place. For extensions this is a documented no-op:
    /// no live attribute can be altered without drop+recreate, which the
    /// orchestrator owns. Never errors, issues no commands.
    async fn update(&self, ext: &Extension) -> ExtensionResult<()>;

    /// Drop the extension by identity.
    ///
    /// Deliberately asymmetric with [`observe`](ExternalClient::observe):
    /// dropping an extension that is already gone surfaces whatever error
    /// the database reports, under the fixed "cannot drop extension"
    /// label. The orchestrator only schedules deletes for resources it has
    /// observed, so absence here points at a race worth surfacing.
    async fn delete(&self, ext: &Extension) -> ExtensionResult<()>;
}

/// Driver for one extension resource, bound to a database handle produced
/// by the [`Connector`](crate::Connector).
pub struct ExtensionClient {
    db: Arc<dyn Db>,
}

impl ExtensionClient {
    /// Wrap a database handle.
    pub fn new(db: Arc<dyn Db>) -> Self {
        Self { db }
    }
}

// Manual impl: the handle is a trait object without `Debug`.
impl std::fmt::Debug for ExtensionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionClient").finish_non_exhaustive()
    }
}

#[async_trait]
impl ExternalClient for ExtensionClient {
    async fn observe(&self, ext: &mut Extension) -> ExtensionResult<Observation> {
        let identity = ext.external_name().to_string();
        let query = Query::new(SELECT_EXTENSION).bind(identity.clone());

        let row = match self.db.scan_one(&query).await {
            Err(err) if err.is_no_rows() => {
                debug!(extension = %identity, "extension not found");
                return Ok(Observation::NotFound);
            }
            Err(err) => return Err(ExtensionError::Select(err)),
            Ok(row) => row,
        };

        let observed = ExtensionObservation {
            extension: identity.clone(),
            version: row.first().cloned().flatten(),
        };

        ext.status.mark_available();

        // Late-init before judging drift, so the verdict reflects the
        // merged desired state.
        let late_initialized = late_init(&observed, &mut ext.spec.for_provider);
        let up_to_date = up_to_date(&observed, &ext.spec.for_provider);

        debug!(
            extension = %identity,
            late_initialized,
            up_to_date,
            "observed extension"
        );

        Ok(Observation::Found {
            late_initialized,
            up_to_date,
        })
    }

    async fn create(&self, ext: &Extension) -> ExtensionResult<()> {
        let params = &ext.spec.for_provider;

        let mut sql = String::from("CREATE EXTENSION ");
        sql.push_str(&quote_identifier(&params.extension));
        if let Some(version) = &params.version {
            sql.push_str(" VERSION ");
            sql.push_str(&quote_identifier(version));
        }
        if let Some(template) = &params.template {
            sql.push_str(" TEMPLATE ");
            sql.push_str(&quote_identifier(template));
        }

        debug!(extension = %params.extension, "creating extension");
        self.db
            .exec(&Query::new(sql))
            .await
            .map_err(ExtensionError::Create)
    }

    async fn update(&self, _ext: &Extension) -> ExtensionResult<()> {
        // No in-place mutation exists for extensions; kept so the state
        // machine stays total over all four operations.
        Ok(())
    }

    async fn delete(&self, ext: &Extension) -> ExtensionResult<()> {
        let identity = ext.external_name();
        let sql = format!("DROP EXTENSION {}", quote_identifier(identity));

        debug!(extension = %identity, "dropping extension");
        self.db
            .exec(&Query::new(sql))
            .await
            .map_err(ExtensionError::Drop)
    }
}
