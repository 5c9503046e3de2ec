//! sqlx-backed PostgreSQL executor.

use async_trait::async_trait;
use pgreconcile_types::ConnectionDetails;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Row as _};
use tracing::debug;

use crate::{Db, Query, Row, XsqlError, XsqlResult};

/// Credential keys expected in [`ConnectionDetails`].
const KEY_USERNAME: &str = "username";
const KEY_PASSWORD: &str = "password";
const KEY_ENDPOINT: &str = "endpoint";
const KEY_PORT: &str = "port";
const KEY_DATABASE: &str = "database";

const DEFAULT_PORT: u16 = 5432;
const DEFAULT_DATABASE: &str = "postgres";

/// PostgreSQL-backed [`Db`] implementation.
///
/// The pool is created lazily: constructing a `PgDb` does no I/O, and
/// connection failures surface on the first command. That keeps handle
/// construction synchronous for the connector, which only has credential
/// bytes in hand.
#[derive(Clone, Debug)]
pub struct PgDb {
    pool: PgPool,
}

impl PgDb {
    /// Build a handle from opaque credential bytes.
    ///
    /// Recognized keys: `username` (required), `password`, `endpoint`
    /// (required), `port` (defaults to 5432), `database` (defaults to
    /// `postgres`).
    pub fn new(creds: &ConnectionDetails) -> XsqlResult<Self> {
        let username = require_str(creds, KEY_USERNAME)?;
        let endpoint = require_str(creds, KEY_ENDPOINT)?;
        let port = match optional_str(creds, KEY_PORT)? {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| XsqlError::Connection(format!("invalid port {raw:?}: {e}")))?,
            None => DEFAULT_PORT,
        };
        let database =
            optional_str(creds, KEY_DATABASE)?.unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let mut options = PgConnectOptions::new()
            .host(&endpoint)
            .port(port)
            .username(&username)
            .database(&database);
        if let Some(password) = optional_str(creds, KEY_PASSWORD)? {
            options = options.password(&password);
        }

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_lazy_with(options);

        Ok(Self { pool })
    }

    /// Wrap an existing pool, e.g. one shared with other reconcilers.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Db for PgDb {
    async fn exec(&self, query: &Query) -> XsqlResult<()> {
        debug!(sql = %query.sql, params = query.params.len(), "executing command");
        let mut q = sqlx::query(&query.sql);
        for param in &query.params {
            q = q.bind(param.as_str());
        }
        q.execute(&self.pool).await?;
        Ok(())
    }

    async fn scan_one(&self, query: &Query) -> XsqlResult<Row> {
        debug!(sql = %query.sql, params = query.params.len(), "scanning one row");
        let mut q = sqlx::query(&query.sql);
        for param in &query.params {
            q = q.bind(param.as_str());
        }
        let row = q.fetch_one(&self.pool).await?;

        let mut columns = Vec::with_capacity(row.len());
        for i in 0..row.len() {
            columns.push(row.try_get::<Option<String>, _>(i)?);
        }
        Ok(columns)
    }
}

fn require_str(creds: &ConnectionDetails, key: &str) -> XsqlResult<String> {
    optional_str(creds, key)?
        .ok_or_else(|| XsqlError::Connection(format!("credentials missing key {key:?}")))
}

fn optional_str(creds: &ConnectionDetails, key: &str) -> XsqlResult<Option<String>> {
    match creds.get(key) {
        None => Ok(None),
        Some(bytes) => std::str::from_utf8(bytes)
            .map(|s| Some(s.to_string()))
            .map_err(|_| XsqlError::Connection(format!("credential {key:?} is not valid UTF-8"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(entries: &[(&str, &str)]) -> ConnectionDetails {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
            .collect()
    }

    #[tokio::test]
    async fn test_handle_is_debug_for_result_asserts() {
        let db = PgDb::new(&creds(&[("username", "admin"), ("endpoint", "db.internal")])).unwrap();
        assert!(format!("{db:?}").contains("PgDb"));
    }

    #[tokio::test]
    async fn test_new_with_full_credentials() {
        let db = PgDb::new(&creds(&[
            ("username", "admin"),
            ("password", "hunter2"),
            ("endpoint", "db.internal"),
            ("port", "5433"),
            ("database", "apps"),
        ]));
        assert!(db.is_ok());
    }

    #[tokio::test]
    async fn test_new_defaults_port_and_database() {
        let db = PgDb::new(&creds(&[("username", "admin"), ("endpoint", "db.internal")]));
        assert!(db.is_ok());
    }

    #[test]
    fn test_new_rejects_missing_endpoint() {
        let err = PgDb::new(&creds(&[("username", "admin")])).unwrap_err();
        assert!(err.to_string().contains("endpoint"));
    }

    #[test]
    fn test_new_rejects_bad_port() {
        let err = PgDb::new(&creds(&[
            ("username", "admin"),
            ("endpoint", "db.internal"),
            ("port", "not-a-port"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("invalid port"));
    }
}
