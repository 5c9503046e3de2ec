//! Scripted [`Db`] implementation for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::{Db, Query, Row, XsqlError, XsqlResult};

/// What the next `scan_one` call should produce.
#[derive(Debug, Clone)]
enum ScanScript {
    Row(Row),
    NoRows,
    Fail(String),
}

/// In-memory [`Db`] twin that records every issued query and replays
/// scripted results.
///
/// Scan results are consumed front-to-back; once the script is exhausted,
/// further scans report no rows. Exec either always succeeds or always
/// fails, depending on construction.
#[derive(Default)]
pub struct MockDb {
    queries: Mutex<Vec<Query>>,
    scans: Mutex<VecDeque<ScanScript>>,
    exec_error: Option<String>,
}

impl MockDb {
    /// A database with nothing in it: scans find no rows, commands succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// A database whose next scan returns the given row.
    pub fn returning_row(row: Row) -> Self {
        let db = Self::new();
        db.push_row(row);
        db
    }

    /// A database whose scans fail with the given message.
    pub fn failing_scan(message: impl Into<String>) -> Self {
        let db = Self::new();
        db.scans
            .lock()
            .unwrap()
            .push_back(ScanScript::Fail(message.into()));
        db
    }

    /// A database whose commands fail with the given message.
    pub fn failing_exec(message: impl Into<String>) -> Self {
        Self {
            exec_error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Queue another row for a subsequent scan.
    pub fn push_row(&self, row: Row) {
        self.scans.lock().unwrap().push_back(ScanScript::Row(row));
    }

    /// Queue an explicit no-rows result.
    pub fn push_no_rows(&self) {
        self.scans.lock().unwrap().push_back(ScanScript::NoRows);
    }

    /// Every query issued so far, commands and scans alike, in order.
    pub fn recorded(&self) -> Vec<Query> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Db for MockDb {
    async fn exec(&self, query: &Query) -> XsqlResult<()> {
        self.queries.lock().unwrap().push(query.clone());
        match &self.exec_error {
            Some(message) => Err(XsqlError::Query(message.clone())),
            None => Ok(()),
        }
    }

    async fn scan_one(&self, query: &Query) -> XsqlResult<Row> {
        self.queries.lock().unwrap().push(query.clone());
        match self.scans.lock().unwrap().pop_front() {
            Some(ScanScript::Row(row)) => Ok(row),
            Some(ScanScript::Fail(message)) => Err(XsqlError::Query(message)),
            Some(ScanScript::NoRows) | None => Err(XsqlError::NoRows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_mock_reports_no_rows() {
        let db = MockDb::new();
        let err = db.scan_one(&Query::new("SELECT 1")).await.unwrap_err();
        assert!(err.is_no_rows());
        assert_eq!(db.recorded().len(), 1);
    }

    #[tokio::test]
    async fn test_scripted_rows_are_consumed_in_order() {
        let db = MockDb::returning_row(vec![Some("1.0".to_string())]);
        db.push_row(vec![Some("2.0".to_string())]);

        let first = db.scan_one(&Query::new("SELECT v")).await.unwrap();
        let second = db.scan_one(&Query::new("SELECT v")).await.unwrap();
        assert_eq!(first, vec![Some("1.0".to_string())]);
        assert_eq!(second, vec![Some("2.0".to_string())]);
        assert!(db
            .scan_one(&Query::new("SELECT v"))
            .await
            .unwrap_err()
            .is_no_rows());
    }

    #[tokio::test]
    async fn test_failing_exec_records_the_query() {
        let db = MockDb::failing_exec("permission denied");
        let err = db.exec(&Query::new("DROP TABLE t")).await.unwrap_err();
        assert!(err.to_string().contains("permission denied"));
        assert_eq!(db.recorded().len(), 1);
    }
}
