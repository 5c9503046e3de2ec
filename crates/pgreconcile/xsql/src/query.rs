//! The `Query` value, the `Db` trait and identifier quoting.

use async_trait::async_trait;

use crate::XsqlResult;

/// A single SQL command with its ordered bind parameters.
///
/// Parameters are always bound positionally (`$1`, `$2`, ...), never
/// interpolated. Strings that must appear inside the command text itself
/// (identifiers) go through [`quote_identifier`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Command text.
    pub sql: String,

    /// Bind parameters, in positional order.
    pub params: Vec<String>,
}

impl Query {
    /// A query with no bind parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append a bind parameter.
    pub fn bind(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }
}

/// One row projected as text columns. Absent (SQL NULL) columns are `None`.
pub type Row = Vec<Option<String>>;

/// Narrow executor contract the reconciler core depends on.
///
/// Implementations must be safe to share behind an `Arc`; the core holds
/// one handle per resource and issues at most one command at a time.
#[async_trait]
pub trait Db: Send + Sync {
    /// Execute a command that returns no result set.
    async fn exec(&self, query: &Query) -> XsqlResult<()>;

    /// Execute a query expected to match exactly one row and return it as
    /// text columns. Matching nothing is [`XsqlError::NoRows`].
    ///
    /// [`XsqlError::NoRows`]: crate::XsqlError::NoRows
    async fn scan_one(&self, query: &Query) -> XsqlResult<Row>;
}

/// Quote an arbitrary string as a PostgreSQL identifier.
///
/// Wraps the input in double quotes and doubles any embedded double quote,
/// so the result is always a single well-formed identifier regardless of
/// content. Every user-controlled string interpolated into command text
/// must pass through here.
pub fn quote_identifier(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for ch in name.chars() {
        if ch == '"' {
            quoted.push('"');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_bind_preserves_order() {
        let query = Query::new("SELECT 1 WHERE a = $1 AND b = $2")
            .bind("first")
            .bind("second");
        assert_eq!(query.params, vec!["first", "second"]);
    }

    #[test]
    fn test_quote_identifier_plain() {
        assert_eq!(quote_identifier("pgcrypto"), r#""pgcrypto""#);
    }

    #[test]
    fn test_quote_identifier_doubles_embedded_quotes() {
        assert_eq!(quote_identifier(r#"foo"bar"#), r#""foo""bar""#);
        assert_eq!(
            quote_identifier("\"; DROP TABLE users; --"),
            "\"\"\"; DROP TABLE users; --\""
        );
    }

    #[test]
    fn test_quote_identifier_empty() {
        assert_eq!(quote_identifier(""), r#""""#);
    }
}
