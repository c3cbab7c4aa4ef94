//! Runner for SQL with pre-numbered placeholders.

use crate::client::GenericClient;
use crate::error::JoblyResult;
use crate::row::FromRow;
use crate::value::FieldValue;
use std::sync::Arc;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Longest SQL text (in bytes) written to a log event.
const MAX_LOGGED_SQL: usize = 200;

/// A SQL string with pre-numbered placeholders (`$1, $2, ...`) plus bound parameters.
///
/// # Example
///
/// ```ignore
/// use jobly::query;
///
/// let job: Job = query("SELECT id, title, salary, equity, company_handle FROM jobs WHERE id = $1")
///     .tag("jobs.get")
///     .bind(7_i32)
///     .fetch_one_as(&conn)
///     .await?;
/// ```
#[must_use]
pub struct Query {
    sql: String,
    params: Vec<Arc<dyn ToSql + Sync + Send>>,
    tag: Option<String>,
}

/// Create a new query with the given SQL
pub fn query(sql: impl Into<String>) -> Query {
    Query {
        sql: sql.into(),
        params: Vec::new(),
        tag: None,
    }
}

impl Query {
    /// Associate a tag, reported with every logged statement.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Bind the next parameter.
    ///
    /// The SQL string must already contain the matching `$n`.
    pub fn bind<T>(mut self, value: T) -> Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.params.push(Arc::new(value));
        self
    }

    /// Bind a run of values, e.g. the values of a [`SqlFragment`](crate::SqlFragment).
    pub fn bind_all(mut self, values: impl IntoIterator<Item = FieldValue>) -> Self {
        self.params
            .extend(values.into_iter().map(|v| Arc::new(v) as Arc<dyn ToSql + Sync + Send>));
        self
    }

    /// Access the SQL string.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of bound parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }

    fn log(&self) {
        tracing::debug!(
            target: "jobly.sql",
            tag = self.tag.as_deref().unwrap_or("-"),
            param_count = self.params.len(),
            sql = %truncate_sql_bytes(&self.sql, MAX_LOGGED_SQL),
        );
    }

    /// Execute the query and return all rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> JoblyResult<Vec<Row>> {
        self.log();
        conn.query(&self.sql, &self.params_ref()).await
    }

    /// Execute the query and return all rows mapped to `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute the query and return the first row mapped to `T`.
    ///
    /// Returns [`JoblyError::NotFound`](crate::JoblyError::NotFound) when no row comes back.
    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<T> {
        self.log();
        let row = conn.query_one(&self.sql, &self.params_ref()).await?;
        T::from_row(&row)
    }

    /// Execute the query and return at most one row mapped to `T`.
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> JoblyResult<Option<T>> {
        self.log();
        let row = conn.query_opt(&self.sql, &self.params_ref()).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute the query and return the number of affected rows.
    pub async fn execute(&self, conn: &impl GenericClient) -> JoblyResult<u64> {
        self.log();
        conn.execute(&self.sql, &self.params_ref()).await
    }
}

/// Cut `sql` to at most `max_bytes`, backing off to a char boundary.
fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
