//! Model behaviour against a recording client (no database needed).
//!
//! The client records every statement and returns no rows, which is enough to
//! check the SQL the models compose, the not-found mapping, and that invalid
//! input is rejected before anything is sent.

use jobly::{Company, FieldMap, GenericClient, Job, JoblyError, JoblyResult};
use std::sync::Mutex;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

#[derive(Default)]
struct RecordingClient {
    statements: Mutex<Vec<(String, usize)>>,
}

impl RecordingClient {
    fn record(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) {
        self.statements
            .lock()
            .unwrap()
            .push((sql.to_string(), params.len()));
    }

    fn statements(&self) -> Vec<(String, usize)> {
        self.statements.lock().unwrap().clone()
    }
}

impl GenericClient for RecordingClient {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<Vec<Row>> {
        self.record(sql, params);
        Ok(Vec::new())
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<u64> {
        self.record(sql, params);
        Ok(0)
    }
}

/// A client whose database is down.
#[derive(Default)]
struct FailingClient {
    calls: Mutex<usize>,
}

impl GenericClient for FailingClient {
    async fn query(&self, _sql: &str, _params: &[&(dyn ToSql + Sync)]) -> JoblyResult<Vec<Row>> {
        *self.calls.lock().unwrap() += 1;
        Err(JoblyError::Connection("database unavailable".into()))
    }

    async fn execute(&self, _sql: &str, _params: &[&(dyn ToSql + Sync)]) -> JoblyResult<u64> {
        *self.calls.lock().unwrap() += 1;
        Err(JoblyError::Connection("database unavailable".into()))
    }
}

#[tokio::test]
async fn update_without_data_fails_before_any_call() {
    let client = RecordingClient::default();

    let err = Job::update(&client, 1, &FieldMap::new()).await.unwrap_err();
    assert!(err.is_bad_request());
    assert_eq!(err.to_string(), "No data");

    let err = Company::update(&client, "c1", &FieldMap::new())
        .await
        .unwrap_err();
    assert!(err.is_bad_request());

    assert!(client.statements().is_empty());
}

#[tokio::test]
async fn update_of_fixed_fields_fails_before_any_call() {
    let client = RecordingClient::default();

    let data = FieldMap::new().with("title", "New").with("companyHandle", "c2");
    let err = Job::update(&client, 1, &data).await.unwrap_err();
    assert_eq!(err.to_string(), "Unaccepted field: companyHandle");

    let err = Job::update(&client, 1, &FieldMap::new().with("id", 9))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Unaccepted field: id");

    let err = Company::update(&client, "c1", &FieldMap::new().with("handle", "c9"))
        .await
        .unwrap_err();
    assert!(err.is_bad_request());

    assert!(client.statements().is_empty());
}

#[tokio::test]
async fn invalid_filters_fail_before_any_call() {
    let client = RecordingClient::default();

    let err = Job::filter(&client, &FieldMap::new().with("hasEquity", "maybe"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Unaccepted value for hasEquity: maybe");

    let err = Company::filter(&client, &FieldMap::new().with("bogus", 1))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Unaccepted field: bogus");

    assert!(client.statements().is_empty());
}

#[tokio::test]
async fn job_filter_composes_where_clause_and_reports_no_rows() {
    let client = RecordingClient::default();
    let criteria = FieldMap::new()
        .with("title", "J")
        .with("minSalary", 101)
        .with("hasEquity", "true");

    let jobs = Job::filter(&client, &criteria).await.unwrap();
    assert!(jobs.is_none());

    let statements = client.statements();
    assert_eq!(statements.len(), 1);
    let (sql, params) = &statements[0];
    assert!(sql.contains(" WHERE title ILIKE $1 AND salary >= $2 AND equity > 0 ORDER BY"));
    assert_eq!(*params, 2);
}

#[tokio::test]
async fn company_filter_without_criteria_has_no_where() {
    let client = RecordingClient::default();

    let companies = Company::filter(&client, &FieldMap::new()).await.unwrap();
    assert!(companies.is_none());

    let (sql, params) = &client.statements()[0];
    assert!(!sql.contains("WHERE"));
    assert_eq!(*params, 0);
}

#[tokio::test]
async fn update_binds_id_after_set_values() {
    let client = RecordingClient::default();
    let data = FieldMap::new().with("title", "New").with("salary", 500);

    let err = Job::update(&client, 42, &data).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "No job: 42");

    let (sql, params) = &client.statements()[0];
    assert!(sql.starts_with(r#"UPDATE jobs SET "title"=$1, "salary"=$2 WHERE id = $3"#));
    assert_eq!(*params, 3);
}

#[tokio::test]
async fn company_update_translates_column_names() {
    let client = RecordingClient::default();
    let data = FieldMap::new()
        .with("numEmployees", 10)
        .with("logoUrl", "http://c1.img");

    let err = Company::update(&client, "c1", &data).await.unwrap_err();
    assert!(err.is_not_found());

    let (sql, params) = &client.statements()[0];
    assert!(sql.starts_with(
        r#"UPDATE companies SET "num_employees"=$1, "logo_url"=$2 WHERE handle = $3"#
    ));
    assert_eq!(*params, 3);
}

#[tokio::test]
async fn missing_rows_are_not_found() {
    let client = RecordingClient::default();

    let err = Job::get(&client, 865).await.unwrap_err();
    assert!(err.is_not_found());

    let err = Job::remove(&client, 865).await.unwrap_err();
    assert!(err.is_not_found());

    let err = Company::get(&client, "nope").await.unwrap_err();
    assert_eq!(err.to_string(), "No company: nope");

    let err = Company::remove(&client, "nope").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn database_failures_propagate_unchanged() {
    let client = FailingClient::default();

    let err = Job::get(&client, 1).await.unwrap_err();
    assert!(matches!(err, JoblyError::Connection(_)));

    let err = Company::find_all(&client).await.unwrap_err();
    assert!(matches!(err, JoblyError::Connection(_)));

    assert_eq!(*client.calls.lock().unwrap(), 2);
}
