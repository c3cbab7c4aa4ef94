//! Data access for companies and jobs.
//!
//! Model functions take any [`GenericClient`], issue a single statement built
//! from the [`sql_for`](crate::sql_for) fragments and map rows into records.
//! Missing rows surface as [`JoblyError::NotFound`]; bad client input surfaces
//! as [`JoblyError::BadRequest`] before the database is touched.

mod company;
mod job;

pub use company::{Company, CompanyWithJobs, NewCompany};
pub use job::{Job, JobWithCompany, NewJob};

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::fields::FieldMap;
use crate::query::query;

/// Table definitions the models expect, one statement per entry.
pub const SCHEMA_SQL: &[&str] = &[
    "CREATE TABLE companies (
        handle VARCHAR(25) PRIMARY KEY CHECK (handle = lower(handle)),
        name TEXT UNIQUE NOT NULL,
        num_employees INTEGER CHECK (num_employees >= 0),
        description TEXT NOT NULL,
        logo_url TEXT
    )",
    "CREATE TABLE jobs (
        id SERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        salary INTEGER CHECK (salary >= 0),
        equity NUMERIC CHECK (equity <= 1.0),
        company_handle VARCHAR(25) NOT NULL
            REFERENCES companies ON DELETE CASCADE
    )",
];

/// Create the `companies` and `jobs` tables.
pub async fn create_tables(conn: &impl GenericClient) -> JoblyResult<()> {
    for statement in SCHEMA_SQL {
        query(*statement).tag("schema.create").execute(conn).await?;
    }
    Ok(())
}

fn not_found(kind: &str, key: impl std::fmt::Display) -> JoblyError {
    tracing::debug!(target: "jobly.models", kind, %key, "row not found");
    JoblyError::not_found(format!("No {kind}: {key}"))
}

/// Reject update keys outside `allowed`.
fn check_update_fields(data: &FieldMap, allowed: &[&str]) -> JoblyResult<()> {
    match data.keys().find(|key| !allowed.contains(key)) {
        Some(key) => Err(JoblyError::bad_request(format!("Unaccepted field: {key}"))),
        None => Ok(()),
    }
}
