use super::{check_update_fields, not_found};
use crate::client::GenericClient;
use crate::error::JoblyResult;
use crate::fields::FieldMap;
use crate::query::query;
use crate::row::{FromRow, RowExt};
use crate::sql_for::{sql_for_job_filter, sql_for_partial_update};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

pub(super) const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

const JOB_WITH_COMPANY_FROM: &str = "SELECT j.id, j.title, j.salary, j.equity, j.company_handle, \
     c.name AS company_name \
     FROM jobs j \
     LEFT JOIN companies c ON c.handle = j.company_handle";

/// Fields a job update may change. Logical and column names coincide.
const JOB_UPDATABLE: &[&str] = &["title", "salary", "equity"];

/// A row of `jobs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Data for a new job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// A job joined with the name of its company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobWithCompany {
    #[serde(flatten)]
    pub job: Job,
    pub company_name: Option<String>,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

impl FromRow for JobWithCompany {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            job: Job::from_row(row)?,
            company_name: row.try_get_column("company_name")?,
        })
    }
}

impl Job {
    /// Insert a job; the database assigns its id.
    pub async fn create(conn: &impl GenericClient, new: &NewJob) -> JoblyResult<Job> {
        query(format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {JOB_COLUMNS}"
        ))
        .tag("jobs.create")
        .bind(new.title.clone())
        .bind(new.salary)
        .bind(new.equity)
        .bind(new.company_handle.clone())
        .fetch_one_as(conn)
        .await
    }

    /// All jobs with their company names, ordered by title.
    pub async fn find_all(conn: &impl GenericClient) -> JoblyResult<Vec<JobWithCompany>> {
        query(format!("{JOB_WITH_COMPANY_FROM} ORDER BY j.title, j.id"))
            .tag("jobs.find_all")
            .fetch_all_as(conn)
            .await
    }

    /// Jobs matching `criteria` (`title`, `minSalary`, `hasEquity`).
    ///
    /// Criteria that filter nothing match every job. Returns `Ok(None)` when
    /// nothing matches.
    pub async fn filter(
        conn: &impl GenericClient,
        criteria: &FieldMap,
    ) -> JoblyResult<Option<Vec<JobWithCompany>>> {
        let mut sql = JOB_WITH_COMPANY_FROM.to_string();
        let values = match sql_for_job_filter(criteria)? {
            Some(filter) => {
                sql.push_str(" WHERE ");
                sql.push_str(&filter.clause);
                filter.values
            }
            None => Vec::new(),
        };
        sql.push_str(" ORDER BY j.title, j.id");

        let jobs: Vec<JobWithCompany> = query(sql)
            .tag("jobs.filter")
            .bind_all(values)
            .fetch_all_as(conn)
            .await?;
        Ok((!jobs.is_empty()).then_some(jobs))
    }

    /// A job with its company name.
    pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<JobWithCompany> {
        query(format!("{JOB_WITH_COMPANY_FROM} WHERE j.id = $1"))
            .tag("jobs.get")
            .bind(id)
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| not_found("job", id))
    }

    /// Apply a partial update and return the updated job.
    ///
    /// `data` may hold `title`, `salary`, `equity`; the id and company are fixed.
    pub async fn update(conn: &impl GenericClient, id: i32, data: &FieldMap) -> JoblyResult<Job> {
        check_update_fields(data, JOB_UPDATABLE)?;
        let set = sql_for_partial_update(data, &[])?;
        let id_idx = set.values.len() + 1;
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ${id_idx} RETURNING {JOB_COLUMNS}",
            set.clause
        );

        query(sql)
            .tag("jobs.update")
            .bind_all(set.values)
            .bind(id)
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| not_found("job", id))
    }

    /// Delete a job.
    pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
        let deleted = query("DELETE FROM jobs WHERE id = $1")
            .tag("jobs.remove")
            .bind(id)
            .execute(conn)
            .await?;
        if deleted == 0 {
            return Err(not_found("job", id));
        }
        Ok(())
    }
}
