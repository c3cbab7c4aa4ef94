use super::job::{JOB_COLUMNS, Job};
use super::{check_update_fields, not_found};
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::fields::FieldMap;
use crate::query::query;
use crate::row::{FromRow, RowExt};
use crate::sql_for::{sql_for_company_filter, sql_for_partial_update};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

const COMPANY_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

/// Logical → column names for company updates.
const COMPANY_JS_TO_SQL: &[(&str, &str)] =
    &[("numEmployees", "num_employees"), ("logoUrl", "logo_url")];

/// Fields a company update may change.
const COMPANY_UPDATABLE: &[&str] = &["name", "description", "numEmployees", "logoUrl"];

/// A row of `companies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// Data for a new company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// A company together with its jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyWithJobs {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

impl Company {
    /// Insert a company and return it.
    ///
    /// Fails with `BadRequest` if the handle is already taken.
    pub async fn create(conn: &impl GenericClient, new: &NewCompany) -> JoblyResult<Company> {
        let existing = query("SELECT handle FROM companies WHERE handle = $1")
            .tag("companies.create.check")
            .bind(new.handle.clone())
            .fetch_all(conn)
            .await?;
        if !existing.is_empty() {
            tracing::debug!(target: "jobly.models", handle = %new.handle, "duplicate company");
            return Err(JoblyError::bad_request(format!(
                "Duplicate company: {}",
                new.handle
            )));
        }

        query(format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COMPANY_COLUMNS}"
        ))
        .tag("companies.create")
        .bind(new.handle.clone())
        .bind(new.name.clone())
        .bind(new.description.clone())
        .bind(new.num_employees)
        .bind(new.logo_url.clone())
        .fetch_one_as(conn)
        .await
    }

    /// All companies, ordered by name.
    pub async fn find_all(conn: &impl GenericClient) -> JoblyResult<Vec<Company>> {
        query(format!(
            "SELECT {COMPANY_COLUMNS} FROM companies ORDER BY name"
        ))
        .tag("companies.find_all")
        .fetch_all_as(conn)
        .await
    }

    /// Companies matching `criteria` (`name`, `minEmployees`, `maxEmployees`).
    ///
    /// Empty criteria match every company. Returns `Ok(None)` when nothing matches.
    pub async fn filter(
        conn: &impl GenericClient,
        criteria: &FieldMap,
    ) -> JoblyResult<Option<Vec<Company>>> {
        let mut sql = format!("SELECT {COMPANY_COLUMNS} FROM companies");
        let values = match sql_for_company_filter(criteria)? {
            Some(filter) => {
                sql.push_str(" WHERE ");
                sql.push_str(&filter.clause);
                filter.values
            }
            None => Vec::new(),
        };
        sql.push_str(" ORDER BY name");

        let companies: Vec<Company> = query(sql)
            .tag("companies.filter")
            .bind_all(values)
            .fetch_all_as(conn)
            .await?;
        Ok((!companies.is_empty()).then_some(companies))
    }

    /// A company and its jobs.
    pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<CompanyWithJobs> {
        let company: Company = query(format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE handle = $1"
        ))
        .tag("companies.get")
        .bind(handle.to_string())
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| not_found("company", handle))?;

        let jobs = query(format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE company_handle = $1 ORDER BY id"
        ))
        .tag("companies.get.jobs")
        .bind(handle.to_string())
        .fetch_all_as(conn)
        .await?;

        Ok(CompanyWithJobs { company, jobs })
    }

    /// Apply a partial update and return the updated company.
    ///
    /// `data` may hold `name`, `description`, `numEmployees`, `logoUrl`.
    pub async fn update(
        conn: &impl GenericClient,
        handle: &str,
        data: &FieldMap,
    ) -> JoblyResult<Company> {
        check_update_fields(data, COMPANY_UPDATABLE)?;
        let set = sql_for_partial_update(data, COMPANY_JS_TO_SQL)?;
        let handle_idx = set.values.len() + 1;
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = ${handle_idx} RETURNING {COMPANY_COLUMNS}",
            set.clause
        );

        query(sql)
            .tag("companies.update")
            .bind_all(set.values)
            .bind(handle.to_string())
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| not_found("company", handle))
    }

    /// Delete a company (its jobs cascade).
    pub async fn remove(conn: &impl GenericClient, handle: &str) -> JoblyResult<()> {
        let deleted = query("DELETE FROM companies WHERE handle = $1")
            .tag("companies.remove")
            .bind(handle.to_string())
            .execute(conn)
            .await?;
        if deleted == 0 {
            return Err(not_found("company", handle));
        }
        Ok(())
    }
}
