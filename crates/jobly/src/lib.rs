//! # jobly
//!
//! Postgres data access for a companies-and-jobs API, built around small
//! dynamic SQL fragment builders.
//!
//! ## Fragment builders
//!
//! Client-supplied fields arrive as an ordered [`FieldMap`]. The builders in
//! [`sql_for`] turn such a map into a [`SqlFragment`]: clause text with
//! `$1, $2, ...` placeholders plus the values to bind, in the same order.
//!
//! - [`sql_for_partial_update`] builds the `SET` list of an `UPDATE`
//! - [`sql_for_company_filter`] / [`sql_for_job_filter`] build `WHERE`
//!   predicates from an allow-listed set of search fields
//!
//! ```ignore
//! use jobly::{FieldMap, sql_for_company_filter};
//!
//! let criteria = FieldMap::new().with("name", "net").with("minEmployees", 10);
//! let filter = sql_for_company_filter(&criteria)?.expect("criteria given");
//! assert_eq!(filter.clause, "name ILIKE $1 AND num_employees >= $2");
//! ```
//!
//! ## Models
//!
//! [`Company`] and [`Job`] consume the fragments and run the statements on any
//! [`GenericClient`] (a `tokio_postgres::Client`, a transaction, or a pooled
//! connection):
//!
//! ```ignore
//! let pool = jobly::create_pool_from_config(&jobly::DbConfig::from_env()?)?;
//! let client = pool.get().await?;
//!
//! let criteria = FieldMap::new().with("minSalary", "50000").with("hasEquity", "true");
//! match Job::filter(&client, &criteria).await? {
//!     Some(jobs) => println!("{} jobs", jobs.len()),
//!     None => println!("no matching jobs"),
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod fields;
pub mod models;
pub mod query;
pub mod row;
pub mod sql_for;
pub mod value;

pub use client::GenericClient;
pub use config::DbConfig;
pub use error::{JoblyError, JoblyResult};
pub use fields::FieldMap;
pub use models::{Company, CompanyWithJobs, Job, JobWithCompany, NewCompany, NewJob};
pub use query::{Query, query};
pub use row::{FromRow, RowExt};
pub use sql_for::{
    CompanyFilterField, FilterField, JobFilterField, SqlFragment, sql_for_company_filter,
    sql_for_job_filter, sql_for_partial_update,
};
pub use value::FieldValue;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_from_config, create_pool_with_config, create_pool_with_tls};
