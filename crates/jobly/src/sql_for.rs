//! SQL fragment builders for partial updates and search filters.
//!
//! Each builder turns a client-supplied [`FieldMap`] into a [`SqlFragment`]: a
//! piece of SQL with `$1, $2, ...` placeholders plus the values to bind, in
//! placeholder order. The data-access layer interpolates the clause into a full
//! statement and binds the values.
//!
//! # Example
//!
//! ```ignore
//! use jobly::{FieldMap, sql_for_job_filter};
//!
//! let criteria = FieldMap::new()
//!     .with("title", "engineer")
//!     .with("minSalary", 100_000)
//!     .with("hasEquity", "true");
//!
//! let fragment = sql_for_job_filter(&criteria)?.expect("criteria given");
//! assert_eq!(fragment.clause, "title ILIKE $1 AND salary >= $2 AND equity > 0");
//! ```

use crate::error::{JoblyError, JoblyResult};
use crate::fields::FieldMap;
use crate::value::FieldValue;


/// A clause fragment and its positional values.
///
/// `clause` holds exactly `values.len()` placeholders, numbered `$1..=$n` in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFragment {
    pub clause: String,
    pub values: Vec<FieldValue>,
}

impl SqlFragment {
    /// Number of `$n` placeholders in the clause.
    pub fn placeholder_count(&self) -> usize {
        let bytes = self.clause.as_bytes();
        bytes
            .windows(2)
            .filter(|w| w[0] == b'$' && w[1].is_ascii_digit())
            .count()
    }
}

/// Collects clause items, numbering placeholders as values are bound.
#[derive(Default)]
struct FragmentWriter {
    items: Vec<String>,
    values: Vec<FieldValue>,
}

impl FragmentWriter {
    /// Append `sql` followed by the next placeholder, and bind `value` to it.
    fn push_bind(&mut self, sql: &str, value: FieldValue) {
        self.values.push(value);
        let idx = self.values.len();
        self.items.push(format!("{sql}${idx}"));
    }

    /// Append a literal item that consumes no placeholder.
    fn push(&mut self, sql: &str) {
        self.items.push(sql.to_string());
    }

    fn finish(self, separator: &str) -> Option<SqlFragment> {
        if self.items.is_empty() {
            return None;
        }
        Some(SqlFragment {
            clause: self.items.join(separator),
            values: self.values,
        })
    }
}

/// Build the `SET` list of an `UPDATE` from the fields present in `data`.
///
/// `js_to_sql` maps logical names to column names (`numEmployees` →
/// `num_employees`); keys without an entry are used as the column name verbatim.
/// No allow-listing happens here, callers restrict the accepted keys.
///
/// ```ignore
/// let data = FieldMap::new().with("firstName", "Aliya").with("age", 32);
/// let set = sql_for_partial_update(&data, &[("firstName", "first_name")])?;
/// assert_eq!(set.clause, r#""first_name"=$1, "age"=$2"#);
/// ```
pub fn sql_for_partial_update(
    data: &FieldMap,
    js_to_sql: &[(&str, &str)],
) -> JoblyResult<SqlFragment> {
    let mut writer = FragmentWriter::default();
    for (key, value) in data.iter() {
        let column = js_to_sql
            .iter()
            .find(|(logical, _)| *logical == key)
            .map_or(key, |(_, column)| *column);
        writer.push_bind(&format!("{}=", quote_column(column)), value.clone());
    }
    writer
        .finish(", ")
        .ok_or_else(|| JoblyError::bad_request("No data"))
}

/// Quote a column name, escaping embedded `"` as `""`.
fn quote_column(column: &str) -> String {
    format!("\"{}\"", column.replace('"', "\"\""))
}

/// A closed set of filterable logical fields for one resource kind.
pub trait FilterField: Copy + 'static {
    /// Every accepted field; its length caps how many criteria a filter may carry.
    const ALL: &'static [Self];

    /// The logical (API-level) name of the field.
    fn key(self) -> &'static str;

    /// Look up a logical name, rejecting anything outside the allow-list.
    fn parse(key: &str) -> JoblyResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.key() == key)
            .ok_or_else(|| JoblyError::bad_request(format!("Unaccepted field: {key}")))
    }
}

/// Logical fields a company search may filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyFilterField {
    /// `name`: case-insensitive substring match
    Name,
    /// `minEmployees`: lower bound on `num_employees`
    MinEmployees,
    /// `maxEmployees`: upper bound on `num_employees`
    MaxEmployees,
}

impl FilterField for CompanyFilterField {
    const ALL: &'static [Self] = &[Self::Name, Self::MinEmployees, Self::MaxEmployees];

    fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::MinEmployees => "minEmployees",
            Self::MaxEmployees => "maxEmployees",
        }
    }
}

/// Logical fields a job search may filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFilterField {
    /// `title`: case-insensitive substring match
    Title,
    /// `minSalary`: positive integer lower bound on `salary`
    MinSalary,
    /// `hasEquity`: `"true"` keeps only jobs with non-zero equity
    HasEquity,
}

impl FilterField for JobFilterField {
    const ALL: &'static [Self] = &[Self::Title, Self::MinSalary, Self::HasEquity];

    fn key(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::MinSalary => "minSalary",
            Self::HasEquity => "hasEquity",
        }
    }
}

/// Reject criteria carrying more keys than `F` has fields.
fn check_field_count<F: FilterField>(criteria: &FieldMap) -> JoblyResult<()> {
    if criteria.len() > F::ALL.len() {
        return Err(JoblyError::bad_request("Too many fields"));
    }
    Ok(())
}

/// Wrap a value for `ILIKE` substring matching.
fn contains_pattern(value: &FieldValue) -> FieldValue {
    FieldValue::Text(format!("%{value}%"))
}

/// Build the `WHERE` predicates of a company search.
///
/// Returns `Ok(None)` when `criteria` is empty (no filter). Employee bounds are
/// bound unchanged; the column type rejects non-numeric input when executed.
pub fn sql_for_company_filter(criteria: &FieldMap) -> JoblyResult<Option<SqlFragment>> {
    if criteria.is_empty() {
        return Ok(None);
    }
    check_field_count::<CompanyFilterField>(criteria)?;

    let mut writer = FragmentWriter::default();
    for (key, value) in criteria.iter() {
        match CompanyFilterField::parse(key)? {
            CompanyFilterField::Name => writer.push_bind("name ILIKE ", contains_pattern(value)),
            CompanyFilterField::MinEmployees => {
                writer.push_bind("num_employees >= ", value.clone());
            }
            CompanyFilterField::MaxEmployees => {
                writer.push_bind("num_employees <= ", value.clone());
            }
        }
    }
    Ok(writer.finish(" AND "))
}

/// Build the `WHERE` predicates of a job search.
///
/// Returns `Ok(None)` when `criteria` is empty, or when the only criterion is
/// `hasEquity: "false"` (which filters nothing). `hasEquity: "true"` compiles to
/// the literal `equity > 0` and binds no value.
pub fn sql_for_job_filter(criteria: &FieldMap) -> JoblyResult<Option<SqlFragment>> {
    if criteria.is_empty() {
        return Ok(None);
    }
    check_field_count::<JobFilterField>(criteria)?;

    let mut writer = FragmentWriter::default();
    for (key, value) in criteria.iter() {
        match JobFilterField::parse(key)? {
            JobFilterField::Title => writer.push_bind("title ILIKE ", contains_pattern(value)),
            JobFilterField::MinSalary => {
                let salary = parse_min_salary(value)?;
                writer.push_bind("salary >= ", FieldValue::Int(salary));
            }
            JobFilterField::HasEquity => {
                if parse_has_equity(value)? {
                    writer.push("equity > 0");
                }
            }
        }
    }
    Ok(writer.finish(" AND "))
}

fn parse_min_salary(value: &FieldValue) -> JoblyResult<i32> {
    let parsed = match value {
        FieldValue::Int(n) => Some(*n),
        FieldValue::Text(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    };
    parsed
        .filter(|n| *n > 0)
        .ok_or_else(|| JoblyError::bad_request(format!("Unaccepted value for minSalary: {value}")))
}

fn parse_has_equity(value: &FieldValue) -> JoblyResult<bool> {
    match value {
        FieldValue::Bool(b) => Ok(*b),
        FieldValue::Text(s) if s == "true" => Ok(true),
        FieldValue::Text(s) if s == "false" => Ok(false),
        other => Err(JoblyError::bad_request(format!(
            "Unaccepted value for hasEquity: {other}"
        ))),
    }
}
