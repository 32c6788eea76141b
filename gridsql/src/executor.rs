//! Paired row/count execution and the database seams.
//!
//! The crate owns no connection. Callers implement [`Executor`] over whatever
//! driver they use; [`build_and_run`] decodes the request once, then composes
//! and runs the row query followed by the count query.

use crate::compose::{QueryKind, compose};
use crate::config::{ParamConfig, QueryConfig};
use crate::decode::decode_criteria;
use crate::dialect::Dialect;
use crate::error::{Error, ErrorKind, Result};
use crate::page::Page;
use crate::params::FormSource;
use crate::registry::FieldRegistry;
use crate::value::Value;
use tracing::{debug, instrument, warn};

/// A database handle able to run composed queries.
///
/// `args` are already flattened and align with the placeholders of `sql`.
pub trait Executor {
    type Row;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run a row query.
    fn query(&mut self, sql: &str, args: &[Value]) -> Result<Vec<Self::Row>, Self::Error>;

    /// Run a count query. One count per returned row (grouped counts are summed).
    fn query_counts(&mut self, sql: &str, args: &[Value]) -> Result<Vec<i64>, Self::Error>;
}

/// The hand-written part of a listing endpoint.
///
/// `query` selects rows and `count_query` counts them; both must have the same
/// `from`/`join`/`where` shape so that the appended criteria mean the same
/// thing. `args` bind placeholders already present in both.
#[derive(Debug, Clone, Copy)]
pub struct ListQuery<'a> {
    pub query: &'a str,
    pub count_query: &'a str,
    pub args: &'a [Value],
}

impl<'a> ListQuery<'a> {
    pub const fn new(query: &'a str, count_query: &'a str) -> Self {
        Self {
            query,
            count_query,
            args: &[],
        }
    }

    #[must_use]
    pub const fn with_args(mut self, args: &'a [Value]) -> Self {
        self.args = args;
        self
    }
}

/// Decode the request criteria, then run the row query and the count query.
///
/// The first failure aborts; on error no rows are returned. Nothing is retried
/// here (see [`run_with_recovery`]).
#[instrument(skip_all, fields(dialect = config.dialect().name()))]
pub fn build_and_run<D, S, E>(
    list: ListQuery<'_>,
    registry: &FieldRegistry,
    params: &S,
    names: &ParamConfig,
    config: &QueryConfig<D>,
    db: &mut E,
) -> Result<Page<E::Row>>
where
    D: Dialect,
    S: FormSource + ?Sized,
    E: Executor + ?Sized,
{
    let criteria = decode_criteria(params, names, config.window_ceiling()).inspect_err(|e| {
        warn!(param = %e.param, "rejected request parameter");
    })?;

    let rows_query = compose(list.query, list.args, &criteria, registry, config, QueryKind::Select)?;
    let rows = db
        .query(&rows_query.sql, &rows_query.params)
        .map_err(execution_fault)?;

    let count_query = compose(
        list.count_query,
        list.args,
        &criteria,
        registry,
        config,
        QueryKind::Count,
    )?;
    let counts = db
        .query_counts(&count_query.sql, &count_query.params)
        .map_err(execution_fault)?;

    let total = counts.iter().fold(0i64, |acc, n| acc.saturating_add(*n));
    let total = u64::try_from(total).unwrap_or(0);
    debug!(rows = rows.len(), total, "listing query done");

    Ok(Page::new(rows, total, criteria.window))
}

fn execution_fault<E: std::error::Error + Send + Sync + 'static>(err: E) -> Error {
    warn!(error = %err, "query execution failed");
    Error::execution(err)
}

/// Brings a database handle back after an execution fault.
///
/// Typically reconnects or takes a fresh connection from a pool. Closures of
/// the form `FnMut(&Error) -> Result<E>` implement it.
pub trait Recover<E> {
    fn recover(&mut self, err: &Error) -> Result<E>;
}

impl<E, F> Recover<E> for F
where
    F: FnMut(&Error) -> Result<E>,
{
    fn recover(&mut self, err: &Error) -> Result<E> {
        self(err)
    }
}

/// Run `op`, and on an execution fault recover `db` and run it exactly once more.
///
/// Client faults are returned as-is; retrying cannot fix a bad request.
#[instrument(skip_all)]
pub fn run_with_recovery<E, R, T, F>(db: &mut E, recovery: &mut R, mut op: F) -> Result<T>
where
    R: Recover<E>,
    F: FnMut(&mut E) -> Result<T>,
{
    match op(db) {
        Err(err) if err.kind() == ErrorKind::Execution => {
            warn!("retrying after execution fault");
            *db = recovery.recover(&err)?;
            op(db)
        },
        other => other,
    }
}
