//! Criteria-to-SQL pipeline for one query.
//!
//! Composition runs in two stages. Every criterion is validated first (prepend
//! lists before client lists; filters, then sorts, then groups) so the first
//! fault is reported before anything is written. The resolved clauses are
//! then pushed onto a [`QueryBuilder`] in SQL order and the placeholders are
//! rebound for the dialect.

use crate::builder::{QueryBuilder, QueryResult};
use crate::config::QueryConfig;
use crate::criteria::Criteria;
use crate::dialect::Dialect;
use crate::error::CriteriaError;
use crate::registry::FieldRegistry;
use crate::validate::{
    ResolvedFilter, ResolvedGroup, ResolvedSort, validate_filter, validate_group, validate_sort,
};
use crate::value::Value;
use tracing::warn;

/// Which of the paired queries is being composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Row query: filters, groups (reconciled), sorts, limit/offset.
    Select,
    /// Count query: filters and groups only.
    Count,
}

#[derive(Debug, Default)]
struct Resolved {
    filters: Vec<ResolvedFilter>,
    sorts: Vec<ResolvedSort>,
    groups: Vec<ResolvedGroup>,
}

/// Validate `prepend` (trusted) then `client` criteria, stopping at the first fault.
fn resolve_all<T, R>(
    prepend: &[T],
    client: &[T],
    validate: impl Fn(&T, bool) -> Result<R, CriteriaError>,
) -> Result<Vec<R>, CriteriaError> {
    prepend
        .iter()
        .map(|c| validate(c, true))
        .chain(client.iter().map(|c| validate(c, false)))
        .collect()
}

fn resolve<D: Dialect>(
    criteria: &Criteria,
    registry: &FieldRegistry,
    config: &QueryConfig<D>,
    kind: QueryKind,
) -> Result<Resolved, CriteriaError> {
    let mut resolved = Resolved::default();

    if !config.exclude_filters {
        resolved.filters = resolve_all(&config.prepend_filters, &criteria.filters, |f, trusted| {
            validate_filter(f, registry, trusted)
        })?;
    }
    if kind == QueryKind::Select && !config.exclude_sorts {
        resolved.sorts = resolve_all(&config.prepend_sorts, &criteria.sorts, |s, trusted| {
            validate_sort(s, registry, trusted)
        })?;
    }
    if !config.exclude_groups {
        resolved.groups = resolve_all(&config.prepend_groups, &criteria.groups, |g, trusted| {
            validate_group(g, registry, trusted)
        })?;
    }

    if kind == QueryKind::Select && config.reconcile_groups() {
        reconcile_groups(&mut resolved.groups, &resolved.sorts);
    }

    Ok(resolved)
}

/// Add every sorted field missing from a non-empty group list.
///
/// Databases reject `order by` on a column that is neither grouped nor
/// aggregated. Field names compare case-sensitively; sort order is kept.
fn reconcile_groups(groups: &mut Vec<ResolvedGroup>, sorts: &[ResolvedSort]) {
    if groups.is_empty() {
        return;
    }
    for sort in sorts {
        if !groups.iter().any(|g| g.field == sort.field) {
            groups.push(ResolvedGroup {
                field: sort.field.clone(),
                column: sort.column.clone(),
            });
        }
    }
}

/// Compose one query from `base` and the request criteria.
///
/// `base_args` bind the placeholders already in `base` and come first in the
/// returned parameters, followed by prepend criteria, client criteria and the
/// paging window.
///
/// ```
/// use gridsql::{
///     compose, Criteria, FieldConfig, FieldRegistry, Filter, Operator, QueryConfig,
///     QueryKind, Value,
/// };
///
/// let registry = FieldRegistry::new()
///     .field("user.name", FieldConfig::new("user.name").filterable().sortable());
/// let criteria = Criteria {
///     filters: vec![Filter::new("user.name", Operator::Eq, "foo")],
///     ..Criteria::default()
/// };
///
/// let query = compose(
///     "select * from user",
///     &[],
///     &criteria,
///     &registry,
///     &QueryConfig::mysql(),
///     QueryKind::Select,
/// )
/// .unwrap();
///
/// assert_eq!(query.sql, "select * from user where user.name = ?");
/// assert_eq!(query.params, vec![Value::from("foo")]);
/// ```
pub fn compose<D: Dialect>(
    base: &str,
    base_args: &[Value],
    criteria: &Criteria,
    registry: &FieldRegistry,
    config: &QueryConfig<D>,
    kind: QueryKind,
) -> Result<QueryResult, CriteriaError> {
    let resolved = resolve(criteria, registry, config, kind).inspect_err(|e| {
        warn!(kind = ?e.kind, clause = %e.clause, field = %e.field, "rejected criteria");
    })?;

    let mut builder = QueryBuilder::new(*config.dialect(), base).with_args(base_args.to_vec());
    for filter in &resolved.filters {
        builder.push_filter(filter);
    }
    for group in &resolved.groups {
        builder.push_group(&group.column);
    }
    for sort in &resolved.sorts {
        builder.push_sort(&sort.column, sort.dir);
    }
    if kind == QueryKind::Select
        && !config.exclude_limit_offset
        && let Some(window) = criteria.window
    {
        builder.limit_offset(window);
    }

    Ok(builder.finish())
}
