//! Request parameter names and per-endpoint query configuration.

use crate::constants::{
    DEFAULT_FILTER_PARAM, DEFAULT_GROUP_PARAM, DEFAULT_SKIP_PARAM, DEFAULT_SORT_PARAM,
    DEFAULT_TAKE_PARAM, ENV_DISABLE_GROUP_RECONCILE, ENV_PARAM_FILTERS, ENV_PARAM_GROUPS,
    ENV_PARAM_SKIP, ENV_PARAM_SORTS, ENV_PARAM_TAKE, ENV_TAKE_LIMIT,
};
use crate::criteria::{Filter, Group, Sort};
use crate::dialect::{Dialect, MySql, Postgres, SqlServer, Sqlite};
use crate::env;

/// Names of the request parameters carrying criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamConfig {
    pub filters: String,
    pub sorts: String,
    pub groups: String,
    pub take: String,
    pub skip: String,
}

impl Default for ParamConfig {
    fn default() -> Self {
        Self {
            filters: DEFAULT_FILTER_PARAM.to_string(),
            sorts: DEFAULT_SORT_PARAM.to_string(),
            groups: DEFAULT_GROUP_PARAM.to_string(),
            take: DEFAULT_TAKE_PARAM.to_string(),
            skip: DEFAULT_SKIP_PARAM.to_string(),
        }
    }
}

impl ParamConfig {
    /// Default names, overridden by `GRIDSQL_PARAM_*` variables in `env`.
    pub fn from_env(env: &[(String, String)]) -> Self {
        Self {
            filters: env::get_or(env, ENV_PARAM_FILTERS, DEFAULT_FILTER_PARAM),
            sorts: env::get_or(env, ENV_PARAM_SORTS, DEFAULT_SORT_PARAM),
            groups: env::get_or(env, ENV_PARAM_GROUPS, DEFAULT_GROUP_PARAM),
            take: env::get_or(env, ENV_PARAM_TAKE, DEFAULT_TAKE_PARAM),
            skip: env::get_or(env, ENV_PARAM_SKIP, DEFAULT_SKIP_PARAM),
        }
    }
}

/// How one endpoint composes its queries.
///
/// Prepend criteria are server-chosen: they are applied before the client's and
/// are not checked against the field registry's capability flags.
///
/// # Example
///
/// ```
/// use gridsql::{Filter, Operator, QueryConfig, Sort};
///
/// let config = QueryConfig::postgres()
///     .take_limit(100)
///     .prepend_filter(Filter::new("tenant", Operator::Eq, 7))
///     .prepend_sort(Sort::desc("created"));
///
/// assert_eq!(config.take_ceiling(), Some(100));
/// ```
#[derive(Debug, Clone)]
pub struct QueryConfig<D: Dialect> {
    dialect: D,
    take_limit: Option<u64>,
    pub(crate) prepend_filters: Vec<Filter>,
    pub(crate) prepend_sorts: Vec<Sort>,
    pub(crate) prepend_groups: Vec<Group>,
    pub(crate) exclude_filters: bool,
    pub(crate) exclude_groups: bool,
    pub(crate) exclude_sorts: bool,
    pub(crate) exclude_limit_offset: bool,
    pub(crate) disable_group_reconcile: bool,
}

impl<D: Dialect> QueryConfig<D> {
    /// Configuration for `dialect` with no take ceiling and nothing excluded.
    pub const fn new(dialect: D) -> Self {
        Self {
            dialect,
            take_limit: None,
            prepend_filters: Vec::new(),
            prepend_sorts: Vec::new(),
            prepend_groups: Vec::new(),
            exclude_filters: false,
            exclude_groups: false,
            exclude_sorts: false,
            exclude_limit_offset: false,
            disable_group_reconcile: false,
        }
    }

    /// Apply `GRIDSQL_TAKE_LIMIT` and `GRIDSQL_DISABLE_GROUP_RECONCILE` from `env`.
    ///
    /// Unset or unparsable variables leave the current setting alone.
    #[must_use]
    pub fn from_env(mut self, env: &[(String, String)]) -> Self {
        if let Some(limit) = env::u64(env, ENV_TAKE_LIMIT) {
            self.take_limit = Some(limit);
        }
        self.disable_group_reconcile =
            env::bool(env, ENV_DISABLE_GROUP_RECONCILE, self.disable_group_reconcile);
        self
    }

    /// Page size ceiling. Without one, no `limit`/`offset` is ever emitted.
    #[must_use]
    pub const fn take_limit(mut self, limit: u64) -> Self {
        self.take_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn prepend_filter(mut self, filter: Filter) -> Self {
        self.prepend_filters.push(filter);
        self
    }

    #[must_use]
    pub fn prepend_sort(mut self, sort: Sort) -> Self {
        self.prepend_sorts.push(sort);
        self
    }

    #[must_use]
    pub fn prepend_group(mut self, group: Group) -> Self {
        self.prepend_groups.push(group);
        self
    }

    /// Skip the `where` clause entirely, prepend filters included.
    #[must_use]
    pub const fn exclude_filters(mut self, exclude: bool) -> Self {
        self.exclude_filters = exclude;
        self
    }

    #[must_use]
    pub const fn exclude_groups(mut self, exclude: bool) -> Self {
        self.exclude_groups = exclude;
        self
    }

    #[must_use]
    pub const fn exclude_sorts(mut self, exclude: bool) -> Self {
        self.exclude_sorts = exclude;
        self
    }

    #[must_use]
    pub const fn exclude_limit_offset(mut self, exclude: bool) -> Self {
        self.exclude_limit_offset = exclude;
        self
    }

    /// Stop adding sort fields to `group by` on row queries.
    #[must_use]
    pub const fn disable_group_reconcile(mut self, disable: bool) -> Self {
        self.disable_group_reconcile = disable;
        self
    }

    pub const fn dialect(&self) -> &D {
        &self.dialect
    }

    pub const fn take_ceiling(&self) -> Option<u64> {
        self.take_limit
    }

    /// Ceiling to decode `take` against, or `None` when paging is off.
    pub(crate) const fn window_ceiling(&self) -> Option<u64> {
        if self.exclude_limit_offset {
            None
        } else {
            self.take_limit
        }
    }

    pub const fn reconcile_groups(&self) -> bool {
        !self.disable_group_reconcile
    }
}

impl QueryConfig<Postgres> {
    pub const fn postgres() -> Self {
        Self::new(Postgres)
    }
}

impl QueryConfig<Sqlite> {
    pub const fn sqlite() -> Self {
        Self::new(Sqlite)
    }
}

impl QueryConfig<MySql> {
    pub const fn mysql() -> Self {
        Self::new(MySql)
    }
}

impl QueryConfig<SqlServer> {
    pub const fn sql_server() -> Self {
        Self::new(SqlServer)
    }
}
