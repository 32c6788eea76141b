//! Query buffer: appends criteria clauses to a caller-supplied base query.
//!
//! Unlike a from-scratch SELECT builder, the base query here is opaque SQL the
//! endpoint wrote by hand. It is scanned once, when the builder is created, to
//! find out whether it already opens a `where`, `group by` or `order by` clause
//! (at parenthesis depth zero, outside quotes and comments). From then on the builder's own
//! flags decide whether to open a clause or join onto it.
//!
//! Clauses must be pushed in SQL order: filters, groups, sorts, then the
//! paging window. [`crate::compose`] does that; the methods here do not
//! reorder anything.

use crate::criteria::{Filter, Group, LimitOffset, Sort, SortDir};
use crate::dialect::{Dialect, code_chars, ends_in_line_comment, expand_in, rebind};
use crate::error::CriteriaError;
use crate::registry::FieldRegistry;
use crate::validate::{Predicate, ResolvedFilter, validate_filter, validate_group, validate_sort};
use crate::value::Value;
use tracing::debug;

/// Query result with SQL string and parameters.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "QueryResult must be used to execute the query"]
pub struct QueryResult {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Which clauses the SQL text already opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenClauses {
    pub has_where: bool,
    pub has_group_by: bool,
    pub has_order_by: bool,
}

impl OpenClauses {
    /// Scan `sql` for top-level `where`, `group by` and `order by`.
    ///
    /// Keywords inside parentheses (subqueries, function calls), quoted text
    /// or comments do not count. Matching is case-insensitive.
    pub fn scan(sql: &str) -> Self {
        let words = top_level_words(sql);
        let pair = |a: &str, b: &str| words.windows(2).any(|w| w[0] == a && w[1] == b);
        Self {
            has_where: words.iter().any(|w| w == "where"),
            has_group_by: pair("group", "by"),
            has_order_by: pair("order", "by"),
        }
    }
}

/// Lowercased words of `sql` at parenthesis depth zero, outside quotes and
/// comments.
fn top_level_words(sql: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for (_, c) in code_chars(sql) {
        if depth == 0 && (c.is_alphanumeric() || c == '_') {
            current.push(c.to_ascii_lowercase());
            continue;
        }
        if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {},
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// SQL query buffer with dialect support.
///
/// Holds the SQL text written so far, the arguments bound so far (in
/// placeholder order) and the open-clause flags.
///
/// ```
/// use gridsql::{Postgres, QueryBuilder, SortDir, Value};
///
/// let mut builder = QueryBuilder::new(Postgres, "select * from users where active");
/// builder.push_condition("age", ">=", Value::Int(18));
/// builder.push_sort("name", SortDir::Asc);
/// let result = builder.finish();
///
/// assert_eq!(result.sql, "select * from users where active and age >= $1 order by name asc");
/// assert_eq!(result.params, vec![Value::Int(18)]);
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder<D: Dialect> {
    dialect: D,
    sql: String,
    args: Vec<Value>,
    open: OpenClauses,
}

impl<D: Dialect> QueryBuilder<D> {
    /// Start from `base`. Trailing whitespace is dropped, unless `base` ends in
    /// a `--` comment, which is closed with a newline.
    pub fn new(dialect: D, base: &str) -> Self {
        let mut sql = base.trim_end().to_string();
        if ends_in_line_comment(&sql) {
            sql.push('\n');
        }
        Self {
            dialect,
            open: OpenClauses::scan(&sql),
            sql,
            args: Vec::new(),
        }
    }

    /// Arguments for placeholders already present in the base query.
    ///
    /// They are bound ahead of everything the builder appends.
    #[must_use]
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        let mut appended = std::mem::replace(&mut self.args, args);
        self.args.append(&mut appended);
        self
    }

    pub const fn open_clauses(&self) -> OpenClauses {
        self.open
    }

    /// SQL written so far, placeholders still neutral.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    // ═══════════════════════════════════════════════════════════════════════
    // RAW PUSHES
    // ═══════════════════════════════════════════════════════════════════════

    fn open_where(&mut self) {
        self.sql.push_str(if self.open.has_where { " and " } else { " where " });
        self.open.has_where = true;
    }

    /// Append `column <op> ?` and bind `value`.
    ///
    /// `column` and `op` are written as-is; only pass trusted text.
    pub fn push_condition(&mut self, column: &str, op: &str, value: Value) {
        self.open_where();
        self.sql.push_str(&format!("{column} {op} ?"));
        self.args.push(value);
    }

    /// Append a validated filter.
    pub fn push_filter(&mut self, filter: &ResolvedFilter) {
        let column = &filter.column;
        match &filter.predicate {
            Predicate::Compare(op, value) => self.push_condition(column, op, value.clone()),
            Predicate::In(values) => {
                self.open_where();
                self.sql.push_str(&format!("{column} in (?)"));
                self.args.push(values.clone());
            },
            Predicate::Like { negated, pattern } => {
                self.open_where();
                self.sql.push_str(&format!(
                    "{column} {} ?{}",
                    self.dialect.like_op(*negated),
                    self.dialect.like_escape()
                ));
                self.args.push(Value::String(pattern.clone()));
            },
            Predicate::IsNull => self.push_bare(column, "is null"),
            Predicate::IsNotNull => self.push_bare(column, "is not null"),
            Predicate::IsEmpty => self.push_bare(column, "= ''"),
            Predicate::IsNotEmpty => self.push_bare(column, "!= ''"),
        }
    }

    fn push_bare(&mut self, column: &str, tail: &str) {
        self.open_where();
        self.sql.push_str(&format!("{column} {tail}"));
    }

    /// Append `column` to the `group by` list.
    pub fn push_group(&mut self, column: &str) {
        self.sql.push_str(if self.open.has_group_by { ", " } else { " group by " });
        self.open.has_group_by = true;
        self.sql.push_str(column);
    }

    /// Append `column dir` to the `order by` list.
    pub fn push_sort(&mut self, column: &str, dir: SortDir) {
        self.sql.push_str(if self.open.has_order_by { ", " } else { " order by " });
        self.open.has_order_by = true;
        self.sql.push_str(&format!("{column} {}", dir.as_str()));
    }

    /// Append `limit ? offset ?` and bind take and skip.
    pub fn limit_offset(&mut self, window: LimitOffset) {
        self.sql.push_str(" limit ? offset ?");
        self.args.push(Value::Int(i64::try_from(window.take).unwrap_or(i64::MAX)));
        self.args.push(Value::Int(i64::try_from(window.skip).unwrap_or(i64::MAX)));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // VALIDATED APPLY
    // ═══════════════════════════════════════════════════════════════════════

    /// Validate and append every filter. Stops at the first fault.
    ///
    /// With `trusted`, capability flags are not checked and unregistered
    /// fields are used verbatim as the column.
    pub fn apply_filters(
        &mut self,
        filters: &[Filter],
        registry: &FieldRegistry,
        trusted: bool,
    ) -> Result<(), CriteriaError> {
        for filter in filters {
            let resolved = validate_filter(filter, registry, trusted)?;
            self.push_filter(&resolved);
        }
        Ok(())
    }

    /// Validate and append every group. Stops at the first fault.
    pub fn apply_groups(
        &mut self,
        groups: &[Group],
        registry: &FieldRegistry,
        trusted: bool,
    ) -> Result<(), CriteriaError> {
        for group in groups {
            let resolved = validate_group(group, registry, trusted)?;
            self.push_group(&resolved.column);
        }
        Ok(())
    }

    /// Validate and append every sort. Stops at the first fault.
    pub fn apply_sorts(
        &mut self,
        sorts: &[Sort],
        registry: &FieldRegistry,
        trusted: bool,
    ) -> Result<(), CriteriaError> {
        for sort in sorts {
            let resolved = validate_sort(sort, registry, trusted)?;
            self.push_sort(&resolved.column, resolved.dir);
        }
        Ok(())
    }

    /// Expand array arguments and rebind placeholders for the dialect.
    pub fn finish(self) -> QueryResult {
        let (expanded, params) = expand_in(&self.sql, self.args);
        let sql = rebind(&self.dialect, &expanded);
        debug!(
            dialect = self.dialect.name(),
            sql_len = sql.len(),
            args = params.len(),
            "composed query"
        );
        QueryResult { sql, params }
    }
}
