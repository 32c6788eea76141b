// =============================================================================
// CRATE-LEVEL QUALITY LINTS
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // SQL keywords in docs
#![allow(clippy::module_name_repetitions)] // Type names matching module - acceptable
#![allow(clippy::return_self_not_must_use)] // Builder methods return Self
#![allow(clippy::must_use_candidate)] // Builder methods - fluent API doesn't need must_use
#![allow(clippy::format_push_string)] // String building style preference
#![allow(clippy::cast_precision_loss)] // u64 -> f64 for oversized JSON numbers
#![allow(clippy::indexing_slicing)] // Slices taken at char boundaries found by char_indices

//! # gridsql - Safe dynamic filtering, sorting and grouping for listing endpoints
//!
//! Listing endpoints let clients pick filters, sorts, groups and a page window
//! through request parameters. gridsql turns those parameters into SQL appended
//! to a hand-written base query, without ever putting client text into the
//! statement:
//!
//! - a [`FieldRegistry`] maps every client field name to a real column and says
//!   whether it may be filtered, sorted or grouped;
//! - values are always bound as arguments, never inlined;
//! - faults carry the offending field, so the client gets a precise 406.
//!
//! ## Quick Start
//!
//! ```
//! # use gridsql::prelude::*;
//! let registry = FieldRegistry::new()
//!     .field("name", FieldConfig::new("u.name").filterable().sortable())
//!     .field("team", FieldConfig::new("t.name").filterable().groupable());
//!
//! let params = QueryParams::parse(
//!     "filters=%5B%7B%22field%22%3A%22name%22%2C%22operator%22%3A%22startswith%22%2C%22value%22%3A%22al%22%7D%5D\
//!      &sorts=%5B%7B%22field%22%3A%22name%22%2C%22dir%22%3A%22asc%22%7D%5D&take=20",
//! )
//! .unwrap();
//!
//! let config = QueryConfig::postgres().take_limit(100);
//! let criteria = decode_criteria(&params, &ParamConfig::default(), config.take_ceiling()).unwrap();
//! let query = compose(
//!     "select u.* from users u join teams t on t.id = u.team_id",
//!     &[],
//!     &criteria,
//!     &registry,
//!     &config,
//!     QueryKind::Select,
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     query.sql,
//!     r"select u.* from users u join teams t on t.id = u.team_id where u.name ilike $1 escape '\' order by u.name asc limit $2 offset $3"
//! );
//! assert_eq!(query.params, vec![Value::from("al%"), Value::Int(20), Value::Int(0)]);
//! ```
//!
//! ## Filter Operators
//!
//! | Operator | SQL | Bound value |
//! |----------|-----|-------------|
//! | `eq` / `neq` | `=` / `!=` | value |
//! | `lt` / `lte` / `gt` / `gte` | `<` / `<=` / `>` / `>=` | value |
//! | `startswith` | `like ?` | `value%` |
//! | `endswith` | `like ?` | `%value` |
//! | `contains` | `like ?` | `%value%` |
//! | `doesnotcontain` | `not like ?` | `%value%` |
//! | `isnull` / `isnotnull` | `is null` / `is not null` | none |
//! | `isempty` / `isnotempty` | `= ''` / `!= ''` | none |
//!
//! An array value always becomes `in (?, ?, ...)`, whatever the operator.
//! Postgres uses `ilike` for the pattern operators.
//!
//! ## Paired Queries
//!
//! [`build_and_run`] runs a row query and a count query built from the same
//! criteria through any [`Executor`] and returns a [`Page`].

mod builder;
mod compose;
mod config;
pub mod constants;
mod criteria;
mod decode;
mod dialect;
pub mod env;
mod error;
mod executor;
mod page;
mod params;
mod registry;
mod validate;
mod value;

pub use builder::{OpenClauses, QueryBuilder, QueryResult};
pub use compose::{QueryKind, compose};
pub use config::{ParamConfig, QueryConfig};
pub use criteria::{Criteria, Filter, Group, LimitOffset, Operator, Sort, SortDir};
pub use decode::{decode_criteria, decode_filters, decode_groups, decode_limit_offset, decode_sorts};
pub use dialect::{Dialect, MySql, Postgres, SqlServer, Sqlite, count_placeholders, expand_in, rebind};
pub use error::{Clause, CriteriaError, DecodeError, Error, ErrorKind, Result};
pub use executor::{Executor, ListQuery, Recover, build_and_run, run_with_recovery};
pub use page::{Page, PageInfo};
pub use params::{FormSource, QueryParams, url_decode};
pub use registry::{Capability, FieldConfig, FieldRegistry};
pub use validate::{
    Predicate, ResolvedFilter, ResolvedGroup, ResolvedSort, escape_like, validate_filter,
    validate_group, validate_sort,
};
pub use value::Value;

/// Prelude module for convenient imports.
///
/// ```
/// use gridsql::prelude::*;
///
/// let registry = FieldRegistry::new().field("id", FieldConfig::all("id"));
/// let query = compose(
///     "select * from t",
///     &[],
///     &Criteria { sorts: vec![Sort::desc("id")], ..Criteria::default() },
///     &registry,
///     &QueryConfig::sqlite(),
///     QueryKind::Select,
/// )
/// .unwrap();
/// assert_eq!(query.sql, "select * from t order by id desc");
/// ```
pub mod prelude {
    pub use crate::{
        Criteria, Dialect, Error, ErrorKind, Executor, FieldConfig, FieldRegistry, Filter,
        FormSource, Group, LimitOffset, ListQuery, MySql, Operator, Page, PageInfo, ParamConfig,
        Postgres, QueryBuilder, QueryConfig, QueryKind, QueryParams, QueryResult, Sort, SortDir,
        SqlServer, Sqlite, Value, build_and_run, compose, decode_criteria, run_with_recovery,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    fn user_registry() -> FieldRegistry {
        FieldRegistry::new()
            .field("user.name", FieldConfig::new("user.name").filterable().sortable())
    }

    #[test]
    fn test_end_to_end_filter() {
        let params = QueryParams::parse(
            "filters=%5B%7B%22field%22%3A%22user.name%22%2C%22operator%22%3A%22eq%22%2C%22value%22%3A%22foo%22%7D%5D",
        )
        .unwrap();
        let config = QueryConfig::mysql();
        let criteria = decode_criteria(&params, &ParamConfig::default(), None).unwrap();
        let query = compose(
            "select * from user",
            &[],
            &criteria,
            &user_registry(),
            &config,
            QueryKind::Select,
        )
        .unwrap();
        assert_eq!(query.sql, "select * from user where user.name = ?");
        assert_eq!(query.params, vec![Value::from("foo")]);
    }

    #[test]
    fn test_end_to_end_unknown_field() {
        let criteria = Criteria {
            filters: vec![Filter::new("user.id", Operator::Eq, 1)],
            ..Criteria::default()
        };
        let err = compose(
            "select * from user",
            &[],
            &criteria,
            &user_registry(),
            &QueryConfig::mysql(),
            QueryKind::Select,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Field);
        assert_eq!(err.field, "user.id");
    }
}

// ============================================================================
// API Contract Tests (compile-time assertions)
// ============================================================================

#[cfg(test)]
mod api_contracts {
    use static_assertions::assert_impl_all;

    // ========================================================================
    // Shared configuration: built once, used from every request thread
    // ========================================================================

    assert_impl_all!(crate::FieldRegistry: Clone, Send, Sync, std::fmt::Debug);
    assert_impl_all!(crate::FieldConfig: Clone, Send, Sync, PartialEq, Eq);
    assert_impl_all!(crate::ParamConfig: Clone, Send, Sync, Default);
    assert_impl_all!(crate::QueryConfig<crate::Postgres>: Clone, Send, Sync, std::fmt::Debug);
    assert_impl_all!(crate::QueryConfig<crate::Sqlite>: Clone, Send, Sync);

    // ========================================================================
    // Dialects are zero-sized and copyable
    // ========================================================================

    assert_impl_all!(crate::Postgres: Copy, Default, Send, Sync);
    assert_impl_all!(crate::Sqlite: Copy, Default, Send, Sync);
    assert_impl_all!(crate::MySql: Copy, Default, Send, Sync);
    assert_impl_all!(crate::SqlServer: Copy, Default, Send, Sync);

    // ========================================================================
    // Criteria and values
    // ========================================================================

    // Value is Clone, Debug, PartialEq (no Eq because of Float)
    assert_impl_all!(crate::Value: Clone, std::fmt::Debug, PartialEq, Send, Sync);
    assert_impl_all!(crate::Filter: Clone, std::fmt::Debug, PartialEq);
    assert_impl_all!(crate::Criteria: Clone, std::fmt::Debug, Default);
    assert_impl_all!(crate::Operator: Copy, Clone, std::fmt::Debug, PartialEq, Eq);
    assert_impl_all!(crate::SortDir: Copy, Clone, std::fmt::Debug, PartialEq, Eq);
    assert_impl_all!(crate::QueryResult: Clone, std::fmt::Debug, PartialEq);
    assert_impl_all!(crate::PageInfo: Clone, std::fmt::Debug, PartialEq, Eq, Default);

    // ========================================================================
    // Error types
    // ========================================================================

    assert_impl_all!(crate::Error: std::error::Error, Send, Sync);
    assert_impl_all!(crate::CriteriaError: std::error::Error, Clone, Send, Sync);
    assert_impl_all!(crate::DecodeError: std::error::Error, Clone, PartialEq, Eq);
    assert_impl_all!(crate::ErrorKind: Copy, Eq, std::hash::Hash);
}
