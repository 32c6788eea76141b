//! Request criteria: filters, sorts, groups and the paging window.
//!
//! These are the decoded, not yet validated, shapes. Operator and direction
//! stay as text until validation so that an unknown operator or a misspelled
//! direction is reported as a validation fault with the field attached.

use crate::value::Value;
use std::fmt;

/// Filter comparison operators accepted from clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=`
    Neq,
    /// `LIKE 'v%'`
    StartsWith,
    /// `LIKE '%v'`
    EndsWith,
    /// `LIKE '%v%'`
    Contains,
    /// `NOT LIKE '%v%'`
    DoesNotContain,
    /// `IS NULL`, value ignored
    IsNull,
    /// `IS NOT NULL`, value ignored
    IsNotNull,
    /// `= ''`
    IsEmpty,
    /// `!= ''`
    IsNotEmpty,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
}

impl Operator {
    /// Every operator, in wire-name order.
    pub const ALL: [Self; 14] = [
        Self::Eq,
        Self::Neq,
        Self::StartsWith,
        Self::EndsWith,
        Self::Contains,
        Self::DoesNotContain,
        Self::IsNull,
        Self::IsNotNull,
        Self::IsEmpty,
        Self::IsNotEmpty,
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
    ];

    /// Parse the wire name (`eq`, `startswith`, ...). Case-sensitive.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == s)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::StartsWith => "startswith",
            Self::EndsWith => "endswith",
            Self::Contains => "contains",
            Self::DoesNotContain => "doesnotcontain",
            Self::IsNull => "isnull",
            Self::IsNotNull => "isnotnull",
            Self::IsEmpty => "isempty",
            Self::IsNotEmpty => "isnotempty",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    /// Parse `asc` or `desc`. Case-sensitive; anything else is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A single filter criterion.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub operator: String,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator: operator.as_str().to_string(),
            value: value.into(),
        }
    }
}

/// A single sort criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub dir: String,
}

impl Sort {
    pub fn new(field: impl Into<String>, dir: SortDir) -> Self {
        Self {
            field: field.into(),
            dir: dir.as_str().to_string(),
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDir::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDir::Desc)
    }
}

/// A single group criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub field: String,
}

impl Group {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

/// Paging window taken from the `take`/`skip` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LimitOffset {
    pub take: u64,
    pub skip: u64,
}

impl LimitOffset {
    pub const fn new(take: u64, skip: u64) -> Self {
        Self { take, skip }
    }
}

/// Everything a client asked for in one request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Criteria {
    pub filters: Vec<Filter>,
    pub sorts: Vec<Sort>,
    pub groups: Vec<Group>,
    /// `None` when paging is not configured.
    pub window: Option<LimitOffset>,
}
