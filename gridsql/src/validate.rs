//! Criteria validation against the field registry.
//!
//! Every decoded criterion is resolved here before any SQL is written: the
//! client field name is swapped for its registered column, the capability flag
//! is checked, and the value is reduced to a [`Predicate`] the builder can emit
//! without further decisions.
//!
//! Trusted criteria (the endpoint's prepend lists) skip the capability check.
//! Their field is still resolved through the registry when registered and is
//! used verbatim as the column otherwise. Value-shape rules apply to both.

use crate::constants::{LIKE_ESCAPE, MAX_IN_VALUES};
use crate::criteria::{Filter, Group, Operator, Sort, SortDir};
use crate::error::{Clause, CriteriaError};
use crate::registry::{Capability, FieldRegistry};
use crate::value::Value;

// ═══════════════════════════════════════════════════════════════════════════
// RESOLVED CRITERIA
// ═══════════════════════════════════════════════════════════════════════════

/// What a validated filter compares its column against.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column <op> ?` with one bound scalar.
    Compare(&'static str, Value),
    /// `column in (?)` with one bound array, expanded at rebind time.
    In(Value),
    /// `column [not] like ? escape '\'` with an escaped pattern.
    Like { negated: bool, pattern: String },
    IsNull,
    IsNotNull,
    IsEmpty,
    IsNotEmpty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFilter {
    pub column: String,
    pub predicate: Predicate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSort {
    /// Client field name, kept for group reconciliation.
    pub field: String,
    pub column: String,
    pub dir: SortDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGroup {
    pub field: String,
    pub column: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// VALIDATION
// ═══════════════════════════════════════════════════════════════════════════

/// Look `field` up and return its column.
///
/// Untrusted lookups fail with a field fault when the field is unknown and an
/// operation fault when `capability` is not granted.
fn resolve_column(
    registry: &FieldRegistry,
    capability: Capability,
    field: &str,
    trusted: bool,
) -> Result<String, CriteriaError> {
    match registry.lookup(field) {
        Some(config) if trusted || config.allows(capability) => {
            Ok(config.db_column().to_string())
        },
        Some(_) => Err(CriteriaError::operation_denied(capability.into(), field)),
        None if trusted => Ok(field.to_string()),
        None => Err(CriteriaError::field_not_found(
            Clause::from(capability),
            field,
        )),
    }
}

/// Validate one filter and reduce it to a column and predicate.
pub fn validate_filter(
    filter: &Filter,
    registry: &FieldRegistry,
    trusted: bool,
) -> Result<ResolvedFilter, CriteriaError> {
    let column = resolve_column(registry, Capability::Filter, &filter.field, trusted)?;
    let op = Operator::parse(&filter.operator)
        .ok_or_else(|| CriteriaError::unknown_operator(&filter.field, &filter.operator))?;
    let predicate = predicate_for(filter, op)?;
    Ok(ResolvedFilter { column, predicate })
}

fn predicate_for(filter: &Filter, op: Operator) -> Result<Predicate, CriteriaError> {
    let invalid = || CriteriaError::invalid_value(&filter.field, op.as_str(), filter.value.clone());
    let pattern = |prefix: &str, suffix: &str| {
        format!("{prefix}{}{suffix}", escape_like(&filter.value.to_text()))
    };

    match (op, &filter.value) {
        // The value of a null check is discarded, whatever it was.
        (Operator::IsNull, _) => Ok(Predicate::IsNull),
        (Operator::IsNotNull, _) => Ok(Predicate::IsNotNull),
        (_, Value::Null | Value::Object(_)) => Err(invalid()),
        (_, Value::Array(items)) => {
            if items.is_empty() || items.len() > MAX_IN_VALUES {
                return Err(invalid());
            }
            if let Some(bad) = items.iter().find(|v| !v.is_primitive()) {
                return Err(CriteriaError::invalid_element(&filter.field, bad));
            }
            Ok(Predicate::In(filter.value.clone()))
        },
        (Operator::IsEmpty, _) => Ok(Predicate::IsEmpty),
        (Operator::IsNotEmpty, _) => Ok(Predicate::IsNotEmpty),
        (Operator::StartsWith, _) => Ok(like(false, pattern("", "%"))),
        (Operator::EndsWith, _) => Ok(like(false, pattern("%", ""))),
        (Operator::Contains, _) => Ok(like(false, pattern("%", "%"))),
        (Operator::DoesNotContain, _) => Ok(like(true, pattern("%", "%"))),
        (Operator::Eq, value) => Ok(Predicate::Compare("=", value.clone())),
        (Operator::Neq, value) => Ok(Predicate::Compare("!=", value.clone())),
        (Operator::Lt, value) => Ok(Predicate::Compare("<", value.clone())),
        (Operator::Lte, value) => Ok(Predicate::Compare("<=", value.clone())),
        (Operator::Gt, value) => Ok(Predicate::Compare(">", value.clone())),
        (Operator::Gte, value) => Ok(Predicate::Compare(">=", value.clone())),
    }
}

const fn like(negated: bool, pattern: String) -> Predicate {
    Predicate::Like { negated, pattern }
}

/// Escape LIKE wildcards (`%`, `_`) and the escape character itself.
///
/// ```
/// use gridsql::escape_like;
///
/// assert_eq!(escape_like("50%_off"), r"50\%\_off");
/// ```
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Validate one sort: capability, then direction.
pub fn validate_sort(
    sort: &Sort,
    registry: &FieldRegistry,
    trusted: bool,
) -> Result<ResolvedSort, CriteriaError> {
    let column = resolve_column(registry, Capability::Sort, &sort.field, trusted)?;
    let dir = SortDir::parse(&sort.dir)
        .ok_or_else(|| CriteriaError::invalid_direction(&sort.field, &sort.dir))?;
    Ok(ResolvedSort {
        field: sort.field.clone(),
        column,
        dir,
    })
}

pub fn validate_group(
    group: &Group,
    registry: &FieldRegistry,
    trusted: bool,
) -> Result<ResolvedGroup, CriteriaError> {
    let column = resolve_column(registry, Capability::Group, &group.field, trusted)?;
    Ok(ResolvedGroup {
        field: group.field.clone(),
        column,
    })
}
