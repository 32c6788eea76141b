//! Error taxonomy.
//!
//! Client faults (bad criteria) and server faults (database failures) share one
//! [`Error`] type so the composer and the executor can use `?` throughout, and
//! callers match on [`Error::kind`] instead of downcasting.

use crate::constants::{CLIENT_FAULT_STATUS, SERVER_FAULT_STATUS};
use crate::registry::Capability;
use crate::value::Value;
use std::fmt;

/// Flat classification of every error this crate returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed criteria JSON or a non-numeric paging parameter.
    Decode,
    /// Field is not in the registry.
    Field,
    /// Field exists but the operation is not permitted on it.
    Operation,
    /// Filter value missing or of a disallowed type.
    Value,
    /// An element inside an array filter value is not a primitive.
    SliceElement,
    /// Sort direction is neither `asc` nor `desc`.
    Direction,
    /// Filter operator is not recognised.
    Operator,
    /// The database call failed.
    Execution,
}

impl ErrorKind {
    /// Whether the request, not the server, is at fault.
    pub const fn is_client_fault(self) -> bool {
        !matches!(self, Self::Execution)
    }
}

/// Which clause a criterion belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clause {
    Filter,
    Sort,
    Group,
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Filter => "filter",
            Self::Sort => "sort",
            Self::Group => "group",
        })
    }
}

impl From<Capability> for Clause {
    fn from(capability: Capability) -> Self {
        match capability {
            Capability::Filter => Self::Filter,
            Capability::Sort => Self::Sort,
            Capability::Group => Self::Group,
        }
    }
}

/// A request parameter could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid '{param}' parameter: {reason}")]
pub struct DecodeError {
    pub param: String,
    pub reason: String,
}

impl DecodeError {
    pub fn new(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            reason: reason.into(),
        }
    }
}

/// A criterion failed validation.
///
/// `kind` is always one of the criteria kinds (`Field`, `Operation`, `Value`,
/// `SliceElement`, `Direction`, `Operator`). The optional payload fields are
/// filled in when they describe the fault.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", self.message())]
pub struct CriteriaError {
    pub kind: ErrorKind,
    pub clause: Clause,
    pub field: String,
    pub operator: Option<String>,
    pub value: Option<Value>,
    pub direction: Option<String>,
    /// Type name of the offending array element, for `SliceElement`.
    pub element_type: Option<&'static str>,
}

impl CriteriaError {
    fn new(kind: ErrorKind, clause: Clause, field: &str) -> Self {
        Self {
            kind,
            clause,
            field: field.to_string(),
            operator: None,
            value: None,
            direction: None,
            element_type: None,
        }
    }

    pub fn field_not_found(clause: Clause, field: &str) -> Self {
        Self::new(ErrorKind::Field, clause, field)
    }

    pub fn operation_denied(clause: Clause, field: &str) -> Self {
        Self::new(ErrorKind::Operation, clause, field)
    }

    pub fn invalid_value(field: &str, operator: &str, value: Value) -> Self {
        Self {
            operator: Some(operator.to_string()),
            value: Some(value),
            ..Self::new(ErrorKind::Value, Clause::Filter, field)
        }
    }

    pub fn invalid_element(field: &str, element: &Value) -> Self {
        Self {
            element_type: Some(element.type_name()),
            value: Some(element.clone()),
            ..Self::new(ErrorKind::SliceElement, Clause::Filter, field)
        }
    }

    pub fn invalid_direction(field: &str, direction: &str) -> Self {
        Self {
            direction: Some(direction.to_string()),
            ..Self::new(ErrorKind::Direction, Clause::Sort, field)
        }
    }

    pub fn unknown_operator(field: &str, operator: &str) -> Self {
        Self {
            operator: Some(operator.to_string()),
            ..Self::new(ErrorKind::Operator, Clause::Filter, field)
        }
    }
}

impl CriteriaError {
    /// Display text; names the field and whatever else was wrong with it.
    fn message(&self) -> String {
        match self.kind {
            ErrorKind::Field => format!("{} field '{}' is not allowed", self.clause, self.field),
            ErrorKind::Operation => {
                format!("field '{}' cannot be used to {}", self.field, self.clause)
            },
            ErrorKind::Value => match &self.value {
                Some(Value::Null) | None => format!(
                    "filter on field '{}' requires a value for operator '{}'",
                    self.field,
                    self.operator.as_deref().unwrap_or_default()
                ),
                Some(value) => format!(
                    "invalid value {} ({}) for filter on field '{}'",
                    value,
                    value.type_name(),
                    self.field
                ),
            },
            ErrorKind::SliceElement => format!(
                "filter on field '{}' contains an invalid {} element in its value list",
                self.field,
                self.element_type.unwrap_or("unknown")
            ),
            ErrorKind::Direction => format!(
                "invalid sort direction '{}' for field '{}': expected 'asc' or 'desc'",
                self.direction.as_deref().unwrap_or_default(),
                self.field
            ),
            ErrorKind::Operator => format!(
                "unknown filter operator '{}' for field '{}'",
                self.operator.as_deref().unwrap_or_default(),
                self.field
            ),
            ErrorKind::Decode | ErrorKind::Execution => {
                format!("invalid {} on field '{}'", self.clause, self.field)
            },
        }
    }
}

/// Errors returned by composition and execution.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Criteria(#[from] CriteriaError),
    /// The driver failed. The source is kept for logs, never shown to clients.
    #[error("query execution failed")]
    Execution(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    pub fn execution<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Execution(Box::new(err))
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode(_) => ErrorKind::Decode,
            Self::Criteria(e) => e.kind,
            Self::Execution(_) => ErrorKind::Execution,
        }
    }

    pub const fn is_client_fault(&self) -> bool {
        self.kind().is_client_fault()
    }

    /// Offending field name, if the fault is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Criteria(e) => Some(&e.field),
            _ => None,
        }
    }

    /// HTTP status to answer with: 406 for client faults, 500 otherwise.
    pub const fn status_code(&self) -> u16 {
        if self.is_client_fault() {
            CLIENT_FAULT_STATUS
        } else {
            SERVER_FAULT_STATUS
        }
    }

    /// Message safe to send to the client.
    ///
    /// Execution faults are opaque; the driver error and SQL are never echoed.
    pub fn client_message(&self) -> String {
        match self {
            Self::Execution(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
