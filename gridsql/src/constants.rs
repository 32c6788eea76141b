//! Centralized constants for the gridsql crate.
//!
//! All limits and default names are defined here for easy tuning and
//! consistent behavior across decoding, composition and execution.

// ============================================================================
// REQUEST LIMITS
// ============================================================================

/// Maximum length of one criteria parameter (64KB) before JSON parsing.
pub const MAX_CRITERIA_PARAM_LEN: usize = 64 * 1024;

/// Maximum number of entries in one filter/sort/group list.
pub const MAX_CRITERIA: usize = 64;

/// Maximum number of elements in one array filter value.
/// Each element becomes its own placeholder after IN expansion.
pub const MAX_IN_VALUES: usize = 1000;

/// Maximum container nesting of a filter value. A valid value is a primitive
/// or a flat list; one more level lets element faults name the bad element.
pub const MAX_VALUE_DEPTH: usize = 2;

/// Maximum decoded query string length (64KB).
pub const MAX_URL_DECODED_LEN: usize = 65536;

/// Maximum number of query string fields.
pub const MAX_QUERY_FIELDS: usize = 1000;

// ============================================================================
// DEFAULT PARAMETER NAMES
// ============================================================================

/// Request parameter holding the JSON filter list.
pub const DEFAULT_FILTER_PARAM: &str = "filters";

/// Request parameter holding the JSON sort list.
pub const DEFAULT_SORT_PARAM: &str = "sorts";

/// Request parameter holding the JSON group list.
pub const DEFAULT_GROUP_PARAM: &str = "groups";

/// Request parameter holding the page size.
pub const DEFAULT_TAKE_PARAM: &str = "take";

/// Request parameter holding the number of rows to skip.
pub const DEFAULT_SKIP_PARAM: &str = "skip";

// ============================================================================
// ENVIRONMENT VARIABLES
// ============================================================================

/// Overrides the take ceiling.
pub const ENV_TAKE_LIMIT: &str = "GRIDSQL_TAKE_LIMIT";

/// Disables group-by/order-by reconciliation when truthy.
pub const ENV_DISABLE_GROUP_RECONCILE: &str = "GRIDSQL_DISABLE_GROUP_RECONCILE";

/// Overrides the filter parameter name.
pub const ENV_PARAM_FILTERS: &str = "GRIDSQL_PARAM_FILTERS";

/// Overrides the sort parameter name.
pub const ENV_PARAM_SORTS: &str = "GRIDSQL_PARAM_SORTS";

/// Overrides the group parameter name.
pub const ENV_PARAM_GROUPS: &str = "GRIDSQL_PARAM_GROUPS";

/// Overrides the take parameter name.
pub const ENV_PARAM_TAKE: &str = "GRIDSQL_PARAM_TAKE";

/// Overrides the skip parameter name.
pub const ENV_PARAM_SKIP: &str = "GRIDSQL_PARAM_SKIP";

// ============================================================================
// HTTP STATUS
// ============================================================================

/// Status for client faults (406 Not Acceptable).
pub const CLIENT_FAULT_STATUS: u16 = 406;

/// Status for execution faults.
pub const SERVER_FAULT_STATUS: u16 = 500;

// ============================================================================
// SQL
// ============================================================================

/// Dialect-neutral placeholder emitted by the composer.
pub const NEUTRAL_PLACEHOLDER: char = '?';

/// Escape character used in LIKE patterns.
pub const LIKE_ESCAPE: char = '\\';
