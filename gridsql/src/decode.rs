//! Criteria decoder.
//!
//! Turns the JSON in one request parameter into a list of [`Filter`], [`Sort`]
//! or [`Group`]. This is a pure shape transformation: field names are not
//! checked against any registry here.
//!
//! Accepted shapes:
//!
//! ```text
//! filters=[{"field":"name","operator":"startswith","value":"al"}]
//! sorts=[{"field":"name","dir":"asc"}]
//! groups=[{"field":"team"}]
//! ```

use crate::config::ParamConfig;
use crate::constants::{MAX_CRITERIA, MAX_CRITERIA_PARAM_LEN};
use crate::criteria::{Criteria, Filter, Group, LimitOffset, Sort};
use crate::error::DecodeError;
use crate::params::FormSource;
use crate::value::Value;
use miniserde::json::{self, Object, Value as Json};

/// Decode the filter list in parameter `name`.
///
/// A missing, blank or `null` parameter is an empty list.
pub fn decode_filters<S: FormSource + ?Sized>(
    params: &S,
    name: &str,
) -> Result<Vec<Filter>, DecodeError> {
    decode_list(params, name, |entry| {
        let value = match entry.get("value") {
            Some(json) => Value::from_json(json, 0)?,
            None => Value::Null,
        };
        Ok(Filter {
            field: required_str(entry, "field")?,
            operator: required_str(entry, "operator")?,
            value,
        })
    })
}

/// Decode the sort list in parameter `name`.
///
/// A missing `dir` decodes as an empty direction and is rejected by validation.
pub fn decode_sorts<S: FormSource + ?Sized>(
    params: &S,
    name: &str,
) -> Result<Vec<Sort>, DecodeError> {
    decode_list(params, name, |entry| {
        Ok(Sort {
            field: required_str(entry, "field")?,
            dir: optional_str(entry, "dir")?.unwrap_or_default(),
        })
    })
}

/// Decode the group list in parameter `name`.
pub fn decode_groups<S: FormSource + ?Sized>(
    params: &S,
    name: &str,
) -> Result<Vec<Group>, DecodeError> {
    decode_list(params, name, |entry| {
        Ok(Group {
            field: required_str(entry, "field")?,
        })
    })
}

/// Decode the paging window.
///
/// Missing `take` defaults to `ceiling`, missing `skip` to 0. A `take` above
/// `ceiling` is clamped rather than rejected.
pub fn decode_limit_offset<S: FormSource + ?Sized>(
    params: &S,
    take_name: &str,
    skip_name: &str,
    ceiling: u64,
) -> Result<LimitOffset, DecodeError> {
    let take = parse_count(params, take_name)?.map_or(ceiling, |take| take.min(ceiling));
    let skip = parse_count(params, skip_name)?.unwrap_or(0);
    Ok(LimitOffset { take, skip })
}

/// Decode every criteria parameter named by `names`.
///
/// The paging window is only decoded when `take_ceiling` is set.
pub fn decode_criteria<S: FormSource + ?Sized>(
    params: &S,
    names: &ParamConfig,
    take_ceiling: Option<u64>,
) -> Result<Criteria, DecodeError> {
    let window = take_ceiling
        .map(|ceiling| decode_limit_offset(params, &names.take, &names.skip, ceiling))
        .transpose()?;

    Ok(Criteria {
        filters: decode_filters(params, &names.filters)?,
        sorts: decode_sorts(params, &names.sorts)?,
        groups: decode_groups(params, &names.groups)?,
        window,
    })
}

fn decode_list<S, T, F>(params: &S, name: &str, mut entry: F) -> Result<Vec<T>, DecodeError>
where
    S: FormSource + ?Sized,
    F: FnMut(&Object) -> Result<T, String>,
{
    let raw = match params.form_value(name).map(str::trim) {
        None | Some("" | "null") => return Ok(Vec::new()),
        Some(raw) => raw,
    };

    if raw.len() > MAX_CRITERIA_PARAM_LEN {
        return Err(DecodeError::new(
            name,
            format!("exceeds {MAX_CRITERIA_PARAM_LEN} bytes"),
        ));
    }

    let parsed: Json =
        json::from_str(raw).map_err(|_| DecodeError::new(name, "malformed JSON"))?;

    let Json::Array(items) = parsed else {
        return Err(DecodeError::new(name, "expected a JSON array"));
    };

    if items.len() > MAX_CRITERIA {
        return Err(DecodeError::new(
            name,
            format!("more than {MAX_CRITERIA} entries"),
        ));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Json::Object(obj) => {
                entry(obj).map_err(|reason| DecodeError::new(name, format!("entry {i}: {reason}")))
            },
            _ => Err(DecodeError::new(
                name,
                format!("entry {i}: expected a JSON object"),
            )),
        })
        .collect()
}

fn optional_str(entry: &Object, key: &str) -> Result<Option<String>, String> {
    match entry.get(key) {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(format!("'{key}' must be a string")),
    }
}

fn required_str(entry: &Object, key: &str) -> Result<String, String> {
    optional_str(entry, key)?.ok_or_else(|| format!("missing '{key}'"))
}

fn parse_count<S: FormSource + ?Sized>(params: &S, name: &str) -> Result<Option<u64>, DecodeError> {
    let raw = match params.form_value(name).map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    match raw.parse::<i64>() {
        Ok(n) => u64::try_from(n)
            .map(Some)
            .map_err(|_| DecodeError::new(name, "must not be negative")),
        Err(_) => Err(DecodeError::new(name, format!("'{raw}' is not a number"))),
    }
}
