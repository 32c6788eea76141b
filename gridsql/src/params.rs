//! Request parameter access.
//!
//! The composer only needs "give me the URL-decoded value of parameter X".
//! [`FormSource`] is that seam; any HTTP framework's request type can
//! implement it. [`QueryParams`] parses a raw query string for callers that
//! only have the URL.

use crate::constants::{MAX_QUERY_FIELDS, MAX_URL_DECODED_LEN};
use crate::error::DecodeError;
use std::collections::{BTreeMap, HashMap};

/// Read access to already URL-decoded request parameters.
pub trait FormSource {
    /// The first value of parameter `name`, if present.
    fn form_value(&self, name: &str) -> Option<&str>;
}

impl FormSource for HashMap<String, String> {
    fn form_value(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl FormSource for BTreeMap<String, String> {
    fn form_value(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl FormSource for [(String, String)] {
    fn form_value(&self, name: &str) -> Option<&str> {
        self.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

impl<T: FormSource + ?Sized> FormSource for &T {
    fn form_value(&self, name: &str) -> Option<&str> {
        (**self).form_value(name)
    }
}

/// Parsed `application/x-www-form-urlencoded` parameters, in input order.
///
/// ```
/// use gridsql::{FormSource, QueryParams};
///
/// let params = QueryParams::parse("take=20&filters=%5B%5D&tag=a&tag=b").unwrap();
/// assert_eq!(params.form_value("take"), Some("20"));
/// assert_eq!(params.form_value("filters"), Some("[]"));
/// assert_eq!(params.all("tag"), vec!["a", "b"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse a query string. A leading `?` is ignored.
    ///
    /// Fields beyond [`MAX_QUERY_FIELDS`] are dropped.
    pub fn parse(query: &str) -> Result<Self, DecodeError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut pairs = Vec::new();

        for part in query.split('&').filter(|p| !p.is_empty()) {
            if pairs.len() >= MAX_QUERY_FIELDS {
                break;
            }
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            pairs.push((url_decode(key)?, url_decode(value)?));
        }

        Ok(Self { pairs })
    }

    /// Every value of parameter `name`, in input order.
    pub fn all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FormSource for QueryParams {
    fn form_value(&self, name: &str) -> Option<&str> {
        self.pairs.as_slice().form_value(name)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Decode a URL component: `+` becomes a space, `%XX` becomes its byte.
///
/// Malformed escapes are kept literally and invalid UTF-8 is replaced, so this
/// only fails when the input exceeds [`MAX_URL_DECODED_LEN`].
pub fn url_decode(input: &str) -> Result<String, DecodeError> {
    if input.len() > MAX_URL_DECODED_LEN {
        return Err(DecodeError::new(
            "query",
            format!("exceeds {MAX_URL_DECODED_LEN} bytes"),
        ));
    }

    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while let Some(&b) = bytes.get(i) {
        match b {
            b'+' => {
                out.push(b' ');
                i += 1;
            },
            b'%' => match (
                bytes.get(i + 1).copied().and_then(hex_val),
                bytes.get(i + 2).copied().and_then(hex_val),
            ) {
                (Some(hi), Some(lo)) => {
                    out.push((hi << 4) | lo);
                    i += 3;
                },
                _ => {
                    out.push(b'%');
                    i += 1;
                },
            },
            _ => {
                out.push(b);
                i += 1;
            },
        }
    }

    Ok(String::from_utf8_lossy(&out).into_owned())
}

const fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
