//! Query-string parsing module
//!
//! Decodes `application/x-www-form-urlencoded` query strings into a simple
//! key/value map. Percent-encoded UTF-8 (e.g. Cyrillic search terms) is
//! decoded transparently.

use std::collections::HashMap;

/// Parsed query parameters.
///
/// For duplicate keys the first occurrence wins.
#[derive(Debug, Default)]
pub struct QueryParams {
    params: HashMap<String, String>,
}

impl QueryParams {
    /// Parse the raw query-string portion of a request URI
    pub fn parse(raw: Option<&str>) -> Self {
        let mut params = HashMap::new();
        if let Some(raw) = raw {
            for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
                params
                    .entry(key.into_owned())
                    .or_insert_with(|| value.into_owned());
            }
        }
        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}
