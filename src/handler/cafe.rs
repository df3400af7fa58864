//! Cafe query handler
//!
//! Implements `GET /cafe`: validates the `city`, `count` and `search` query
//! parameters, filters and truncates the city's cafe list, and renders the
//! result as a comma-separated plain-text body.

use crate::dataset::Dataset;
use crate::http;
use crate::http::QueryParams;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

/// Request-level validation errors, surfaced as 400 responses
/// with fixed plain-text messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    /// `city` parameter absent or not a dataset key
    UnknownCity,
    /// `count` parameter present but not a non-negative integer
    InvalidCount,
}

impl QueryError {
    pub const fn message(self) -> &'static str {
        match self {
            Self::UnknownCity => "unknown city",
            Self::InvalidCount => "incorrect count",
        }
    }
}

/// Select cafes for a query: validate city, then count, then apply the
/// search filter and truncate.
///
/// `count` beyond the available entries returns everything; `count=0` yields
/// an empty selection, which is not an error. The search filter is
/// case-insensitive and Unicode-aware (both sides are uppercased before the
/// containment check, so Cyrillic terms fold correctly).
pub fn select_cafes<'a>(
    dataset: &'a Dataset,
    params: &QueryParams,
) -> Result<Vec<&'a str>, QueryError> {
    let city = params.get("city").ok_or(QueryError::UnknownCity)?;
    let cafes = dataset.cafes(city).ok_or(QueryError::UnknownCity)?;

    let count = match params.get("count") {
        Some(raw) => raw.parse::<usize>().map_err(|_| QueryError::InvalidCount)?,
        None => cafes.len(),
    };

    let search = params.get("search").unwrap_or("");

    let mut selected: Vec<&str> = if search.is_empty() {
        cafes.iter().map(String::as_str).collect()
    } else {
        let needle = search.to_uppercase();
        cafes
            .iter()
            .map(String::as_str)
            .filter(|name| name.to_uppercase().contains(&needle))
            .collect()
    };

    selected.truncate(count);
    Ok(selected)
}

/// Build the response for a `/cafe` request from its raw query string
pub fn respond(dataset: &Dataset, raw_query: Option<&str>, is_head: bool) -> Response<Full<Bytes>> {
    let params = QueryParams::parse(raw_query);
    match select_cafes(dataset, &params) {
        Ok(cafes) => http::build_text_response(cafes.join(","), is_head),
        Err(err) => http::build_bad_request_response(err.message()),
    }
}
