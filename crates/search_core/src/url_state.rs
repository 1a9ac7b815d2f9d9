use serde_json::Value;
use thiserror::Error;
use tracing::warn;
use url::form_urlencoded;

use crate::query::{FilterMap, FilterValue, SearchQuery, SortKey};

pub const SEARCH_PARAM: &str = "search";
pub const SORT_PARAM: &str = "sort";
pub const PAGE_PARAM: &str = "page";
pub const FILTERS_PARAM: &str = "filters";

#[derive(Debug, Error)]
pub enum UrlStateError {
    #[error("filters parameter is not valid JSON: {0}")]
    MalformedFilters(#[from] serde_json::Error),
    #[error("filters parameter must be a JSON object")]
    FiltersNotAMapping,
}

pub fn query_params(query: &SearchQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(4);
    if !query.search_text().is_empty() {
        params.push((SEARCH_PARAM, query.search_text().to_string()));
    }
    if let Some(sort) = query.sort() {
        params.push((SORT_PARAM, sort.as_str().to_string()));
    }
    if query.page() != 1 {
        params.push((PAGE_PARAM, query.page().to_string()));
    }
    if !query.filters().is_empty() {
        params.push((FILTERS_PARAM, encode_filters(query.filters())));
    }
    params
}

/// Query string for `query`, with a leading `?`, or empty for the default query.
pub fn serialize_query(query: &SearchQuery) -> String {
    let params = query_params(query);
    if params.is_empty() {
        return String::new();
    }
    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("?{encoded}")
}

/// Never fails; malformed or invalid parameters fall back to their defaults.
pub fn parse_query(raw: &str) -> SearchQuery {
    let raw = raw.trim().trim_start_matches('?');

    let mut search: Option<String> = None;
    let mut sort: Option<String> = None;
    let mut page: Option<String> = None;
    let mut filters: Option<String> = None;
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        let slot = match key.as_ref() {
            SEARCH_PARAM => &mut search,
            SORT_PARAM => &mut sort,
            PAGE_PARAM => &mut page,
            FILTERS_PARAM => &mut filters,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }

    let sort = match SortKey::parse_optional(sort.as_deref().unwrap_or_default()) {
        Ok(sort) => sort,
        Err(err) => {
            warn!(error = %err, "url: ignoring sort parameter");
            None
        }
    };

    let page = page.as_deref().map(parse_page).unwrap_or(1);

    let filters = match filters.as_deref().map(parse_filters) {
        None => FilterMap::new(),
        Some(Ok(filters)) => filters,
        Some(Err(err)) => {
            warn!(error = %err, "url: ignoring malformed filters parameter");
            FilterMap::new()
        }
    };

    SearchQuery::new(search.unwrap_or_default(), sort, filters, page)
}

/// A bare number or string counts as a single selection; other JSON values are skipped.
pub fn parse_filters(raw: &str) -> Result<FilterMap, UrlStateError> {
    let Value::Object(entries) = serde_json::from_str::<Value>(raw)? else {
        return Err(UrlStateError::FiltersNotAMapping);
    };

    let mut filters = FilterMap::new();
    for (name, value) in entries {
        let values: Vec<FilterValue> = match value {
            Value::Array(items) => items.into_iter().filter_map(json_filter_value).collect(),
            other => json_filter_value(other).into_iter().collect(),
        };
        filters.insert(name, values);
    }
    // Re-run construction invariants (blank names, empty selections, duplicates).
    Ok(SearchQuery::default().with_filters(filters).filters().clone())
}

fn json_filter_value(value: Value) -> Option<FilterValue> {
    match value {
        Value::Number(number) => number.as_i64().map(FilterValue::Id),
        Value::String(text) => FilterValue::from_control_value(&text),
        _ => None,
    }
}

fn encode_filters(filters: &FilterMap) -> String {
    // A map of strings to numbers/strings always serializes.
    serde_json::to_string(filters).unwrap_or_else(|_| "{}".to_string())
}

fn parse_page(raw: &str) -> u32 {
    match raw.trim().parse::<u32>() {
        Ok(page) if page >= 1 => page,
        _ => {
            warn!(page = raw, "url: ignoring invalid page parameter");
            1
        }
    }
}

#[cfg(test)]
#[path = "tests/url_state_tests.rs"]
mod tests;
