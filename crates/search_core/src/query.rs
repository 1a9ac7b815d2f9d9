use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CATEGORIES_FILTER: &str = "categories";
pub const SUBCATEGORIES_FILTER: &str = "subcategories";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::PriceAsc,
        SortKey::PriceDesc,
        SortKey::NameAsc,
        SortKey::NameDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
        }
    }

    /// Reads a sort selector value. Blank input means default ordering.
    pub fn parse_optional(raw: &str) -> Result<Option<Self>, UnknownSortKey> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort key: {0}")]
pub struct UnknownSortKey(pub String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownSortKey(s.to_string()))
    }
}

/// One selected option of a filter control: a bare JSON number or string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Id(i64),
    Text(String),
}

impl FilterValue {
    /// Interprets a raw widget option value. Blank values select nothing; numeric text
    /// becomes an id only when it reads back unchanged, so `"0012"` stays text.
    pub fn from_control_value(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match raw.parse::<i64>() {
            Ok(id) if id.to_string() == raw => FilterValue::Id(id),
            _ => FilterValue::Text(raw.to_string()),
        })
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Id(id) => write!(f, "{id}"),
            FilterValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Id(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

pub type FilterMap = BTreeMap<String, Vec<FilterValue>>;

/// Immutable; every constructor trims, dedupes and clamps `page` to at least 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    search_text: String,
    sort: Option<SortKey>,
    filters: FilterMap,
    page: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            sort: None,
            filters: FilterMap::new(),
            page: 1,
        }
    }
}

impl SearchQuery {
    pub fn new<I, K>(
        search_text: impl AsRef<str>,
        sort: Option<SortKey>,
        filters: I,
        page: u32,
    ) -> Self
    where
        I: IntoIterator<Item = (K, Vec<FilterValue>)>,
        K: AsRef<str>,
    {
        Self {
            search_text: search_text.as_ref().trim().to_string(),
            sort,
            filters: normalize_filters(filters),
            page: page.max(1),
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn sort(&self) -> Option<SortKey> {
        self.sort
    }

    pub fn filters(&self) -> &FilterMap {
        &self.filters
    }

    pub fn filter(&self, name: &str) -> Option<&[FilterValue]> {
        self.filters.get(name).map(Vec::as_slice)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn with_search_text(&self, search_text: impl AsRef<str>) -> Self {
        Self {
            search_text: search_text.as_ref().trim().to_string(),
            ..self.clone()
        }
    }

    pub fn with_sort(&self, sort: Option<SortKey>) -> Self {
        Self {
            sort,
            ..self.clone()
        }
    }

    pub fn with_filters<I, K>(&self, filters: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<FilterValue>)>,
        K: AsRef<str>,
    {
        Self {
            filters: normalize_filters(filters),
            ..self.clone()
        }
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }
}

fn normalize_filters<I, K>(filters: I) -> FilterMap
where
    I: IntoIterator<Item = (K, Vec<FilterValue>)>,
    K: AsRef<str>,
{
    let mut normalized = FilterMap::new();
    for (name, values) in filters {
        let name = name.as_ref().trim();
        if name.is_empty() {
            continue;
        }
        let entry: &mut Vec<FilterValue> = normalized.entry(name.to_string()).or_default();
        for value in values {
            let value = match value {
                FilterValue::Text(text) => match FilterValue::from_control_value(&text) {
                    Some(value) => value,
                    None => continue,
                },
                id => id,
            };
            if !entry.contains(&value) {
                entry.push(value);
            }
        }
    }
    normalized.retain(|_, values| !values.is_empty());
    normalized
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Previous,
    Next,
}

impl PageDirection {
    /// Target page when stepping from `current`, or `None` when already on the first page.
    pub fn step(self, current: u32) -> Option<u32> {
        match self {
            PageDirection::Next => Some(current.max(1).saturating_add(1)),
            PageDirection::Previous if current > 1 => Some(current - 1),
            PageDirection::Previous => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_trims_text_and_clamps_page() {
        let query = SearchQuery::new("  shoes ", None, Vec::<(&str, Vec<FilterValue>)>::new(), 0);
        assert_eq!(query.search_text(), "shoes");
        assert_eq!(query.page(), 1);
        assert_eq!(query, SearchQuery::default().with_search_text("shoes"));
    }

    #[test]
    fn empty_filter_entries_are_dropped() {
        let query = SearchQuery::default().with_filters([
            ("categories", vec![FilterValue::Id(3), FilterValue::Id(3)]),
            ("subcategories", vec![]),
            ("  ", vec![FilterValue::Id(1)]),
            ("tags", vec![FilterValue::Text("  ".into())]),
        ]);
        assert_eq!(query.filters().len(), 1);
        assert_eq!(query.filter(CATEGORIES_FILTER), Some(&[FilterValue::Id(3)][..]));
        assert_eq!(query.filter(SUBCATEGORIES_FILTER), None);
    }

    #[test]
    fn numeric_text_selections_become_ids() {
        let query = SearchQuery::default().with_filters([(
            "categories",
            vec![FilterValue::Text(" 7 ".into()), FilterValue::Text("red".into())],
        )]);
        assert_eq!(
            query.filter(CATEGORIES_FILTER),
            Some(&[FilterValue::Id(7), FilterValue::Text("red".into())][..])
        );
    }

    #[test]
    fn zero_padded_ids_keep_their_text() {
        assert_eq!(FilterValue::from_control_value("0012"), Some(FilterValue::Text("0012".into())));
        assert_eq!(
            FilterValue::from_control_value("000000001234").map(|v| v.to_string()),
            Some("000000001234".to_string())
        );
        assert_eq!(FilterValue::from_control_value("+7"), Some(FilterValue::Text("+7".into())));
        assert_eq!(FilterValue::from_control_value(" 12 "), Some(FilterValue::Id(12)));
        assert_eq!(FilterValue::from("aB3kL9xQ2mZp").to_string(), "aB3kL9xQ2mZp");
    }

    #[test]
    fn sort_keys_parse_their_wire_names() {
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>(), Ok(key));
        }
        assert_eq!(SortKey::parse_optional("  "), Ok(None));
        assert_eq!(SortKey::parse_optional(" name-asc "), Ok(Some(SortKey::NameAsc)));
        assert_eq!(
            SortKey::parse_optional("cheapest"),
            Err(UnknownSortKey("cheapest".into()))
        );
    }

    #[test]
    fn previous_page_never_goes_below_one() {
        assert_eq!(PageDirection::Previous.step(1), None);
        assert_eq!(PageDirection::Previous.step(0), None);
        assert_eq!(PageDirection::Previous.step(4), Some(3));
        assert_eq!(PageDirection::Next.step(1), Some(2));
        assert_eq!(PageDirection::Next.step(u32::MAX), Some(u32::MAX));
    }
}
