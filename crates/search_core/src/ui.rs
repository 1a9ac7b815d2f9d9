use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{api::ResultPage, price_overlay::PriceOverlay};

pub trait SearchControls: Send {
    fn search_text(&self) -> String;
    fn set_search_text(&mut self, text: &str);
    fn sort_value(&self) -> String;
    fn set_sort_value(&mut self, value: &str);
}

pub trait FilterControl: Send {
    fn filter_name(&self) -> &str;

    /// `false` while the widget library has not constructed the control yet.
    fn is_ready(&self) -> bool {
        true
    }

    fn selected_values(&self) -> Vec<String>;
    fn set_selected_values(&mut self, values: &[String]);
    fn clear(&mut self);
}

pub trait BrowserLocation: Send {
    fn query_string(&self) -> String;
    /// Rewrites the current history entry.
    fn replace_query(&mut self, query: &str);
    /// Adds a history entry.
    fn push_query(&mut self, query: &str);
}

pub trait ResultsSurface: Send {
    fn render_products(&mut self, page: &ResultPage);
    fn render_empty(&mut self);
    fn set_pagination(&mut self, pagination: PaginationState);
    fn show_price_overlay(&mut self, overlay: &PriceOverlay);
    fn dismiss_price_overlay(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub page: u32,
    pub previous_enabled: bool,
    pub next_enabled: bool,
}

impl PaginationState {
    pub fn for_page(page: &ResultPage) -> Self {
        if page.is_empty() {
            return Self::disabled(page.page);
        }
        Self {
            page: page.page,
            previous_enabled: page.has_previous_page,
            next_enabled: page.has_next_page,
        }
    }

    pub fn disabled(page: u32) -> Self {
        Self {
            page,
            previous_enabled: false,
            next_enabled: false,
        }
    }
}

/// How search-affecting interactions are recorded in browser history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryMode {
    #[default]
    Replace,
    Push,
}

impl HistoryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryMode::Replace => "replace",
            HistoryMode::Push => "push",
        }
    }
}

impl fmt::Display for HistoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown history mode '{0}' (expected 'replace' or 'push')")]
pub struct UnknownHistoryMode(pub String);

impl FromStr for HistoryMode {
    type Err = UnknownHistoryMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(HistoryMode::Replace),
            "push" => Ok(HistoryMode::Push),
            other => Err(UnknownHistoryMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{domain::ProductId, protocol::ProductSummary};

    fn page_with(products: usize, previous: bool, next: bool) -> ResultPage {
        ResultPage {
            page: 3,
            products: (0..products)
                .map(|id| ProductSummary {
                    id: ProductId(format!("{id:012}")),
                    product_name: format!("product {id}"),
                    product_images: Vec::new(),
                    prices: Vec::new(),
                })
                .collect(),
            has_previous_page: previous,
            has_next_page: next,
        }
    }

    #[test]
    fn pagination_follows_server_flags() {
        assert_eq!(
            PaginationState::for_page(&page_with(2, true, false)),
            PaginationState {
                page: 3,
                previous_enabled: true,
                next_enabled: false,
            }
        );
    }

    #[test]
    fn empty_page_disables_both_directions() {
        assert_eq!(
            PaginationState::for_page(&page_with(0, true, true)),
            PaginationState::disabled(3)
        );
    }

    #[test]
    fn history_mode_parses_case_insensitively() {
        assert_eq!(" Push ".parse::<HistoryMode>(), Ok(HistoryMode::Push));
        assert_eq!("replace".parse::<HistoryMode>(), Ok(HistoryMode::Replace));
        assert!("pushstate".parse::<HistoryMode>().is_err());
    }
}
