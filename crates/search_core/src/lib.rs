//! Client-side state for the storefront product search page.

pub mod api;
pub mod controller;
pub mod memory;
pub mod price_overlay;
pub mod query;
pub mod ui;
pub mod url_state;

pub use api::{HttpSearchApi, ResultPage, SearchApi, SearchError};
pub use controller::{PageBindings, SearchOutcome, SearchStateController};
pub use price_overlay::{Anchor, ClickTarget, PriceOverlay};
pub use query::{FilterMap, FilterValue, PageDirection, SearchQuery, SortKey};
pub use ui::{
    BrowserLocation, FilterControl, HistoryMode, PaginationState, ResultsSurface, SearchControls,
};
