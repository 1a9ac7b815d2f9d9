use std::{collections::HashMap, sync::Arc};

use shared::domain::ProductId;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    api::{ResultPage, SearchApi, SearchError},
    price_overlay::{Anchor, ClickTarget, PriceOverlay},
    query::{FilterMap, FilterValue, PageDirection, SearchQuery, SortKey},
    ui::{
        BrowserLocation, FilterControl, HistoryMode, PaginationState, ResultsSurface,
        SearchControls,
    },
    url_state::{parse_query, serialize_query},
};

pub struct PageBindings {
    pub controls: Box<dyn SearchControls>,
    pub filter_controls: Vec<Box<dyn FilterControl>>,
    pub location: Box<dyn BrowserLocation>,
    pub surface: Box<dyn ResultsSurface>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The response was rendered.
    Rendered(ResultPage),
    /// A newer search was issued while this one was in flight; its response was dropped.
    Superseded,
    /// Nothing to do (previous page requested on page 1).
    Skipped,
}

pub struct SearchStateController {
    api: Arc<dyn SearchApi>,
    history_mode: HistoryMode,
    state: Mutex<ControllerState>,
}

struct ControllerState {
    bindings: PageBindings,
    latest_request: u64,
    pending_filter_selections: HashMap<String, Vec<FilterValue>>,
    rendered: Option<ResultPage>,
    overlay: Option<PriceOverlay>,
}

impl SearchStateController {
    pub fn new(
        api: Arc<dyn SearchApi>,
        bindings: PageBindings,
        history_mode: HistoryMode,
    ) -> Arc<Self> {
        Arc::new(Self {
            api,
            history_mode,
            state: Mutex::new(ControllerState {
                bindings,
                latest_request: 0,
                pending_filter_selections: HashMap::new(),
                rendered: None,
                overlay: None,
            }),
        })
    }

    pub fn history_mode(&self) -> HistoryMode {
        self.history_mode
    }

    /// Page load: restore controls from the URL, canonicalize it and run the first search.
    pub async fn initialize(&self) -> Result<SearchOutcome, SearchError> {
        let query = self.read_query_from_url().await;
        info!(
            url = %serialize_query(&query),
            page = query.page(),
            "search: initializing from url"
        );
        self.apply_query_to_controls(&query).await;
        self.search_from_state(HistoryMode::Replace, move |_| Some(query))
            .await
    }

    pub async fn read_query_from_controls(&self) -> SearchQuery {
        self.read_query_from_controls_at(1).await
    }

    pub async fn read_query_from_controls_at(&self, page: u32) -> SearchQuery {
        self.state.lock().await.read_controls(page)
    }

    pub async fn read_query_from_url(&self) -> SearchQuery {
        self.state.lock().await.read_url()
    }

    /// Writes `query` into the widgets. Filter controls that are not ready keep their
    /// selection pending until [`Self::on_controls_ready`] or the next read.
    pub async fn apply_query_to_controls(&self, query: &SearchQuery) {
        let mut state = self.state.lock().await;
        let controls = &mut state.bindings.controls;
        controls.set_search_text(query.search_text());
        controls.set_sort_value(query.sort().map(|sort| sort.as_str()).unwrap_or_default());

        state.pending_filter_selections.clear();
        let ControllerState {
            bindings,
            pending_filter_selections,
            ..
        } = &mut *state;
        for control in bindings.filter_controls.iter_mut() {
            let values = query
                .filter(control.filter_name())
                .map(<[FilterValue]>::to_vec)
                .unwrap_or_default();
            if control.is_ready() {
                apply_selection(control.as_mut(), &values);
            } else {
                debug!(
                    filter = control.filter_name(),
                    "search: filter control not ready, deferring selection"
                );
                pending_filter_selections.insert(control.filter_name().to_string(), values);
            }
        }
    }

    pub async fn on_controls_ready(&self) {
        self.state.lock().await.flush_pending_selections();
    }

    pub fn serialize_query_to_url(query: &SearchQuery) -> String {
        serialize_query(query)
    }

    pub async fn update_browser_url(&self, query: &SearchQuery) {
        self.state
            .lock()
            .await
            .write_location(query, self.history_mode);
    }

    /// Runs one search and renders it unless a newer search was issued meanwhile.
    pub async fn execute_search(&self, query: SearchQuery) -> Result<SearchOutcome, SearchError> {
        let request_id = self.state.lock().await.issue_request();
        self.run_search(request_id, query).await
    }

    pub async fn on_search_submitted(&self) -> Result<SearchOutcome, SearchError> {
        self.search_from_state(self.history_mode, |state| {
            let from_controls = state.read_controls(1);
            Some(
                state
                    .read_url()
                    .with_search_text(from_controls.search_text())
                    .with_page(1),
            )
        })
        .await
    }

    pub async fn on_sort_changed(&self) -> Result<SearchOutcome, SearchError> {
        self.search_from_state(self.history_mode, |state| {
            let from_controls = state.read_controls(1);
            Some(state.read_url().with_sort(from_controls.sort()).with_page(1))
        })
        .await
    }

    pub async fn on_filter_changed(&self) -> Result<SearchOutcome, SearchError> {
        self.search_from_state(self.history_mode, |state| {
            let from_controls = state.read_controls(1);
            Some(
                state
                    .read_url()
                    .with_filters(from_controls.filters().clone())
                    .with_page(1),
            )
        })
        .await
    }

    pub async fn on_filters_cleared(&self) -> Result<SearchOutcome, SearchError> {
        self.search_from_state(self.history_mode, |state| {
            state.pending_filter_selections.clear();
            for control in state.bindings.filter_controls.iter_mut() {
                control.clear();
            }
            Some(state.read_url().with_filters(FilterMap::new()).with_page(1))
        })
        .await
    }

    /// Steps the URL-derived page. Going back from page 1 does nothing.
    pub async fn on_page_navigated(
        &self,
        direction: PageDirection,
    ) -> Result<SearchOutcome, SearchError> {
        self.search_from_state(self.history_mode, |state| {
            let current = state.read_url();
            match direction.step(current.page()) {
                Some(page) => Some(current.with_page(page)),
                None => {
                    debug!(page = current.page(), ?direction, "search: page navigation clamped");
                    None
                }
            }
        })
        .await
    }

    /// Opens the pricing overlay for a product on the rendered page. Returns `false` when
    /// the product is not currently shown.
    pub async fn show_price_details(&self, product_id: ProductId, anchor: Anchor) -> bool {
        let mut state = self.state.lock().await;
        let Some(overlay) = state
            .rendered
            .as_ref()
            .and_then(|page| page.product(&product_id))
            .map(|product| PriceOverlay::for_product(product, anchor))
        else {
            warn!(product_id = %product_id, "search: price details for product not on page");
            return false;
        };

        state.dismiss_overlay();
        state.bindings.surface.show_price_overlay(&overlay);
        state.overlay = Some(overlay);
        true
    }

    pub async fn on_document_click(&self, target: ClickTarget) {
        let mut state = self.state.lock().await;
        if target.dismisses_overlay() {
            state.dismiss_overlay();
        }
    }

    pub async fn price_overlay(&self) -> Option<PriceOverlay> {
        self.state.lock().await.overlay.clone()
    }

    /// Builds the next query, writes the URL and claims the latest request id under one
    /// lock. `None` from `build` skips the search.
    async fn search_from_state<F>(
        &self,
        mode: HistoryMode,
        build: F,
    ) -> Result<SearchOutcome, SearchError>
    where
        F: FnOnce(&mut ControllerState) -> Option<SearchQuery>,
    {
        let (request_id, query) = {
            let mut state = self.state.lock().await;
            let Some(query) = build(&mut *state) else {
                return Ok(SearchOutcome::Skipped);
            };
            state.write_location(&query, mode);
            (state.issue_request(), query)
        };
        self.run_search(request_id, query).await
    }

    async fn run_search(
        &self,
        request_id: u64,
        query: SearchQuery,
    ) -> Result<SearchOutcome, SearchError> {
        debug!(request_id, query = %serialize_query(&query), "search: request issued");

        let result = self.api.search(&query).await;

        let mut state = self.state.lock().await;
        if state.latest_request != request_id {
            info!(
                request_id,
                latest_request = state.latest_request,
                "search: discarding stale response"
            );
            return Ok(SearchOutcome::Superseded);
        }

        match result {
            Ok(page) => {
                state.render(&page);
                info!(
                    request_id,
                    page = page.page,
                    products = page.products.len(),
                    "search: results rendered"
                );
                Ok(SearchOutcome::Rendered(page))
            }
            Err(err) => {
                warn!(request_id, error = %err, "search: request failed, keeping previous results");
                Err(err)
            }
        }
    }
}

impl ControllerState {
    fn issue_request(&mut self) -> u64 {
        self.latest_request += 1;
        self.latest_request
    }

    fn read_controls(&mut self, page: u32) -> SearchQuery {
        self.flush_pending_selections();

        let controls = &self.bindings.controls;
        let sort = match SortKey::parse_optional(&controls.sort_value()) {
            Ok(sort) => sort,
            Err(err) => {
                warn!(error = %err, "search: ignoring sort selector value");
                None
            }
        };

        let mut filters = FilterMap::new();
        for control in &self.bindings.filter_controls {
            let values = match self.pending_filter_selections.get(control.filter_name()) {
                Some(pending) => pending.clone(),
                None => control
                    .selected_values()
                    .iter()
                    .filter_map(|raw| FilterValue::from_control_value(raw))
                    .collect(),
            };
            filters
                .entry(control.filter_name().to_string())
                .or_default()
                .extend(values);
        }

        SearchQuery::new(controls.search_text(), sort, filters, page)
    }

    fn read_url(&self) -> SearchQuery {
        parse_query(&self.bindings.location.query_string())
    }

    fn write_location(&mut self, query: &SearchQuery, mode: HistoryMode) {
        let serialized = serialize_query(query);
        let location = &mut self.bindings.location;
        match mode {
            HistoryMode::Replace => location.replace_query(&serialized),
            HistoryMode::Push if location.query_string() == serialized => {}
            HistoryMode::Push => location.push_query(&serialized),
        }
        debug!(url = %serialized, mode = %mode, "search: browser url updated");
    }

    fn flush_pending_selections(&mut self) {
        if self.pending_filter_selections.is_empty() {
            return;
        }
        for control in self.bindings.filter_controls.iter_mut() {
            if !control.is_ready() {
                continue;
            }
            if let Some(values) = self.pending_filter_selections.remove(control.filter_name()) {
                debug!(filter = control.filter_name(), "search: applying deferred selection");
                apply_selection(control.as_mut(), &values);
            }
        }
    }

    fn render(&mut self, page: &ResultPage) {
        self.dismiss_overlay();
        let surface = &mut self.bindings.surface;
        if page.is_empty() {
            surface.render_empty();
        } else {
            surface.render_products(page);
        }
        surface.set_pagination(PaginationState::for_page(page));
        self.rendered = Some(page.clone());
    }

    fn dismiss_overlay(&mut self) {
        if self.overlay.take().is_some() {
            self.bindings.surface.dismiss_price_overlay();
        }
    }
}

fn apply_selection(control: &mut dyn FilterControl, values: &[FilterValue]) {
    if values.is_empty() {
        control.clear();
    } else {
        let values: Vec<String> = values.iter().map(ToString::to_string).collect();
        control.set_selected_values(&values);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
