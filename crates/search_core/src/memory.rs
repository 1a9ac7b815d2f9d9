use std::sync::{Arc, Mutex, MutexGuard};

use shared::domain::ProductId;

use crate::{
    api::ResultPage,
    price_overlay::PriceOverlay,
    ui::{BrowserLocation, FilterControl, PaginationState, ResultsSurface, SearchControls},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
struct ControlValues {
    search_text: String,
    sort: String,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryControls {
    values: Arc<Mutex<ControlValues>>,
}

impl MemoryControls {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SearchControls for MemoryControls {
    fn search_text(&self) -> String {
        lock(&self.values).search_text.clone()
    }

    fn set_search_text(&mut self, text: &str) {
        lock(&self.values).search_text = text.to_string();
    }

    fn sort_value(&self) -> String {
        lock(&self.values).sort.clone()
    }

    fn set_sort_value(&mut self, value: &str) {
        lock(&self.values).sort = value.to_string();
    }
}

#[derive(Debug)]
struct FilterSelection {
    ready: bool,
    selected: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MemoryFilterControl {
    name: String,
    selection: Arc<Mutex<FilterSelection>>,
}

impl MemoryFilterControl {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_readiness(name, true)
    }

    /// A control whose widget has not been constructed yet; see [`Self::mark_ready`].
    pub fn uninitialized(name: impl Into<String>) -> Self {
        Self::with_readiness(name, false)
    }

    fn with_readiness(name: impl Into<String>, ready: bool) -> Self {
        Self {
            name: name.into(),
            selection: Arc::new(Mutex::new(FilterSelection {
                ready,
                selected: Vec::new(),
            })),
        }
    }

    pub fn mark_ready(&self) {
        lock(&self.selection).ready = true;
    }

    /// Simulates the user picking options, regardless of readiness.
    pub fn select(&self, values: &[&str]) {
        lock(&self.selection).selected = values.iter().map(|value| value.to_string()).collect();
    }

    pub fn selected(&self) -> Vec<String> {
        lock(&self.selection).selected.clone()
    }
}

impl FilterControl for MemoryFilterControl {
    fn filter_name(&self) -> &str {
        &self.name
    }

    fn is_ready(&self) -> bool {
        lock(&self.selection).ready
    }

    fn selected_values(&self) -> Vec<String> {
        let selection = lock(&self.selection);
        if selection.ready {
            selection.selected.clone()
        } else {
            Vec::new()
        }
    }

    fn set_selected_values(&mut self, values: &[String]) {
        lock(&self.selection).selected = values.to_vec();
    }

    fn clear(&mut self) {
        lock(&self.selection).selected.clear();
    }
}

#[derive(Debug)]
struct LocationState {
    current: String,
    entries: usize,
}

#[derive(Debug, Clone)]
pub struct MemoryLocation {
    state: Arc<Mutex<LocationState>>,
}

impl MemoryLocation {
    pub fn new(initial_query: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(LocationState {
                current: initial_query.into(),
                entries: 1,
            })),
        }
    }

    pub fn current_query(&self) -> String {
        lock(&self.state).current.clone()
    }

    pub fn history_len(&self) -> usize {
        lock(&self.state).entries
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("")
    }
}

impl BrowserLocation for MemoryLocation {
    fn query_string(&self) -> String {
        self.current_query()
    }

    fn replace_query(&mut self, query: &str) {
        lock(&self.state).current = query.to_string();
    }

    fn push_query(&mut self, query: &str) {
        let mut state = lock(&self.state);
        state.current = query.to_string();
        state.entries += 1;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceSnapshot {
    pub products: Vec<ProductId>,
    pub empty_placeholder: bool,
    pub pagination: Option<PaginationState>,
    pub overlay: Option<PriceOverlay>,
    pub renders: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    snapshot: Arc<Mutex<SurfaceSnapshot>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        lock(&self.snapshot).clone()
    }
}

impl ResultsSurface for RecordingSurface {
    fn render_products(&mut self, page: &ResultPage) {
        let mut snapshot = lock(&self.snapshot);
        snapshot.products = page.products.iter().map(|product| product.id.clone()).collect();
        snapshot.empty_placeholder = false;
        snapshot.renders += 1;
    }

    fn render_empty(&mut self) {
        let mut snapshot = lock(&self.snapshot);
        snapshot.products.clear();
        snapshot.empty_placeholder = true;
        snapshot.renders += 1;
    }

    fn set_pagination(&mut self, pagination: PaginationState) {
        lock(&self.snapshot).pagination = Some(pagination);
    }

    fn show_price_overlay(&mut self, overlay: &PriceOverlay) {
        lock(&self.snapshot).overlay = Some(overlay.clone());
    }

    fn dismiss_price_overlay(&mut self) {
        lock(&self.snapshot).overlay = None;
    }
}
