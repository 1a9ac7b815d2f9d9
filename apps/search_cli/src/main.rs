use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::Parser;
use search_core::{
    memory::{MemoryControls, MemoryFilterControl, MemoryLocation},
    query::{CATEGORIES_FILTER, SUBCATEGORIES_FILTER},
    Anchor, HistoryMode, HttpSearchApi, PageBindings, PageDirection, SearchControls,
    SearchError, SearchOutcome, SearchStateController,
};
use shared::domain::ProductId;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod terminal;

use config::{load_settings, DEFAULT_CONFIG_FILE};
use terminal::TerminalSurface;

/// Drives the storefront product search the way the search page does: restore state from
/// a URL, apply interactions in order and print what the page would show.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Storefront base URL; overrides the config file and environment.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    history_mode: Option<HistoryMode>,
    /// Query string of the page URL to start from, e.g. "?search=shoes&page=2".
    #[arg(long, default_value = "")]
    url: String,
    #[arg(long)]
    clear_filters: bool,
    #[arg(long)]
    search: Option<String>,
    /// One of price-asc, price-desc, name-asc, name-desc; empty for default ordering.
    #[arg(long)]
    sort: Option<String>,
    #[arg(long = "category")]
    categories: Vec<String>,
    #[arg(long = "subcategory")]
    subcategories: Vec<String>,
    #[arg(long, conflicts_with = "previous")]
    next: bool,
    #[arg(long)]
    previous: bool,
    /// Show the pricing overlay for a product on the final page.
    #[arg(long)]
    price: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    if let Some(server_url) = &args.server_url {
        settings.base_url = server_url.clone();
    }
    if let Some(mode) = args.history_mode {
        settings.history_mode = mode;
    }
    info!(
        base_url = %settings.base_url,
        search_path = %settings.search_path,
        history_mode = %settings.history_mode,
        "search_cli: starting"
    );

    let api = HttpSearchApi::with_options(
        &settings.base_url,
        &settings.search_path,
        settings.request_timeout(),
    )
    .context("failed to set up search client")?;

    let mut controls = MemoryControls::new();
    let categories = MemoryFilterControl::new(CATEGORIES_FILTER);
    let subcategories = MemoryFilterControl::new(SUBCATEGORIES_FILTER);
    let location = MemoryLocation::new(args.url.clone());
    let controller = SearchStateController::new(
        Arc::new(api),
        PageBindings {
            controls: Box::new(controls.clone()),
            filter_controls: vec![Box::new(categories.clone()), Box::new(subcategories.clone())],
            location: Box::new(location.clone()),
            surface: Box::new(TerminalSurface),
        },
        settings.history_mode,
    );

    let mut runs = RunSummary::default();
    runs.record("initial search", controller.initialize().await);

    if args.clear_filters {
        runs.record("clear filters", controller.on_filters_cleared().await);
    }
    if let Some(text) = &args.search {
        controls.set_search_text(text);
        runs.record("search", controller.on_search_submitted().await);
    }
    if let Some(sort) = &args.sort {
        controls.set_sort_value(sort);
        runs.record("sort", controller.on_sort_changed().await);
    }
    if !args.categories.is_empty() || !args.subcategories.is_empty() {
        if !args.categories.is_empty() {
            categories.select(&as_strs(&args.categories));
        }
        if !args.subcategories.is_empty() {
            subcategories.select(&as_strs(&args.subcategories));
        }
        runs.record("filter", controller.on_filter_changed().await);
    }
    if args.next {
        runs.record(
            "next page",
            controller.on_page_navigated(PageDirection::Next).await,
        );
    } else if args.previous {
        runs.record(
            "previous page",
            controller.on_page_navigated(PageDirection::Previous).await,
        );
    }

    if let Some(product_id) = args.price {
        if !controller
            .show_price_details(ProductId(product_id.clone()), Anchor::default())
            .await
        {
            warn!(%product_id, "product is not on the current results page");
        }
    }

    println!("url: {}", location.current_query());

    if runs.rendered == 0 {
        bail!(
            "no search succeeded against {} ({} failed)",
            settings.base_url,
            runs.failed
        );
    }
    Ok(())
}

#[derive(Default)]
struct RunSummary {
    rendered: usize,
    failed: usize,
}

impl RunSummary {
    fn record(&mut self, step: &str, outcome: Result<SearchOutcome, SearchError>) {
        match outcome {
            Ok(SearchOutcome::Rendered(page)) => {
                self.rendered += 1;
                info!(step, page = page.page, products = page.products.len(), "search_cli: rendered");
            }
            Ok(SearchOutcome::Skipped) => info!(step, "search_cli: nothing to do"),
            Ok(SearchOutcome::Superseded) => info!(step, "search_cli: superseded"),
            Err(err) => {
                self.failed += 1;
                warn!(step, error = %err, "search_cli: search failed, previous results kept");
            }
        }
    }
}

fn as_strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}
