use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use shared::{
    domain::ProductId,
    error::{ApiError, ApiException},
    protocol::{ProductSummary, SearchResponse, PRODUCT_SEARCH_PATH},
};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::{query::SearchQuery, url_state::query_params};

#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    pub page: u32,
    pub products: Vec<ProductSummary>,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl ResultPage {
    pub fn from_response(page: u32, response: SearchResponse) -> Self {
        Self {
            page: page.max(1),
            products: response.products,
            has_previous_page: response.previous_page,
            has_next_page: response.next_page,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn product(&self, product_id: &ProductId) -> Option<&ProductSummary> {
        self.products.iter().find(|product| &product.id == product_id)
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("failed to build http client: {0}")]
    ClientSetup(reqwest::Error),
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("search request rejected: {0}")]
    Rejected(#[from] ApiException),
}

impl SearchError {
    pub fn is_request_failure(&self) -> bool {
        matches!(self, SearchError::Transport(_) | SearchError::Rejected(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SearchError::Transport(err) => err.status().map(|status| status.as_u16()),
            SearchError::Rejected(err) => Some(err.status),
            _ => None,
        }
    }
}

#[async_trait]
pub trait SearchApi: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<ResultPage, SearchError>;
}

/// [`SearchApi`] over HTTP: `GET {base}/api/products/search/?search=&sort=&page=&filters=`.
pub struct HttpSearchApi {
    http: Client,
    endpoint: Url,
}

impl HttpSearchApi {
    pub fn new(base_url: &str) -> Result<Self, SearchError> {
        Self::with_options(base_url, PRODUCT_SEARCH_PATH, None)
    }

    pub fn with_options(
        base_url: &str,
        search_path: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, SearchError> {
        let endpoint = Url::parse(base_url.trim())?.join(search_path)?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(SearchError::ClientSetup)?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn request_url(&self, query: &SearchQuery) -> Url {
        let mut url = self.endpoint.clone();
        let params = query_params(query);
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        url
    }
}

#[async_trait]
impl SearchApi for HttpSearchApi {
    async fn search(&self, query: &SearchQuery) -> Result<ResultPage, SearchError> {
        let url = self.request_url(query);
        debug!(url = %url, "search: GET");
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = ApiError::from_body(&body)
                .map(|err| err.message)
                .unwrap_or_else(|| status.to_string());
            return Err(ApiException::new(status.as_u16(), message).into());
        }

        let body: SearchResponse = response.json().await?;
        Ok(ResultPage::from_response(query.page(), body))
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
