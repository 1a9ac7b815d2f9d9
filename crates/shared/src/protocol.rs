use serde::{Deserialize, Serialize};

use crate::domain::ProductId;

pub const PRODUCT_SEARCH_PATH: &str = "/api/products/search/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTier {
    pub units: u32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub product_images: Vec<ProductImage>,
    #[serde(default)]
    pub prices: Vec<PriceTier>,
}

impl ProductSummary {
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.product_images
            .first()
            .map(|image| image.image.as_str())
            .filter(|url| !url.trim().is_empty())
    }

    pub fn view_path(&self) -> String {
        format!("/view_product/{}/", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub products: Vec<ProductSummary>,
    #[serde(default)]
    pub previous_page: bool,
    #[serde(default)]
    pub next_page: bool,
}
