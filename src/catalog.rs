//! Catalog Loader
//!
//! Pulls product records from a WooCommerce-style backend and normalizes
//! them for indexing: markup is stripped from descriptions and missing
//! fields are replaced with sentinels so every record serializes to a
//! complete flat text block.

use reqwest::Client;
use scraper::Html;
use serde::Deserialize;
use std::env;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::AssistantError;
use crate::models::{ProductRecord, MISSING_FIELD};
use crate::Result;

const PRODUCTS_PATH: &str = "/wp-json/wc/v3/products";

/// Connection settings for the catalog backend.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
}

impl CatalogConfig {
    /// Read settings from WC_BASE_URL / WC_API_KEY / WC_API_SECRET.
    /// Returns `None` when no store URL is configured.
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("WC_BASE_URL").ok()?;
        let consumer_key = env::var("WC_API_KEY").unwrap_or_default();
        let consumer_secret = env::var("WC_API_SECRET").unwrap_or_default();

        Some(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            consumer_key,
            consumer_secret,
        })
    }
}

/// HTTP client for the catalog API.
pub struct CatalogClient {
    client: Client,
    config: CatalogConfig,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetch the product collection from the backend.
    pub async fn fetch_products(&self) -> Result<Vec<ProductRecord>> {
        let url = format!("{}{}", self.config.base_url, PRODUCTS_PATH);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("consumer_key", self.config.consumer_key.as_str()),
                ("consumer_secret", self.config.consumer_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistantError::CatalogError(format!(
                "catalog request returned {}",
                status
            )));
        }

        let products: Vec<WcProduct> = response.json().await?;

        Ok(products.into_iter().map(ProductRecord::from).collect())
    }

    /// Fetch the catalog, degrading any failure to an empty catalog.
    /// The failure is logged but never surfaced to the user.
    pub async fn load_or_empty(&self) -> Vec<ProductRecord> {
        match self.fetch_products().await {
            Ok(records) => {
                info!("Loaded {} products from catalog", records.len());
                records
            }
            Err(error) => {
                warn!("Catalog fetch failed, continuing with empty catalog: {}", error);
                Vec::new()
            }
        }
    }
}

/// Product payload as returned by the catalog API.
#[derive(Debug, Deserialize)]
pub struct WcProduct {
    pub name: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<WcCategory>,
}

#[derive(Debug, Deserialize)]
pub struct WcCategory {
    pub name: String,
}

impl From<WcProduct> for ProductRecord {
    fn from(product: WcProduct) -> Self {
        let name = product
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| MISSING_FIELD.to_string());

        let price = product
            .price
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| MISSING_FIELD.to_string());

        let description = product
            .description
            .as_deref()
            .map(strip_html)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| MISSING_FIELD.to_string());

        ProductRecord {
            name,
            price,
            description,
            categories: product.categories.into_iter().map(|c| c.name).collect(),
        }
    }
}

/// Reduce an HTML fragment to plain text with collapsed whitespace, so the
/// line-oriented flat block format stays parseable.
pub fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let pieces: Vec<&str> = fragment.root_element().text().collect();

    pieces
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
