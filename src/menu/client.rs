use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;

/// Asks the stock service which ingredients of the given recipes are missing.
#[async_trait]
pub trait AvailabilityClient: Send + Sync {
    /// Returns the shopping list as an opaque, display-ready string.
    async fn get_missing_products(&self, recipes: &[String]) -> Result<String, AppError>;
}

const CHECK_AVAILABILITY_PATH: &str = "/api/v1/products/check-availability";

#[derive(Debug, Serialize, Deserialize)]
struct ProductsResponse {
    products: Vec<serde_json::Value>,
}

/// HTTP client for the barn (stock) service.
#[derive(Clone)]
pub struct BarnClient {
    base_url: String,
    http: reqwest::Client,
}

impl BarnClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build barn http client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn check_availability(&self, recipes: &[String]) -> anyhow::Result<String> {
        // recipes are already JSON documents, so the body is spliced rather than re-encoded
        let body = format!("[{}]", recipes.join(", "));
        let url = format!("{}{}", self.base_url, CHECK_AVAILABILITY_PATH);
        debug!(%url, recipes = recipes.len(), "checking product availability");

        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .context("failed to get products")?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("unexpected status code: {}, body: {}", status.as_u16(), body);
        }

        let products: ProductsResponse = resp.json().await.context("failed to decode response")?;
        serde_json::to_string(&products).context("failed to marshal product response")
    }
}

#[async_trait]
impl AvailabilityClient for BarnClient {
    async fn get_missing_products(&self, recipes: &[String]) -> Result<String, AppError> {
        self.check_availability(recipes)
            .await
            .with_context(|| format!("barn at {}", self.base_url))
            .map_err(|e| AppError::io("get_missing_products", self.base_url.as_str(), e))
    }
}
