//! Catalogue document download

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use wbcat_source::{CatalogueDownloader, SourceError};

/// Well-known location of the full menu tree
pub const CATALOGUE_URL: &str = "https://static-basket-01.wb.ru/vol0/data/main-menu-ru-ru-v2.json";

/// reqwest-backed [`CatalogueDownloader`]
#[derive(Debug, Clone)]
pub struct HttpCatalogueDownloader {
    client: Client,
    url: String,
}

impl HttpCatalogueDownloader {
    /// Create downloader for `url`
    #[inline]
    #[must_use]
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Source URL
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CatalogueDownloader for HttpCatalogueDownloader {
    async fn download(&self) -> Result<Value, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SourceError::Download(format!("{}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Download(format!("{}: status {status}", self.url)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SourceError::Download(format!("{}: {e}", self.url)))
    }
}
