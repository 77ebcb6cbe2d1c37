//! Facet lookups over HTTP
//!
//! One GET per leaf against the filters endpoint. The transport outcome is
//! folded into a [`FacetLookup`]:
//! - send timed out, or the connection dropped mid-exchange → `Disconnected`
//! - non-success status, non-JSON content type, undecodable body → `UnexpectedContent`
//! - host unreachable → `Err(FetchError::Unreachable)`, which ends the run

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use wbcat_model::FacetResponse;
use wbcat_source::{FacetFetcher, FacetLookup, FacetRequest, FetchError};

/// Filters endpoint and its fixed query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacetEndpoint {
    /// Base URL, shard is appended as a path segment
    pub base_url: String,
    /// `appType` parameter
    pub app_type: u32,
    /// `curr` parameter
    pub currency: String,
    /// `dest` parameter (delivery region)
    pub dest: i64,
    /// `spp` parameter (result-size hint)
    pub spp: u32,
}

impl FacetEndpoint {
    /// Full lookup URL for a request
    #[must_use]
    pub fn url(&self, request: &FacetRequest) -> String {
        format!(
            "{}/{}//v4/filters?appType={}&{}&curr={}&dest={}&spp={}",
            self.base_url.trim_end_matches('/'),
            request.shard,
            self.app_type,
            request.query,
            self.currency,
            self.dest,
            self.spp,
        )
    }
}

impl Default for FacetEndpoint {
    fn default() -> Self {
        Self {
            base_url: "https://catalog.wb.ru/catalog".to_string(),
            app_type: 1,
            currency: "rub".to_string(),
            dest: -8_144_334,
            spp: 30,
        }
    }
}

/// reqwest-backed [`FacetFetcher`]
#[derive(Debug, Clone)]
pub struct HttpFacetFetcher {
    client: Client,
    endpoint: FacetEndpoint,
}

impl HttpFacetFetcher {
    /// Create fetcher on a shared client
    #[inline]
    #[must_use]
    pub fn new(client: Client, endpoint: FacetEndpoint) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl FacetFetcher for HttpFacetFetcher {
    async fn fetch(&self, request: &FacetRequest) -> Result<FacetLookup, FetchError> {
        let url = self.endpoint.url(request);
        tracing::trace!(%url, "facet lookup");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(err) => return classify_send_error(&err),
        };

        let status = response.status();
        if !status.is_success() {
            return Ok(FacetLookup::unexpected_content(format!("status {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.contains("json") {
            return Ok(FacetLookup::unexpected_content(format!(
                "content type {content_type:?}"
            )));
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => return Ok(FacetLookup::disconnected(err.to_string())),
        };

        match serde_json::from_slice::<FacetResponse>(&body) {
            Ok(decoded) => Ok(FacetLookup::Response(decoded)),
            Err(err) => Ok(FacetLookup::unexpected_content(format!("decode: {err}"))),
        }
    }
}

/// Map a failed send to a lookup outcome or a fatal error
pub(crate) fn classify_send_error(err: &reqwest::Error) -> Result<FacetLookup, FetchError> {
    if err.is_builder() {
        Err(FetchError::Transport(err.to_string()))
    } else if err.is_connect() && !err.is_timeout() {
        Err(FetchError::Unreachable(err.to_string()))
    } else {
        Ok(FacetLookup::disconnected(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{refused_addr, serve_once, serve_then_hang_up};
    use crate::HttpConfig;

    fn fetcher_for(base_url: String) -> HttpFacetFetcher {
        let client = HttpConfig::new().with_timeout_secs(5).build_client().unwrap();
        let endpoint = FacetEndpoint {
            base_url,
            ..FacetEndpoint::default()
        };
        HttpFacetFetcher::new(client, endpoint)
    }

    #[test]
    fn url_matches_storefront_layout() {
        let endpoint = FacetEndpoint::default();
        let url = endpoint.url(&FacetRequest::new("bl_shirts", "cat=8126"));
        assert_eq!(
            url,
            "https://catalog.wb.ru/catalog/bl_shirts//v4/filters?appType=1&cat=8126&curr=rub&dest=-8144334&spp=30"
        );
    }

    #[test]
    fn numeric_shard_in_url() {
        let endpoint = FacetEndpoint {
            base_url: "http://localhost/catalog/".to_string(),
            ..FacetEndpoint::default()
        };
        let url = endpoint.url(&FacetRequest::new(99_999_i64, "subject=1"));
        assert!(url.starts_with("http://localhost/catalog/99999//v4/filters?appType=1&subject=1&"));
    }

    #[tokio::test]
    async fn json_body_is_decoded() {
        let body = r#"{"data":{"filters":[{"name":"Категория","items":[{"id":9,"name":"X"}]}]}}"#;
        let base = serve_once("200 OK", "application/json; charset=utf-8", body).await;

        let lookup = fetcher_for(base)
            .fetch(&FacetRequest::new(1_i64, "cat=1"))
            .await
            .unwrap();

        let FacetLookup::Response(response) = lookup else {
            panic!("expected decoded response, got {lookup:?}");
        };
        assert!(response.first_group().unwrap().is_labeled("Категория"));
    }

    #[tokio::test]
    async fn broken_second_group_still_decodes() {
        let body = r#"{"data":{"filters":[{"name":"Категория","items":[{"id":9,"name":"X"}]},{"name":"Цена","items":null}]}}"#;
        let base = serve_once("200 OK", "application/json", body).await;

        let lookup = fetcher_for(base)
            .fetch(&FacetRequest::new(1_i64, "cat=1"))
            .await
            .unwrap();

        let FacetLookup::Response(response) = lookup else {
            panic!("expected decoded response, got {lookup:?}");
        };
        let first = response.first_group().unwrap();
        assert!(first.is_labeled("Категория"));
        assert_eq!(first.items.len(), 1);
    }

    #[tokio::test]
    async fn html_body_is_unexpected_content() {
        let base = serve_once("200 OK", "text/html", "<html></html>").await;

        let lookup = fetcher_for(base)
            .fetch(&FacetRequest::new(1_i64, "cat=1"))
            .await
            .unwrap();
        assert!(matches!(lookup, FacetLookup::UnexpectedContent { .. }));
    }

    #[tokio::test]
    async fn error_status_is_unexpected_content() {
        let base = serve_once("500 Internal Server Error", "application/json", "{}").await;

        let lookup = fetcher_for(base)
            .fetch(&FacetRequest::new(1_i64, "cat=1"))
            .await
            .unwrap();
        assert_eq!(lookup, FacetLookup::unexpected_content("status 500 Internal Server Error"));
    }

    #[tokio::test]
    async fn hang_up_is_disconnected() {
        let base = serve_then_hang_up().await;

        let lookup = fetcher_for(base)
            .fetch(&FacetRequest::new(1_i64, "cat=1"))
            .await
            .unwrap();
        assert!(matches!(lookup, FacetLookup::Disconnected { .. }));
    }

    #[tokio::test]
    async fn refused_connection_is_fatal() {
        let base = refused_addr().await;

        let err = fetcher_for(base)
            .fetch(&FacetRequest::new(1_i64, "cat=1"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Unreachable(_)));
    }
}
