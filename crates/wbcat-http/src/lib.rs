//! wbcat HTTP transport
//!
//! reqwest implementations of the source-layer seams:
//! - [`HttpCatalogueDownloader`] fetches the menu tree document
//! - [`HttpFacetFetcher`] performs one filters lookup per leaf
//!
//! Both share one [`reqwest::Client`] built from [`HttpConfig`], which
//! carries the `Accept` and `User-Agent` headers the storefront expects.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod catalogue;
pub mod client;
pub mod error;
pub mod facet;

pub use catalogue::{HttpCatalogueDownloader, CATALOGUE_URL};
pub use client::{HttpConfig, DEFAULT_ACCEPT, DEFAULT_USER_AGENT};
pub use error::HttpError;
pub use facet::{FacetEndpoint, HttpFacetFetcher};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
