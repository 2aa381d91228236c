//! # Katharos Registry
//!
//! Docker Hub and Registry v2 clients for the Katharos cleanup platform.
//!
//! This crate implements the network side of a cleanup run: credential
//! validation against the Hub API, the bearer-token handshake with a
//! per-repository token cache, paginated tag listings, and tag deletion
//! (delete-by-digest with a Hub API fallback). It implements the
//! [`TagRegistry`](katharos_core::TagRegistry) collaborator trait that the
//! core processing loop drives.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use katharos_core::{RepositoryName, RetentionPolicy};
//! use katharos_registry::{HubClient, HubConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HubConfig::new("acme", "hunter2").with_dry_run(true);
//!     let client = HubClient::new(config)?;
//!
//!     client.authenticate().await?;
//!
//!     let repository = RepositoryName::new("acme", "web");
//!     let summary = katharos_core::run(
//!         &client,
//!         std::slice::from_ref(&repository),
//!         &RetentionPolicy::new(),
//!         chrono::Utc::now(),
//!     )
//!     .await;
//!     println!("{}", serde_json::to_string_pretty(&summary)?);
//!
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod api;
mod client;
mod config;
mod error;
mod retry;
mod token;

pub use api::{TagListResponse, TagPage, TagRecord, TokenResponse};
pub use client::HubClient;
pub use config::HubConfig;
pub use error::RegistryError;
pub use retry::{retry, RetryConfig};
pub use token::TokenCache;
