//! Docker Hub client for tag listing and deletion.
//!
//! The client speaks both of the service's APIs: the Hub metadata API
//! (credential validation, paginated tag listings with timestamps, tag
//! delete fallback) and the token-based Registry v2 protocol (listing
//! fallback, delete-by-digest). Every network call goes through the
//! retrying invoker in [`crate::retry`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use katharos_core::{DeleteOutcome, RepositoryName, Tag, TagRegistry};
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Response, StatusCode};

use crate::api::{TagListResponse, TagPage, TokenResponse};
use crate::config::HubConfig;
use crate::error::RegistryError;
use crate::retry::{retry, RetryConfig};
use crate::token::TokenCache;

/// Media type requested when resolving a manifest digest.
const MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";

/// Service name used in the token handshake.
const TOKEN_SERVICE: &str = "registry.docker.io";

/// Fallback wait when a rate-limit response carries no `Retry-After`.
const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(1);

/// Client for the Docker Hub and Registry v2 APIs.
#[derive(Debug)]
pub struct HubClient {
    config: HubConfig,
    http: reqwest::Client,
    tokens: TokenCache,
    retry: RetryConfig,
}

impl HubClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: HubConfig) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|source| RegistryError::ConnectionFailed {
                url: config.hub_url.clone(),
                source,
            })?;

        Ok(Self {
            config,
            http,
            tokens: TokenCache::new(),
            retry: RetryConfig::default(),
        })
    }

    /// Overrides the retry configuration.
    #[must_use]
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Validates credentials against the Hub API.
    ///
    /// Must be called once before any repository is processed; a failure
    /// here is fatal for the whole run.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AuthenticationFailed`] if the credentials
    /// are rejected, or a transport error if the service is unreachable.
    pub async fn authenticate(&self) -> Result<(), RegistryError> {
        tracing::info!(username = %self.config.username, "Validating credentials");
        retry(&self.retry, "authenticate", || self.authenticate_once()).await
    }

    async fn authenticate_once(&self) -> Result<(), RegistryError> {
        let url = format!("{}/users/{}", self.config.hub_url, self.config.username);
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, self.basic_auth_header()?)
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Lists tags via the Hub API, following pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if any page cannot be fetched after retries.
    pub async fn list_tags_hub(&self, repository: &RepositoryName) -> Result<Vec<Tag>, RegistryError> {
        let mut tags = Vec::new();
        let mut page = 1u32;

        loop {
            let page_data = retry(&self.retry, "hub-list-tags", || {
                self.fetch_tag_page(repository, page)
            })
            .await?;

            tracing::debug!(
                repository = %repository,
                page,
                count = page_data.results.len(),
                "Fetched tag page"
            );
            tags.extend(page_data.results.into_iter().map(Tag::from));

            if page_data.next.is_none() {
                break;
            }
            page += 1;
        }

        Ok(tags)
    }

    async fn fetch_tag_page(&self, repository: &RepositoryName, page: u32) -> Result<TagPage, RegistryError> {
        let url = format!(
            "{}/repositories/{}/{}/tags",
            self.config.hub_url,
            repository.namespace(),
            repository.repository()
        );

        let response = self
            .http
            .get(&url)
            .query(&[("page", page), ("page_size", self.config.page_size)])
            .header(AUTHORIZATION, self.basic_auth_header()?)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// Lists tags via the Registry v2 API.
    ///
    /// This path carries no timestamps; returned tags have no
    /// last-modified value and are treated as maximally old downstream.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be fetched after retries.
    pub async fn list_tags_registry(
        &self,
        repository: &RepositoryName,
    ) -> Result<Vec<Tag>, RegistryError> {
        let token = self.bearer_token(repository).await?;
        retry(&self.retry, "registry-list-tags", || {
            self.fetch_registry_tags(repository, &token)
        })
        .await
    }

    async fn fetch_registry_tags(
        &self,
        repository: &RepositoryName,
        token: &str,
    ) -> Result<Vec<Tag>, RegistryError> {
        let url = format!("{}/{}/tags/list", self.config.registry_url, repository);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        let response = Self::ensure_success(response).await?;
        let listing: TagListResponse = response.json().await?;
        Ok(listing.into_tags())
    }

    /// Deletes a tag, preferring delete-by-digest over the Hub API.
    ///
    /// In dry-run mode nothing is removed and the call reports success.
    /// A tag that is already gone is reported as
    /// [`DeleteOutcome::NotFound`], which callers treat as success.
    ///
    /// # Errors
    ///
    /// Returns an error if both delete paths fail after retries.
    pub async fn delete(
        &self,
        repository: &RepositoryName,
        tag: &str,
    ) -> Result<DeleteOutcome, RegistryError> {
        if self.config.dry_run {
            tracing::info!(repository = %repository, tag, "Dry run: tag would be deleted");
            return Ok(DeleteOutcome::DryRun);
        }

        match self.delete_via_registry(repository, tag).await {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                tracing::debug!(
                    repository = %repository,
                    tag,
                    error = %error,
                    "Registry delete failed, trying Hub API"
                );
                retry(&self.retry, "hub-delete", || {
                    self.hub_delete_once(repository, tag)
                })
                .await
            }
        }
    }

    async fn delete_via_registry(
        &self,
        repository: &RepositoryName,
        tag: &str,
    ) -> Result<DeleteOutcome, RegistryError> {
        let token = self.bearer_token(repository).await?;
        let digest = retry(&self.retry, "manifest-digest", || {
            self.manifest_digest(repository, tag, &token)
        })
        .await?;

        retry(&self.retry, "registry-delete", || {
            self.delete_manifest(repository, &digest, &token)
        })
        .await
    }

    async fn manifest_digest(
        &self,
        repository: &RepositoryName,
        tag: &str,
        token: &str,
    ) -> Result<String, RegistryError> {
        let url = format!("{}/{}/manifests/{}", self.config.registry_url, repository, tag);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header(ACCEPT, MANIFEST_V2)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        response
            .headers()
            .get("Docker-Content-Digest")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
            .ok_or_else(|| RegistryError::MissingDigest {
                repository: repository.to_string(),
                tag: tag.to_string(),
            })
    }

    async fn delete_manifest(
        &self,
        repository: &RepositoryName,
        digest: &str,
        token: &str,
    ) -> Result<DeleteOutcome, RegistryError> {
        let url = format!(
            "{}/{}/manifests/{}",
            self.config.registry_url, repository, digest
        );
        let response = self.http.delete(&url).bearer_auth(token).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(DeleteOutcome::NotFound);
        }

        Self::ensure_success(response).await?;
        Ok(DeleteOutcome::Deleted)
    }

    async fn hub_delete_once(
        &self,
        repository: &RepositoryName,
        tag: &str,
    ) -> Result<DeleteOutcome, RegistryError> {
        let encoded: String = url::form_urlencoded::byte_serialize(tag.as_bytes()).collect();
        let url = format!(
            "{}/repositories/{}/{}/tags/{}",
            self.config.hub_url,
            repository.namespace(),
            repository.repository(),
            encoded
        );

        let response = self
            .http
            .delete(&url)
            .header(AUTHORIZATION, self.basic_auth_header()?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(DeleteOutcome::NotFound);
        }

        Self::ensure_success(response).await?;
        Ok(DeleteOutcome::Deleted)
    }

    /// Returns a bearer token for the repository, reusing a cached one
    /// while it is fresh.
    async fn bearer_token(&self, repository: &RepositoryName) -> Result<String, RegistryError> {
        let key = repository.to_string();
        if let Some(token) = self.tokens.get(&key, Utc::now()) {
            tracing::debug!(repository = %repository, "Using cached bearer token");
            return Ok(token);
        }

        let token = retry(&self.retry, "bearer-token", || {
            self.fetch_bearer_token(repository)
        })
        .await?;
        self.tokens.insert(key, token.clone(), Utc::now());
        Ok(token)
    }

    async fn fetch_bearer_token(&self, repository: &RepositoryName) -> Result<String, RegistryError> {
        let scope = format!("repository:{repository}:pull,push,delete");
        let url = format!("{}/token", self.config.auth_url);

        tracing::debug!(repository = %repository, "Requesting bearer token");
        let response = self
            .http
            .get(&url)
            .query(&[("service", TOKEN_SERVICE), ("scope", scope.as_str())])
            .header(AUTHORIZATION, self.basic_auth_header()?)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let token: TokenResponse = response.json().await?;
        token.token.ok_or_else(|| RegistryError::MissingToken {
            repository: repository.to_string(),
        })
    }

    /// Creates the Basic authorization header value.
    fn basic_auth_header(&self) -> Result<HeaderValue, RegistryError> {
        let credentials = base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            format!("{}:{}", self.config.username, self.config.password),
        );
        let mut value = HeaderValue::from_str(&format!("Basic {credentials}")).map_err(|_| {
            RegistryError::AuthenticationFailed {
                message: "Invalid credentials".to_string(),
            }
        })?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// Maps non-success responses to typed errors, reading the body for
    /// the message and the `Retry-After` header for rate limits.
    async fn ensure_success(response: Response) -> Result<Response, RegistryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map_or(DEFAULT_RATE_LIMIT_WAIT, Duration::from_secs);
            return Err(RegistryError::RateLimited { retry_after });
        }

        let message = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            return Err(RegistryError::AuthenticationFailed {
                message: if message.is_empty() {
                    status.to_string()
                } else {
                    message
                },
            });
        }

        Err(RegistryError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl TagRegistry for HubClient {
    /// Lists tags, preferring the Hub API for its timestamps and falling
    /// back to the Registry API only on an HTTP-level failure. An empty
    /// Hub response is a valid empty repository, not a reason to fall
    /// back.
    async fn list_tags(&self, repository: &RepositoryName) -> katharos_core::Result<Vec<Tag>> {
        match self.list_tags_hub(repository).await {
            Ok(tags) => Ok(tags),
            Err(error) => {
                tracing::warn!(
                    repository = %repository,
                    error = %error,
                    "Hub listing failed, falling back to Registry API"
                );
                self.list_tags_registry(repository).await.map_err(Into::into)
            }
        }
    }

    async fn delete_tag(
        &self,
        repository: &RepositoryName,
        tag_name: &str,
    ) -> katharos_core::Result<DeleteOutcome> {
        self.delete(repository, tag_name).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HubClient {
        HubClient::new(HubConfig::new("acme", "hunter2")).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let result = HubClient::new(HubConfig::new("acme", "hunter2"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_basic_auth_header() {
        let header = client().basic_auth_header().unwrap();
        let expected = base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            "acme:hunter2",
        );
        assert_eq!(
            header.to_str().unwrap(),
            format!("Basic {expected}")
        );
        assert!(header.is_sensitive());
    }

    #[tokio::test]
    async fn test_dry_run_delete_is_a_no_op() {
        let client = HubClient::new(HubConfig::new("acme", "hunter2").with_dry_run(true)).unwrap();
        let repository = RepositoryName::new("acme", "web");

        let outcome = client.delete(&repository, "pr-42").await.unwrap();
        assert_eq!(outcome, DeleteOutcome::DryRun);
    }

    #[tokio::test]
    async fn test_dry_run_through_trait() {
        let client = HubClient::new(HubConfig::new("acme", "hunter2").with_dry_run(true)).unwrap();
        let repository = RepositoryName::new("acme", "web");

        let outcome = TagRegistry::delete_tag(&client, &repository, "pr-42")
            .await
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::DryRun);
    }
}
