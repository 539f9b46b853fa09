use crate::{RegistryError, RegistryInfo};
use dashmap::DashMap;
use snpm_dep_spec::PackageName;
use snpm_semver::ExactVersion;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Fetches and memoizes package metadata from an npm-compatible registry.
///
/// Per-name in-flight deduplication: concurrent callers for the same name
/// await the same fetch rather than issuing one request each. A name whose
/// fetch fails is not cached — the next caller retries.
pub struct RegistryClient {
    http: reqwest::Client,
    registry_url: String,
    cache: DashMap<PackageName, Arc<OnceCell<Arc<RegistryInfo>>>>,
}

impl RegistryClient {
    pub fn new(registry_url: impl Into<String>) -> Self {
        RegistryClient {
            http: reqwest::Client::new(),
            registry_url: registry_url.into(),
            cache: DashMap::new(),
        }
    }

    /// Full registry document for `name`: every published version and
    /// dist-tag. Memoized; all concurrent callers for the same name share
    /// one request.
    pub async fn info(&self, name: &PackageName) -> Result<Arc<RegistryInfo>, RegistryError> {
        let cell = self.cache.entry(name.clone()).or_insert_with(|| Arc::new(OnceCell::new())).clone();
        cell.get_or_try_init(|| self.fetch_info(name)).await.map(Arc::clone)
    }

    async fn fetch_info(&self, name: &PackageName) -> Result<Arc<RegistryInfo>, RegistryError> {
        let url = format!("{}/{}", self.registry_url.trim_end_matches('/'), encode_name(name));
        tracing::debug!(%name, url, "fetching package info");
        let info: RegistryInfo = self
            .http
            .get(&url)
            .header("user-agent", "snpm")
            .header("accept", "application/json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(Arc::new(info))
    }

    /// Published versions for `name`, used when the install sub-command
    /// needs to pick a version with nothing yet cached in the store.
    pub async fn available_versions(&self, name: &PackageName) -> Result<Vec<ExactVersion>, RegistryError> {
        let info = self.info(name).await?;
        Ok(info.parsed_versions().collect())
    }

    /// Downloads the tarball at `url` in full. Decompression/extraction is
    /// left to an injected [`crate::Unpack`].
    pub async fn fetch_tarball(&self, url: &str) -> Result<Vec<u8>, RegistryError> {
        let bytes = self.http.get(url).send().await?.error_for_status()?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Scoped names go over the wire URL-encoded: `@org%2fname`.
fn encode_name(name: &PackageName) -> String {
    match &name.scope {
        Some(scope) => format!("@{scope}%2f{}", name.bare),
        None => name.bare.clone(),
    }
}
