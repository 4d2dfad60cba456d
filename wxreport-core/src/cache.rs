use async_trait::async_trait;
use std::{
    fmt::Debug,
    path::{Path, PathBuf},
};

use crate::{error::CatalogError, provider::NwsClient, station::StationCatalog};

/// Supplies the radar station catalog. Whether it comes from disk or the
/// network is the implementation's business.
#[async_trait]
pub trait StationSource: Send + Sync + Debug {
    async fn fetch_station_catalog(&self) -> Result<StationCatalog, CatalogError>;
}

/// Radar stations from a JSON cache file, fetched from NWS when the file is
/// absent.
#[derive(Debug, Clone)]
pub struct CachedStationSource {
    cache_path: PathBuf,
    client: NwsClient,
}

impl CachedStationSource {
    pub fn new(cache_path: impl Into<PathBuf>, client: NwsClient) -> Self {
        Self { cache_path: cache_path.into(), client }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Fetch from the network and overwrite the cache, whatever is on disk.
    pub async fn refresh(&self) -> Result<StationCatalog, CatalogError> {
        let catalog = self.client.radar_stations().await?;
        // An empty list would pin every later run to `EmptyCatalog`.
        if catalog.is_empty() {
            tracing::warn!("NWS returned no radar stations; not caching");
        } else {
            self.store(&catalog).await;
        }
        Ok(catalog)
    }

    async fn load(&self) -> Result<StationCatalog, CatalogError> {
        let path = &self.cache_path;
        let contents = tokio::fs::read(path)
            .await
            .map_err(|source| CatalogError::Read { path: path.clone(), source })?;

        serde_json::from_slice(&contents)
            .map_err(|source| CatalogError::Parse { path: path.clone(), source })
    }

    /// A cache that cannot be written only costs a refetch next run.
    async fn store(&self, catalog: &StationCatalog) {
        if let Err(e) = self.try_store(catalog).await {
            tracing::warn!(path = %self.cache_path.display(), "failed to write station cache: {e}");
        }
    }

    async fn try_store(&self, catalog: &StationCatalog) -> std::io::Result<()> {
        if let Some(parent) = self.cache_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec(catalog)?;
        tokio::fs::write(&self.cache_path, json).await
    }
}

#[async_trait]
impl StationSource for CachedStationSource {
    async fn fetch_station_catalog(&self) -> Result<StationCatalog, CatalogError> {
        if tokio::fs::try_exists(&self.cache_path).await.unwrap_or(false) {
            tracing::info!(path = %self.cache_path.display(), "using cached radar stations");
            return self.load().await;
        }

        self.refresh().await
    }
}
