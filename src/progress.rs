use std::sync::Arc;

use anyhow::Context as _;

use crate::model::ProgressMap;
use crate::storage::{KeyValueStore, PROGRESS_STORAGE_KEY};

/// Per-video watched flags, persisted as one JSON object.
#[derive(Clone)]
pub struct ProgressStore {
    storage: Arc<dyn KeyValueStore>,
}

impl ProgressStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Reads the map for display. A stored value that does not parse is
    /// logged and read as empty.
    pub async fn load(&self) -> anyhow::Result<ProgressMap> {
        let saved = self.read_raw().await?;
        let Some(saved) = saved else {
            return Ok(ProgressMap::default());
        };
        match serde_json::from_str(&saved) {
            Ok(progress) => Ok(progress),
            Err(err) => {
                tracing::warn!(%err, "corrupt progress map; starting empty");
                Ok(ProgressMap::default())
            }
        }
    }

    /// Reads the map, flips one flag, and writes the whole map back.
    ///
    /// Fails without writing when the stored map does not parse, so the
    /// other flags are never replaced by a one-entry map.
    pub async fn toggle(&self, youtube_id: &str) -> anyhow::Result<bool> {
        let mut progress = match self.read_raw().await? {
            Some(saved) => serde_json::from_str::<ProgressMap>(&saved)
                .context("parse stored progress map")?,
            None => ProgressMap::default(),
        };
        let watched = progress.toggle(youtube_id);
        let data = serde_json::to_string(&progress).context("serialize progress map")?;
        self.storage
            .set(PROGRESS_STORAGE_KEY, &data)
            .await
            .context("write progress map")?;
        tracing::info!(youtube_id, watched, "toggled watched flag");
        Ok(watched)
    }

    async fn read_raw(&self) -> anyhow::Result<Option<String>> {
        self.storage
            .get(PROGRESS_STORAGE_KEY)
            .await
            .context("read progress map")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;

    #[tokio::test]
    async fn toggle_persists_whole_map() -> anyhow::Result<()> {
        let storage = Arc::new(MemoryKeyValueStore::new());
        let store = ProgressStore::new(storage.clone());

        assert!(store.toggle("v1").await?);
        assert!(store.toggle("v2").await?);
        assert!(!store.toggle("v1").await?);

        let raw = storage.get(PROGRESS_STORAGE_KEY).await?.unwrap_or_default();
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        assert_eq!(value, serde_json::json!({"v1": false, "v2": true}));
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_map_reads_as_empty_but_refuses_toggle() -> anyhow::Result<()> {
        let storage = Arc::new(MemoryKeyValueStore::new());
        storage.set(PROGRESS_STORAGE_KEY, "[1,2").await?;
        let store = ProgressStore::new(storage.clone());

        assert!(store.load().await?.is_empty());
        let err = store.toggle("v1").await.unwrap_err();
        assert!(format!("{err:#}").contains("parse stored progress map"));
        assert_eq!(storage.get(PROGRESS_STORAGE_KEY).await?.as_deref(), Some("[1,2"));
        Ok(())
    }

    #[tokio::test]
    async fn toggle_keeps_existing_flags_when_one_entry_is_malformed() -> anyhow::Result<()> {
        let saved = r#"{"a":true,"b":true,"c":true,"d":1}"#;
        let storage = Arc::new(MemoryKeyValueStore::new());
        storage.set(PROGRESS_STORAGE_KEY, saved).await?;
        let store = ProgressStore::new(storage.clone());

        assert!(store.toggle("e").await.is_err());
        assert_eq!(storage.get(PROGRESS_STORAGE_KEY).await?.as_deref(), Some(saved));
        Ok(())
    }
}
