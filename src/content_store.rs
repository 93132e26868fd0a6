use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use url::Url;

use crate::model::Document;
use crate::storage::{DATA_STORAGE_KEY, KeyValueStore};

/// Read-only seed data used when no persisted document is usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackSource {
    File(PathBuf),
    Http(Url),
}

impl FallbackSource {
    /// `http(s)://` values become URLs, anything else is a local path.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            anyhow::bail!("fallback source is empty");
        }
        if raw.starts_with("http://") || raw.starts_with("https://") {
            let url = Url::parse(raw).with_context(|| format!("parse fallback url: {raw}"))?;
            return Ok(Self::Http(url));
        }
        Ok(Self::File(PathBuf::from(raw)))
    }

    pub fn local_path(&self) -> Option<&PathBuf> {
        match self {
            Self::File(path) => Some(path),
            Self::Http(_) => None,
        }
    }
}

impl std::fmt::Display for FallbackSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Http(url) => write!(f, "{url}"),
        }
    }
}

#[derive(Clone)]
pub struct ContentStore {
    storage: Arc<dyn KeyValueStore>,
    fallback: FallbackSource,
    client: reqwest::Client,
}

impl ContentStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, fallback: FallbackSource) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("build fallback http client")?;
        Ok(Self {
            storage,
            fallback,
            client,
        })
    }

    pub fn fallback(&self) -> &FallbackSource {
        &self.fallback
    }

    /// Returns the persisted document, or the fallback resource when nothing
    /// is persisted or the persisted copy does not parse.
    pub async fn load(&self) -> anyhow::Result<Document> {
        let saved = self
            .storage
            .get(DATA_STORAGE_KEY)
            .await
            .context("read persisted document")?;
        if let Some(saved) = saved {
            match serde_json::from_str::<Document>(&saved) {
                Ok(doc) => {
                    tracing::debug!(subjects = doc.subjects.len(), "loaded persisted document");
                    return Ok(doc);
                }
                Err(err) => {
                    tracing::warn!(%err, fallback = %self.fallback, "corrupt persisted document; falling back");
                }
            }
        }

        self.load_fallback().await
    }

    pub async fn load_fallback(&self) -> anyhow::Result<Document> {
        let body = match &self.fallback {
            FallbackSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("read fallback: {}", path.display()))?,
            FallbackSource::Http(url) => self.fetch_text(url).await?,
        };
        let doc: Document = serde_json::from_str(&body)
            .with_context(|| format!("parse fallback document: {}", self.fallback))?;
        tracing::debug!(subjects = doc.subjects.len(), fallback = %self.fallback, "loaded fallback document");
        Ok(doc)
    }

    /// Overwrites the whole persisted document.
    pub async fn persist(&self, doc: &Document) -> anyhow::Result<()> {
        let data = serde_json::to_string(doc).context("serialize document")?;
        self.storage
            .set(DATA_STORAGE_KEY, &data)
            .await
            .context("write persisted document")?;
        tracing::debug!(subjects = doc.subjects.len(), "persisted document");
        Ok(())
    }

    async fn fetch_text(&self, url: &Url) -> anyhow::Result<String> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        if !resp.status().is_success() {
            anyhow::bail!("GET {url} failed ({})", resp.status());
        }
        resp.text()
            .await
            .with_context(|| format!("read response body: {url}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Subject;
    use crate::storage::MemoryKeyValueStore;

    const SEED: &str = r#"{"subjects":[{"id":"maths","name":"Maths","description":"Numbers","chapters":[]}]}"#;

    fn store_with_seed(dir: &tempfile::TempDir) -> anyhow::Result<(ContentStore, Arc<MemoryKeyValueStore>)> {
        let seed = dir.path().join("data.json");
        std::fs::write(&seed, SEED)?;
        let storage = Arc::new(MemoryKeyValueStore::new());
        let store = ContentStore::new(storage.clone(), FallbackSource::File(seed))?;
        Ok((store, storage))
    }

    #[test]
    fn fallback_source_parses_urls_and_paths() -> anyhow::Result<()> {
        assert!(matches!(
            FallbackSource::parse("https://example.com/data.json")?,
            FallbackSource::Http(_)
        ));
        assert_eq!(
            FallbackSource::parse(" data.json ")?,
            FallbackSource::File(PathBuf::from("data.json"))
        );
        assert!(FallbackSource::parse("  ").is_err());
        Ok(())
    }

    #[tokio::test]
    async fn load_uses_fallback_when_nothing_is_persisted() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let (store, _) = store_with_seed(&temp)?;
        let doc = store.load().await?;
        assert_eq!(doc.subjects.len(), 1);
        assert_eq!(doc.subjects[0].id, "maths");
        Ok(())
    }

    #[tokio::test]
    async fn load_prefers_persisted_document() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let (store, _) = store_with_seed(&temp)?;

        let mut doc = Document::default();
        doc.subjects.push(Subject {
            id: "science".to_owned(),
            name: "Science".to_owned(),
            ..Subject::default()
        });
        store.persist(&doc).await?;

        assert_eq!(store.load().await?, doc);
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_persisted_document_falls_back() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let (store, storage) = store_with_seed(&temp)?;
        storage.set(DATA_STORAGE_KEY, "{not json").await?;

        let doc = store.load().await?;
        assert_eq!(doc.subjects[0].id, "maths");
        // The corrupt value is left in place until the next persist.
        assert_eq!(
            storage.get(DATA_STORAGE_KEY).await?.as_deref(),
            Some("{not json")
        );
        Ok(())
    }

    #[tokio::test]
    async fn missing_fallback_file_is_an_error() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let storage = Arc::new(MemoryKeyValueStore::new());
        let store = ContentStore::new(
            storage,
            FallbackSource::File(temp.path().join("missing.json")),
        )?;
        let err = store.load().await.unwrap_err();
        assert!(format!("{err:#}").contains("read fallback"));
        Ok(())
    }
}
