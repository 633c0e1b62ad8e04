use std::sync::Arc;

use thiserror::Error;

use crate::{
    catalog::{Catalog, CatalogError, normalize::stream_variants},
    models::StreamVariant,
};

#[derive(Debug, Error)]
#[error("streaming info not available for episode {episode_id}: {source}")]
pub struct StreamFetchFailed {
    pub episode_id: String,
    #[source]
    pub source: CatalogError,
}

/// Fetches the sub/dub variants of one episode. Single call, never retried.
#[derive(Debug)]
pub struct StreamResolver<C> {
    catalog: Arc<C>,
}

impl<C> Clone for StreamResolver<C> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
        }
    }
}

impl<C: Catalog> StreamResolver<C> {
    pub fn new(catalog: Arc<C>) -> Self {
        Self { catalog }
    }

    pub async fn fetch_variants(
        &self,
        episode_id: &str,
    ) -> Result<Vec<StreamVariant>, StreamFetchFailed> {
        match self.catalog.fetch_stream_variants(episode_id).await {
            Ok(entries) => {
                let variants = stream_variants(entries);
                tracing::debug!(
                    "Episode {episode_id} has {} playable variant(s)",
                    variants.len()
                );
                Ok(variants)
            }
            Err(source) => {
                tracing::warn!("Stream lookup failed for episode {episode_id}: {source:#}");
                Err(StreamFetchFailed {
                    episode_id: episode_id.to_string(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::catalog::fake::{Call, FakeCatalog, variant_entry};
    use crate::models::VariantKind;

    #[tokio::test]
    async fn variants_are_normalized_in_catalog_order() {
        let fake = Arc::new(FakeCatalog::new().with_streams(
            "ep-1",
            Duration::ZERO,
            Ok(vec![
                variant_entry("dub", "https://cdn/dub.m3u8", &[]),
                variant_entry("sub", "https://cdn/sub.m3u8", &["https://cdn/en.vtt"]),
            ]),
        ));
        let streams = StreamResolver::new(Arc::clone(&fake));

        let variants = streams.fetch_variants("ep-1").await.unwrap();

        let kinds: Vec<_> = variants.iter().map(|v| v.kind).collect();
        assert_eq!(kinds, [VariantKind::Dub, VariantKind::Sub]);
        assert!(variants[1].has_caption_track("https://cdn/en.vtt"));
    }

    #[tokio::test]
    async fn failure_is_reported_once_without_retry() {
        let fake = Arc::new(FakeCatalog::new().with_streams("ep-1", Duration::ZERO, Err(500)));
        let streams = StreamResolver::new(Arc::clone(&fake));

        let err = streams.fetch_variants("ep-1").await.unwrap_err();

        assert_eq!(err.episode_id, "ep-1");
        assert!(err.to_string().starts_with("streaming info not available"));
        assert_eq!(fake.calls(), [Call::Streams("ep-1".into())]);
    }
}
