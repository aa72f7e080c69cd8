use anyhow::Result;
use std::collections::BTreeSet;

use super::keywords::derive_keywords;
use super::metadata::ImageMetadata;
use crate::config::KeywordConfig;
use crate::db::{MetadataStore, NewImage};

/// What one `ingest` call wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ingested {
    pub image_id: i64,
    pub keywords: usize,
}

/// Writes one image row and its keyword rows.
pub struct Ingestor<'a> {
    store: &'a dyn MetadataStore,
    keywords: KeywordConfig,
}

impl<'a> Ingestor<'a> {
    pub fn new(store: &'a dyn MetadataStore, keywords: KeywordConfig) -> Self {
        Self { store, keywords }
    }

    /// Insert the metadata row, then keywords from the description (when
    /// non-empty) and from `directory`.
    ///
    /// Unless `merge_sources` is set the two token sets are inserted
    /// independently, so a token found in both lands twice.
    pub fn ingest(
        &self,
        filepath: &str,
        directory: &str,
        metadata: &ImageMetadata,
    ) -> Result<Ingested> {
        let image_id = self.store.insert_image(&NewImage {
            filepath,
            directory,
            metadata,
        })?;

        let split = self.keywords.split;
        let description = metadata
            .image_description
            .as_deref()
            .filter(|d| !d.is_empty());

        let mut inserted = 0;
        if self.keywords.merge_sources {
            let mut tokens = description
                .map(|d| derive_keywords(d, split))
                .unwrap_or_default();
            tokens.extend(derive_keywords(directory, split));
            inserted += self.insert_keywords(image_id, &tokens)?;
        } else {
            if let Some(description) = description {
                inserted += self.insert_keywords(image_id, &derive_keywords(description, split))?;
            }
            inserted += self.insert_keywords(image_id, &derive_keywords(directory, split))?;
        }

        Ok(Ingested {
            image_id,
            keywords: inserted,
        })
    }

    fn insert_keywords(&self, image_id: i64, keywords: &BTreeSet<String>) -> Result<usize> {
        for keyword in keywords {
            self.store.insert_keyword(image_id, keyword)?;
        }
        Ok(keywords.len())
    }
}
