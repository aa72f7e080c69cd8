pub mod coordinates;
pub mod discovery;
pub mod ingest;
pub mod keywords;
pub mod metadata;

#[cfg(test)]
pub(crate) mod test_support;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{KeywordConfig, ScannerConfig};
use crate::db::MetadataStore;

pub use discovery::WalkEvent;
pub use ingest::{Ingested, Ingestor};
pub use metadata::{ExtractError, ImageMetadata};

#[derive(Debug, Clone)]
pub enum ImportProgress {
    Directory { path: PathBuf },
    Imported { path: PathBuf, image_id: i64, keywords: usize },
    Failed { path: PathBuf, message: String },
}

/// Counts for one run.
#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    pub directories: usize,
    /// Files with an unrecognized extension, never opened
    pub skipped: usize,
    pub imported: usize,
    pub failed: usize,
    pub keywords: usize,
}

impl ImportSummary {
    fn start() -> Self {
        Self {
            started_at: Local::now(),
            finished_at: None,
            directories: 0,
            skipped: 0,
            imported: 0,
            failed: 0,
            keywords: 0,
        }
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} images imported, {} failed, {} other files skipped, {} keywords, {} directories",
            self.imported, self.failed, self.skipped, self.keywords, self.directories
        )?;
        if let Some(finished_at) = self.finished_at {
            let elapsed = finished_at - self.started_at;
            write!(f, " in {:.1}s", elapsed.num_milliseconds() as f64 / 1000.0)?;
        }
        Ok(())
    }
}

pub struct Importer {
    scanner: ScannerConfig,
    keywords: KeywordConfig,
}

impl Importer {
    pub fn new(scanner: ScannerConfig, keywords: KeywordConfig) -> Self {
        Self { scanner, keywords }
    }

    /// Import every image under `root`, one file at a time.
    ///
    /// Extraction failures are reported and skipped; store failures abort
    /// the run and leave the rows already written in place.
    pub fn import_directory(
        &self,
        root: &Path,
        store: &dyn MetadataStore,
        mut progress: impl FnMut(&ImportProgress),
    ) -> Result<ImportSummary> {
        let root = discovery::absolute_root(root)
            .with_context(|| format!("Failed to resolve {}", root.display()))?;
        info!("Importing {}", root.display());
        let ingestor = Ingestor::new(store, self.keywords);
        let mut summary = ImportSummary::start();

        for event in discovery::walk(&root, &self.scanner.image_extensions) {
            match event {
                WalkEvent::Directory(path) => {
                    summary.directories += 1;
                    debug!("Entering {}", path.display());
                    progress(&ImportProgress::Directory { path });
                }
                WalkEvent::Other(_) => {
                    summary.skipped += 1;
                }
                WalkEvent::Error(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                }
                WalkEvent::Image(path) => match metadata::extract_metadata(&path) {
                    Ok(meta) => {
                        let filepath = path.to_string_lossy();
                        let directory = discovery::directory_name(&path);
                        let ingested = ingestor
                            .ingest(&filepath, &directory, &meta)
                            .with_context(|| format!("Failed to import {}", path.display()))?;

                        summary.imported += 1;
                        summary.keywords += ingested.keywords;
                        debug!(image_id = ingested.image_id, "Imported {}", path.display());
                        progress(&ImportProgress::Imported {
                            path,
                            image_id: ingested.image_id,
                            keywords: ingested.keywords,
                        });
                    }
                    Err(e) => {
                        summary.failed += 1;
                        warn!("Error extracting EXIF data from {}: {}", path.display(), e);
                        progress(&ImportProgress::Failed {
                            path,
                            message: e.to_string(),
                        });
                    }
                },
            }
        }

        summary.finished_at = Some(Local::now());
        info!("Import of {} finished: {}", root.display(), summary);
        Ok(summary)
    }
}
