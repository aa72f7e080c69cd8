mod schema;
pub mod backend;
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "postgres")]
pub mod postgres_schema;

use anyhow::Result;

pub use backend::MetadataStore;
pub use schema::SCHEMA;

use crate::config::{DatabaseConfig, DatabaseType};
use crate::scanner::ImageMetadata;

/// An `exif_metadata` row about to be inserted.
#[derive(Debug, Clone, Copy)]
pub struct NewImage<'a> {
    pub filepath: &'a str,
    pub directory: &'a str,
    pub metadata: &'a ImageMetadata,
}

/// An `exif_metadata` row as stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageRow {
    pub id: i64,
    pub filepath: Option<String>,
    pub directory: Option<String>,
    pub datetime: Option<String>,
    pub datetime_original: Option<String>,
    pub gps_latitude: Option<f64>,
    pub gps_latitude_ref: Option<String>,
    pub gps_longitude: Option<f64>,
    pub gps_longitude_ref: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub lens_model: Option<String>,
    pub image_description: Option<String>,
}

/// Macro to dispatch a method call to the active backend variant.
macro_rules! dispatch {
    // No arguments beyond self
    ($self:expr, $method:ident()) => {
        match &$self.inner {
            DatabaseInner::Sqlite(db) => db.$method(),
            #[cfg(feature = "postgres")]
            DatabaseInner::Postgres(db) => db.$method(),
        }
    };
    // With arguments
    ($self:expr, $method:ident($($arg:expr),+ $(,)?)) => {
        match &$self.inner {
            DatabaseInner::Sqlite(db) => db.$method($($arg),+),
            #[cfg(feature = "postgres")]
            DatabaseInner::Postgres(db) => db.$method($($arg),+),
        }
    };
}

enum DatabaseInner {
    Sqlite(sqlite::SqliteDb),
    #[cfg(feature = "postgres")]
    Postgres(postgres::PgDb),
}

/// The one store connection a run holds; dropped (and closed) at shutdown.
pub struct Database {
    inner: DatabaseInner,
}

impl Database {
    /// Open a database connection based on the provided configuration.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        match config.backend {
            DatabaseType::Sqlite => {
                let db = sqlite::SqliteDb::open(&config.sqlite_path)?;
                Ok(Self {
                    inner: DatabaseInner::Sqlite(db),
                })
            }
            #[cfg(feature = "postgres")]
            DatabaseType::Postgresql => {
                let url = config
                    .postgresql_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("PostgreSQL URL not configured"))?;
                let pg = postgres::PgDb::open(url)?;
                Ok(Self {
                    inner: DatabaseInner::Postgres(pg),
                })
            }
            #[cfg(not(feature = "postgres"))]
            DatabaseType::Postgresql => {
                anyhow::bail!(
                    "PostgreSQL support not compiled in (rebuild with --features postgres)"
                )
            }
        }
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = sqlite::SqliteDb::open_in_memory()?;
        Ok(Self {
            inner: DatabaseInner::Sqlite(db),
        })
    }
}

impl MetadataStore for Database {
    fn initialize(&self) -> Result<()> {
        dispatch!(self, initialize())
    }

    fn insert_image(&self, image: &NewImage<'_>) -> Result<i64> {
        dispatch!(self, insert_image(image))
    }

    fn insert_keyword(&self, image_id: i64, keyword: &str) -> Result<()> {
        dispatch!(self, insert_keyword(image_id, keyword))
    }

    fn count_images(&self) -> Result<usize> {
        dispatch!(self, count_images())
    }

    fn count_keywords(&self) -> Result<usize> {
        dispatch!(self, count_keywords())
    }

    fn get_image(&self, image_id: i64) -> Result<Option<ImageRow>> {
        dispatch!(self, get_image(image_id))
    }

    fn keywords_for_image(&self, image_id: i64) -> Result<Vec<String>> {
        dispatch!(self, keywords_for_image(image_id))
    }

    fn find_images_by_keyword(&self, keyword: &str) -> Result<Vec<ImageRow>> {
        dispatch!(self, find_images_by_keyword(keyword))
    }
}
