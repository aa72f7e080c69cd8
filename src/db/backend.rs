//! Store abstraction shared by the SQLite and PostgreSQL backends.
//!
//! Every write is its own committed unit: there is no multi-row transaction,
//! so an interrupted run leaves whatever rows were already written.

use anyhow::Result;

use super::{ImageRow, NewImage};

/// Trait for database backend implementations.
pub trait MetadataStore {
    /// Create both tables if they do not exist yet
    fn initialize(&self) -> Result<()>;

    /// Insert one `exif_metadata` row and return its generated id
    fn insert_image(&self, image: &NewImage<'_>) -> Result<i64>;

    /// Insert one `keywords` row linked to `image_id`
    fn insert_keyword(&self, image_id: i64, keyword: &str) -> Result<()>;

    fn count_images(&self) -> Result<usize>;

    fn count_keywords(&self) -> Result<usize>;

    fn get_image(&self, image_id: i64) -> Result<Option<ImageRow>>;

    /// Keywords of one image, in insertion order
    fn keywords_for_image(&self, image_id: i64) -> Result<Vec<String>>;

    /// Images carrying `keyword`, ordered by id
    fn find_images_by_keyword(&self, keyword: &str) -> Result<Vec<ImageRow>>;
}
