//! SQLite backend implementation.

use anyhow::Result;
use rusqlite::{Connection, Row};
use std::path::Path;

use super::backend::MetadataStore;
use super::schema::SCHEMA;
use super::{ImageRow, NewImage};

const IMAGE_COLUMNS: &str = "id, filepath, directory, datetime, datetime_original, \
     gps_latitude, gps_latitude_ref, gps_longitude, gps_longitude_ref, \
     make, model, lens_model, image_description";

pub struct SqliteDb {
    pub(crate) conn: Connection,
}

impl SqliteDb {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn })
    }
}

fn row_to_image(row: &Row) -> rusqlite::Result<ImageRow> {
    Ok(ImageRow {
        id: row.get(0)?,
        filepath: row.get(1)?,
        directory: row.get(2)?,
        datetime: row.get(3)?,
        datetime_original: row.get(4)?,
        gps_latitude: row.get(5)?,
        gps_latitude_ref: row.get(6)?,
        gps_longitude: row.get(7)?,
        gps_longitude_ref: row.get(8)?,
        make: row.get(9)?,
        model: row.get(10)?,
        lens_model: row.get(11)?,
        image_description: row.get(12)?,
    })
}

impl MetadataStore for SqliteDb {
    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn insert_image(&self, image: &NewImage<'_>) -> Result<i64> {
        let meta = image.metadata;
        self.conn.execute(
            r#"
            INSERT INTO exif_metadata (
                filepath, directory, datetime, datetime_original,
                gps_latitude, gps_latitude_ref, gps_longitude, gps_longitude_ref,
                make, model, lens_model, image_description
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            rusqlite::params![
                image.filepath,
                image.directory,
                meta.datetime,
                meta.datetime_original,
                meta.gps_latitude,
                meta.gps_latitude_ref,
                meta.gps_longitude,
                meta.gps_longitude_ref,
                meta.make,
                meta.model,
                meta.lens_model,
                meta.image_description,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_keyword(&self, image_id: i64, keyword: &str) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare_cached("INSERT INTO keywords (keyword, image_id) VALUES (?, ?)")?;
        stmt.execute(rusqlite::params![keyword, image_id])?;
        Ok(())
    }

    fn count_images(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM exif_metadata", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn count_keywords(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM keywords", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn get_image(&self, image_id: i64) -> Result<Option<ImageRow>> {
        let result = self.conn.query_row(
            &format!("SELECT {IMAGE_COLUMNS} FROM exif_metadata WHERE id = ?"),
            [image_id],
            row_to_image,
        );
        match result {
            Ok(image) => Ok(Some(image)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn keywords_for_image(&self, image_id: i64) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT keyword FROM keywords WHERE image_id = ? ORDER BY id")?;
        let keywords = stmt
            .query_map([image_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(keywords)
    }

    fn find_images_by_keyword(&self, keyword: &str) -> Result<Vec<ImageRow>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {IMAGE_COLUMNS}
            FROM exif_metadata
            WHERE id IN (SELECT image_id FROM keywords WHERE keyword = ?)
            ORDER BY id
            "#
        ))?;
        let images = stmt
            .query_map([keyword], row_to_image)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::ImageMetadata;

    fn db() -> SqliteDb {
        let db = SqliteDb::open_in_memory().unwrap();
        db.initialize().unwrap();
        db
    }

    #[test]
    fn test_initialize_is_repeatable() {
        let db = db();
        db.initialize().unwrap();
        assert_eq!(db.count_images().unwrap(), 0);
        assert_eq!(db.count_keywords().unwrap(), 0);
    }

    #[test]
    fn test_insert_and_read_back() {
        let db = db();
        let meta = ImageMetadata {
            datetime_original: Some("2021:06:05 20:14:33".to_string()),
            gps_latitude: Some(40.5),
            gps_latitude_ref: Some("N".to_string()),
            make: Some("Canon".to_string()),
            ..Default::default()
        };

        let first = db
            .insert_image(&NewImage {
                filepath: "/photos/lake/a.jpg",
                directory: "lake",
                metadata: &meta,
            })
            .unwrap();
        let second = db
            .insert_image(&NewImage {
                filepath: "/photos/lake/b.jpg",
                directory: "lake",
                metadata: &ImageMetadata::default(),
            })
            .unwrap();
        assert!(second > first);

        let row = db.get_image(first).unwrap().unwrap();
        assert_eq!(row.filepath.as_deref(), Some("/photos/lake/a.jpg"));
        assert_eq!(row.directory.as_deref(), Some("lake"));
        assert_eq!(row.datetime, None);
        assert_eq!(row.datetime_original.as_deref(), Some("2021:06:05 20:14:33"));
        assert_eq!(row.gps_latitude, Some(40.5));
        assert_eq!(row.gps_latitude_ref.as_deref(), Some("N"));
        assert_eq!(row.gps_longitude, None);
        assert_eq!(row.make.as_deref(), Some("Canon"));

        assert!(db.get_image(second + 100).unwrap().is_none());
    }

    #[test]
    fn test_whole_degree_reads_back_as_float() {
        // NUMERIC affinity stores 12.0 as an integer
        let db = db();
        let meta = ImageMetadata {
            gps_longitude: Some(12.0),
            gps_longitude_ref: Some("E".to_string()),
            ..Default::default()
        };
        let id = db
            .insert_image(&NewImage {
                filepath: "/x.jpg",
                directory: "",
                metadata: &meta,
            })
            .unwrap();
        assert_eq!(db.get_image(id).unwrap().unwrap().gps_longitude, Some(12.0));
    }

    #[test]
    fn test_keywords() {
        let db = db();
        let meta = ImageMetadata::default();
        let a = db
            .insert_image(&NewImage { filepath: "/p/a.jpg", directory: "p", metadata: &meta })
            .unwrap();
        let b = db
            .insert_image(&NewImage { filepath: "/p/b.jpg", directory: "p", metadata: &meta })
            .unwrap();

        db.insert_keyword(a, "lake").unwrap();
        db.insert_keyword(a, "sunset").unwrap();
        db.insert_keyword(b, "lake").unwrap();

        assert_eq!(db.count_keywords().unwrap(), 3);
        assert_eq!(db.keywords_for_image(a).unwrap(), vec!["lake", "sunset"]);

        let found: Vec<i64> = db
            .find_images_by_keyword("lake")
            .unwrap()
            .iter()
            .map(|row| row.id)
            .collect();
        assert_eq!(found, vec![a, b]);
        assert!(db.find_images_by_keyword("mountain").unwrap().is_empty());
    }

    #[test]
    fn test_keyword_requires_existing_image() {
        let db = db();
        assert!(db.insert_keyword(42, "orphan").is_err());
    }
}
