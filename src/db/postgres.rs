//! PostgreSQL backend implementation.
//!
//! Holds a single client for the whole run; there is no pool and no
//! reconnect.

use anyhow::Result;
use postgres::{Client, NoTls, Row};
use std::cell::RefCell;

use super::backend::MetadataStore;
use super::postgres_schema::POSTGRES_SCHEMA;
use super::{ImageRow, NewImage};

// NUMERIC columns are read through float8 so they map onto f64
const IMAGE_COLUMNS: &str = "id, filepath, directory, datetime, datetime_original, \
     gps_latitude::float8, gps_latitude_ref, gps_longitude::float8, gps_longitude_ref, \
     make, model, lens_model, image_description";

pub struct PgDb {
    client: RefCell<Client>,
}

impl PgDb {
    pub fn open(url: &str) -> Result<Self> {
        let client = Client::connect(url, NoTls)?;
        Ok(Self {
            client: RefCell::new(client),
        })
    }
}

fn row_to_image(row: &Row) -> ImageRow {
    let id: i32 = row.get(0);
    ImageRow {
        id: id as i64,
        filepath: row.get(1),
        directory: row.get(2),
        datetime: row.get(3),
        datetime_original: row.get(4),
        gps_latitude: row.get(5),
        gps_latitude_ref: row.get(6),
        gps_longitude: row.get(7),
        gps_longitude_ref: row.get(8),
        make: row.get(9),
        model: row.get(10),
        lens_model: row.get(11),
        image_description: row.get(12),
    }
}

impl MetadataStore for PgDb {
    fn initialize(&self) -> Result<()> {
        self.client.borrow_mut().batch_execute(POSTGRES_SCHEMA)?;
        Ok(())
    }

    fn insert_image(&self, image: &NewImage<'_>) -> Result<i64> {
        let meta = image.metadata;
        let row = self.client.borrow_mut().query_one(
            r#"
            INSERT INTO exif_metadata (
                filepath, directory, datetime, datetime_original,
                gps_latitude, gps_latitude_ref, gps_longitude, gps_longitude_ref,
                make, model, lens_model, image_description
            ) VALUES ($1, $2, $3, $4, $5::float8, $6, $7::float8, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
            &[
                &image.filepath,
                &image.directory,
                &meta.datetime,
                &meta.datetime_original,
                &meta.gps_latitude,
                &meta.gps_latitude_ref,
                &meta.gps_longitude,
                &meta.gps_longitude_ref,
                &meta.make,
                &meta.model,
                &meta.lens_model,
                &meta.image_description,
            ],
        )?;
        let id: i32 = row.get(0);
        Ok(id as i64)
    }

    fn insert_keyword(&self, image_id: i64, keyword: &str) -> Result<()> {
        let image_id = i32::try_from(image_id)?;
        self.client.borrow_mut().execute(
            "INSERT INTO keywords (keyword, image_id) VALUES ($1, $2)",
            &[&keyword, &image_id],
        )?;
        Ok(())
    }

    fn count_images(&self) -> Result<usize> {
        let row = self
            .client
            .borrow_mut()
            .query_one("SELECT COUNT(*) FROM exif_metadata", &[])?;
        let count: i64 = row.get(0);
        Ok(count as usize)
    }

    fn count_keywords(&self) -> Result<usize> {
        let row = self
            .client
            .borrow_mut()
            .query_one("SELECT COUNT(*) FROM keywords", &[])?;
        let count: i64 = row.get(0);
        Ok(count as usize)
    }

    fn get_image(&self, image_id: i64) -> Result<Option<ImageRow>> {
        let image_id = i32::try_from(image_id)?;
        let sql = format!("SELECT {IMAGE_COLUMNS} FROM exif_metadata WHERE id = $1");
        let row = self.client.borrow_mut().query_opt(sql.as_str(), &[&image_id])?;
        Ok(row.as_ref().map(row_to_image))
    }

    fn keywords_for_image(&self, image_id: i64) -> Result<Vec<String>> {
        let image_id = i32::try_from(image_id)?;
        let rows = self.client.borrow_mut().query(
            "SELECT keyword FROM keywords WHERE image_id = $1 ORDER BY id",
            &[&image_id],
        )?;
        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    fn find_images_by_keyword(&self, keyword: &str) -> Result<Vec<ImageRow>> {
        let sql = format!(
            r#"
            SELECT {IMAGE_COLUMNS}
            FROM exif_metadata
            WHERE id IN (SELECT image_id FROM keywords WHERE keyword = $1)
            ORDER BY id
            "#
        );
        let rows = self.client.borrow_mut().query(sql.as_str(), &[&keyword])?;
        Ok(rows.iter().map(row_to_image).collect())
    }
}
