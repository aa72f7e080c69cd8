pub const SCHEMA: &str = r#"
-- One row per imported image
CREATE TABLE IF NOT EXISTS exif_metadata (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filepath TEXT,
    directory TEXT,
    datetime TEXT,
    datetime_original TEXT,
    gps_latitude NUMERIC,
    gps_latitude_ref TEXT,
    gps_longitude NUMERIC,
    gps_longitude_ref TEXT,
    make TEXT,
    model TEXT,
    lens_model TEXT,
    image_description TEXT
);

-- Tokens from the description and directory name of each image
CREATE TABLE IF NOT EXISTS keywords (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    keyword TEXT,
    image_id INTEGER REFERENCES exif_metadata(id)
);
"#;
