pub const POSTGRES_SCHEMA: &str = r#"
-- PostgreSQL schema for exifscan

CREATE TABLE IF NOT EXISTS exif_metadata (
    id SERIAL PRIMARY KEY,
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

CREATE TABLE IF NOT EXISTS keywords (
    id SERIAL PRIMARY KEY,
    keyword TEXT,
    image_id INTEGER REFERENCES exif_metadata(id)
);
"#;
