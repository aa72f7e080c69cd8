use exif::{Context, Exif, Field, In, Reader, Tag, Value};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use thiserror::Error;

use super::coordinates::{to_decimal_degrees, CoordinateError};

/// Tag values pulled from one image, every field optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageMetadata {
    // Date/time (DateTimeDigitized and DateTimeOriginal, unparsed)
    pub datetime: Option<String>,
    pub datetime_original: Option<String>,

    // GPS, unsigned decimal degrees plus hemisphere reference
    pub gps_latitude: Option<f64>,
    pub gps_latitude_ref: Option<String>,
    pub gps_longitude: Option<f64>,
    pub gps_longitude_ref: Option<String>,

    // Camera info
    pub make: Option<String>,
    pub model: Option<String>,
    pub lens_model: Option<String>,

    pub image_description: Option<String>,
}

/// Why a file's tags could not be extracted.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("file not found")]
    NotFound,

    #[error("I/O error: {0}")]
    Io(#[source] io::Error),

    #[error("unreadable tag structure: {0}")]
    Decode(#[source] exif::Error),

    #[error("malformed {tag}: {source}")]
    Coordinate {
        tag: Tag,
        #[source]
        source: CoordinateError,
    },
}

impl From<io::Error> for ExtractError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            ExtractError::NotFound
        } else {
            ExtractError::Io(e)
        }
    }
}

/// One decoded tag, as printed by `exifscan tags`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    pub group: &'static str,
    pub name: String,
    pub value: String,
}

/// Extract the fixed set of tags the importer stores.
///
/// A readable file without an EXIF segment (or a GIF/BMP, which have none)
/// yields a record with every field unset.
pub fn extract_metadata(path: &Path) -> Result<ImageMetadata, ExtractError> {
    let Some(exif) = read_exif(path)? else {
        return Ok(ImageMetadata::default());
    };

    let (gps_latitude, gps_latitude_ref) =
        coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef)?;
    let (gps_longitude, gps_longitude_ref) =
        coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef)?;

    Ok(ImageMetadata {
        datetime: text_field(&exif, Tag::DateTimeDigitized),
        datetime_original: text_field(&exif, Tag::DateTimeOriginal),
        gps_latitude,
        gps_latitude_ref,
        gps_longitude,
        gps_longitude_ref,
        make: text_field(&exif, Tag::Make),
        model: text_field(&exif, Tag::Model),
        lens_model: text_field(&exif, Tag::LensModel),
        image_description: text_field(&exif, Tag::ImageDescription),
    })
}

/// Decode every tag in the file, in file order.
pub fn dump_tags(path: &Path) -> Result<Vec<TagEntry>, ExtractError> {
    let Some(exif) = read_exif(path)? else {
        return Ok(Vec::new());
    };

    let entries = exif
        .fields()
        .map(|field| TagEntry {
            group: tag_group(field),
            name: field.tag.to_string(),
            value: field.display_value().with_unit(&exif).to_string(),
        })
        .collect();

    Ok(entries)
}

fn read_exif(path: &Path) -> Result<Option<Exif>, ExtractError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => Ok(Some(exif)),
        Err(exif::Error::NotFound(_)) => Ok(None),
        Err(exif::Error::Io(e)) => Err(e.into()),
        Err(e) => {
            if has_tagless_signature(&mut reader)? {
                Ok(None)
            } else {
                Err(ExtractError::Decode(e))
            }
        }
    }
}

/// GIF and BMP files carry no EXIF container the decoder understands.
fn has_tagless_signature<R: Read + Seek>(reader: &mut R) -> io::Result<bool> {
    reader.seek(SeekFrom::Start(0))?;
    let mut magic = Vec::with_capacity(6);
    reader.by_ref().take(6).read_to_end(&mut magic)?;

    Ok(magic.starts_with(b"GIF87a") || magic.starts_with(b"GIF89a") || magic.starts_with(b"BM"))
}

fn text_field(exif: &Exif, tag: Tag) -> Option<String> {
    exif.get_field(tag, In::PRIMARY).map(field_text)
}

fn field_text(field: &Field) -> String {
    let text = match field.value {
        Value::Ascii(ref parts) => parts
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default(),
        _ => field.display_value().to_string(),
    };
    text.trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_string()
}

/// Decimal value and reference for one axis. The reference is only read
/// when the value tag exists.
fn coordinate(
    exif: &Exif,
    value_tag: Tag,
    ref_tag: Tag,
) -> Result<(Option<f64>, Option<String>), ExtractError> {
    let Some(field) = exif.get_field(value_tag, In::PRIMARY) else {
        return Ok((None, None));
    };

    let degrees = match field.value {
        Value::Rational(ref dms) => to_decimal_degrees(dms),
        _ => Err(CoordinateError::NotRational),
    }
    .map_err(|source| ExtractError::Coordinate {
        tag: value_tag,
        source,
    })?;

    Ok((Some(degrees), text_field(exif, ref_tag)))
}

#[allow(unreachable_patterns)]
fn tag_group(field: &Field) -> &'static str {
    if field.ifd_num == In::THUMBNAIL {
        return "Thumbnail";
    }
    match field.tag.context() {
        Context::Tiff => "Image",
        Context::Exif => "EXIF",
        Context::Gps => "GPS",
        Context::Interop => "Interoperability",
        _ => "Other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::test_support::{ascii, rational, tiff_bytes, write_jpeg};
    use tempfile::tempdir;

    #[test]
    fn test_extract_all_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        write_jpeg(
            &path,
            &[
                ascii(Tag::Make, "Canon"),
                ascii(Tag::Model, "Canon EOS R6  "),
                ascii(Tag::ImageDescription, "Sunset over the lake"),
                ascii(Tag::DateTimeOriginal, "2021:06:05 20:14:33"),
                ascii(Tag::DateTimeDigitized, "2021:06:05 20:14:34"),
                ascii(Tag::LensModel, "RF24-105mm F4 L IS USM"),
                ascii(Tag::GPSLatitudeRef, "N"),
                rational(Tag::GPSLatitude, &[(40, 1), (26, 1), (46, 1)]),
                ascii(Tag::GPSLongitudeRef, "W"),
                rational(Tag::GPSLongitude, &[(79, 1), (58, 1), (56, 1)]),
            ],
        );

        let meta = extract_metadata(&path).unwrap();
        assert_eq!(meta.make.as_deref(), Some("Canon"));
        assert_eq!(meta.model.as_deref(), Some("Canon EOS R6"));
        assert_eq!(meta.image_description.as_deref(), Some("Sunset over the lake"));
        assert_eq!(meta.datetime_original.as_deref(), Some("2021:06:05 20:14:33"));
        assert_eq!(meta.datetime.as_deref(), Some("2021:06:05 20:14:34"));
        assert_eq!(meta.lens_model.as_deref(), Some("RF24-105mm F4 L IS USM"));
        assert_eq!(meta.gps_latitude_ref.as_deref(), Some("N"));
        assert_eq!(meta.gps_longitude_ref.as_deref(), Some("W"));
        assert!((meta.gps_latitude.unwrap() - 40.446_111_111).abs() < 1e-9);
        // Western hemisphere stays positive, the ref carries the sign
        assert!((meta.gps_longitude.unwrap() - 79.982_222_222).abs() < 1e-9);
    }

    #[test]
    fn test_absent_tags_stay_unset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        write_jpeg(&path, &[ascii(Tag::Make, "Nikon")]);

        let meta = extract_metadata(&path).unwrap();
        assert_eq!(meta.make.as_deref(), Some("Nikon"));
        assert_eq!(meta.model, None);
        assert_eq!(meta.image_description, None);
        assert_eq!(meta.gps_latitude, None);
        assert_eq!(meta.gps_latitude_ref, None);
    }

    #[test]
    fn test_latitude_without_ref() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        write_jpeg(
            &path,
            &[rational(Tag::GPSLatitude, &[(10, 1), (30, 1), (0, 1)])],
        );

        let meta = extract_metadata(&path).unwrap();
        assert!((meta.gps_latitude.unwrap() - 10.5).abs() < 1e-12);
        assert_eq!(meta.gps_latitude_ref, None);
        assert_eq!(meta.gps_longitude, None);
    }

    #[test]
    fn test_ref_without_value_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        write_jpeg(&path, &[ascii(Tag::GPSLongitudeRef, "E")]);

        let meta = extract_metadata(&path).unwrap();
        assert_eq!(meta.gps_longitude, None);
        assert_eq!(meta.gps_longitude_ref, None);
    }

    #[test]
    fn test_zero_denominator_fails_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        write_jpeg(
            &path,
            &[
                ascii(Tag::Make, "Canon"),
                rational(Tag::GPSLatitude, &[(40, 1), (26, 0), (46, 1)]),
            ],
        );

        let err = extract_metadata(&path).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::Coordinate {
                tag,
                source: CoordinateError::ZeroDenominator { index: 1 },
            } if tag == Tag::GPSLatitude
        ));
    }

    #[test]
    fn test_bare_tiff() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.tiff");
        std::fs::write(&path, tiff_bytes(&[ascii(Tag::Model, "Scanner")])).unwrap();

        let meta = extract_metadata(&path).unwrap();
        assert_eq!(meta.model.as_deref(), Some("Scanner"));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"this is not an image at all").unwrap();

        let err = extract_metadata(&path).unwrap_err();
        assert!(matches!(err, ExtractError::Decode(_)));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = extract_metadata(&dir.path().join("gone.jpg")).unwrap_err();
        assert!(matches!(err, ExtractError::NotFound));
    }

    #[test]
    fn test_gif_has_no_tags() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        std::fs::write(&path, b"GIF89a\x01\x00\x01\x00\x00\x00\x00;").unwrap();

        assert_eq!(extract_metadata(&path).unwrap(), ImageMetadata::default());
    }

    #[test]
    fn test_dump_tags() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        write_jpeg(
            &path,
            &[
                ascii(Tag::Make, "Canon"),
                ascii(Tag::DateTimeOriginal, "2021:06:05 20:14:33"),
                rational(Tag::GPSLatitude, &[(40, 1), (26, 1), (46, 1)]),
            ],
        );

        let entries = dump_tags(&path).unwrap();
        let make = entries.iter().find(|e| e.name == "Make").unwrap();
        assert_eq!(make.group, "Image");
        assert!(make.value.contains("Canon"));
        assert!(entries
            .iter()
            .any(|e| e.group == "EXIF" && e.name == "DateTimeOriginal"));
        assert!(entries
            .iter()
            .any(|e| e.group == "GPS" && e.name == "GPSLatitude"));
    }
}
