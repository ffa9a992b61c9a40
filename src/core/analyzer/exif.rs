//! EXIF extraction via kamadak-exif.
//!
//! Only the primary image IFD is read; thumbnail tags are ignored.

use crate::error::AnalyzeError;
use chrono::{NaiveDate, NaiveDateTime};
use exif::{Field, In, Reader, Tag, Value};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Date tags in order of preference
const DATE_TAGS: [Tag; 3] = [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime];

const DATETIME_FORMATS: [&str; 2] = ["%Y:%m:%d %H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: [&str; 2] = ["%Y:%m:%d", "%Y-%m-%d"];

/// What a photo's EXIF block says
#[derive(Debug, Clone, Default)]
pub struct ExifSummary {
    /// Tag name to display value
    pub fields: BTreeMap<String, String>,
    /// First parseable date tag
    pub date_taken: Option<NaiveDateTime>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
}

/// Read the EXIF block of a photo
pub fn read_exif(path: &Path) -> Result<ExifSummary, AnalyzeError> {
    let file = File::open(path).map_err(|source| AnalyzeError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut bufreader = BufReader::new(&file);
    let exif = Reader::new()
        .read_from_container(&mut bufreader)
        .map_err(|e| AnalyzeError::Exif {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let fields = exif
        .fields()
        .filter(|f| f.ifd_num == In::PRIMARY)
        .map(|f| (f.tag.to_string(), field_text(f)))
        .collect();

    let date_taken = DATE_TAGS.iter().find_map(|&tag| {
        exif.get_field(tag, In::PRIMARY)
            .and_then(|f| get_string_value(&f.value))
            .and_then(|s| parse_exif_datetime(&s))
    });

    Ok(ExifSummary {
        fields,
        date_taken,
        camera_make: exif
            .get_field(Tag::Make, In::PRIMARY)
            .and_then(|f| get_string_value(&f.value)),
        camera_model: exif
            .get_field(Tag::Model, In::PRIMARY)
            .and_then(|f| get_string_value(&f.value)),
    })
}

/// Parse an EXIF date string; date-only values become midnight
pub fn parse_exif_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn field_text(field: &Field) -> String {
    get_string_value(&field.value).unwrap_or_else(|| field.display_value().to_string())
}

/// Helper to extract string from EXIF ASCII value
fn get_string_value(value: &Value) -> Option<String> {
    if let Value::Ascii(ref vec) = value {
        if let Some(bytes) = vec.first() {
            if let Ok(s) = std::str::from_utf8(bytes) {
                let trimmed = s.trim_end_matches('\0').trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn parses_exif_colon_format() {
        assert_eq!(
            parse_exif_datetime("2023:06:01 10:00:00"),
            Some(at(2023, 6, 1, 10, 0, 0))
        );
    }

    #[test]
    fn parses_iso_like_format() {
        assert_eq!(
            parse_exif_datetime("2023-06-01 10:30:15"),
            Some(at(2023, 6, 1, 10, 30, 15))
        );
    }

    #[test]
    fn date_only_is_midnight() {
        assert_eq!(parse_exif_datetime("2023:06:01"), Some(at(2023, 6, 1, 0, 0, 0)));
        assert_eq!(parse_exif_datetime("2023-06-01"), Some(at(2023, 6, 1, 0, 0, 0)));
    }

    #[test]
    fn garbage_does_not_parse() {
        assert_eq!(parse_exif_datetime(""), None);
        assert_eq!(parse_exif_datetime("0000:00:00 00:00:00"), None);
        assert_eq!(parse_exif_datetime("yesterday"), None);
    }

    #[test]
    fn ascii_values_are_trimmed() {
        let value = Value::Ascii(vec![b"Canon \0".to_vec()]);
        assert_eq!(get_string_value(&value), Some("Canon".to_string()));
        assert_eq!(get_string_value(&Value::Ascii(vec![b"   ".to_vec()])), None);
    }

    #[test]
    fn file_without_exif_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("plain.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xD9]).unwrap();

        assert!(matches!(read_exif(&path), Err(AnalyzeError::Exif { .. })));
    }
}
