//! Embedded EXIF metadata
//!
//! Camera clocks were rarely set correctly, so everything read here is
//! recorded for audit only and always carries the date caveat.

use crate::model::{ExtractedMetadata, METADATA_DATE_CAVEAT};
use exif::{Field, In, Reader, Tag, Value};
use std::io::Cursor;

fn ascii_value(field: &Field) -> Option<String> {
    match &field.value {
        Value::Ascii(parts) => parts
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).trim_matches(|c: char| c == '\0' || c.is_whitespace()).to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

/// Reads DateTimeOriginal, Make and Model from an image
///
/// Returns None when the bytes carry no EXIF block or none of the fields.
pub fn extract_metadata(bytes: &[u8]) -> Option<ExtractedMetadata> {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(e) => {
            tracing::trace!("No EXIF data: {}", e);
            return None;
        }
    };

    let read = |tag: Tag| exif.get_field(tag, In::PRIMARY).and_then(ascii_value);
    let metadata = ExtractedMetadata {
        date_time_original: read(Tag::DateTimeOriginal),
        make: read(Tag::Make),
        model: read(Tag::Model),
        warning: METADATA_DATE_CAVEAT.to_string(),
    };

    if metadata.date_time_original.is_none() && metadata.make.is_none() && metadata.model.is_none() {
        return None;
    }
    Some(metadata)
}
