//! JSON artifact I/O
//!
//! Every artifact is pretty-printed UTF-8 so diffs between runs stay
//! reviewable. Writes go to a sibling temp file and are renamed into place,
//! so a reader never sees a torn file.

use crate::HarvestError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Writes `value` as indented JSON, atomically replacing `path`
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), HarvestError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut bytes = serde_json::to_vec_pretty(value).map_err(|source| HarvestError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    bytes.push(b'\n');

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, &bytes)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Reads a JSON artifact
///
/// A missing file is reported as `MissingInput` so phases can fail fast on
/// absent prerequisites.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, HarvestError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(HarvestError::MissingInput(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    serde_json::from_slice(&bytes).map_err(|source| HarvestError::Json {
        path: path.to_path_buf(),
        source,
    })
}
