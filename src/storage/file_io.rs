//! JSON file helpers with atomic replacement

use std::fs::{self, File};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::EnvelopeError;

fn storage_error<'a>(
    action: &'static str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> EnvelopeError + 'a {
    move |e| EnvelopeError::Storage(format!("Failed to {} {}: {}", action, path.display(), e))
}

/// Sibling path used while a write is in flight
fn staging_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

/// Read a JSON file; a missing file yields `T::default()`
pub fn read_json<T, P>(path: P) -> Result<T, EnvelopeError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(storage_error("read", path)(e)),
    };

    serde_json::from_slice(&bytes)
        .map_err(|e| EnvelopeError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Replace a JSON file atomically
///
/// Data goes to a staging file that is synced and then renamed over the
/// target, so readers see either the old or the new contents.
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), EnvelopeError>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(storage_error("create directory", parent))?;
    }

    let staging = staging_path(path);
    let file = File::create(&staging).map_err(storage_error("create", &staging))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, data).map_err(|e| {
        EnvelopeError::Storage(format!("Failed to serialize {}: {}", path.display(), e))
    })?;
    writer.flush().map_err(storage_error("flush", &staging))?;
    writer.get_ref().sync_all().map_err(storage_error("sync", &staging))?;

    if let Err(e) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(storage_error("replace", path)(e));
    }
    Ok(())
}
