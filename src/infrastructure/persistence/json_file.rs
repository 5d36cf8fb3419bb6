//! Whole-file JSON reads and atomic rewrites.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::sync::Mutex;

use crate::error::StoreError;

/// One JSON file that is only ever replaced as a whole.
///
/// Writers share a single sibling `.tmp` file, so rewrites through the same
/// `JsonFile` are serialized by `write_lock`.
#[derive(Debug)]
pub(crate) struct JsonFile {
    path: PathBuf,
    temp_path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFile {
    pub(crate) fn new(path: PathBuf) -> Self {
        let temp_path = temp_path_for(&path);
        Self {
            path,
            temp_path,
            write_lock: Mutex::new(()),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file, treating a missing or blank file as absent.
    pub(crate) async fn read_optional(&self) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(None),
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }

    /// Replaces the file with `contents`.
    ///
    /// Writes the `.tmp` sibling first and renames it over the target, so a
    /// failed write leaves the previous contents in place.
    pub(crate) async fn write_atomic(&self, contents: &[u8]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        fs::write(&self.temp_path, contents)
            .await
            .map_err(|e| StoreError::io(&self.temp_path, e))?;

        if let Err(e) = fs::rename(&self.temp_path, &self.path).await {
            let _ = fs::remove_file(&self.temp_path).await;
            return Err(StoreError::io(&self.path, e));
        }

        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
