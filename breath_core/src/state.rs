//! Catalog persistence with file locking.
//!
//! The catalog is the user's editable state. It is saved atomically after
//! every edit and falls back to the built-in default whenever the file on
//! disk cannot be trusted.

use crate::catalog::build_default_catalog;
use crate::{Catalog, Error, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

impl Catalog {
    /// Load the catalog from a file with shared locking
    ///
    /// Returns the default catalog if the file doesn't exist.
    /// If the file is unreadable, corrupted or fails validation, logs a
    /// warning and returns the default catalog.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No catalog file found, using default catalog");
            return Ok(build_default_catalog());
        }

        match Self::read_locked(path) {
            Ok(catalog) => {
                let errors = catalog.validate();
                if errors.is_empty() {
                    tracing::debug!("Loaded catalog from {:?}", path);
                    Ok(catalog)
                } else {
                    Ok(recover(
                        path,
                        Error::StorageCorruption(errors.join("; ")),
                    ))
                }
            }
            Err(e) => Ok(recover(path, e)),
        }
    }

    fn read_locked(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        let _ = file.unlock();
        read?;

        serde_json::from_str::<Catalog>(&contents)
            .map_err(|e| Error::StorageCorruption(e.to_string()))
    }

    /// Save the catalog to a file
    ///
    /// Does not serialize against other writers; edits go through
    /// [`Catalog::update`]. Atomically writes by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "catalog path missing parent")
        })?)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved catalog to {:?}", path);
        Ok(())
    }

    /// Load the catalog, apply an edit and save it back
    ///
    /// An exclusive lock on `<path>.lock` is held from the load until the
    /// rename, so edits from other threads or processes are applied one
    /// after another. Nothing is written when the edit fails, so a rejected
    /// edit leaves the stored catalog untouched.
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut Catalog) -> Result<()>,
    {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(lock_path(path))?;
        lock.lock_exclusive()?;

        let result = Self::load(path).and_then(|mut catalog| {
            f(&mut catalog)?;
            catalog.save(path)?;
            Ok(catalog)
        });

        let _ = lock.unlock();
        result
    }
}

/// Sidecar file that serializes catalog edits
fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

fn recover(path: &Path, cause: Error) -> Catalog {
    tracing::warn!(
        "Unable to use catalog file {:?}: {}. Using default catalog.",
        path,
        cause
    );
    build_default_catalog()
}
