//! Directory-backed fragment pixel storage

use image::ImageFormat;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::fragments::fragment::{Fragment, FragmentKind};
use crate::io::configuration::FRAGMENT_EXTENSION;
use crate::io::error::{PipelineError, Result};

/// Opaque handle naming where a fragment's pixels live
///
/// For directory storage this is a file name relative to the storage root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageReference(String);

impl StorageReference {
    /// Wrap an existing reference string, e.g. one read back from the store
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Reference for a fragment first committed by `image_index` under `region_id`
    pub fn for_fragment(kind: FragmentKind, image_index: usize, region_id: u32) -> Self {
        Self(format!(
            "{}_image{image_index}_{region_id}.{FRAGMENT_EXTENSION}",
            kind.as_str()
        ))
    }

    /// The reference as stored in the record table
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Saves and opens fragments as RGBA PNG files under one directory
#[derive(Debug, Clone)]
pub struct FragmentStorage {
    root: PathBuf,
}

impl FragmentStorage {
    /// Storage rooted at `root`; the directory must already exist for writes
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the fragment files
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path of a reference
    pub fn path_of(&self, reference: &StorageReference) -> PathBuf {
        self.root.join(reference.as_str())
    }

    /// Write a fragment's pixels under `reference`
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::StorageWrite`] if encoding or writing fails
    pub fn save(&self, reference: &StorageReference, fragment: &Fragment) -> Result<()> {
        fragment
            .to_rgba()
            .save_with_format(self.path_of(reference), ImageFormat::Png)
            .map_err(|source| PipelineError::StorageWrite {
                reference: reference.to_string(),
                source,
            })
    }

    /// Read a fragment back from storage
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::FragmentLoad`] if the file is missing or cannot
    /// be decoded
    pub fn open(&self, reference: &StorageReference) -> Result<Fragment> {
        let decoded =
            image::open(self.path_of(reference)).map_err(|source| PipelineError::FragmentLoad {
                reference: reference.to_string(),
                source,
            })?;
        Ok(Fragment::from_rgba(&decoded.to_rgba8()))
    }

    /// Delete a stored fragment
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed
    pub fn remove(&self, reference: &StorageReference) -> Result<()> {
        let path = self.path_of(reference);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PipelineError::FileSystem {
                path,
                operation: "remove fragment",
                source,
            }),
        }
    }

    /// Size in bytes of a stored fragment
    ///
    /// # Errors
    ///
    /// Returns an error if the file metadata cannot be read
    pub fn size_of(&self, reference: &StorageReference) -> Result<u64> {
        let path = self.path_of(reference);
        std::fs::metadata(&path)
            .map(|metadata| metadata.len())
            .map_err(|source| PipelineError::FileSystem {
                path,
                operation: "read fragment metadata",
                source,
            })
    }
}
