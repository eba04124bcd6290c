//! Output directory holding the record database and fragment files

use std::path::{Path, PathBuf};

use crate::io::configuration::{DATABASE_FILE_NAME, FRAGMENT_EXTENSION, RECONSTRUCTION_PREFIX};
use crate::io::error::{PipelineError, Result};
use crate::storage::fragments::FragmentStorage;
use crate::storage::store::SqliteStore;

/// Store handle and fragment storage scoped to one output directory
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    store: SqliteStore,
    storage: FragmentStorage,
}

impl Workspace {
    /// Open `root`, creating the directory and the record schema if absent
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| PipelineError::FileSystem {
            path: root.clone(),
            operation: "create output directory",
            source,
        })?;

        let store = SqliteStore::open(&root.join(DATABASE_FILE_NAME))?;
        let storage = FragmentStorage::new(root.clone());

        Ok(Self {
            root,
            store,
            storage,
        })
    }

    /// Open a workspace an earlier extraction already created
    ///
    /// Nothing is created on disk, so read-only commands pointed at a wrong
    /// path fail instead of leaving an empty workspace behind.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::FileSystem`] if `root` holds no record
    /// database, or an error if the database cannot be opened
    pub fn open_existing(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let database = root.join(DATABASE_FILE_NAME);
        std::fs::metadata(&database).map_err(|source| PipelineError::FileSystem {
            path: database.clone(),
            operation: "open existing output",
            source,
        })?;

        let store = SqliteStore::open(&database)?;
        let storage = FragmentStorage::new(root.clone());

        Ok(Self {
            root,
            store,
            storage,
        })
    }

    /// Output directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record store
    pub const fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Fragment storage
    pub const fn storage(&self) -> &FragmentStorage {
        &self.storage
    }

    /// Mutable store alongside shared storage, as extraction needs both
    pub fn parts_mut(&mut self) -> (&mut SqliteStore, &FragmentStorage) {
        (&mut self.store, &self.storage)
    }

    /// Default destination for the reconstruction of `image_index`
    pub fn reconstruction_path(&self, image_index: usize) -> PathBuf {
        self.root.join(format!(
            "{RECONSTRUCTION_PREFIX}{image_index}.{FRAGMENT_EXTENSION}"
        ))
    }
}
