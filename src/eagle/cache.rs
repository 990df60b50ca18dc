//! Per-session drawing cache.
//!
//! Keeps at most one loaded drawing per absolute path and hands out shared
//! handles to it: an edit made through one handle is seen through every
//! other. Entries are never evicted. Single-threaded by construction.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::drawing::Drawing;
use super::error::{EagleError, EagleResult};
use super::reader::ReadOptions;

/// Shared handle to a cached drawing.
pub type SharedDrawing = Rc<RefCell<Drawing>>;

/// Path-keyed cache of loaded drawings.
#[derive(Debug, Default)]
pub struct DrawingCache {
    options: ReadOptions,
    entries: HashMap<PathBuf, SharedDrawing>,
}

impl DrawingCache {
    /// Creates an empty cache using default import options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache with explicit import options.
    #[must_use]
    pub fn with_options(options: ReadOptions) -> Self {
        Self {
            options,
            entries: HashMap::new(),
        }
    }

    /// Returns the cached drawing for `path`, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns the load error; nothing is cached for a failed load.
    pub fn get_or_load(&mut self, path: impl AsRef<Path>) -> EagleResult<SharedDrawing> {
        let key = Self::key(path.as_ref())?;
        if let Some(hit) = self.entries.get(&key) {
            tracing::trace!(path = %key.display(), "Cache hit");
            return Ok(Rc::clone(hit));
        }

        let drawing = Drawing::open_with(&key, &self.options)?;
        let shared = Rc::new(RefCell::new(drawing));
        self.entries.insert(key, Rc::clone(&shared));
        Ok(shared)
    }

    /// Like [`get_or_load`](Self::get_or_load) but logs failures and returns `None`.
    pub fn load_or_none(&mut self, path: impl AsRef<Path>) -> Option<SharedDrawing> {
        let path = path.as_ref();
        match self.get_or_load(path) {
            Ok(drawing) => Some(drawing),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load drawing");
                None
            }
        }
    }

    /// Cached drawing for `path` without loading.
    #[must_use]
    pub fn get(&self, path: impl AsRef<Path>) -> Option<SharedDrawing> {
        let key = Self::key(path.as_ref()).ok()?;
        self.entries.get(&key).map(Rc::clone)
    }

    /// True if `path` has been loaded.
    #[must_use]
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.get(path).is_some()
    }

    /// Number of cached drawings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(path: &Path) -> EagleResult<PathBuf> {
        path.canonicalize()
            .map_err(|e| EagleError::file_read(path, e))
    }
}
