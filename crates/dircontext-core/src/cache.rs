// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module cache wrapping a loader

use crate::error::LoadError;
use crate::loader::Loader;
use dashmap::DashMap;
use std::path::{Path, PathBuf};

/// Loader wrapper memoizing results by absolute path.
///
/// Failed loads are not cached; the next lookup tries again.
pub struct CachingLoader<L: Loader> {
    inner: L,
    cache: DashMap<PathBuf, L::Output>,
}

impl<L: Loader> CachingLoader<L> {
    /// Wrap `inner` with an empty cache
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    /// Check if a path is cached
    pub fn contains(&self, path: &Path) -> bool {
        self.cache.contains_key(path)
    }

    /// Remove a path from the cache
    pub fn evict(&self, path: &Path) -> Option<L::Output> {
        self.cache.remove(path).map(|(_, v)| v)
    }

    /// Clear the entire cache
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Get the number of cached modules
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// The wrapped loader
    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L> Loader for CachingLoader<L>
where
    L: Loader,
    L::Output: Clone + Sync,
{
    type Output = L::Output;

    fn load(&self, path: &Path) -> Result<Self::Output, LoadError> {
        if let Some(cached) = self.cache.get(path) {
            return Ok(cached.clone());
        }

        let value = self.inner.load(path)?;
        self.cache.insert(path.to_path_buf(), value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{FileLoader, Module};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_second_load_hits_cache() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "first").unwrap();

        let loader = CachingLoader::new(FileLoader);
        assert_eq!(loader.load(&file).unwrap(), Module::Text("first".into()));
        assert!(loader.contains(&file));

        fs::write(&file, "second").unwrap();
        assert_eq!(loader.load(&file).unwrap(), Module::Text("first".into()));

        loader.evict(&file);
        assert_eq!(loader.load(&file).unwrap(), Module::Text("second".into()));
        assert_eq!(loader.len(), 1);

        loader.clear();
        assert!(loader.is_empty());
    }

    #[test]
    fn test_failures_are_not_cached() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("late.txt");

        let loader = CachingLoader::new(FileLoader);
        assert!(loader.load(&file).is_err());
        assert!(loader.is_empty());

        fs::write(&file, "here now").unwrap();
        assert!(loader.load(&file).is_ok());
    }
}
