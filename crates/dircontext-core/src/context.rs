// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Context objects: a traversed directory bound to a key set and a timing mode.
//!
//! A context is built once, synchronously, and never changes afterwards.
//! Lookups are answered from the key set captured at build time, even if the
//! directory has since changed on disk.

use crate::error::{ContextError, LoadError, Result};
use crate::lister::DirectoryLister;
use crate::loader::Loader;
use crate::mode::TimingMode;
use futures::future::BoxFuture;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use tracing::{debug, trace};

/// Relative paths matched by one traversal, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    ordered: Vec<String>,
    members: HashSet<String>,
}

impl KeySet {
    /// Insert a key; inserting an existing key is a no-op
    fn insert(&mut self, key: String) {
        if self.members.insert(key.clone()) {
            self.ordered.push(key);
        }
    }

    /// Check if a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.members.contains(key)
    }

    /// Iterate keys in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    /// Get the number of keys
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Keys as a set, ignoring order
    pub fn as_set(&self) -> &HashSet<String> {
        &self.members
    }
}

/// Walk `root` and collect every non-directory entry whose key matches `filter`.
///
/// Keys are `/`-joined and start at `.`, e.g. `./sub/b.txt`. Subdirectories
/// are only entered when `recursive` is set. Any listing failure aborts the
/// whole walk.
pub fn build_key_set(
    lister: &dyn DirectoryLister,
    root: &Path,
    recursive: bool,
    filter: &Regex,
) -> Result<KeySet> {
    let mut keys = KeySet::default();
    traverse(lister, root, ".", recursive, filter, &mut keys)?;
    debug!(
        "collected {} keys under {} (recursive: {}, filter: {})",
        keys.len(),
        root.display(),
        recursive,
        filter
    );
    Ok(keys)
}

fn traverse(
    lister: &dyn DirectoryLister,
    root: &Path,
    directory: &str,
    recursive: bool,
    filter: &Regex,
    keys: &mut KeySet,
) -> Result<()> {
    let path = key_path(root, directory);
    let listing = lister
        .list(&path)
        .map_err(|source| ContextError::Listing {
            path: path.clone(),
            source,
        })?;
    debug!("listed {} ({} entries)", path.display(), listing.len());

    for entry in listing {
        let entry_key = format!("{}/{}", directory, entry.name);

        if entry.is_directory {
            if recursive {
                traverse(lister, root, &entry_key, recursive, filter, keys)?;
            }
        } else if filter.is_match(&entry_key) {
            trace!("key {}", entry_key);
            keys.insert(entry_key);
        }
    }

    Ok(())
}

/// Join a `/`-separated key onto `root` using native separators
fn key_path(root: &Path, key: &str) -> PathBuf {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}

/// A load that runs when first awaited.
///
/// Creating a `Deferred` does no work. Awaiting it performs the load once and
/// consumes it.
#[must_use = "a deferred load does nothing unless awaited"]
pub struct Deferred<T> {
    path: PathBuf,
    future: BoxFuture<'static, std::result::Result<T, LoadError>>,
}

impl<T: Send + 'static> Deferred<T> {
    /// Defer `loader.load(path)`
    pub fn new<L>(loader: Arc<L>, path: PathBuf) -> Self
    where
        L: Loader<Output = T>,
    {
        let target = path.clone();
        Self {
            path,
            future: Box::pin(async move { loader.load(&target) }),
        }
    }
}

impl<T> Deferred<T> {
    /// Absolute path that will be loaded
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> Future for Deferred<T> {
    type Output = std::result::Result<T, LoadError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        self.future.as_mut().poll(cx)
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").field("path", &self.path).finish()
    }
}

/// Result of invoking a context with a key
#[derive(Debug)]
pub enum Loaded<T> {
    /// Loaded right away
    Immediate(T),
    /// Load postponed until awaited
    Deferred(Deferred<T>),
}

impl<T> Loaded<T> {
    /// Whether the load was postponed
    pub fn is_deferred(&self) -> bool {
        matches!(self, Loaded::Deferred(_))
    }

    /// The value, if it was loaded immediately
    pub fn into_immediate(self) -> Option<T> {
        match self {
            Loaded::Immediate(value) => Some(value),
            Loaded::Deferred(_) => None,
        }
    }

    /// The deferred load, if there is one
    pub fn into_deferred(self) -> Option<Deferred<T>> {
        match self {
            Loaded::Immediate(_) => None,
            Loaded::Deferred(deferred) => Some(deferred),
        }
    }

    /// Wait for the value, forcing a deferred load if needed
    pub async fn settle(self) -> std::result::Result<T, LoadError> {
        match self {
            Loaded::Immediate(value) => Ok(value),
            Loaded::Deferred(deferred) => deferred.await,
        }
    }
}

/// A traversed directory, answering lookups by key
pub struct Context<L: Loader> {
    root: PathBuf,
    keys: KeySet,
    mode: TimingMode,
    loader: Arc<L>,
}

impl<L: Loader> Context<L> {
    /// Traverse `root` and bind the resulting keys to `mode`
    pub fn build(
        lister: &dyn DirectoryLister,
        loader: Arc<L>,
        root: PathBuf,
        recursive: bool,
        filter: &Regex,
        mode: TimingMode,
    ) -> Result<Self> {
        let keys = build_key_set(lister, &root, recursive, filter)?;
        Ok(Self {
            root,
            keys,
            mode,
            loader,
        })
    }

    /// Load the module behind `key` according to the timing mode
    pub fn call(&self, key: &str) -> Result<Loaded<L::Output>> {
        let path = self.resolve(key)?;

        if self.mode.is_deferred() {
            trace!("deferring load of {}", path.display());
            Ok(Loaded::Deferred(Deferred::new(Arc::clone(&self.loader), path)))
        } else {
            trace!("loading {}", path.display());
            Ok(Loaded::Immediate(self.loader.load(&path)?))
        }
    }

    /// Absolute path of a known key
    pub fn resolve(&self, key: &str) -> Result<PathBuf> {
        if !self.keys.contains(key) {
            return Err(ContextError::missing_key(key));
        }
        Ok(key_path(&self.root, key))
    }

    /// Snapshot of the keys, in discovery order
    pub fn keys(&self) -> Vec<String> {
        self.keys.iter().map(str::to_string).collect()
    }

    /// Check if a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// The key set captured at build time
    pub fn key_set(&self) -> &KeySet {
        &self.keys
    }

    /// The resolved root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The timing mode lookups use
    pub fn mode(&self) -> &TimingMode {
        &self.mode
    }

    /// Get the number of keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if there are no keys
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<L: Loader> fmt::Debug for Context<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("root", &self.root)
            .field("keys", &self.keys.ordered)
            .field("mode", &self.mode)
            .finish()
    }
}
