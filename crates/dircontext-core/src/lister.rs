// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Directory listing

use std::fs;
use std::io;
use std::path::Path;

/// A single directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// File name within the listed directory
    pub name: String,
    /// Whether the entry itself is a directory
    pub is_directory: bool,
}

impl DirEntry {
    /// Create a file entry
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: false,
        }
    }

    /// Create a directory entry
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: true,
        }
    }
}

/// Lists the entries of a directory
pub trait DirectoryLister: Send + Sync {
    /// List `dir`, failing when it is unreadable or absent
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>>;
}

/// Lister backed by the live filesystem.
///
/// Entries come back in the order the OS yields them. Symbolic links are not
/// followed when classifying, so a link to a directory is a plain entry.
/// Names are decoded lossily: a name that is not valid UTF-8 yields a key
/// containing U+FFFD, and loading that key fails with an I/O error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLister;

impl DirectoryLister for FsLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        let mut result = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            result.push(DirEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                is_directory: file_type.is_dir(),
            });
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_list_classifies_entries() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let mut entries = FsLister.list(dir.path()).unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(
            entries,
            vec![DirEntry::file("a.txt"), DirEntry::directory("sub")]
        );
    }

    #[test]
    fn test_list_missing_directory() {
        let dir = tempdir().unwrap();
        let err = FsLister.list(&dir.path().join("gone")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
