// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module loader - turns a resolved file into a value

use crate::error::LoadError;
use std::fmt;
use std::path::Path;

/// Loads the file behind a context key
pub trait Loader: Send + Sync + 'static {
    /// Value produced for a loaded file
    type Output: Send + 'static;

    /// Load the file at `path`
    fn load(&self, path: &Path) -> Result<Self::Output, LoadError>;
}

/// A loaded module
#[derive(Debug, Clone, PartialEq)]
pub enum Module {
    /// Parsed `.json` file
    Json(serde_json::Value),
    /// Any other file, as UTF-8 text
    Text(String),
}

impl Module {
    /// Text content, if this is a text module
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Module::Text(text) => Some(text),
            Module::Json(_) => None,
        }
    }

    /// JSON value, if this is a JSON module
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Module::Json(value) => Some(value),
            Module::Text(_) => None,
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Module::Json(value) => match serde_json::to_string_pretty(value) {
                Ok(pretty) => f.write_str(&pretty),
                Err(_) => write!(f, "{}", value),
            },
            Module::Text(text) => f.write_str(text),
        }
    }
}

/// Loader reading modules from disk by extension
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

impl FileLoader {
    fn read(path: &Path) -> Result<String, LoadError> {
        std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Loader for FileLoader {
    type Output = Module;

    fn load(&self, path: &Path) -> Result<Module, LoadError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => {
                let content = Self::read(path)?;
                let value = serde_json::from_str(&content).map_err(|source| LoadError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
                Ok(Module::Json(value))
            }
            // Native addons not supported
            Some("node") => Err(LoadError::Unsupported(path.to_path_buf())),
            _ => Ok(Module::Text(Self::read(path)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_by_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("data.json"), r#"{"name": "dircontext"}"#).unwrap();
        fs::write(dir.path().join("readme.md"), "# Hello").unwrap();
        fs::write(dir.path().join("addon.node"), [0u8; 4]).unwrap();

        let json = FileLoader.load(&dir.path().join("data.json")).unwrap();
        assert_eq!(json.as_json().unwrap()["name"], "dircontext");

        let text = FileLoader.load(&dir.path().join("readme.md")).unwrap();
        assert_eq!(text.as_text(), Some("# Hello"));

        assert!(matches!(
            FileLoader.load(&dir.path().join("addon.node")),
            Err(LoadError::Unsupported(_))
        ));
    }

    #[test]
    fn test_load_failures() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{ nope").unwrap();

        assert!(matches!(
            FileLoader.load(&dir.path().join("broken.json")),
            Err(LoadError::Parse { .. })
        ));
        assert!(matches!(
            FileLoader.load(&dir.path().join("absent.js")),
            Err(LoadError::Io { .. })
        ));
    }
}
