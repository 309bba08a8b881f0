// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Directory resolution for context requests.
//!
//! Requests resolve to the directory they denote, never to a package's main
//! entry file: `require.context("lodash")` traverses the `lodash` package
//! directory, not `lodash/index.js`.

use crate::error::{ContextError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves a request string against a base directory
pub trait ModuleResolver: Send + Sync {
    /// Resolve `request` from `base` to an absolute directory path
    fn resolve_directory(&self, base: &Path, request: &str) -> std::result::Result<PathBuf, String>;
}

/// Resolve the root of a context.
///
/// Wraps any [`ModuleResolver`] failure, and any result that is not an
/// existing directory, in [`ContextError::Resolution`].
pub fn resolve_root(resolver: &dyn ModuleResolver, base: &Path, request: &str) -> Result<PathBuf> {
    let resolved = resolver
        .resolve_directory(base, request)
        .map_err(|reason| ContextError::resolution(base, request, reason))?;

    if !resolved.is_dir() {
        return Err(ContextError::resolution(
            base,
            request,
            format!("'{}' is not a directory", resolved.display()),
        ));
    }

    debug!(
        "resolved context '{}' from {} to {}",
        request,
        base.display(),
        resolved.display()
    );
    Ok(resolved)
}

/// Resolver following the Node.js lookup rules, in directory mode
#[derive(Debug, Clone)]
pub struct NodeDirectoryResolver {
    /// Directory names searched for bare specifiers
    modules: Vec<String>,
    /// Leading-segment rewrites applied before lookup
    alias: BTreeMap<String, String>,
}

impl NodeDirectoryResolver {
    /// Create a resolver searching `node_modules`
    pub fn new() -> Self {
        Self {
            modules: vec!["node_modules".to_string()],
            alias: BTreeMap::new(),
        }
    }

    /// Replace the searched module directories
    pub fn with_modules(mut self, modules: Vec<String>) -> Self {
        self.modules = modules;
        self
    }

    /// Add an alias: requests whose first segment is `name` start at `target`
    pub fn with_alias(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.alias.insert(name.into(), target.into());
        self
    }

    /// Apply the first matching alias to `request`
    fn apply_alias(&self, request: &str) -> Option<String> {
        let (head, rest) = match request.split_once('/') {
            Some((head, rest)) => (head, Some(rest)),
            None => (request, None),
        };
        let target = self.alias.get(head)?;
        Some(match rest {
            Some(rest) => format!("{}/{}", target.trim_end_matches('/'), rest),
            None => target.clone(),
        })
    }

    /// Resolve a path-like request against `base`
    fn resolve_path(&self, base: &Path, request: &str) -> std::result::Result<PathBuf, String> {
        let path = base.join(request);
        if path.is_dir() {
            return path.canonicalize().map_err(|e| e.to_string());
        }
        if path.exists() {
            return Err(format!("'{}' is not a directory", path.display()));
        }
        Err(format!("Cannot find directory '{}'", request))
    }

    /// Resolve a bare specifier by walking up the module directories
    fn resolve_modules(&self, base: &Path, request: &str) -> std::result::Result<PathBuf, String> {
        let (package_name, subpath) = parse_package_specifier(request);

        let mut current = Some(base);
        while let Some(dir) = current {
            for modules in &self.modules {
                let mut candidate = dir.join(modules).join(package_name);
                if let Some(sub) = subpath {
                    candidate = candidate.join(sub);
                }
                if candidate.is_dir() {
                    return candidate.canonicalize().map_err(|e| e.to_string());
                }
            }
            current = dir.parent();
        }

        Err(format!("Cannot find module '{}'", request))
    }
}

impl Default for NodeDirectoryResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleResolver for NodeDirectoryResolver {
    fn resolve_directory(&self, base: &Path, request: &str) -> std::result::Result<PathBuf, String> {
        let aliased = self.apply_alias(request);
        let request = aliased.as_deref().unwrap_or(request);

        if is_path_request(request) {
            self.resolve_path(base, request)
        } else {
            self.resolve_modules(base, request)
        }
    }
}

/// Whether a request names a filesystem path rather than a package
fn is_path_request(request: &str) -> bool {
    request.is_empty()
        || request == "."
        || request == ".."
        || request.starts_with("./")
        || request.starts_with("../")
        || Path::new(request).is_absolute()
}

/// Split a package specifier into name and optional subpath
fn parse_package_specifier(specifier: &str) -> (&str, Option<&str>) {
    if specifier.starts_with('@') {
        // Scoped package: @scope/name or @scope/name/subpath
        if let Some(slash_pos) = specifier[1..].find('/') {
            let after_scope = &specifier[slash_pos + 2..];
            if let Some(subpath_pos) = after_scope.find('/') {
                let name_end = slash_pos + 2 + subpath_pos;
                return (&specifier[..name_end], Some(&specifier[name_end + 1..]));
            }
        }
        (specifier, None)
    } else if let Some(slash_pos) = specifier.find('/') {
        (&specifier[..slash_pos], Some(&specifier[slash_pos + 1..]))
    } else {
        (specifier, None)
    }
}
