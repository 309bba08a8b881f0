// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Context-making entry point.
//!
//! A [`ContextMaker`] bundles the collaborators (resolver, lister, loader).
//! Binding it to a [`HomeModule`] yields a [`ContextFactory`] whose
//! `context()` resolves a request relative to that module and traverses it:
//!
//! ```rust,ignore
//! use dircontext_core::{ContextMaker, FileLoader, HomeModule, TimingMode};
//! use regex::Regex;
//!
//! let maker = ContextMaker::new(FileLoader);
//! let factory = maker.make_context(&HomeModule::new("/app/src/index.js"));
//! let ctx = factory.context("./locales", true, &Regex::new(r"\.json$")?, TimingMode::Sync)?;
//! for key in ctx.keys() {
//!     println!("{key}");
//! }
//! ```

use crate::config::ContextConfig;
use crate::context::Context;
use crate::error::Result;
use crate::lister::{DirectoryLister, FsLister};
use crate::loader::Loader;
use crate::mode::{ModePolicy, TimingMode};
use crate::resolver::{resolve_root, ModuleResolver, NodeDirectoryResolver};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

/// Filter used when none is given: every key
pub const DEFAULT_FILTER: &str = r"^\./.*$";

static DEFAULT_FILTER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_FILTER).expect("default filter is a valid pattern")
});

/// The module on whose behalf requests are resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeModule {
    filename: PathBuf,
}

impl HomeModule {
    /// Create a home module from its absolute filename
    pub fn new(filename: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
        }
    }

    /// The module's filename
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Directory requests are resolved against
    pub fn base_dir(&self) -> &Path {
        self.filename.parent().unwrap_or(Path::new("."))
    }
}

/// Traversal options for a context
#[derive(Debug, Clone)]
pub struct ContextOptions {
    /// Descend into subdirectories
    pub recursive: bool,
    /// Keys must match this pattern
    pub filter: Regex,
    /// Timing mode for lookups
    pub mode: TimingMode,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            filter: DEFAULT_FILTER_REGEX.clone(),
            mode: TimingMode::Sync,
        }
    }
}

impl ContextOptions {
    /// Set recursion
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set the filter
    pub fn with_filter(mut self, filter: Regex) -> Self {
        self.filter = filter;
        self
    }

    /// Compile and set the filter
    pub fn with_pattern(self, pattern: &str) -> Result<Self> {
        Ok(self.with_filter(Regex::new(pattern)?))
    }

    /// Set the timing mode
    pub fn with_mode(mut self, mode: impl Into<TimingMode>) -> Self {
        self.mode = mode.into();
        self
    }
}

/// Collaborators used to make contexts
pub struct ContextMaker<L: Loader> {
    resolver: Arc<dyn ModuleResolver>,
    lister: Arc<dyn DirectoryLister>,
    loader: Arc<L>,
    policy: ModePolicy,
}

impl<L: Loader> ContextMaker<L> {
    /// Create a maker using the Node.js resolver and the live filesystem
    pub fn new(loader: L) -> Self {
        Self {
            resolver: Arc::new(NodeDirectoryResolver::new()),
            lister: Arc::new(FsLister),
            loader: Arc::new(loader),
            policy: ModePolicy::default(),
        }
    }

    /// Create a maker from configuration
    pub fn from_config(config: &ContextConfig, loader: L) -> Self {
        Self::new(loader)
            .with_resolver(config.resolver())
            .with_policy(config.mode_policy())
    }

    /// Replace the resolver
    pub fn with_resolver(mut self, resolver: impl ModuleResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Replace the directory lister
    pub fn with_lister(mut self, lister: impl DirectoryLister + 'static) -> Self {
        self.lister = Arc::new(lister);
        self
    }

    /// Set how unrecognized timing modes are handled
    pub fn with_policy(mut self, policy: ModePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The shared loader
    pub fn loader(&self) -> &Arc<L> {
        &self.loader
    }

    /// The mode policy
    pub fn policy(&self) -> ModePolicy {
        self.policy
    }

    /// Bind to a home module
    pub fn make_context(&self, home: &HomeModule) -> ContextFactory<L> {
        self.factory_at(home.base_dir())
    }

    /// Bind to a base directory directly
    pub fn factory_at(&self, base_dir: impl Into<PathBuf>) -> ContextFactory<L> {
        ContextFactory {
            base_dir: base_dir.into(),
            maker: self.clone(),
        }
    }
}

impl<L: Loader> Clone for ContextMaker<L> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            lister: Arc::clone(&self.lister),
            loader: Arc::clone(&self.loader),
            policy: self.policy,
        }
    }
}

/// Makes contexts relative to one base directory
pub struct ContextFactory<L: Loader> {
    base_dir: PathBuf,
    maker: ContextMaker<L>,
}

impl<L: Loader> ContextFactory<L> {
    /// Resolve `request`, traverse it, and bind the keys to `mode`
    pub fn context(
        &self,
        request: &str,
        recursive: bool,
        filter: &Regex,
        mode: TimingMode,
    ) -> Result<Context<L>> {
        self.maker.policy.check(&mode)?;

        let root = resolve_root(self.maker.resolver.as_ref(), &self.base_dir, request)?;
        Context::build(
            self.maker.lister.as_ref(),
            Arc::clone(&self.maker.loader),
            root,
            recursive,
            filter,
            mode,
        )
    }

    /// Same as [`context`](Self::context), taking bundled options
    pub fn context_with(&self, request: &str, options: &ContextOptions) -> Result<Context<L>> {
        self.context(request, options.recursive, &options.filter, options.mode.clone())
    }

    /// Directory requests are resolved against
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
