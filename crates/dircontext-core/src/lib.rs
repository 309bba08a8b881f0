// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # dircontext-core
//!
//! Bundler-style directory contexts (`require.context`) for Rust hosts.
//!
//! Given a home module, a request, and traversal options, a context:
//!
//! - resolves the request to a directory (never to a package's main file)
//! - walks it once, optionally recursively, keeping files whose
//!   `./`-relative key matches a regular expression
//! - loads any matched key on demand, immediately or deferred depending on
//!   the [`TimingMode`]
//!
//! Resolution, listing and loading are pluggable through the
//! [`ModuleResolver`], [`DirectoryLister`] and [`Loader`] traits.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dircontext_core::{ContextMaker, ContextOptions, FileLoader, HomeModule};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let maker = ContextMaker::new(FileLoader);
//!     let factory = maker.make_context(&HomeModule::new("/app/src/main.js"));
//!
//!     let options = ContextOptions::default()
//!         .with_pattern(r"\.json$")?
//!         .with_mode("lazy");
//!     let ctx = factory.context_with("./locales", &options)?;
//!
//!     for key in ctx.keys() {
//!         let module = ctx.call(&key)?.settle().await?;
//!         println!("{key}: {module}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod factory;
pub mod lister;
pub mod loader;
pub mod mode;
pub mod registry;
pub mod resolver;

// Re-exports
pub use cache::CachingLoader;
pub use config::ContextConfig;
pub use context::{build_key_set, Context, Deferred, KeySet, Loaded};
pub use error::{ContextError, LoadError, Result};
pub use factory::{ContextFactory, ContextMaker, ContextOptions, HomeModule, DEFAULT_FILTER};
pub use lister::{DirEntry, DirectoryLister, FsLister};
pub use loader::{FileLoader, Loader, Module};
pub use mode::{ModePolicy, TimingMode, DEFERRED_MODES};
pub use resolver::{resolve_root, ModuleResolver, NodeDirectoryResolver};

/// Version of the dircontext-core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
