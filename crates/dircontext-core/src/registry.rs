// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Process-wide context maker.
//!
//! Hosts that cannot thread a [`ContextMaker`] through every call site can
//! install one here once, at startup. The first installation wins for the
//! rest of the process; nothing can replace or remove it.

use crate::factory::{ContextFactory, ContextMaker, HomeModule};
use crate::loader::Loader;
use std::any::Any;
use std::sync::OnceLock;
use tracing::debug;

static INSTALLED: OnceLock<Box<dyn Any + Send + Sync>> = OnceLock::new();

/// Install the process-wide maker.
///
/// Returns `true` if this call installed it, `false` if one was already in
/// place (the argument is dropped in that case).
pub fn install<L: Loader>(maker: ContextMaker<L>) -> bool {
    let installed = INSTALLED.set(Box::new(maker)).is_ok();
    if installed {
        debug!("installed process-wide context maker");
    }
    installed
}

/// The installed maker, if one was installed with loader type `L`
pub fn installed<L: Loader>() -> Option<&'static ContextMaker<L>> {
    INSTALLED.get()?.downcast_ref::<ContextMaker<L>>()
}

/// Bind the installed maker to `home`
pub fn make_context<L: Loader>(home: &HomeModule) -> Option<ContextFactory<L>> {
    installed::<L>().map(|maker| maker.make_context(home))
}
