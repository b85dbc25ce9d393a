// Copyright 2018-2026 the Deno authors. All rights reserved. MIT license.
//! The dependency graph engine behind a minimal AMD-style module loader
//! (§1 of the spec): URL canonicalization, the Module Registry, the
//! Fetcher abstraction, the per-Module state machine, the cycle-safe
//! execution scheduler, and the `define`/`require` public surface.
//!
//! The HTML host page, the real network transport, and full AMD plugin
//! support are out of scope (§1) — this crate only implements the engine
//! that a host page's single global `define` call drives.

mod error;
mod fetcher;
mod graph;
mod loader;
mod module;
mod registry;
mod require;
mod scheduler;
mod sink;
mod specifier;

pub use error::{LoaderError, Result};
pub use fetcher::Fetcher;
pub use loader::Loader;
pub use module::{Arg, Factory, FactoryResult, ModuleState};
pub use require::{OnFailure, OnResolved, RequireFn};
pub use sink::{LoggingSink, UncaughtErrorSink};
pub use specifier::Specifier;

use std::cell::RefCell;

thread_local! {
  static GLOBAL: RefCell<Option<Loader>> = const { RefCell::new(None) };
}

/// Configure the single global loader a page's scripts call `define`
/// against. Must be called once before any script runs.
pub fn init(document_base: &str, fetcher: impl Fetcher + 'static) -> Result<()> {
  let loader = Loader::new(document_base, fetcher)?;
  GLOBAL.with(|cell| *cell.borrow_mut() = Some(loader));
  Ok(())
}

/// The single global entry point a transpiled script's top-level code
/// calls (§6): `define(deps, factory)`.
///
/// # Panics
///
/// Panics if [`init`] has not been called on this thread.
pub fn define(deps: Vec<String>, factory: Factory) -> Specifier {
  GLOBAL.with(|cell| {
    let loader = cell.borrow();
    let loader = loader
      .as_ref()
      .expect("amd_graph::init must be called before amd_graph::define");
    loader.define(deps, factory)
  })
}

/// Test-only: drop the global loader's state so a new scenario can start
/// from a clean Registry and Scheduler.
pub fn reset() {
  GLOBAL.with(|cell| {
    if let Some(loader) = cell.borrow().as_ref() {
      loader.reset();
    }
  });
}
