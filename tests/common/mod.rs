// Copyright 2018-2026 the Deno authors. All rights reserved. MIT license.
//! A deterministic, synchronous stand-in for a real script transport,
//! driving the real `Loader::define` entry point instead of mocking the
//! graph engine's internals (mirrors the reference runtime's own
//! `MockSpecifierHandler` fixture pattern).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use amd_graph::{Arg, Factory, FactoryResult, Fetcher, Loader, LoaderError, Specifier, UncaughtErrorSink};

enum ScriptBehavior {
  Define {
    deps: Vec<String>,
    factory: RefCell<Option<Factory>>,
  },
  Empty,
}

/// Scripts are keyed by the absolute URL string they resolve to. Anything
/// not registered fails with `LoaderError::Fetch`, simulating a 404.
#[derive(Clone, Default)]
pub struct MockFetcher {
  scripts: Rc<RefCell<HashMap<String, ScriptBehavior>>>,
}

impl MockFetcher {
  pub fn new() -> Self {
    // Best-effort: lets `RUST_LOG=trace` surface the engine's dependency
    // discovery and scheduler pump trace lines while running this suite.
    // Ignored on the second and later calls (one global logger per process).
    let _ = env_logger::try_init();
    Self::default()
  }

  /// Register a script at `url` whose body calls
  /// `define(deps, factory)` exactly once.
  pub fn define(&self, url: &str, deps: &[&str], factory: impl FnOnce(Vec<Arg>) -> FactoryResult + 'static) {
    self.scripts.borrow_mut().insert(
      url.to_string(),
      ScriptBehavior::Define {
        deps: deps.iter().map(|d| d.to_string()).collect(),
        factory: RefCell::new(Some(Box::new(factory))),
      },
    );
  }

  /// Register a script at `url` that loads successfully but never calls
  /// `define` — the engine synthesizes the trivial no-dep factory for it.
  pub fn empty(&self, url: &str) {
    self.scripts.borrow_mut().insert(url.to_string(), ScriptBehavior::Empty);
  }
}

impl Fetcher for MockFetcher {
  fn fetch(&self, loader: Loader, specifier: Specifier) {
    let behavior = self.scripts.borrow_mut().remove(&specifier.to_string());
    match behavior {
      Some(ScriptBehavior::Define { deps, factory }) => {
        loader.enter_script(&specifier);
        let factory = factory.borrow_mut().take().expect("script fetched twice");
        loader.define(deps, factory);
        loader.exit_script(&specifier);
      }
      Some(ScriptBehavior::Empty) => {
        loader.enter_script(&specifier);
        loader.exit_script(&specifier);
      }
      None => {
        loader.script_failed(&specifier, LoaderError::Fetch(specifier.clone()));
      }
    }
  }
}

/// Collects everything the engine would otherwise hand to
/// `window.onerror`, so tests can assert on uncaught top-level failures.
#[derive(Clone, Default)]
pub struct CapturingSink(pub Rc<RefCell<Vec<String>>>);

impl UncaughtErrorSink for CapturingSink {
  fn uncaught(&self, err: &LoaderError) {
    self.0.borrow_mut().push(err.to_string());
  }
}
