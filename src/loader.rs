// Copyright 2018-2026 the Deno authors. All rights reserved. MIT license.
//! The engine that ties the Registry, Fetcher, Graph Engine and Top-Level
//! Scheduler together behind a single handle (§2, §5 of the spec).
//!
//! Everything here is single-threaded cooperative state, as the spec
//! mandates: `Loader` is `Rc<RefCell<Inner>>`, cheap to clone, and passed
//! by value to Fetcher callbacks and `require` continuations so they can
//! call back into the engine without the engine itself ever being `Sync`.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::LoaderError;
use crate::fetcher::Fetcher;
use crate::graph;
use crate::module::{Module, ModuleState};
use crate::registry::Registry;
use crate::require::{OnFailure, OnResolved, RequireJoin, SharedJoin};
use crate::scheduler::TopLevelScheduler;
use crate::sink::{LoggingSink, UncaughtErrorSink};
use crate::specifier::Specifier;

pub(crate) struct Inner {
  pub registry: Registry,
  pub scheduler: TopLevelScheduler,
  /// `require()` targets that are not part of any top-level module's
  /// subgraph and so need their own (unordered, best-effort) drive
  /// attempts — see `Loader::drive_all`.
  pub pending_drive: Vec<Specifier>,
  pub loading_stack: Vec<Specifier>,
  pub fetcher: Rc<dyn Fetcher>,
  pub sink: Rc<dyn UncaughtErrorSink>,
  pub document_base: Specifier,
  pub next_toplevel_id: usize,
}

/// A cheap, cloneable handle to the module graph engine. There is normally
/// one per embedding page; [`crate::define`]/[`crate::reset`] operate on a
/// thread-local default instance so scripts can call a single global
/// `define`, while tests construct their own `Loader` for isolation.
#[derive(Clone)]
pub struct Loader(pub(crate) Rc<RefCell<Inner>>);

impl Loader {
  pub fn new(document_base: &str, fetcher: impl Fetcher + 'static) -> Result<Self, LoaderError> {
    Self::with_sink(document_base, fetcher, LoggingSink)
  }

  pub fn with_sink(
    document_base: &str,
    fetcher: impl Fetcher + 'static,
    sink: impl UncaughtErrorSink + 'static,
  ) -> Result<Self, LoaderError> {
    let document_base = Specifier::parse_absolute(document_base)?;
    Ok(Loader(Rc::new(RefCell::new(Inner {
      registry: Registry::default(),
      scheduler: TopLevelScheduler::default(),
      pending_drive: Vec::new(),
      loading_stack: Vec::new(),
      fetcher: Rc::new(fetcher),
      sink: Rc::new(sink),
      document_base,
      next_toplevel_id: 0,
    }))))
  }

  /// Test-only: drop every Module and queue. Does not unload
  /// already-evaluated scripts from the host.
  pub fn reset(&self) {
    let mut inner = self.0.borrow_mut();
    inner.registry.reset();
    inner.scheduler.reset();
    inner.pending_drive.clear();
    inner.loading_stack.clear();
    inner.next_toplevel_id = 0;
  }

  /// The public `define(deps, factory)` entry point (§6). Binds to the
  /// Module currently being evaluated (the top of the "currently loading
  /// URL" stack), or — if nothing is being loaded — creates a fresh
  /// top-level Module bound to the document base URL.
  pub fn define(&self, deps: Vec<String>, factory: crate::module::Factory) -> Specifier {
    let current = { self.0.borrow().loading_stack.last().cloned() };
    match current {
      Some(target) => {
        let module_rc = self.registry_get(&target);
        let already_bound = module_rc.borrow().state != ModuleState::Loading;
        if already_bound {
          self.fail_module(&target, Arc::new(LoaderError::DuplicateDefine(target.clone())));
        } else {
          self.bind_define(&target, deps, factory, false);
        }
        target
      }
      None => {
        let target = self.fresh_toplevel_specifier();
        self.intern(&target);
        self.bind_define(&target, deps, factory, true);
        target
      }
    }
  }

  fn fresh_toplevel_specifier(&self) -> Specifier {
    let mut inner = self.0.borrow_mut();
    let id = inner.next_toplevel_id;
    inner.next_toplevel_id += 1;
    inner.document_base.with_fragment(&format!("L{id}"))
  }

  fn bind_define(
    &self,
    target: &Specifier,
    deps_raw: Vec<String>,
    factory: crate::module::Factory,
    is_toplevel: bool,
  ) {
    let module_rc = self.registry_get(target);
    {
      let mut m = module_rc.borrow_mut();
      m.factory = Some(factory);
      if m.state == ModuleState::Initialized {
        m.state = ModuleState::Loading;
      }
    }
    let resolved = graph::resolve_deps(self, target, &deps_raw);
    {
      let mut m = module_rc.borrow_mut();
      m.deps = resolved;
      m.state = ModuleState::WaitingForTurn;
    }
    if is_toplevel {
      self.0.borrow_mut().scheduler.enqueue(target.clone());
    }
    self.drive_all();
  }

  /// Called by a [`Fetcher`] right before it begins evaluating the script
  /// at `specifier`, so an anonymous `define()` inside it binds correctly.
  pub fn enter_script(&self, specifier: &Specifier) {
    self.0.borrow_mut().loading_stack.push(specifier.clone());
  }

  /// Called by a [`Fetcher`] right after a script finished evaluating
  /// without erroring. If it never called `define`, synthesizes the
  /// trivial no-dep factory (§4.4's `Loading → WaitingForTurn` rule).
  pub fn exit_script(&self, specifier: &Specifier) {
    self.0.borrow_mut().loading_stack.pop();
    let module_rc = self.registry_get(specifier);
    let still_loading = module_rc.borrow().state == ModuleState::Loading;
    if still_loading {
      let trivial: crate::module::Factory = Box::new(|_args| Ok(None));
      self.bind_define(specifier, Vec::new(), trivial, false);
    }
  }

  /// Called by a [`Fetcher`] when the script at `specifier` could not be
  /// loaded or evaluated at all (network error, 404, parse failure).
  pub fn script_failed(&self, specifier: &Specifier, err: LoaderError) {
    self.fail_module(specifier, Arc::new(err));
    self.drive_all();
  }

  pub(crate) fn registry_get(&self, specifier: &Specifier) -> Rc<RefCell<Module>> {
    self.0.borrow().registry.get(specifier)
  }

  pub(crate) fn intern(&self, specifier: &Specifier) -> Rc<RefCell<Module>> {
    self.0.borrow_mut().registry.intern(specifier)
  }

  /// Transition an `Initialized` Module to `Loading` and issue exactly one
  /// fetch. A no-op if a fetch is already outstanding or the module is
  /// further along (§4.3: "a single outstanding fetch suffices").
  pub(crate) fn fetch_if_needed(&self, specifier: &Specifier) {
    let module_rc = self.intern(specifier);
    let needs_fetch = {
      let mut m = module_rc.borrow_mut();
      if m.state == ModuleState::Initialized {
        m.state = ModuleState::Loading;
        true
      } else {
        false
      }
    };
    if needs_fetch {
      let fetcher = self.0.borrow().fetcher.clone();
      fetcher.fetch(self.clone(), specifier.clone());
    }
  }

  /// Mark a synthetic dependency (one whose specifier string failed to
  /// resolve) `Failed` directly, without ever fetching it.
  pub(crate) fn fail_synthetic(&self, specifier: &Specifier, err: LoaderError) {
    let module_rc = self.intern(specifier);
    let mut m = module_rc.borrow_mut();
    m.state = ModuleState::Failed;
    m.error = Some(Arc::new(err));
  }

  fn fail_module(&self, specifier: &Specifier, err: Arc<LoaderError>) {
    let module_rc = self.registry_get(specifier);
    {
      let mut m = module_rc.borrow_mut();
      m.state = ModuleState::Failed;
      m.error = Some(err.clone());
    }
    self.complete_module(specifier, Err(err));
  }

  /// Drain `specifier`'s notify list in insertion order. Does not itself
  /// re-attempt scheduling; callers that might have unblocked something
  /// (fetch completion, factory completion) call [`Loader::drive_all`].
  pub(crate) fn complete_module(&self, specifier: &Specifier, result: Result<(), Arc<LoaderError>>) {
    let module_rc = self.registry_get(specifier);
    let notify = std::mem::take(&mut module_rc.borrow_mut().notify);
    for cb in notify {
      cb(result.clone());
    }
  }

  pub(crate) fn register_pending_drive(&self, specifier: Specifier) {
    self.0.borrow_mut().pending_drive.push(specifier);
  }

  pub(crate) fn report_uncaught(&self, err: Arc<LoaderError>) {
    let sink = self.0.borrow().sink.clone();
    sink.uncaught(&err);
  }

  /// Attempt to advance every pending root: the top-level FIFO queue (in
  /// order, stopping at the first one still blocked) and every outstanding
  /// `require()` target (unordered, best-effort). Called after every event
  /// that could have unblocked something — a script finishing loading, a
  /// fetch failing, a factory completing.
  pub(crate) fn drive_all(&self) {
    log::trace!("drive_all: pumping top-level queue and pending require() roots");
    loop {
      let mut progressed = false;

      loop {
        let front = { self.0.borrow().scheduler.front().cloned() };
        let Some(front) = front else { break };
        let mut stack = Vec::new();
        if graph::try_execute_subgraph(self, &front, &mut stack) {
          log::trace!("top-level {front} reached a terminal state, advancing the queue");
          self.0.borrow_mut().scheduler.pop_front();
          self.report_toplevel_failure(&front);
          progressed = true;
        } else {
          log::trace!("top-level {front} still blocked, stopping the queue here");
          break;
        }
      }

      let roots: Vec<Specifier> = self.0.borrow().pending_drive.clone();
      for root in &roots {
        let mut stack = Vec::new();
        if graph::try_execute_subgraph(self, root, &mut stack) {
          progressed = true;
        }
      }
      self.0.borrow_mut().pending_drive.retain(|s| {
        let module_rc = self.registry_get(s);
        !module_rc.borrow().state.is_terminal()
      });

      if !progressed {
        break;
      }
    }
  }

  /// A top-level Module that reached `Failed` with nobody awaiting it
  /// surfaces through the uncaught-error channel (§7). This never fires
  /// twice for the same Module: once popped from the scheduler it is
  /// never re-examined here again.
  fn report_toplevel_failure(&self, specifier: &Specifier) {
    let module_rc = self.registry_get(specifier);
    let err = {
      let m = module_rc.borrow();
      if m.state == ModuleState::Failed { m.error.clone() } else { None }
    };
    if let Some(err) = err {
      self.report_uncaught(err);
    }
  }

  /// Dynamic `require(deps, onResolved, onFailure?)` (§4.7).
  pub fn require(
    &self,
    referrer: &Specifier,
    deps_raw: Vec<String>,
    on_resolved: OnResolved,
    on_failure: Option<OnFailure>,
  ) {
    let mut specifiers = Vec::with_capacity(deps_raw.len());
    for d in &deps_raw {
      match Specifier::resolve(d, referrer) {
        Ok(s) => specifiers.push(s),
        Err(e) => {
          let err = Arc::new(e);
          match on_failure {
            Some(f) => f(err),
            None => self.report_uncaught(err),
          }
          return;
        }
      }
    }
    if specifiers.is_empty() {
      on_resolved(Vec::new());
      return;
    }

    let join: SharedJoin = Rc::new(RefCell::new(RequireJoin::new(
      specifiers.len(),
      on_resolved,
      on_failure,
    )));
    for (index, spec) in specifiers.into_iter().enumerate() {
      self.fetch_if_needed(&spec);
      self.register_pending_drive(spec.clone());
      let module_rc = self.registry_get(&spec);
      let terminal = module_rc.borrow().state.is_terminal();
      if terminal {
        self.settle_require_slot(&join, index, &module_rc);
      } else {
        let join = join.clone();
        let loader = self.clone();
        let spec_owned = spec.clone();
        module_rc.borrow_mut().notify.push(Box::new(move |_result| {
          let module_rc = loader.registry_get(&spec_owned);
          loader.settle_require_slot(&join, index, &module_rc);
        }));
      }
    }
    self.drive_all();
  }

  fn settle_require_slot(&self, join: &SharedJoin, index: usize, module_rc: &Rc<RefCell<Module>>) {
    let (err, exports) = {
      let m = module_rc.borrow();
      (m.error.clone(), m.exports.clone())
    };
    let mut j = join.borrow_mut();
    if j.failed {
      return;
    }
    if let Some(err) = err {
      j.failed = true;
      let on_failure = j.on_failure.take();
      j.on_resolved = None;
      drop(j);
      match on_failure {
        Some(f) => f(err),
        None => self.report_uncaught(err),
      }
      return;
    }
    j.results[index] = Some(exports);
    j.remaining -= 1;
    if j.remaining == 0 {
      if let Some(cb) = j.on_resolved.take() {
        let results = j.results.iter().cloned().map(|r| r.unwrap()).collect();
        drop(j);
        cb(results);
      }
    }
  }
}
