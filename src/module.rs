// Copyright 2018-2026 the Deno authors. All rights reserved. MIT license.
//! The per-URL Module record and its lifecycle (§3, §4.4 of the spec).

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::Value;

use crate::error::LoaderError;
use crate::require::RequireFn;
use crate::specifier::Specifier;

/// The exports container. Pre-allocated at intern time and mutated in
/// place; every dependent is handed the same `Rc<RefCell<Value>>`, so
/// cyclic partners observe a stable identity even before the factory that
/// owns it has run.
pub type ExportsHandle = Rc<RefCell<Value>>;

/// A factory return of `Ok(None)` keeps the pre-allocated (possibly
/// in-place-mutated) exports; `Ok(Some(v))` replaces its contents.
pub type FactoryResult = Result<Option<Value>, LoaderError>;

/// The callable passed to `define`. Consumes the resolved argument list
/// built from `deps`, in the same order they were listed.
pub type Factory = Box<dyn FnOnce(Vec<Arg>) -> FactoryResult>;

/// A continuation waiting on a Module reaching a terminal state.
pub type NotifyFn = Box<dyn FnOnce(Result<(), Arc<LoaderError>>)>;

/// One resolved entry of a Module's dependency list. Pseudo-dependencies are
/// recognized by literal specifier text during resolution (§4.5) and never
/// reach the Registry.
#[derive(Clone)]
pub enum DepRef {
  Module(Specifier),
  Require,
  Exports,
  Meta,
}

/// The value passed to a factory for one entry of its `deps` list.
pub enum Arg {
  Exports(ExportsHandle),
  Require(RequireFn),
  Meta(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
  Initialized,
  Loading,
  WaitingForTurn,
  Executing,
  Executed,
  Failed,
}

impl ModuleState {
  pub fn is_terminal(self) -> bool {
    matches!(self, ModuleState::Executed | ModuleState::Failed)
  }
}

pub struct Module {
  pub specifier: Specifier,
  pub state: ModuleState,
  pub deps: Vec<DepRef>,
  pub factory: Option<Factory>,
  pub exports: ExportsHandle,
  pub notify: Vec<NotifyFn>,
  pub error: Option<Arc<LoaderError>>,
}

impl Module {
  pub fn new(specifier: Specifier) -> Self {
    Module {
      specifier,
      state: ModuleState::Initialized,
      deps: Vec::new(),
      factory: None,
      exports: Rc::new(RefCell::new(Value::Object(serde_json::Map::new()))),
      notify: Vec::new(),
      error: None,
    }
  }
}
