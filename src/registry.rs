// Copyright 2018-2026 the Deno authors. All rights reserved. MIT license.
//! The process-wide URL-to-Module map (§4.2 of the spec).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::module::Module;
use crate::specifier::Specifier;

/// Owns every Module for the lifetime of the Loader. All other components
/// hold non-owning `Rc<RefCell<Module>>` references.
#[derive(Default)]
pub struct Registry {
  modules: HashMap<Specifier, Rc<RefCell<Module>>>,
}

impl Registry {
  /// Return the existing Module for `specifier`, creating one in
  /// `Initialized` state if this is the first time it has been seen.
  pub fn intern(&mut self, specifier: &Specifier) -> Rc<RefCell<Module>> {
    self
      .modules
      .entry(specifier.clone())
      .or_insert_with(|| Rc::new(RefCell::new(Module::new(specifier.clone()))))
      .clone()
  }

  /// Look up a Module without creating it. Panics if `specifier` was never
  /// interned, which would indicate a bug in the graph engine (every
  /// Specifier reachable from a dependency list is always interned before
  /// being referenced).
  pub fn get(&self, specifier: &Specifier) -> Rc<RefCell<Module>> {
    self
      .modules
      .get(specifier)
      .unwrap_or_else(|| panic!("module {specifier} was never interned"))
      .clone()
  }

  /// Test-only: drop every Module. Does not unload already-evaluated
  /// scripts from the host.
  pub fn reset(&mut self) {
    self.modules.clear();
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.modules.len()
  }
}
