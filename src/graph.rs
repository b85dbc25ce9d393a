// Copyright 2018-2026 the Deno authors. All rights reserved. MIT license.
//! The Dependency Graph Engine: dependency discovery (§4.5) and the
//! cycle-safe post-order execution algorithm (§4.6, §9).
//!
//! Execution is a recursive depth-first walk. A Module is "ready" once
//! every dependency on its list is either already terminal or is a back
//! edge to an ancestor currently on the walk — the latter is exactly how
//! ECMAScript module evaluation tolerates cycles: the cyclic partner sees
//! whatever the ancestor's exports object holds *so far*, not a completed
//! one.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::loader::Loader;
use crate::module::{Arg, DepRef, Module, ModuleState};
use crate::require::make_require_fn;
use crate::specifier::Specifier;

/// Turn the literal dependency strings a `define()` call listed into
/// resolved [`DepRef`]s, recognizing the three pseudo-dependencies by
/// exact text and issuing a fetch for every newly-discovered real Module.
pub(crate) fn resolve_deps(loader: &Loader, referrer: &Specifier, deps_raw: &[String]) -> Vec<DepRef> {
  deps_raw
    .iter()
    .map(|d| match d.as_str() {
      "require" => DepRef::Require,
      "exports" => DepRef::Exports,
      "meta" => DepRef::Meta,
      _ => match Specifier::resolve(d, referrer) {
        Ok(specifier) => {
          log::trace!("{referrer} depends on {specifier}");
          loader.fetch_if_needed(&specifier);
          DepRef::Module(specifier)
        }
        Err(err) => {
          let synthetic = referrer.with_fragment(&format!("invalid-dep:{d}"));
          log::trace!("{referrer} depends on unresolvable specifier {d:?}: {err}");
          loader.fail_synthetic(&synthetic, err);
          DepRef::Module(synthetic)
        }
      },
    })
    .collect()
}

/// Attempt to execute `specifier` and every dependency it still needs.
/// Returns `true` once `specifier` has reached a terminal state (either
/// because it just executed/failed, or because it already had); `false`
/// means some dependency is still loading and this root cannot progress
/// yet. `stack` holds the ancestors currently being walked, so a
/// dependency cycle resolves to the back edge rather than infinite
/// recursion.
pub(crate) fn try_execute_subgraph(loader: &Loader, specifier: &Specifier, stack: &mut Vec<Specifier>) -> bool {
  if stack.contains(specifier) {
    return true;
  }

  let module_rc = loader.registry_get(specifier);
  let state = module_rc.borrow().state;
  match state {
    ModuleState::Executed | ModuleState::Failed | ModuleState::Executing => true,
    ModuleState::Initialized | ModuleState::Loading => false,
    ModuleState::WaitingForTurn => {
      stack.push(specifier.clone());
      let deps = module_rc.borrow().deps.clone();
      let mut ready = true;
      for dep in &deps {
        if let DepRef::Module(dep_specifier) = dep {
          if !try_execute_subgraph(loader, dep_specifier, stack) {
            ready = false;
          }
        }
      }
      stack.pop();
      if ready {
        log::trace!("{specifier} subgraph ready, executing");
        execute(loader, specifier);
        true
      } else {
        log::trace!("{specifier} subgraph not ready yet");
        false
      }
    }
  }
}

/// Run a single Module's factory once every dependency is settled. A
/// Failed dependency propagates the exact same `Arc<LoaderError>` rather
/// than wrapping it again (§4.4).
fn execute(loader: &Loader, specifier: &Specifier) {
  let module_rc = loader.registry_get(specifier);

  let failed_dep = {
    let m = module_rc.borrow();
    m.deps.iter().find_map(|dep| match dep {
      DepRef::Module(dep_specifier) => loader.registry_get(dep_specifier).borrow().error.clone(),
      _ => None,
    })
  };
  if let Some(err) = failed_dep {
    log::trace!("{specifier} failed: dependency already failed ({err})");
    {
      let mut m = module_rc.borrow_mut();
      m.state = ModuleState::Failed;
      m.error = Some(err.clone());
    }
    loader.complete_module(specifier, Err(err));
    return;
  }

  module_rc.borrow_mut().state = ModuleState::Executing;
  let args = build_args(loader, &module_rc, specifier);
  let factory = module_rc.borrow_mut().factory.take();
  let Some(factory) = factory else {
    // Nothing bound a factory for this Module but every dependency is
    // satisfied: treat it as having produced no exports.
    module_rc.borrow_mut().state = ModuleState::Executed;
    loader.complete_module(specifier, Ok(()));
    return;
  };

  match factory(args) {
    Ok(replacement) => {
      if let Some(value) = replacement {
        *module_rc.borrow().exports.borrow_mut() = value;
      }
      module_rc.borrow_mut().state = ModuleState::Executed;
      log::trace!("executed {specifier}");
      loader.complete_module(specifier, Ok(()));
    }
    Err(err) => {
      log::trace!("{specifier} factory threw: {err}");
      let err = Arc::new(err);
      {
        let mut m = module_rc.borrow_mut();
        m.state = ModuleState::Failed;
        m.error = Some(err.clone());
      }
      loader.complete_module(specifier, Err(err));
    }
  }
}

fn build_args(loader: &Loader, module_rc: &Rc<RefCell<Module>>, specifier: &Specifier) -> Vec<Arg> {
  let deps = module_rc.borrow().deps.clone();
  deps
    .into_iter()
    .map(|dep| match dep {
      DepRef::Module(dep_specifier) => Arg::Exports(loader.registry_get(&dep_specifier).borrow().exports.clone()),
      DepRef::Require => Arg::Require(make_require_fn(loader.clone(), specifier.clone())),
      DepRef::Exports => Arg::Exports(module_rc.borrow().exports.clone()),
      DepRef::Meta => Arg::Meta(serde_json::json!({ "url": specifier.to_string() })),
    })
    .collect()
}
