// Copyright 2018-2026 the Deno authors. All rights reserved. MIT license.
//! Dynamic `require(deps, onResolved, onFailure?)` (§4.7 of the spec).

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::LoaderError;
use crate::loader::Loader;
use crate::module::ExportsHandle;
use crate::specifier::Specifier;

pub type OnResolved = Box<dyn FnOnce(Vec<ExportsHandle>)>;
pub type OnFailure = Box<dyn FnOnce(Arc<LoaderError>)>;

/// The value bound to the `require` pseudo-dependency. Cloning is cheap
/// (`Rc`); every factory that lists `require` among its deps gets one bound
/// to its own Module as referrer.
pub type RequireFn =
  Rc<dyn Fn(Vec<String>, OnResolved, Option<OnFailure>)>;

/// Tracks one in-flight `require()` call while its dependencies load and
/// execute. `onFailure` fires at most once, with the first failure
/// encountered; after that, `onResolved` is never called.
pub(crate) struct RequireJoin {
  pub remaining: usize,
  pub results: Vec<Option<ExportsHandle>>,
  pub failed: bool,
  pub on_resolved: Option<OnResolved>,
  pub on_failure: Option<OnFailure>,
}

impl RequireJoin {
  pub fn new(count: usize, on_resolved: OnResolved, on_failure: Option<OnFailure>) -> Self {
    RequireJoin {
      remaining: count,
      results: vec![None; count],
      failed: false,
      on_resolved: Some(on_resolved),
      on_failure,
    }
  }
}

pub(crate) type SharedJoin = Rc<RefCell<RequireJoin>>;

/// Bind a `require` argument to the Module that listed it as a dependency,
/// so calls made from inside a factory resolve relative to that Module's
/// own URL.
pub(crate) fn make_require_fn(loader: Loader, referrer: Specifier) -> RequireFn {
  Rc::new(move |deps, on_resolved, on_failure| {
    loader.require(&referrer, deps, on_resolved, on_failure);
  })
}
