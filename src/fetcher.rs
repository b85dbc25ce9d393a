// Copyright 2018-2026 the Deno authors. All rights reserved. MIT license.
//! The abstract "fetch and evaluate a URL" collaborator (§4.3 of the spec).
//!
//! The real script transport — inserting a `<script>` element, waiting for
//! its load/error event — is the host page's job and is out of scope here
//! (§1). A `Fetcher` only needs to call back into the [`Loader`] it is
//! handed to report what happened.

use crate::loader::Loader;
use crate::specifier::Specifier;

/// Given a Module in `Initialized` state, begin loading `specifier` and
/// report the outcome back through `loader`:
///
/// - on success, wrap the script's evaluation in
///   [`Loader::enter_script`]/[`Loader::exit_script`] so that any `define`
///   call the script makes binds to the right Module;
/// - on failure, call [`Loader::script_failed`] directly (the script never
///   ran, so there is no enter/exit bracket).
///
/// Implementations may report the outcome synchronously (as a test
/// `MockFetcher` does) or after a real asynchronous network round trip —
/// the engine does not care, since it only ever advances in response to
/// these callbacks.
pub trait Fetcher {
  fn fetch(&self, loader: Loader, specifier: Specifier);
}
