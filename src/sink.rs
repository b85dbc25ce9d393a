// Copyright 2018-2026 the Deno authors. All rights reserved. MIT license.
//! The host's uncaught-error channel (§6, §7).

use crate::error::LoaderError;

/// Receives failures that have no registered handler: a top-level Module
/// that failed, or a `require()` call whose caller omitted `onFailure`.
pub trait UncaughtErrorSink {
  fn uncaught(&self, err: &LoaderError);
}

/// Default sink: logs at `error` level, matching how the reference runtime
/// surfaces unhandled graph failures.
pub struct LoggingSink;

impl UncaughtErrorSink for LoggingSink {
  fn uncaught(&self, err: &LoaderError) {
    log::error!("Uncaught (in module graph) {err}");
  }
}

#[cfg(test)]
pub mod test_support {
  use std::cell::RefCell;
  use std::rc::Rc;

  use super::*;

  /// Captures every uncaught error for assertions instead of logging it.
  #[derive(Clone, Default)]
  pub struct CapturingSink(pub Rc<RefCell<Vec<String>>>);

  impl UncaughtErrorSink for CapturingSink {
    fn uncaught(&self, err: &LoaderError) {
      self.0.borrow_mut().push(err.to_string());
    }
  }
}
