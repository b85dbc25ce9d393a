// Copyright 2018-2026 the Deno authors. All rights reserved. MIT license.
//! Error kinds raised by the graph engine (see §7 of the spec).

use thiserror::Error;

use crate::specifier::Specifier;

/// A failure captured on a Module, or raised while resolving/fetching one.
///
/// `Fetch` and `Factory` failures are stored on the originating Module as
/// `Arc<LoaderError>` and handed unchanged (not re-wrapped) to every
/// transitive dependent that fails as a consequence.
#[derive(Debug, Clone, Error)]
pub enum LoaderError {
  /// A specifier string could not be resolved against its referrer.
  #[error("Unable to resolve dependency specifier: {0}")]
  InvalidSpecifier(String),

  /// The script at `specifier` failed to load (network error, 404, or the
  /// host failed to parse/evaluate it).
  #[error("Failed to fetch {0}")]
  Fetch(Specifier),

  /// The factory passed to `define` threw/panicked.
  #[error("Uncaught error in module factory for {specifier}: {message}")]
  Factory { specifier: Specifier, message: String },

  /// `define` was called a second time while evaluating the same script.
  #[error("define() was called more than once while evaluating {0}")]
  DuplicateDefine(Specifier),
}

pub type Result<T> = std::result::Result<T, LoaderError>;
