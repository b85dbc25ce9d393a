// Copyright 2018-2026 the Deno authors. All rights reserved. MIT license.
//! URL canonicalization for dependency specifiers.
//!
//! A [`Specifier`] is the Registry key: two syntactically different
//! specifier strings that resolve to the same URL must produce the same
//! `Specifier`, which is what lets `./y.js`, `y.js` and `../y/y.js` dedupe
//! to a single Module.

use std::fmt;

use url::Url;

use crate::error::LoaderError;

/// An absolute, canonical module URL. Fragments are significant (they are
/// part of the Registry key); query strings are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Specifier(Url);

impl Specifier {
  /// Parse an absolute URL with no referrer, e.g. the document base URL.
  pub fn parse_absolute(url: &str) -> Result<Self, LoaderError> {
    Url::parse(url)
      .map(Specifier)
      .map_err(|_| LoaderError::InvalidSpecifier(url.to_string()))
  }

  /// Resolve `specifier` (relative, absolute, or protocol-relative) against
  /// `referrer`, per the standard URL resolution algorithm.
  pub fn resolve(specifier: &str, referrer: &Specifier) -> Result<Self, LoaderError> {
    Url::options()
      .base_url(Some(&referrer.0))
      .parse(specifier)
      .map(Specifier)
      .map_err(|_| LoaderError::InvalidSpecifier(specifier.to_string()))
  }

  /// Return a copy of this specifier with `fragment` set, overwriting any
  /// existing fragment. Used to mint distinct identities for the anonymous
  /// top-level modules that all share the document base URL.
  pub fn with_fragment(&self, fragment: &str) -> Self {
    let mut url = self.0.clone();
    url.set_fragment(Some(fragment));
    Specifier(url)
  }

  pub fn as_url(&self) -> &Url {
    &self.0
  }
}

impl fmt::Display for Specifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn s(url: &str) -> Specifier {
    Specifier::parse_absolute(url).unwrap()
  }

  #[test]
  fn dedupes_syntactic_variants() {
    let referrer = s("https://example.com/lib/main.js");
    let variants = ["./y.js", "y.js", "../lib/y.js", "z/../y.js"];
    let resolved: Vec<_> = variants
      .iter()
      .map(|v| Specifier::resolve(v, &referrer).unwrap())
      .collect();
    for r in &resolved[1..] {
      assert_eq!(&resolved[0], r);
    }
    assert_eq!(resolved[0].to_string(), "https://example.com/lib/y.js");
  }

  #[test]
  fn preserves_fragment_and_query() {
    let referrer = s("https://example.com/main.js");
    let resolved = Specifier::resolve("./mod.js?x=1#frag", &referrer).unwrap();
    assert_eq!(resolved.to_string(), "https://example.com/mod.js?x=1#frag");
  }

  #[test]
  fn fragment_distinguishes_otherwise_equal_urls() {
    let base = s("https://example.com/index.html");
    let a = base.with_fragment("L0");
    let b = base.with_fragment("L1");
    assert_ne!(a, b);
  }

  #[test]
  fn invalid_specifier_is_rejected() {
    let referrer = s("https://example.com/main.js");
    assert!(Specifier::resolve("http://[::bad", &referrer).is_err());
  }
}
