//! Packages and bundles.
//!
//! Both kinds of unit share one contract: an ordered list of contributing
//! files, a concatenated source text computed at most once, and a code text
//! per variant computed at most once per variant name. Nothing is read until
//! it is asked for.

mod bundle;
mod package;

pub use bundle::Bundle;
pub use package::Package;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::{Rc, Weak};

use crate::build::Build;
use crate::config::UnitSpec;
use crate::consts::SEPARATOR;
use crate::error::{Error, Result};

/// A unit that can produce source and code.
pub trait Buildable {
  fn name(&self) -> &str;

  fn spec(&self) -> &UnitSpec;

  /// Contributing source files in order. Duplicates are kept.
  fn files(&self) -> Result<Vec<PathBuf>>;

  /// Concatenated source, memoized.
  fn source(&self) -> Result<Rc<str>>;

  /// Source after the named variant's pipeline, memoized per variant.
  fn code(&self, variant: &str) -> Result<Rc<str>>;

  fn kind(&self) -> &'static str {
    self.spec().kind.as_str()
  }
}

/// Lazily filled caches for one unit.
///
/// No borrow is held while a value is being computed, so computing one
/// unit may freely read others.
#[derive(Debug, Default)]
pub struct Memo {
  source: RefCell<Option<Rc<str>>>,
  code: RefCell<BTreeMap<String, Rc<str>>>,
}

impl Memo {
  pub fn source<F>(&self, compute: F) -> Result<Rc<str>>
  where
    F: FnOnce() -> Result<String>,
  {
    if let Some(source) = self.source.borrow().as_ref() {
      return Ok(Rc::clone(source));
    }
    let source: Rc<str> = compute()?.into();
    *self.source.borrow_mut() = Some(Rc::clone(&source));
    Ok(source)
  }

  pub fn code<F>(&self, variant: &str, compute: F) -> Result<Rc<str>>
  where
    F: FnOnce() -> Result<String>,
  {
    if let Some(code) = self.code.borrow().get(variant) {
      return Ok(Rc::clone(code));
    }
    let code: Rc<str> = compute()?.into();
    self.code.borrow_mut().insert(variant.to_string(), Rc::clone(&code));
    Ok(code)
  }
}

#[cfg(test)]
impl Memo {
  fn has_source(&self) -> bool {
    self.source.borrow().is_some()
  }

  /// Variant names with cached code, sorted.
  fn variants(&self) -> Vec<String> {
    self.code.borrow().keys().cloned().collect()
  }
}

/// Join fragments with two blank lines between them.
pub fn join<I, S>(parts: I) -> String
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut out = String::new();
  for (i, part) in parts.into_iter().enumerate() {
    if i > 0 {
      out.push_str(SEPARATOR);
    }
    out.push_str(part.as_ref());
  }
  out
}

pub(crate) fn upgrade(build: &Weak<Build>, name: &str) -> Result<Rc<Build>> {
  build.upgrade().ok_or_else(|| Error::Detached(name.to_string()))
}
