use std::path::PathBuf;
use std::rc::{Rc, Weak};

use tracing::debug;

use super::{Buildable, Memo, join, upgrade};
use crate::build::Build;
use crate::config::UnitSpec;
use crate::error::Result;

/// A unit aggregating other packages or bundles, in declared order.
///
/// Dependencies are looked up by name only when first needed, so a bundle
/// may name units declared after it.
pub struct Bundle {
  name: String,
  build: Weak<Build>,
  spec: UnitSpec,
  dependencies: Vec<String>,
  memo: Memo,
}

impl Bundle {
  pub fn new(name: impl Into<String>, build: Weak<Build>, spec: UnitSpec, dependencies: Vec<String>) -> Self {
    Self {
      name: name.into(),
      build,
      spec,
      dependencies,
      memo: Memo::default(),
    }
  }

  /// Apply `f` to each dependency in order, with this bundle marked as
  /// being resolved.
  fn each_dependency<T, F>(&self, mut f: F) -> Result<Vec<T>>
  where
    F: FnMut(&dyn Buildable) -> Result<T>,
  {
    let build = upgrade(&self.build, &self.name)?;
    let _guard = build.enter(&self.name)?;
    self
      .dependencies
      .iter()
      .map(|dependency| {
        let unit = build.package(dependency)?;
        f(unit.as_ref())
      })
      .collect()
  }
}

impl Buildable for Bundle {
  fn name(&self) -> &str {
    &self.name
  }

  fn spec(&self) -> &UnitSpec {
    &self.spec
  }

  fn files(&self) -> Result<Vec<PathBuf>> {
    let nested = self.each_dependency(|unit| unit.files())?;
    Ok(nested.into_iter().flatten().collect())
  }

  fn source(&self) -> Result<Rc<str>> {
    self.memo.source(|| {
      let parts = self.each_dependency(|unit| unit.source())?;
      debug!(bundle = %self.name, parts = parts.len(), "concatenated source");
      Ok(join(parts))
    })
  }

  fn code(&self, variant: &str) -> Result<Rc<str>> {
    upgrade(&self.build, &self.name)?.variant(variant)?;
    self.memo.code(variant, || {
      let parts = self.each_dependency(|unit| unit.code(variant))?;
      debug!(bundle = %self.name, variant, "concatenated code");
      Ok(join(parts))
    })
  }
}
