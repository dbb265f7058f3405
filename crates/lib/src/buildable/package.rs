use std::path::PathBuf;
use std::rc::{Rc, Weak};

use tracing::debug;

use super::{Buildable, Memo, join, upgrade};
use crate::build::Build;
use crate::config::UnitSpec;
use crate::error::Result;

/// A unit backed by source files.
pub struct Package {
  name: String,
  build: Weak<Build>,
  spec: UnitSpec,
  entries: Vec<String>,
  memo: Memo,
}

impl Package {
  pub fn new(name: impl Into<String>, build: Weak<Build>, spec: UnitSpec, entries: Vec<String>) -> Self {
    Self {
      name: name.into(),
      build,
      spec,
      entries,
      memo: Memo::default(),
    }
  }

}

impl Buildable for Package {
  fn name(&self) -> &str {
    &self.name
  }

  fn spec(&self) -> &UnitSpec {
    &self.spec
  }

  fn files(&self) -> Result<Vec<PathBuf>> {
    let build = upgrade(&self.build, &self.name)?;
    Ok(self.entries.iter().map(|entry| build.locate_source(entry)).collect())
  }

  fn source(&self) -> Result<Rc<str>> {
    self.memo.source(|| {
      let build = upgrade(&self.build, &self.name)?;
      let files = self.files()?;
      let parts = files
        .iter()
        .map(|path| build.read_source_file(path))
        .collect::<Result<Vec<_>>>()?;
      debug!(package = %self.name, files = parts.len(), "concatenated source");
      Ok(join(parts))
    })
  }

  fn code(&self, variant: &str) -> Result<Rc<str>> {
    let build = upgrade(&self.build, &self.name)?;
    let pipeline = build.variant(variant)?;
    self.memo.code(variant, || {
      let source = self.source()?;
      let code = build.apply_variant(pipeline, &source)?;
      debug!(package = %self.name, variant, "applied variant");
      Ok(code)
    })
  }
}
