//! Test utilities for jake-lib.
//!
//! Projects live in a [`MemoryFs`] rooted at [`ROOT`], with the counters
//! reset after loading so tests only see reads and writes they cause.

use std::rc::Rc;

use crate::build::Build;
use crate::fs::MemoryFs;

pub const ROOT: &str = "/project";

/// Create a project from a `jake.yml` body and `(relative path, contents)`
/// pairs, and load it.
pub fn project(config: &str, files: &[(&str, &str)]) -> (Rc<MemoryFs>, Rc<Build>) {
  let fs = Rc::new(MemoryFs::new());
  fs.insert(format!("{}/jake.yml", ROOT), config);
  for (path, contents) in files {
    fs.insert(format!("{}/{}", ROOT, path), contents);
  }
  let build = Build::load_with(ROOT, fs.clone()).expect("test project should load");
  fs.reset_counters();
  (fs, build)
}
