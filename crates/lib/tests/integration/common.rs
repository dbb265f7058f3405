//! Shared test helpers for jake-lib integration tests.

use std::path::PathBuf;
use std::rc::Rc;

use jake_lib::Build;
use jake_lib::fs::MemoryFs;

pub const ROOT: &str = "/project";

/// Absolute path of a file inside the test project.
pub fn path(relative: &str) -> PathBuf {
  PathBuf::from(ROOT).join(relative)
}

/// Create an in-memory project with a `jake.yml` and source files.
pub fn memory_project(config: &str, files: &[(&str, &str)]) -> Rc<MemoryFs> {
  let fs = Rc::new(MemoryFs::new());
  fs.insert(path("jake.yml"), config);
  for (relative, contents) in files {
    fs.insert(path(relative), contents);
  }
  fs
}

/// Load a build over `fs` and reset its counters.
pub fn load(fs: &Rc<MemoryFs>) -> Rc<Build> {
  let build = Build::load_with(ROOT, fs.clone()).unwrap();
  fs.reset_counters();
  build
}

/// [`memory_project`] followed by [`load`].
pub fn project(config: &str, files: &[(&str, &str)]) -> (Rc<MemoryFs>, Rc<Build>) {
  let fs = memory_project(config, files);
  let build = load(&fs);
  (fs, build)
}

/// The `core`/`all` example: one package of two files and a bundle of it.
pub const CORE_ALL: &str = r#"
packages:
  core: [a, b]
bundles:
  all: [core]
"#;

pub const CORE_ALL_FILES: &[(&str, &str)] = &[("a.js", "A"), ("b.js", "B")];
