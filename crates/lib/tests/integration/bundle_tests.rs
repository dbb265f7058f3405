//! Bundle aggregation and reference handling.

use std::rc::Rc;

use jake_lib::{ConfigError, Error};

use super::common::{CORE_ALL, CORE_ALL_FILES, path, project};

#[test]
fn core_all_example() {
  let (_, build) = project(CORE_ALL, CORE_ALL_FILES);
  let core = build.package("core").unwrap();
  let all = build.package("all").unwrap();

  assert_eq!(&*core.source().unwrap(), "A\n\n\nB");
  assert_eq!(&*all.source().unwrap(), "A\n\n\nB");
  assert_eq!(all.files().unwrap(), vec![path("a.js"), path("b.js")]);
  assert_eq!(all.kind(), "bundle");
}

#[test]
fn bundles_of_bundles_aggregate_recursively() {
  let (_, build) = project(
    r#"
packages:
  p1: [a]
  p2: [b]
bundles:
  b2: [p1]
  b3: [b2, p2]
"#,
    &[("a.js", "A"), ("b.js", "B")],
  );
  let b3 = build.package("b3").unwrap();
  assert_eq!(&*b3.source().unwrap(), "A\n\n\nB");
  assert_eq!(&*b3.code("src").unwrap(), "A\n\n\nB");
  assert_eq!(b3.files().unwrap(), vec![path("a.js"), path("b.js")]);
}

#[test]
fn shared_dependencies_are_read_once() {
  let (fs, build) = project(
    "packages:\n  core: [a]\nbundles:\n  one: [core]\n  two: [core, one]",
    &[("a.js", "A")],
  );
  assert_eq!(&*build.package("two").unwrap().source().unwrap(), "A\n\n\nA");
  assert_eq!(fs.reads(), 1);
}

#[test]
fn unknown_reference_fails_on_dereference_only() {
  let (_, build) = project("bundles:\n  all: [core, ghost]\npackages:\n  core: [a]", &[("a.js", "A")]);
  let all = build.package("all").unwrap();

  let err = all.source().unwrap_err();
  assert!(matches!(err.as_config(), Some(ConfigError::UnknownReference(name)) if name == "ghost"));
  assert!(all.files().is_err());
}

#[test]
fn resolution_is_deterministic() {
  let config = "packages:\n  x: [c, a]\n  y: [b]\nbundles:\n  all: [y, x]";
  let files = [("a.js", "A"), ("b.js", "B"), ("c.js", "C")];

  let outputs: Vec<Rc<str>> = (0..3)
    .map(|_| {
      let (_, build) = project(config, &files);
      build.package("all").unwrap().source().unwrap()
    })
    .collect();
  assert!(outputs.iter().all(|o| **o == *"B\n\n\nC\n\n\nA"));
}

#[test]
fn cycles_are_reported_with_their_path() {
  let (_, build) = project("bundles:\n  a: [b]\n  b: [a]", &[]);
  let err = build.package("a").unwrap().source().unwrap_err();
  match err {
    Error::Config(ConfigError::Cycle(path)) => assert_eq!(path, vec!["a", "b", "a"]),
    other => panic!("expected cycle, got {:?}", other),
  }
}

#[test]
fn long_form_accepts_packages_key() {
  let (_, build) = project(
    "packages:\n  core: [a]\nbundles:\n  all:\n    packages: [core]\n    output: false",
    &[("a.js", "A")],
  );
  assert_eq!(&*build.package("all").unwrap().source().unwrap(), "A");
  assert!(build.targets("all").unwrap().is_empty());
}
