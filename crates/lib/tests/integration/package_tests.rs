//! Package resolution, concatenation and memoization.

use jake_lib::{ConfigError, Error};

use super::common::{path, project};

#[test]
fn files_keep_declaration_order_and_duplicates() {
  let (_, build) = project(
    "source_directory: src\npackages:\n  core: [b, a, b]",
    &[("src/a.js", "A"), ("src/b.js", "B")],
  );
  let files = build.package("core").unwrap().files().unwrap();
  assert_eq!(files, vec![path("src/b.js"), path("src/a.js"), path("src/b.js")]);
}

#[test]
fn source_joins_trimmed_files_with_two_blank_lines() {
  let (_, build) = project("packages:\n  core: [a, b]", &[("a.js", "\n  A\n\n"), ("b.js", "B\n")]);
  assert_eq!(&*build.package("core").unwrap().source().unwrap(), "A\n\n\nB");
}

#[test]
fn exact_file_name_wins_over_extension() {
  let (_, build) = project("packages:\n  core: [a.txt]", &[("a.txt", "text"), ("a.txt.js", "js")]);
  assert_eq!(&*build.package("core").unwrap().source().unwrap(), "text");
}

#[test]
fn source_is_read_once() {
  let (fs, build) = project("packages:\n  core: [a, b]", &[("a.js", "A"), ("b.js", "B")]);
  let core = build.package("core").unwrap();

  let first = core.source().unwrap();
  assert_eq!(fs.reads(), 2);
  let second = core.source().unwrap();
  assert_eq!(fs.reads(), 2);
  assert_eq!(first, second);

  core.code("src").unwrap();
  assert_eq!(fs.reads(), 2);
}

#[test]
fn code_is_cached_per_variant() {
  let (_, build) = project(
    "builds:\n  src: []\n  min: [strip_comments, trim_lines]\npackages:\n  core: [a]",
    &[("a.js", "var a = 1; // one\n\nvar b = 2;")],
  );
  let core = build.package("core").unwrap();

  assert_eq!(&*core.code("min").unwrap(), "var a = 1;\nvar b = 2;");
  assert_eq!(&*core.code("src").unwrap(), "var a = 1; // one\n\nvar b = 2;");
  assert_eq!(&*core.code("min").unwrap(), "var a = 1;\nvar b = 2;");
}

#[test]
fn unknown_step_fails_only_its_variant() {
  let (_, build) = project(
    "builds:\n  src: []\n  broken: [nope]\npackages:\n  core: [a]",
    &[("a.js", "A")],
  );
  let core = build.package("core").unwrap();
  assert_eq!(&*core.code("src").unwrap(), "A");

  let err = core.code("broken").unwrap_err();
  assert!(matches!(err.as_config(), Some(ConfigError::UnknownTransformation(name)) if name == "nope"));
}

#[test]
fn missing_file_names_the_path() {
  let (_, build) = project("packages:\n  core: [a, gone]", &[("a.js", "A")]);
  let err = build.package("core").unwrap().source().unwrap_err();
  match err {
    Error::Read { path: missing, .. } => assert_eq!(missing, path("gone")),
    other => panic!("expected read error, got {:?}", other),
  }
}

#[test]
fn failed_reads_are_retried() {
  let (fs, build) = project("packages:\n  core: [a]", &[]);
  let core = build.package("core").unwrap();
  assert!(core.source().is_err());

  fs.insert(path("a.js"), "late");
  assert_eq!(&*core.source().unwrap(), "late");
}
