//! Running builds: freshness, force, partial failure and checks.

use std::time::{Duration, SystemTime};

use jake_lib::{ConfigError, TargetStatus};

use super::common::{CORE_ALL, CORE_ALL_FILES, path, project};

#[test]
fn writes_every_target_in_document_order() {
  let (fs, build) = project(CORE_ALL, CORE_ALL_FILES);
  let report = build.run();

  assert!(report.is_success());
  let written: Vec<_> = report.outcomes.iter().map(|o| o.name.as_str()).collect();
  assert_eq!(written, vec!["core", "all"]);
  assert_eq!(fs.contents(&path("core-src.js")).as_deref(), Some("A\n\n\nB"));
  assert_eq!(fs.contents(&path("all-src.js")).as_deref(), Some("A\n\n\nB"));
}

#[test]
fn fresh_outputs_are_skipped() {
  let (fs, build) = project(CORE_ALL, CORE_ALL_FILES);
  build.run();
  fs.reset_counters();

  let report = build.run();
  assert_eq!(report.up_to_date(), 2);
  assert_eq!(fs.writes(), 0);
}

#[test]
fn newer_input_rewrites_dependents_only() {
  let (fs, build) = project(
    "packages:\n  core: [a]\n  ui: [b]\nbundles:\n  all: [core]",
    &[("a.js", "A"), ("b.js", "B")],
  );
  build.run();
  fs.touch(&path("a.js"));
  fs.reset_counters();

  let report = build.run();
  let statuses: Vec<_> = report
    .outcomes
    .iter()
    .map(|o| (o.name.as_str(), o.status.as_str()))
    .collect();
  assert_eq!(
    statuses,
    vec![("core", "written"), ("ui", "up_to_date"), ("all", "written")]
  );
  assert_eq!(fs.writes(), 2);
}

#[test]
fn equal_timestamps_count_as_fresh() {
  let (fs, build) = project("packages:\n  core: [a]", &[("a.js", "A")]);
  build.run();
  let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
  fs.set_modified(&path("a.js"), stamp);
  fs.set_modified(&path("core-src.js"), stamp);

  assert_eq!(build.run().up_to_date(), 1);
}

#[test]
fn force_rewrites_everything() {
  let (fs, build) = project(CORE_ALL, CORE_ALL_FILES);
  build.run();
  fs.reset_counters();

  build.force();
  let report = build.run();
  assert_eq!(report.written(), 2);
  assert_eq!(fs.writes(), 2);
  assert!(build.is_forced());
}

#[test]
fn one_failure_does_not_block_other_targets() {
  let (fs, build) = project(
    "packages:\n  core: [a]\nbundles:\n  bad: [ghost]\n  all: [core]",
    &[("a.js", "A")],
  );
  let report = build.run();

  assert!(!report.is_success());
  assert_eq!(report.written(), 2);
  assert_eq!(report.failed(), 1);
  assert!(fs.exists(&path("all-src.js")));

  let (outcome, err) = report.failures().next().unwrap();
  assert_eq!(outcome.name, "bad");
  assert!(matches!(err.as_config(), Some(ConfigError::UnknownReference(_))));
  assert!(matches!(outcome.status, TargetStatus::Failed(_)));
}

#[test]
fn variants_write_separate_outputs() {
  let (fs, build) = project(
    "build_directory: build\nlayout: apart\nbuilds:\n  src: []\n  min: [trim_lines]\npackages:\n  core: [a]",
    &[("a.js", "A  \n\nB")],
  );
  assert!(build.run().is_success());
  assert_eq!(fs.contents(&path("build/src/core.js")).as_deref(), Some("A  \n\nB"));
  assert_eq!(fs.contents(&path("build/min/core.js")).as_deref(), Some("A\nB"));
}

#[test]
fn check_is_clean_for_a_valid_project() {
  let (fs, build) = project(CORE_ALL, CORE_ALL_FILES);
  let report = build.check().unwrap();
  assert!(report.is_ok());
  assert_eq!(report.order, vec!["core", "all"]);
  assert_eq!(fs.reads(), 0);
}
