//! Implementation of the `jake build` command.
//!
//! Loads the project, writes every stale target (or every target with
//! `--force`) and prints one line per target.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use jake_lib::Build;

use super::report::{ReportSummary, display_path, failure, print_outcome};
use crate::output::{OutputFormat, format_duration, print_json, print_stat, print_success, print_warning};

pub fn cmd_build(path: &Path, force: bool, format: OutputFormat) -> Result<()> {
  let build = Build::load(path).with_context(|| format!("Failed to load project: {}", display_path(path)))?;
  if force {
    build.force();
  }

  let report = build.run();

  if format.is_json() {
    print_json(&ReportSummary::from(&report))?;
  } else {
    for outcome in &report.outcomes {
      print_outcome(outcome);
    }
    for err in &report.hook_errors {
      print_warning(&format!("hook failed: {}", err));
    }

    println!();
    if report.is_success() {
      print_success("Build complete");
    }
    print_stat("Written", &report.written().to_string());
    print_stat("Up to date", &report.up_to_date().to_string());
    print_stat("Failed", &report.failed().to_string());
    print_stat("Time", &format_duration(report.elapsed));
  }

  info!(root = %display_path(&build.config().root), "build done");

  if let Some(err) = failure(&report) {
    return Err(err);
  }
  if let Some(err) = report.hook_errors.into_iter().next() {
    return Err(err).context("Build hook failed");
  }
  Ok(())
}
