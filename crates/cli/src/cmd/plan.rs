//! Implementation of the `jake plan` command.

use std::path::Path;

use anyhow::{Context, Result};

use jake_lib::Build;

use super::report::{ReportSummary, display_path, failure, print_outcome};
use crate::output::{OutputFormat, print_info, print_json, print_stat};

pub fn cmd_plan(path: &Path, format: OutputFormat) -> Result<()> {
  let build = Build::load(path).with_context(|| format!("Failed to load project: {}", display_path(path)))?;
  let report = build.plan();

  if format.is_json() {
    print_json(&ReportSummary::from(&report))?;
  } else {
    for outcome in &report.outcomes {
      print_outcome(outcome);
    }

    println!();
    if report.stale() == 0 && report.failed() == 0 {
      print_info("Nothing to build");
    }
    print_stat("Stale", &report.stale().to_string());
    print_stat("Up to date", &report.up_to_date().to_string());
  }

  match failure(&report) {
    Some(err) => Err(err),
    None => Ok(()),
  }
}
