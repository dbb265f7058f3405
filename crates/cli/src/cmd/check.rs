//! Implementation of the `jake check` command.
//!
//! Validates every declaration, bundle reference and variant step, and looks
//! for dependency cycles, without reading any source file.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use jake_lib::Build;

use super::report::display_path;
use crate::output::{OutputFormat, print_error, print_json, print_stat, print_success};

#[derive(Serialize)]
struct CheckSummary {
  ok: bool,
  problems: Vec<String>,
  order: Vec<String>,
}

pub fn cmd_check(path: &Path, format: OutputFormat) -> Result<()> {
  let build = Build::load(path).with_context(|| format!("Failed to load project: {}", display_path(path)))?;
  let report = build.check().context("Failed to check build graph")?;

  if format.is_json() {
    print_json(&CheckSummary {
      ok: report.is_ok(),
      problems: report.problems.iter().map(|e| e.to_string()).collect(),
      order: report.order.clone(),
    })?;
  } else if report.is_ok() {
    let config = build.config();
    print_success("Configuration is valid");
    print_stat("Packages", &config.package_count().to_string());
    print_stat("Bundles", &config.bundle_count().to_string());
    print_stat("Variants", &config.variants.len().to_string());
  } else {
    for problem in &report.problems {
      print_error(&problem.to_string());
    }
  }

  if !report.is_ok() {
    bail!("{} problem(s) found", report.problems.len());
  }
  Ok(())
}
