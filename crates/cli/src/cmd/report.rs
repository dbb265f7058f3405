//! Shared rendering of run and plan reports.

use std::path::Path;

use anyhow::anyhow;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use jake_lib::{RunReport, TargetOutcome, TargetStatus};

use crate::output::symbols;

/// One target as printed by `--format json`.
#[derive(Debug, Serialize)]
pub struct TargetSummary {
  pub name: String,
  pub variant: Option<String>,
  pub path: Option<String>,
  pub status: &'static str,
  pub error: Option<String>,
}

impl From<&TargetOutcome> for TargetSummary {
  fn from(outcome: &TargetOutcome) -> Self {
    Self {
      name: outcome.name.clone(),
      variant: outcome.variant.clone(),
      path: outcome.path.as_deref().map(display_path),
      status: outcome.status.as_str(),
      error: match &outcome.status {
        TargetStatus::Failed(err) => Some(err.to_string()),
        _ => None,
      },
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
  pub targets: Vec<TargetSummary>,
  pub written: usize,
  pub up_to_date: usize,
  pub stale: usize,
  pub failed: usize,
  pub hook_errors: Vec<String>,
  pub elapsed_ms: u128,
}

impl From<&RunReport> for ReportSummary {
  fn from(report: &RunReport) -> Self {
    Self {
      targets: report.outcomes.iter().map(TargetSummary::from).collect(),
      written: report.written(),
      up_to_date: report.up_to_date(),
      stale: report.stale(),
      failed: report.failed(),
      hook_errors: report.hook_errors.iter().map(|e| e.to_string()).collect(),
      elapsed_ms: report.elapsed.as_millis(),
    }
  }
}

pub fn display_path(path: &Path) -> String {
  dunce::simplified(path).display().to_string()
}

/// `name (variant)`, or just `name` if the unit failed before its targets
/// were known.
pub fn target_label(outcome: &TargetOutcome) -> String {
  match &outcome.variant {
    Some(variant) => format!("{} ({})", outcome.name, variant),
    None => outcome.name.clone(),
  }
}

pub fn print_outcome(outcome: &TargetOutcome) {
  let label = target_label(outcome);
  let path = outcome.path.as_deref().map(display_path).unwrap_or_default();
  match &outcome.status {
    TargetStatus::Written => println!(
      "  {} {} {} {}",
      symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
      label,
      symbols::ARROW,
      path
    ),
    TargetStatus::Stale => println!(
      "  {} {} {} {}",
      symbols::PLUS.if_supports_color(Stream::Stdout, |s| s.green()),
      label,
      symbols::ARROW,
      path
    ),
    TargetStatus::UpToDate => println!(
      "  {} {}",
      symbols::UNCHANGED.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      label.if_supports_color(Stream::Stdout, |s| s.dimmed())
    ),
    TargetStatus::Failed(err) => eprintln!(
      "  {} {}: {}",
      symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
      label,
      err
    ),
  }
}

/// The error the command exits with when any target failed.
pub fn failure(report: &RunReport) -> Option<anyhow::Error> {
  let mut failures = report.failures();
  let (outcome, err) = failures.next()?;
  let others = failures.count();
  let message = if others == 0 {
    format!("{} failed: {}", target_label(outcome), err)
  } else {
    format!("{} failed: {} (and {} more)", target_label(outcome), err, others)
  };
  Some(anyhow!(message))
}
