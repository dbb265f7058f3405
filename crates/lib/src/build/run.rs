use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::{debug, error, info, warn};

use super::Build;
use crate::buildable::Buildable;
use crate::config::OutputRule;
use crate::error::{ConfigError, Error, Result};
use crate::fs::normalize_path;
use crate::lua::globals::{BUILD_COMPLETE, FILE_CREATED};
use crate::template;

/// One output file: a unit written through one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
  pub name: String,
  pub variant: String,
  pub path: PathBuf,
}

#[derive(Debug)]
pub enum TargetStatus {
  Written,
  UpToDate,
  /// Would be written by the next run. Only produced by [`Build::plan`].
  Stale,
  Failed(Error),
}

impl TargetStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      TargetStatus::Written => "written",
      TargetStatus::UpToDate => "up_to_date",
      TargetStatus::Stale => "stale",
      TargetStatus::Failed(_) => "failed",
    }
  }
}

/// What happened to a target.
///
/// `variant` and `path` are absent when the unit failed before its targets
/// could be listed.
#[derive(Debug)]
pub struct TargetOutcome {
  pub name: String,
  pub variant: Option<String>,
  pub path: Option<PathBuf>,
  pub status: TargetStatus,
}

impl TargetOutcome {
  fn unit_failed(name: &str, err: Error) -> Self {
    Self {
      name: name.to_string(),
      variant: None,
      path: None,
      status: TargetStatus::Failed(err),
    }
  }

  fn of(target: Target, status: TargetStatus) -> Self {
    Self {
      name: target.name,
      variant: Some(target.variant),
      path: Some(target.path),
      status,
    }
  }
}

/// The result of [`Build::run`] or [`Build::plan`].
#[derive(Debug, Default)]
pub struct RunReport {
  pub outcomes: Vec<TargetOutcome>,
  /// Errors raised by hooks. They do not fail individual targets.
  pub hook_errors: Vec<Error>,
  pub elapsed: Duration,
}

impl RunReport {
  pub fn written(&self) -> usize {
    self.count(|s| matches!(s, TargetStatus::Written))
  }

  pub fn up_to_date(&self) -> usize {
    self.count(|s| matches!(s, TargetStatus::UpToDate))
  }

  pub fn stale(&self) -> usize {
    self.count(|s| matches!(s, TargetStatus::Stale))
  }

  pub fn failures(&self) -> impl Iterator<Item = (&TargetOutcome, &Error)> {
    self.outcomes.iter().filter_map(|outcome| match &outcome.status {
      TargetStatus::Failed(err) => Some((outcome, err)),
      _ => None,
    })
  }

  pub fn failed(&self) -> usize {
    self.failures().count()
  }

  pub fn is_success(&self) -> bool {
    self.failed() == 0 && self.hook_errors.is_empty()
  }

  fn count(&self, f: impl Fn(&TargetStatus) -> bool) -> usize {
    self.outcomes.iter().filter(|o| f(&o.status)).count()
  }
}

#[derive(Serialize)]
struct FileCreated<'a> {
  name: &'a str,
  variant: &'a str,
  path: String,
}

#[derive(Serialize)]
struct BuildComplete {
  written: usize,
  skipped: usize,
  failed: usize,
}

impl Build {
  /// The targets of one unit, in `builds` order.
  ///
  /// A unit with `output: false` has none. A unit listing its own `builds`
  /// must only name configured variants.
  pub fn targets(&self, name: &str) -> Result<Vec<Target>> {
    let unit = self.package(name)?;
    let spec = unit.spec();
    if spec.output == OutputRule::Disabled {
      return Ok(Vec::new());
    }

    let variants = match &spec.builds {
      Some(names) => names.iter().map(|n| self.variant(n)).collect::<Result<Vec<_>>>()?,
      None => self.config.variants.iter().collect(),
    };

    let config = &self.config;
    Ok(
      variants
        .into_iter()
        .map(|variant| {
          let path = match &spec.output {
            OutputRule::Template(template) => normalize_path(
              &config
                .build_directory
                .join(template.replace("{name}", name).replace("{variant}", &variant.name)),
            ),
            _ => config
              .layout
              .output_path(&config.build_directory, name, &variant.name, &config.extension),
          };
          Target {
            name: name.to_string(),
            variant: variant.name.clone(),
            path,
          }
        })
        .collect(),
    )
  }

  /// Files an output depends on: the unit's sources and its header.
  pub fn inputs(&self, unit: &dyn Buildable) -> Result<Vec<PathBuf>> {
    let mut inputs = unit.files()?;
    if let Some(header) = self.header_path(unit) {
      inputs.push(header);
    }
    Ok(inputs)
  }

  /// Whether `output` needs writing.
  ///
  /// It does if it is missing, if any input is newer, or if an input's
  /// timestamp cannot be read.
  pub fn is_stale(&self, output: &Path, inputs: &[PathBuf]) -> bool {
    let Ok(written) = self.fs.modified(output) else {
      return true;
    };
    inputs.iter().any(|input| match self.fs.modified(input) {
      Ok(modified) => modified > written,
      Err(_) => true,
    })
  }

  /// Write every stale target, or every target if forced.
  ///
  /// A failing target does not stop the run; it is recorded and the
  /// remaining targets are still processed. Targets sharing an output path
  /// all fail with [`ConfigError::OutputCollision`] and none of them is
  /// written.
  pub fn run(&self) -> RunReport {
    let start = Instant::now();
    let mut report = RunReport::default();

    let (units, shared) = self.all_targets();
    for (name, targets) in units {
      let targets = match targets {
        Ok(targets) => targets,
        Err(err) => {
          error!(name = %name, error = %err, "cannot list targets");
          report.outcomes.push(TargetOutcome::unit_failed(name, err));
          continue;
        }
      };

      for target in targets {
        let result = match collision(&shared, &target) {
          Some(err) => Err(err),
          None => self.build_target(&target),
        };
        let status = match result {
          Ok(status) => status,
          Err(err) => {
            error!(name = %target.name, variant = %target.variant, error = %err, "target failed");
            TargetStatus::Failed(err)
          }
        };

        if matches!(status, TargetStatus::Written) {
          let info = FileCreated {
            name: &target.name,
            variant: &target.variant,
            path: target.path.to_string_lossy().to_string(),
          };
          if let Err(err) = self.scope.fire(FILE_CREATED, self.handle(), &info) {
            report.hook_errors.push(err.into());
          }
        }

        report.outcomes.push(TargetOutcome::of(target, status));
      }
    }

    let complete = BuildComplete {
      written: report.written(),
      skipped: report.up_to_date(),
      failed: report.failed(),
    };
    if let Err(err) = self.scope.fire(BUILD_COMPLETE, self.handle(), &complete) {
      report.hook_errors.push(err.into());
    }

    report.elapsed = start.elapsed();
    info!(
      written = complete.written,
      up_to_date = complete.skipped,
      failed = complete.failed,
      elapsed_ms = report.elapsed.as_millis() as u64,
      "build finished"
    );
    report
  }

  /// Report which targets a run would write, without writing anything.
  pub fn plan(&self) -> RunReport {
    let start = Instant::now();
    let mut report = RunReport::default();

    let (units, shared) = self.all_targets();
    for (name, targets) in units {
      let targets = match targets {
        Ok(targets) => targets,
        Err(err) => {
          report.outcomes.push(TargetOutcome::unit_failed(name, err));
          continue;
        }
      };

      for target in targets {
        let stale = match collision(&shared, &target) {
          Some(err) => Err(err),
          None => self.target_is_stale(&target),
        };
        let status = match stale {
          Ok(true) => TargetStatus::Stale,
          Ok(false) => TargetStatus::UpToDate,
          Err(err) => TargetStatus::Failed(err),
        };
        report.outcomes.push(TargetOutcome::of(target, status));
      }
    }

    report.elapsed = start.elapsed();
    report
  }

  /// Targets of every unit in declaration order, with the output paths
  /// that more than one of them would write.
  fn all_targets(&self) -> (Vec<(&str, Result<Vec<Target>>)>, HashMap<PathBuf, Vec<String>>) {
    let units: Vec<_> = self
      .config
      .units
      .iter()
      .map(|entry| (entry.name.as_str(), self.targets(&entry.name)))
      .collect();
    let shared = shared_outputs(units.iter().filter_map(|(_, t)| t.as_ref().ok()).flatten())
      .into_iter()
      .collect();
    (units, shared)
  }

  fn target_is_stale(&self, target: &Target) -> Result<bool> {
    if self.is_forced() {
      return Ok(true);
    }
    let unit = self.package(&target.name)?;
    let inputs = self.inputs(unit.as_ref())?;
    Ok(self.is_stale(&target.path, &inputs))
  }

  /// Write one target unless it is fresh.
  pub fn build_target(&self, target: &Target) -> Result<TargetStatus> {
    if !self.target_is_stale(target)? {
      debug!(name = %target.name, variant = %target.variant, "up to date");
      return Ok(TargetStatus::UpToDate);
    }

    let unit = self.package(&target.name)?;
    let code = unit.code(&target.variant)?;
    let header = self.render_header(unit.as_ref(), &target.variant)?;
    let contents = if header.is_empty() {
      code.to_string()
    } else {
      format!("{}\n{}", header, code)
    };

    self.fs.write(&target.path, &contents).map_err(|source| Error::Write {
      path: target.path.clone(),
      source,
    })?;
    info!(name = %target.name, variant = %target.variant, path = %target.path.display(), "wrote");
    Ok(TargetStatus::Written)
  }

  fn header_path(&self, unit: &dyn Buildable) -> Option<PathBuf> {
    let header = unit.spec().header.as_ref().or(self.config.header.as_ref())?;
    Some(self.locate_source(header))
  }

  /// Render the unit's header for `variant`, or an empty string if it has
  /// none.
  pub fn render_header(&self, unit: &dyn Buildable, variant: &str) -> Result<String> {
    let Some(path) = self.header_path(unit) else {
      return Ok(String::new());
    };
    let text = self.read_source_file(&path)?;

    let spec = unit.spec();
    let meta = match &spec.meta {
      Value::Null => Value::Mapping(Mapping::new()),
      meta => meta.clone(),
    };
    let env = self.scope.template_env(self.handle(), unit.name(), variant, &meta)?;
    let rendered = template::render(&text, |expr| {
      self.scope.eval_in(&env, expr).map_err(|err| {
        warn!(name = %unit.name(), expr, "header expression failed");
        Error::from(err)
      })
    })?;
    Ok(rendered.trim().to_string())
  }
}

/// Output paths claimed by more than one target, in order of first claim.
///
/// Each owner is labelled `name (variant)`.
pub(crate) fn shared_outputs<'a>(targets: impl IntoIterator<Item = &'a Target>) -> Vec<(PathBuf, Vec<String>)> {
  let mut claims: Vec<(&Path, Vec<String>)> = Vec::new();
  let mut index: HashMap<&Path, usize> = HashMap::new();
  for target in targets {
    let owner = format!("{} ({})", target.name, target.variant);
    match index.get(target.path.as_path()) {
      Some(&i) => claims[i].1.push(owner),
      None => {
        index.insert(&target.path, claims.len());
        claims.push((&target.path, vec![owner]));
      }
    }
  }
  claims
    .into_iter()
    .filter(|(_, owners)| owners.len() > 1)
    .map(|(path, owners)| (path.to_path_buf(), owners))
    .collect()
}

fn collision(shared: &HashMap<PathBuf, Vec<String>>, target: &Target) -> Option<Error> {
  let owners = shared.get(&target.path)?;
  Some(
    ConfigError::OutputCollision {
      path: target.path.clone(),
      owners: owners.clone(),
    }
    .into(),
  )
}
