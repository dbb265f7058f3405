//! The build orchestrator.
//!
//! A [`Build`] owns the parsed config, the file system handle and the helper
//! scope. It resolves unit names to shared [`Buildable`] instances, caching
//! one instance per name, and drives output writing.
//!
//! Units hold a weak reference back to their build. Resolution is lazy: a
//! bundle's dependencies are looked up only when its files, source or code
//! are first asked for. The names currently being resolved are kept on a
//! stack so that a bundle reaching itself fails with a cycle error instead
//! of recursing.
//!
//! # Submodules
//!
//! - [`run`] - Targets, freshness checks and writing
//! - [`check`] - Eager validation of the whole graph

pub mod check;
pub mod run;

pub use check::CheckReport;
pub use run::{RunReport, Target, TargetOutcome, TargetStatus};

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use tracing::{debug, info};

use crate::buildable::{Buildable, Bundle, Package};
use crate::config::{Config, UnitKind, UnitSpec, Variant};
use crate::consts::HELPER_FILE;
use crate::error::{ConfigError, Error, Result};
use crate::fs::{FileSystem, LocalFs, locate, normalize_path, read_source};
use crate::lua::{BuildHandle, HelperScope};
use crate::transform::{self, Transform};

pub struct Build {
  config: Config,
  fs: Rc<dyn FileSystem>,
  scope: HelperScope,
  forced: Cell<bool>,
  units: RefCell<HashMap<String, Rc<dyn Buildable>>>,
  resolving: RefCell<Vec<String>>,
  this: Weak<Build>,
}

impl Build {
  /// Load the config at `path` from the local disk.
  pub fn load(path: impl AsRef<Path>) -> Result<Rc<Self>> {
    Self::load_with(path, Rc::new(LocalFs))
  }

  /// Load the config at `path` through `fs`.
  pub fn load_with(path: impl AsRef<Path>, fs: Rc<dyn FileSystem>) -> Result<Rc<Self>> {
    let config = Config::load(fs.as_ref(), path.as_ref())?;
    Self::from_config(config, fs)
  }

  /// Create a build for an already parsed config.
  ///
  /// The `Jakefile` next to the config, if any, is run into a fresh helper
  /// scope.
  pub fn from_config(config: Config, fs: Rc<dyn FileSystem>) -> Result<Rc<Self>> {
    let scope = HelperScope::new(&config.root)?;

    let script = config.root.join(HELPER_FILE);
    if fs.is_file(&script) {
      let content = fs.read_to_string(&script).map_err(|source| Error::Read {
        path: script.clone(),
        source,
      })?;
      scope.load_script(&script, &content)?;
      debug!(path = %script.display(), "loaded helper script");
    }

    info!(
      root = %config.root.display(),
      packages = config.package_count(),
      bundles = config.bundle_count(),
      variants = config.variants.len(),
      "build loaded"
    );

    Ok(Rc::new_cyclic(|this| Build {
      config,
      fs,
      scope,
      forced: Cell::new(false),
      units: RefCell::new(HashMap::new()),
      resolving: RefCell::new(Vec::new()),
      this: this.clone(),
    }))
  }

  /// Rewrite every target on the next run regardless of timestamps.
  ///
  /// There is no way back to the normal state.
  pub fn force(&self) {
    if !self.forced.replace(true) {
      info!("forced rebuild enabled");
    }
  }

  pub fn is_forced(&self) -> bool {
    self.forced.get()
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn fs(&self) -> &dyn FileSystem {
    self.fs.as_ref()
  }

  pub fn scope(&self) -> &HelperScope {
    &self.scope
  }

  /// A weak handle for Lua callbacks.
  pub fn handle(&self) -> BuildHandle {
    BuildHandle::new(self.this.clone())
  }

  /// Resolve a unit by name.
  ///
  /// The first call parses the declaration and constructs the unit; later
  /// calls return the same instance.
  pub fn package(&self, name: &str) -> Result<Rc<dyn Buildable>> {
    if let Some(unit) = self.units.borrow().get(name) {
      return Ok(Rc::clone(unit));
    }

    let entry = self
      .config
      .unit(name)
      .ok_or_else(|| ConfigError::UnknownReference(name.to_string()))?;
    let spec = UnitSpec::parse(entry)?;

    let unit: Rc<dyn Buildable> = match spec.kind.clone() {
      UnitKind::Package { files } => Rc::new(Package::new(name, self.this.clone(), spec, files)),
      UnitKind::Bundle { dependencies } => Rc::new(Bundle::new(name, self.this.clone(), spec, dependencies)),
    };
    debug!(name, kind = unit.kind(), "resolved unit");

    self.units.borrow_mut().insert(name.to_string(), Rc::clone(&unit));
    Ok(unit)
  }

  /// Whether `name` has been resolved already.
  pub fn is_resolved(&self, name: &str) -> bool {
    self.units.borrow().contains_key(name)
  }

  /// Look up a variant of the `builds` table.
  pub fn variant(&self, name: &str) -> Result<&Variant> {
    self
      .config
      .variant(name)
      .ok_or_else(|| ConfigError::UnknownTransformation(name.to_string()).into())
  }

  /// Resolve a transformation name: built-ins first, then the helper scope.
  pub fn transform(&self, name: &str) -> Result<Box<dyn Transform>> {
    if let Some(builtin) = transform::builtin(name) {
      return Ok(builtin);
    }
    match self.scope.transform(name)? {
      Some(script) => Ok(Box::new(script)),
      None => Err(ConfigError::UnknownTransformation(name.to_string()).into()),
    }
  }

  pub fn has_transform(&self, name: &str) -> Result<bool> {
    Ok(transform::builtin(name).is_some() || self.scope.transform(name)?.is_some())
  }

  /// Run `source` through the variant's pipeline.
  pub fn apply_variant(&self, variant: &Variant, source: &str) -> Result<String> {
    transform::apply_pipeline(variant.transforms.iter().map(String::as_str), source, |step| {
      self.transform(step)
    })
  }

  /// Resolve a declared file entry against the source directory.
  ///
  /// Tries the entry itself, then the entry with the configured extension.
  /// If neither exists the literal path is returned, so that reading it
  /// fails with that path.
  pub fn locate_source(&self, entry: &str) -> PathBuf {
    let path = normalize_path(&self.config.source_directory.join(entry));
    locate(self.fs(), &path, &self.config.extension).unwrap_or(path)
  }

  /// Read a source file located by [`Build::locate_source`], trimmed.
  pub fn read_source_file(&self, path: &Path) -> Result<String> {
    let read_error = |source| Error::Read {
      path: path.to_path_buf(),
      source,
    };
    match read_source(self.fs(), path, &self.config.extension) {
      Ok(Some(text)) => Ok(text),
      Ok(None) => Err(read_error(io::Error::new(io::ErrorKind::NotFound, "no such file"))),
      Err(source) => Err(read_error(source)),
    }
  }

  /// Mark `name` as being resolved until the guard is dropped.
  ///
  /// Fails with [`ConfigError::Cycle`] if `name` is already on the stack.
  pub(crate) fn enter(&self, name: &str) -> Result<ResolveGuard<'_>> {
    let mut resolving = self.resolving.borrow_mut();
    if let Some(start) = resolving.iter().position(|n| n == name) {
      let mut path = resolving[start..].to_vec();
      path.push(name.to_string());
      return Err(ConfigError::Cycle(path).into());
    }
    resolving.push(name.to_string());
    Ok(ResolveGuard {
      resolving: &self.resolving,
    })
  }

  /// Run a helper registered by the `Jakefile`.
  pub fn invoke_helper(&self, name: &str, args: &[String]) -> Result<Option<String>> {
    debug!(helper = %name, args = args.len(), "invoking helper");
    match self.scope.call_helper(self.handle(), name, args)? {
      Some(result) => Ok(result),
      None => Err(ConfigError::UnknownHelper(name.to_string()).into()),
    }
  }
}

pub(crate) struct ResolveGuard<'a> {
  resolving: &'a RefCell<Vec<String>>,
}

impl Drop for ResolveGuard<'_> {
  fn drop(&mut self) {
    self.resolving.borrow_mut().pop();
  }
}
