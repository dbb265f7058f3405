//! Error types for jake-lib.

use std::path::PathBuf;

use mlua::prelude::LuaError;
use thiserror::Error;

/// Problems with the declared build graph.
///
/// None of these are retried: they describe the configuration, not the
/// environment.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("config file not found: {}", .0.display())]
  ConfigNotFound(PathBuf),

  #[error("cannot parse {}: {message}", .path.display())]
  Parse { path: PathBuf, message: String },

  /// A name that is neither a package nor a bundle.
  #[error("unknown buildable '{0}'")]
  UnknownReference(String),

  /// A variant or transformation step that nothing provides.
  #[error("unknown transformation '{0}'")]
  UnknownTransformation(String),

  #[error("unknown helper '{0}'")]
  UnknownHelper(String),

  #[error("malformed declaration for '{name}': {reason}")]
  MalformedDeclaration { name: String, reason: String },

  #[error("'{0}' is declared as both a package and a bundle")]
  DuplicateUnit(String),

  #[error("dependency cycle: {}", .0.join(" -> "))]
  Cycle(Vec<String>),

  #[error("invalid header template: {0}")]
  Template(String),

  /// More than one target would write the same file.
  #[error("{} is the output of {}", .path.display(), .owners.join(" and "))]
  OutputCollision { path: PathBuf, owners: Vec<String> },
}

/// Errors that can occur while resolving or building units.
#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Config(#[from] ConfigError),

  #[error("cannot read {}: {source}", .path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("cannot write {}: {source}", .path.display())]
  Write { path: PathBuf, source: std::io::Error },

  /// A Lua error, kept as its message. `mlua::Error` is neither `Send` nor
  /// `Sync` without mlua's `send` feature.
  #[error("lua error: {0}")]
  Lua(String),

  #[error("transformation '{name}' failed: {message}")]
  Transform { name: String, message: String },

  /// A buildable was used after its build was dropped.
  #[error("buildable '{0}' outlived its build")]
  Detached(String),
}

impl Error {
  /// Returns the configuration error, if this is one.
  pub fn as_config(&self) -> Option<&ConfigError> {
    match self {
      Error::Config(err) => Some(err),
      _ => None,
    }
  }
}

impl From<LuaError> for Error {
  fn from(err: LuaError) -> Self {
    Error::Lua(err.to_string())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
