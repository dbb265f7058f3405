use serde_yaml::{Mapping, Value};

use super::{Section, UnitEntry, string_list};
use crate::error::ConfigError;

/// What a unit is made of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitKind {
  /// Source file entries, relative to the source directory.
  Package { files: Vec<String> },
  /// Names of other packages or bundles.
  Bundle { dependencies: Vec<String> },
}

impl UnitKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      UnitKind::Package { .. } => "package",
      UnitKind::Bundle { .. } => "bundle",
    }
  }
}

/// Where a unit's outputs go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputRule {
  /// Follow the configured [`Layout`](super::Layout).
  #[default]
  Layout,
  /// Path relative to the build directory, with `{name}` and `{variant}`
  /// substituted.
  Template(String),
  /// Never written; the unit only feeds bundles.
  Disabled,
}

/// A unit declaration after its shape has been interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitSpec {
  pub kind: UnitKind,
  pub header: Option<String>,
  pub output: OutputRule,
  /// Variants to write; all configured variants when `None`.
  pub builds: Option<Vec<String>>,
  /// Free-form data exposed to header templates.
  pub meta: Value,
}

impl UnitSpec {
  /// Interpret a raw declaration.
  ///
  /// Both sections accept a bare list. In the long form a package lists its
  /// sources under `files`, and a bundle lists its members under `files` or
  /// `packages`.
  pub fn parse(entry: &UnitEntry) -> Result<Self, ConfigError> {
    let malformed = |reason: &str| ConfigError::MalformedDeclaration {
      name: entry.name.clone(),
      reason: reason.to_string(),
    };

    let empty = Mapping::new();
    let (items, options) = match &entry.declaration {
      Value::Sequence(items) => (items, &empty),
      Value::Mapping(options) => {
        let list = match entry.section {
          Section::Packages => options.get("files"),
          Section::Bundles => options.get("files").or_else(|| options.get("packages")),
        };
        match list {
          Some(Value::Sequence(items)) => (items, options),
          Some(_) => return Err(malformed("member list must be a sequence")),
          None => {
            return Err(malformed(match entry.section {
              Section::Packages => "package has no 'files' list",
              Section::Bundles => "bundle has no 'files' or 'packages' list",
            }));
          }
        }
      }
      _ => return Err(malformed("expected a list or a mapping")),
    };

    let members = string_list(items).ok_or_else(|| malformed("members must be strings"))?;
    let kind = match entry.section {
      Section::Packages => UnitKind::Package { files: members },
      Section::Bundles => UnitKind::Bundle { dependencies: members },
    };

    let header = match options.get("header") {
      None | Some(Value::Null) => None,
      Some(Value::String(path)) => Some(path.clone()),
      Some(_) => return Err(malformed("'header' must be a path")),
    };

    let output = match options.get("output") {
      None | Some(Value::Null) => OutputRule::Layout,
      Some(Value::Bool(false)) => OutputRule::Disabled,
      Some(Value::String(template)) => OutputRule::Template(template.clone()),
      Some(_) => return Err(malformed("'output' must be a path or false")),
    };

    let builds = match options.get("builds") {
      None | Some(Value::Null) => None,
      Some(Value::Sequence(names)) => Some(string_list(names).ok_or_else(|| malformed("variant names must be strings"))?),
      Some(Value::String(name)) => Some(vec![name.clone()]),
      Some(_) => return Err(malformed("'builds' must be a list of variant names")),
    };

    Ok(Self {
      kind,
      header,
      output,
      builds,
      meta: options.get("meta").cloned().unwrap_or(Value::Null),
    })
  }

  /// Declared members: file entries for a package, names for a bundle.
  pub fn members(&self) -> &[String] {
    match &self.kind {
      UnitKind::Package { files } => files,
      UnitKind::Bundle { dependencies } => dependencies,
    }
  }
}
