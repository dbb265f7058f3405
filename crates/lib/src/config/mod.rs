//! `jake.yml` loading.
//!
//! The document is parsed with `serde_yaml`, its keys are normalized (see
//! [`normalize`]), and the result is split into directory settings, the
//! ordered variant table (`builds`) and the ordered unit entries (`packages`
//! then `bundles`). Unit declarations are kept raw here; their shape is only
//! interpreted when a unit is resolved (see [`UnitSpec::parse`]).

pub mod normalize;
mod unit;

pub use unit::{OutputRule, UnitKind, UnitSpec};

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::consts::{CONFIG_FILE, DEFAULT_EXTENSION, DEFAULT_VARIANT};
use crate::error::ConfigError;
use crate::fs::{FileSystem, normalize_path};

/// How output files are laid out under the build directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
  /// `<build>/<name>-<variant>.<ext>`
  #[default]
  Together,
  /// `<build>/<variant>/<name>.<ext>`
  Apart,
}

impl Layout {
  pub fn output_path(self, build_dir: &Path, name: &str, variant: &str, extension: &str) -> PathBuf {
    match self {
      Layout::Together => build_dir.join(format!("{}-{}.{}", name, variant, extension)),
      Layout::Apart => build_dir.join(variant).join(format!("{}.{}", name, extension)),
    }
  }
}

/// A named transformation pipeline from the `builds` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
  pub name: String,
  /// Transformation names, applied in order. Empty means raw source.
  pub transforms: Vec<String>,
}

/// Which section of the document a unit was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
  Packages,
  Bundles,
}

/// A unit declaration as written in the config.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitEntry {
  pub name: String,
  pub section: Section,
  pub declaration: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
  source_directory: Option<String>,
  build_directory: Option<String>,
  layout: Layout,
  extension: Option<String>,
  header: Option<String>,
  builds: Option<Mapping>,
  packages: Mapping,
  bundles: Mapping,
}

/// The parsed configuration of one build.
#[derive(Debug, Clone)]
pub struct Config {
  /// Directory containing the config file. All relative paths hang off it.
  pub root: PathBuf,
  pub source_directory: PathBuf,
  pub build_directory: PathBuf,
  pub layout: Layout,
  pub extension: String,
  /// Default header template, relative to the source directory.
  pub header: Option<String>,
  pub variants: Vec<Variant>,
  pub units: Vec<UnitEntry>,
}

impl Config {
  /// Load the config at `path`.
  ///
  /// `path` may be the config file itself or a directory containing
  /// `jake.yml`. Relative paths are made absolute against the working
  /// directory.
  pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, ConfigError> {
    let path = if path.is_absolute() {
      path.to_path_buf()
    } else {
      std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
    };
    let path = normalize_path(&path);

    let (file, root) = if fs.is_file(&path) {
      let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
      (path, root)
    } else {
      (path.join(CONFIG_FILE), path)
    };

    let text = fs
      .read_to_string(&file)
      .map_err(|_| ConfigError::ConfigNotFound(file.clone()))?;

    debug!(path = %file.display(), "loaded config");
    Self::parse(&text, &root, &file)
  }

  /// Parse config text. `origin` is only used in error messages.
  pub fn parse(text: &str, root: &Path, origin: &Path) -> Result<Self, ConfigError> {
    let parse_error = |message: String| ConfigError::Parse {
      path: origin.to_path_buf(),
      message,
    };

    let document: Value = serde_yaml::from_str(text).map_err(|e| parse_error(e.to_string()))?;
    let raw: RawConfig = match normalize::normalize_keys(document) {
      Value::Null => RawConfig::default(),
      value => serde_yaml::from_value(value).map_err(|e| parse_error(e.to_string()))?,
    };

    let variants = match raw.builds {
      Some(builds) => parse_variants(builds)?,
      None => vec![Variant {
        name: DEFAULT_VARIANT.to_string(),
        transforms: Vec::new(),
      }],
    };

    let mut units: Vec<UnitEntry> = Vec::new();
    for (section, table) in [(Section::Packages, raw.packages), (Section::Bundles, raw.bundles)] {
      for (key, declaration) in table {
        let name = key_name(&key, "unit")?;
        if units.iter().any(|u| u.name == name) {
          return Err(ConfigError::DuplicateUnit(name));
        }
        units.push(UnitEntry {
          name,
          section,
          declaration,
        });
      }
    }

    let source_directory = root.join(raw.source_directory.as_deref().unwrap_or("."));
    let build_directory = root.join(raw.build_directory.as_deref().unwrap_or("."));

    Ok(Self {
      root: root.to_path_buf(),
      source_directory: normalize_path(&source_directory),
      build_directory: normalize_path(&build_directory),
      layout: raw.layout,
      extension: raw.extension.unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
      header: raw.header,
      variants,
      units,
    })
  }

  pub fn unit(&self, name: &str) -> Option<&UnitEntry> {
    self.units.iter().find(|u| u.name == name)
  }

  pub fn variant(&self, name: &str) -> Option<&Variant> {
    self.variants.iter().find(|v| v.name == name)
  }

  pub fn package_count(&self) -> usize {
    self.units.iter().filter(|u| u.section == Section::Packages).count()
  }

  pub fn bundle_count(&self) -> usize {
    self.units.iter().filter(|u| u.section == Section::Bundles).count()
  }
}

fn key_name(key: &Value, what: &str) -> Result<String, ConfigError> {
  key
    .as_str()
    .map(str::to_string)
    .ok_or_else(|| ConfigError::MalformedDeclaration {
      name: format!("{:?}", key),
      reason: format!("{} names must be strings", what),
    })
}

fn parse_variants(builds: Mapping) -> Result<Vec<Variant>, ConfigError> {
  let mut variants = Vec::with_capacity(builds.len());
  for (key, value) in builds {
    let name = key_name(&key, "variant")?;
    let malformed = |reason: &str| ConfigError::MalformedDeclaration {
      name: name.clone(),
      reason: reason.to_string(),
    };

    let transforms = match &value {
      Value::Null | Value::Bool(false) => Vec::new(),
      Value::String(step) => vec![step.clone()],
      Value::Sequence(steps) => string_list(steps).ok_or_else(|| malformed("transformations must be strings"))?,
      Value::Mapping(options) => match options.get("transforms") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Sequence(steps)) => {
          string_list(steps).ok_or_else(|| malformed("transformations must be strings"))?
        }
        Some(Value::String(step)) => vec![step.clone()],
        Some(_) => return Err(malformed("'transforms' must be a list")),
      },
      _ => return Err(malformed("expected a list of transformations")),
    };

    variants.push(Variant { name, transforms });
  }
  Ok(variants)
}

pub(crate) fn string_list(items: &[Value]) -> Option<Vec<String>> {
  items.iter().map(|v| v.as_str().map(str::to_string)).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::fs::MemoryFs;

  fn parse(text: &str) -> Result<Config, ConfigError> {
    Config::parse(text, Path::new("/project"), Path::new("/project/jake.yml"))
  }

  mod settings {
    use super::*;

    #[test]
    fn defaults_for_empty_document() {
      let config = parse("").unwrap();
      assert_eq!(config.source_directory, PathBuf::from("/project"));
      assert_eq!(config.build_directory, PathBuf::from("/project"));
      assert_eq!(config.layout, Layout::Together);
      assert_eq!(config.extension, "js");
      assert_eq!(config.variants.len(), 1);
      assert_eq!(config.variants[0].name, "src");
      assert!(config.units.is_empty());
    }

    #[test]
    fn directories_are_relative_to_root() {
      let config = parse("source_directory: src/../source\nbuild_directory: ./build\nlayout: apart").unwrap();
      assert_eq!(config.source_directory, PathBuf::from("/project/source"));
      assert_eq!(config.build_directory, PathBuf::from("/project/build"));
      assert_eq!(config.layout, Layout::Apart);
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
      let err = parse("packages: [unclosed").unwrap_err();
      assert!(matches!(err, ConfigError::Parse { .. }));
    }
  }

  mod variants {
    use super::*;

    #[test]
    fn variant_shapes() {
      let config = parse(
        r#"
builds:
  src: false
  raw:
  min: [strip_comments, trim_lines]
  one: trim_lines
  long:
    transforms: [strip_comments]
"#,
      )
      .unwrap();

      let names: Vec<_> = config.variants.iter().map(|v| v.name.as_str()).collect();
      assert_eq!(names, vec!["src", "raw", "min", "one", "long"]);
      assert!(config.variant("src").unwrap().transforms.is_empty());
      assert!(config.variant("raw").unwrap().transforms.is_empty());
      assert_eq!(config.variant("min").unwrap().transforms, vec!["strip_comments", "trim_lines"]);
      assert_eq!(config.variant("one").unwrap().transforms, vec!["trim_lines"]);
      assert_eq!(config.variant("long").unwrap().transforms, vec!["strip_comments"]);
    }

    #[test]
    fn non_string_steps_are_malformed() {
      let err = parse("builds:\n  min: [1, {a: b}]").unwrap_err();
      assert!(matches!(err, ConfigError::MalformedDeclaration { name, .. } if name == "min"));
    }
  }

  mod units {
    use super::*;

    #[test]
    fn keeps_document_order_packages_first() {
      let config = parse(
        r#"
bundles:
  zed: [b]
  all: [a]
packages:
  b: [b]
  a: [a]
"#,
      )
      .unwrap();

      let names: Vec<_> = config.units.iter().map(|u| u.name.as_str()).collect();
      assert_eq!(names, vec!["b", "a", "zed", "all"]);
      assert_eq!(config.package_count(), 2);
      assert_eq!(config.bundle_count(), 2);
    }

    #[test]
    fn numeric_names_are_normalized() {
      let config = parse("packages:\n  2024: [a]").unwrap();
      assert!(config.unit("2024").is_some());
    }

    #[test]
    fn duplicate_names_are_rejected() {
      let err = parse("packages:\n  x: [a]\nbundles:\n  x: [x]").unwrap_err();
      assert!(matches!(err, ConfigError::DuplicateUnit(name) if name == "x"));
    }

    #[test]
    fn unknown_references_are_not_checked_at_load() {
      let config = parse("bundles:\n  all: [missing]").unwrap();
      assert!(config.unit("all").is_some());
    }
  }

  mod load {
    use super::*;

    #[test]
    fn directory_path_uses_config_file() {
      let fs = MemoryFs::new();
      fs.insert("/project/jake.yml", "packages:\n  core: [a]");
      let config = Config::load(&fs, Path::new("/project")).unwrap();
      assert_eq!(config.root, PathBuf::from("/project"));
      assert!(config.unit("core").is_some());
    }

    #[test]
    fn file_path_uses_its_parent_as_root() {
      let fs = MemoryFs::new();
      fs.insert("/project/custom.yml", "packages:\n  core: [a]");
      let config = Config::load(&fs, Path::new("/project/custom.yml")).unwrap();
      assert_eq!(config.root, PathBuf::from("/project"));
    }

    #[test]
    fn missing_config_is_reported() {
      let fs = MemoryFs::new();
      let err = Config::load(&fs, Path::new("/nowhere")).unwrap_err();
      assert!(matches!(err, ConfigError::ConfigNotFound(path) if path == Path::new("/nowhere/jake.yml")));
    }
  }

  #[test]
  fn layouts_place_outputs() {
    let build = Path::new("/out");
    assert_eq!(
      Layout::Together.output_path(build, "core", "min", "js"),
      PathBuf::from("/out/core-min.js")
    );
    assert_eq!(
      Layout::Apart.output_path(build, "core", "min", "js"),
      PathBuf::from("/out/min/core.js")
    );
  }
}
