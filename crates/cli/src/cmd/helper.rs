//! Implementation of the `jake helper` command.

use std::path::Path;

use anyhow::{Context, Result};

use jake_lib::Build;

use super::report::display_path;

pub fn cmd_helper(dir: &Path, name: &str, args: &[String]) -> Result<()> {
  let build = Build::load(dir).with_context(|| format!("Failed to load project: {}", display_path(dir)))?;
  let result = build
    .invoke_helper(name, args)
    .with_context(|| format!("Helper '{}' failed", name))?;

  if let Some(output) = result {
    println!("{}", output);
  }
  Ok(())
}
