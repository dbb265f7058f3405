//! The `jake` global table.
//!
//! - `jake.dir` - Root directory of the build
//! - `jake.version` - Version of this library
//! - `jake.helper(name, fn)` - Register a helper, called as `fn(build, ...)`
//! - `jake.transform(name, fn)` - Register a transformation, called as `fn(source)`
//! - `jake.on(event, fn)` - Register a hook, called as `fn(build, info)`

use std::path::Path;

use mlua::prelude::*;
use tracing::debug;

use crate::transform::BUILTIN_TRANSFORMS;

pub const HELPERS_REGISTRY_KEY: &str = "__jake_helpers";
pub const TRANSFORMS_REGISTRY_KEY: &str = "__jake_transforms";
pub const HOOKS_REGISTRY_KEY: &str = "__jake_hooks";

/// Fired after each written target with `{ name, variant, path }`.
pub const FILE_CREATED: &str = "file_created";
/// Fired once per run with `{ written, skipped, failed }`.
pub const BUILD_COMPLETE: &str = "build_complete";

pub const HOOK_EVENTS: &[&str] = &[FILE_CREATED, BUILD_COMPLETE];

/// Globals bound in header templates; helpers may not shadow them.
pub const RESERVED_HELPER_NAMES: &[&str] = &["build", "meta", "name", "variant"];

fn is_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
    && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Register the `jake` global table and its empty registries.
pub fn register_globals(lua: &Lua, root: &Path) -> LuaResult<()> {
  let jake = lua.create_table()?;

  jake.set("dir", root.to_string_lossy().to_string())?;
  jake.set("version", env!("CARGO_PKG_VERSION"))?;

  lua.set_named_registry_value(HELPERS_REGISTRY_KEY, lua.create_table()?)?;
  lua.set_named_registry_value(TRANSFORMS_REGISTRY_KEY, lua.create_table()?)?;

  let hooks = lua.create_table()?;
  for event in HOOK_EVENTS {
    hooks.set(*event, lua.create_table()?)?;
  }
  lua.set_named_registry_value(HOOKS_REGISTRY_KEY, hooks)?;

  let helper = lua.create_function(|lua, (name, func): (String, LuaFunction)| {
    if !is_identifier(&name) {
      return Err(LuaError::external(format!(
        "helper name '{}' is not a valid identifier",
        name
      )));
    }
    if RESERVED_HELPER_NAMES.contains(&name.as_str()) {
      return Err(LuaError::external(format!("helper name '{}' is reserved", name)));
    }

    let registry: LuaTable = lua.named_registry_value(HELPERS_REGISTRY_KEY)?;
    debug!(helper = %name, "registered helper");
    registry.set(name, func)
  })?;
  jake.set("helper", helper)?;

  let transform = lua.create_function(|lua, (name, func): (String, LuaFunction)| {
    // Prevent overwriting built-in transformations
    if BUILTIN_TRANSFORMS.contains(&name.as_str()) {
      return Err(LuaError::external(format!(
        "cannot override built-in transformation '{}'",
        name
      )));
    }

    let registry: LuaTable = lua.named_registry_value(TRANSFORMS_REGISTRY_KEY)?;
    debug!(transform = %name, "registered transformation");
    registry.set(name, func)
  })?;
  jake.set("transform", transform)?;

  let on = lua.create_function(|lua, (event, func): (String, LuaFunction)| {
    if !HOOK_EVENTS.contains(&event.as_str()) {
      return Err(LuaError::external(format!(
        "unknown event '{}' (expected one of: {})",
        event,
        HOOK_EVENTS.join(", ")
      )));
    }

    let hooks: LuaTable = lua.named_registry_value(HOOKS_REGISTRY_KEY)?;
    let list: LuaTable = hooks.get(event.as_str())?;
    list.raw_set(list.raw_len() + 1, func)
  })?;
  jake.set("on", on)?;

  lua.globals().set("jake", jake)?;

  Ok(())
}
