use std::path::Path;

use mlua::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use super::globals::{HELPERS_REGISTRY_KEY, HOOKS_REGISTRY_KEY, TRANSFORMS_REGISTRY_KEY, register_globals};
use super::handle::BuildHandle;
use crate::transform::ScriptTransform;

/// A build's private Lua state.
pub struct HelperScope {
  lua: Lua,
}

impl HelperScope {
  /// Create a fresh state with the `jake` table registered.
  pub fn new(root: &Path) -> LuaResult<Self> {
    let lua = Lua::new();
    register_globals(&lua, root)?;
    Ok(Self { lua })
  }

  pub fn lua(&self) -> &Lua {
    &self.lua
  }

  /// Run a helper script. `path` only names the chunk in error messages.
  pub fn load_script(&self, path: &Path, content: &str) -> LuaResult<()> {
    self
      .lua
      .load(content)
      .set_name(format!("@{}", path.display()))
      .exec()
  }

  pub fn helper(&self, name: &str) -> LuaResult<Option<LuaFunction>> {
    let registry: LuaTable = self.lua.named_registry_value(HELPERS_REGISTRY_KEY)?;
    registry.get(name)
  }

  /// Registered helper names, sorted.
  pub fn helper_names(&self) -> LuaResult<Vec<String>> {
    registry_names(&self.lua, HELPERS_REGISTRY_KEY)
  }

  pub fn transform(&self, name: &str) -> LuaResult<Option<ScriptTransform>> {
    let registry: LuaTable = self.lua.named_registry_value(TRANSFORMS_REGISTRY_KEY)?;
    let func: Option<LuaFunction> = registry.get(name)?;
    Ok(func.map(|func| ScriptTransform::new(name, func)))
  }

  pub fn transform_names(&self) -> LuaResult<Vec<String>> {
    registry_names(&self.lua, TRANSFORMS_REGISTRY_KEY)
  }

  /// Hooks registered for `event`, in registration order.
  pub fn hooks(&self, event: &str) -> LuaResult<Vec<LuaFunction>> {
    let hooks: LuaTable = self.lua.named_registry_value(HOOKS_REGISTRY_KEY)?;
    let list: Option<LuaTable> = hooks.get(event)?;
    match list {
      Some(list) => list.sequence_values::<LuaFunction>().collect(),
      None => Ok(Vec::new()),
    }
  }

  /// Call every hook for `event` with the build and `info`.
  ///
  /// All hooks run even if one fails; the first error is returned.
  pub fn fire<T: Serialize>(&self, event: &str, handle: BuildHandle, info: &T) -> LuaResult<()> {
    let hooks = self.hooks(event)?;
    if hooks.is_empty() {
      return Ok(());
    }

    let build = self.lua.create_userdata(handle)?;
    let info = to_lua(&self.lua, info)?;
    let mut first_error = None;
    for hook in hooks {
      if let Err(err) = hook.call::<()>((build.clone(), info.clone())) {
        warn!(event, error = %err, "hook failed");
        first_error.get_or_insert(err);
      }
    }
    debug!(event, "fired hooks");

    match first_error {
      Some(err) => Err(err),
      None => Ok(()),
    }
  }

  /// Call a registered helper with the build as its first argument.
  ///
  /// Returns `Ok(None)` if no helper is registered under `name`, and
  /// `Ok(Some(None))` if the helper returned nothing.
  pub fn call_helper(&self, handle: BuildHandle, name: &str, args: &[String]) -> LuaResult<Option<Option<String>>> {
    let Some(func) = self.helper(name)? else {
      return Ok(None);
    };

    let mut call_args = Vec::with_capacity(args.len() + 1);
    call_args.push(LuaValue::UserData(self.lua.create_userdata(handle)?));
    for arg in args {
      call_args.push(LuaValue::String(self.lua.create_string(arg)?));
    }

    let result: LuaValue = func.call(LuaMultiValue::from_vec(call_args))?;
    match result {
      LuaValue::Nil => Ok(Some(None)),
      value => Ok(Some(Some(value.to_string()?))),
    }
  }

  /// Build the environment a header template is evaluated in.
  ///
  /// Every helper becomes a global with the build bound as its first
  /// argument, next to `build`, `name`, `variant` and `meta`. Other lookups
  /// fall through to the real globals.
  pub fn template_env<M: Serialize>(
    &self,
    handle: BuildHandle,
    name: &str,
    variant: &str,
    meta: &M,
  ) -> LuaResult<LuaTable> {
    let env = self.lua.create_table()?;
    let build = self.lua.create_userdata(handle)?;

    let helpers: LuaTable = self.lua.named_registry_value(HELPERS_REGISTRY_KEY)?;
    for pair in helpers.pairs::<String, LuaFunction>() {
      let (helper, func) = pair?;
      let bound_build = build.clone();
      let bound = self.lua.create_function(move |_, args: LuaMultiValue| {
        let mut call_args = Vec::with_capacity(args.len() + 1);
        call_args.push(LuaValue::UserData(bound_build.clone()));
        call_args.extend(args);
        func.call::<LuaMultiValue>(LuaMultiValue::from_vec(call_args))
      })?;
      env.set(helper, bound)?;
    }

    env.set("build", build)?;
    env.set("name", name)?;
    env.set("variant", variant)?;
    env.set("meta", to_lua(&self.lua, meta)?)?;

    // Inherit from _G via metatable
    let mt = self.lua.create_table()?;
    mt.set("__index", self.lua.globals())?;
    env.set_metatable(Some(mt))?;

    Ok(env)
  }

  /// Evaluate a single expression in `env`. `nil` renders as empty.
  pub fn eval_in(&self, env: &LuaTable, expr: &str) -> LuaResult<String> {
    let value: LuaValue = self
      .lua
      .load(format!("return {}", expr))
      .set_name("=header")
      .set_environment(env.clone())
      .eval()?;
    match value {
      LuaValue::Nil => Ok(String::new()),
      value => value.to_string(),
    }
  }
}

/// Serialize into Lua with YAML nulls mapped to `nil`.
fn to_lua<T: Serialize>(lua: &Lua, value: &T) -> LuaResult<LuaValue> {
  let options = LuaSerializeOptions::new()
    .serialize_none_to_null(false)
    .serialize_unit_to_null(false);
  lua.to_value_with(value, options)
}

fn registry_names(lua: &Lua, key: &str) -> LuaResult<Vec<String>> {
  let registry: LuaTable = lua.named_registry_value(key)?;
  let mut names = registry
    .pairs::<String, LuaValue>()
    .map(|pair| pair.map(|(name, _)| name))
    .collect::<LuaResult<Vec<_>>>()?;
  names.sort();
  Ok(names)
}
