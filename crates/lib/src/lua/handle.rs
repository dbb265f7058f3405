//! The `build` value seen from Lua.

use std::rc::{Rc, Weak};

use mlua::prelude::*;

use super::globals::HELPERS_REGISTRY_KEY;
use crate::build::Build;

/// A non-owning reference to a [`Build`], exposed to helpers, hooks and
/// header templates.
///
/// Fields: `forced`, `root`, `source_directory`, `build_directory`.
/// Methods: `files(name)`, `source(name)`, `code(name, variant)` and
/// `helper(name, ...)`.
#[derive(Debug, Clone)]
pub struct BuildHandle(Weak<Build>);

impl BuildHandle {
  pub fn new(build: Weak<Build>) -> Self {
    Self(build)
  }

  pub fn upgrade(&self) -> LuaResult<Rc<Build>> {
    self
      .0
      .upgrade()
      .ok_or_else(|| LuaError::external("build is no longer available"))
  }
}

impl LuaUserData for BuildHandle {
  fn add_fields<F: LuaUserDataFields<Self>>(fields: &mut F) {
    fields.add_field_method_get("forced", |_, this| Ok(this.upgrade()?.is_forced()));
    fields.add_field_method_get("root", |_, this| {
      Ok(this.upgrade()?.config().root.to_string_lossy().to_string())
    });
    fields.add_field_method_get("source_directory", |_, this| {
      Ok(this.upgrade()?.config().source_directory.to_string_lossy().to_string())
    });
    fields.add_field_method_get("build_directory", |_, this| {
      Ok(this.upgrade()?.config().build_directory.to_string_lossy().to_string())
    });
  }

  fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
    methods.add_method("files", |_, this, name: String| {
      let build = this.upgrade()?;
      let unit = build.package(&name).map_err(LuaError::external)?;
      let files = unit.files().map_err(LuaError::external)?;
      Ok(files.iter().map(|p| p.to_string_lossy().to_string()).collect::<Vec<_>>())
    });

    methods.add_method("source", |_, this, name: String| {
      let build = this.upgrade()?;
      let unit = build.package(&name).map_err(LuaError::external)?;
      let source = unit.source().map_err(LuaError::external)?;
      Ok(source.to_string())
    });

    methods.add_method("code", |_, this, (name, variant): (String, String)| {
      let build = this.upgrade()?;
      let unit = build.package(&name).map_err(LuaError::external)?;
      let code = unit.code(&variant).map_err(LuaError::external)?;
      Ok(code.to_string())
    });

    methods.add_function(
      "helper",
      |lua, (handle, name, args): (LuaAnyUserData, String, LuaMultiValue)| {
        let registry: LuaTable = lua.named_registry_value(HELPERS_REGISTRY_KEY)?;
        let func: Option<LuaFunction> = registry.get(name.as_str())?;
        let func = func.ok_or_else(|| LuaError::external(format!("unknown helper '{}'", name)))?;

        let mut call_args = Vec::with_capacity(args.len() + 1);
        call_args.push(LuaValue::UserData(handle));
        call_args.extend(args);
        func.call::<LuaMultiValue>(LuaMultiValue::from_vec(call_args))
      },
    );
  }
}
