use mlua::prelude::*;

use super::Transform;
use crate::error::{Error, Result};

/// A transformation registered from the helper script.
///
/// The function receives the source text and must return a string.
pub struct ScriptTransform {
  name: String,
  func: LuaFunction,
}

impl ScriptTransform {
  pub fn new(name: impl Into<String>, func: LuaFunction) -> Self {
    Self { name: name.into(), func }
  }
}

impl Transform for ScriptTransform {
  fn name(&self) -> &str {
    &self.name
  }

  fn apply(&self, source: &str) -> Result<String> {
    let transform_error = |message: String| Error::Transform {
      name: self.name.clone(),
      message,
    };

    match self.func.call::<LuaValue>(source) {
      Ok(LuaValue::String(text)) => Ok(text.to_str().map_err(|e| transform_error(e.to_string()))?.to_string()),
      Ok(other) => Err(transform_error(format!("expected a string result, got {}", other.type_name()))),
      Err(err) => Err(transform_error(err.to_string())),
    }
  }
}
