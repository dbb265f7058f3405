//! Named source transformations.
//!
//! A variant in the `builds` table is an ordered list of transformation
//! names. Names resolve to the built-ins defined here first, then to the
//! functions a `Jakefile` registers with `jake.transform(name, fn)` (see
//! [`ScriptTransform`]). Built-in names cannot be overridden from Lua.

mod builtin;
mod script;

pub use builtin::{StripComments, TrimLines};
pub use script::ScriptTransform;

use crate::error::Result;

/// Names reserved by built-in transformations.
pub const BUILTIN_TRANSFORMS: &[&str] = &["strip_comments", "trim_lines"];

/// A pure function from source text to source text.
pub trait Transform {
  fn name(&self) -> &str;

  fn apply(&self, source: &str) -> Result<String>;
}

/// Look up a built-in transformation by name.
pub fn builtin(name: &str) -> Option<Box<dyn Transform>> {
  match name {
    "strip_comments" => Some(Box::new(StripComments)),
    "trim_lines" => Some(Box::new(TrimLines)),
    _ => None,
  }
}

/// Apply `steps` in order, resolving each name with `lookup`.
pub fn apply_pipeline<'a, I, F>(steps: I, source: &str, mut lookup: F) -> Result<String>
where
  I: IntoIterator<Item = &'a str>,
  F: FnMut(&str) -> Result<Box<dyn Transform>>,
{
  let mut text = source.to_string();
  for step in steps {
    text = lookup(step)?.apply(&text)?;
  }
  Ok(text)
}
