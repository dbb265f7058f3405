//! Header templates.
//!
//! A header is plain text with `<%= expr %>` segments. Each expression is
//! handed to a caller-supplied evaluator (in practice the build's Lua helper
//! scope) and its result is spliced in place of the tag.

use crate::error::{ConfigError, Result};

const OPEN: &str = "<%=";
const CLOSE: &str = "%>";

/// A parsed piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
  Text(&'a str),
  Expr(&'a str),
}

/// Split a template into text and expression segments.
pub fn parse(template: &str) -> Result<Vec<Segment<'_>>, ConfigError> {
  let mut segments = Vec::new();
  let mut rest = template;

  while let Some(start) = rest.find(OPEN) {
    if start > 0 {
      segments.push(Segment::Text(&rest[..start]));
    }
    let after = &rest[start + OPEN.len()..];
    let end = after
      .find(CLOSE)
      .ok_or_else(|| ConfigError::Template(format!("unterminated '{}' tag", OPEN)))?;
    let expr = after[..end].trim();
    if expr.is_empty() {
      return Err(ConfigError::Template("empty expression".to_string()));
    }
    segments.push(Segment::Expr(expr));
    rest = &after[end + CLOSE.len()..];
  }

  if !rest.is_empty() {
    segments.push(Segment::Text(rest));
  }
  Ok(segments)
}

/// Render `template`, replacing each expression with `eval(expr)`.
pub fn render<F>(template: &str, mut eval: F) -> Result<String>
where
  F: FnMut(&str) -> Result<String>,
{
  let mut out = String::with_capacity(template.len());
  for segment in parse(template)? {
    match segment {
      Segment::Text(text) => out.push_str(text),
      Segment::Expr(expr) => out.push_str(&eval(expr)?),
    }
  }
  Ok(out)
}
