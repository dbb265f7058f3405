use super::Transform;
use crate::error::Result;

/// Removes `//` line comments and `/* */` block comments.
///
/// String and template literals (`'`, `"`, `` ` ``) are copied verbatim,
/// escapes included, so comment markers inside them survive.
#[derive(Debug, Clone, Copy)]
pub struct StripComments;

impl Transform for StripComments {
  fn name(&self) -> &str {
    "strip_comments"
  }

  fn apply(&self, source: &str) -> Result<String> {
    Ok(strip_comments(source))
  }
}

/// Trims trailing whitespace from every line and drops blank lines.
#[derive(Debug, Clone, Copy)]
pub struct TrimLines;

impl Transform for TrimLines {
  fn name(&self) -> &str {
    "trim_lines"
  }

  fn apply(&self, source: &str) -> Result<String> {
    let lines: Vec<&str> = source
      .lines()
      .map(str::trim_end)
      .filter(|line| !line.is_empty())
      .collect();
    Ok(lines.join("\n"))
  }
}

enum State {
  Code,
  Quoted(char),
  LineComment,
  BlockComment,
}

fn strip_comments(source: &str) -> String {
  let mut out = String::with_capacity(source.len());
  let mut chars = source.chars().peekable();
  let mut state = State::Code;

  while let Some(c) = chars.next() {
    match state {
      State::Code => match c {
        '/' if chars.peek() == Some(&'/') => {
          chars.next();
          state = State::LineComment;
        }
        '/' if chars.peek() == Some(&'*') => {
          chars.next();
          state = State::BlockComment;
        }
        '\'' | '"' | '`' => {
          out.push(c);
          state = State::Quoted(c);
        }
        _ => out.push(c),
      },
      State::Quoted(quote) => {
        out.push(c);
        if c == '\\' {
          if let Some(escaped) = chars.next() {
            out.push(escaped);
          }
        } else if c == quote {
          state = State::Code;
        }
      }
      State::LineComment => {
        if c == '\n' {
          out.push(c);
          state = State::Code;
        }
      }
      State::BlockComment => {
        if c == '*' && chars.peek() == Some(&'/') {
          chars.next();
          state = State::Code;
        }
      }
    }
  }

  out
}
