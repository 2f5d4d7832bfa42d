//! Template parsing and substitution for patch values.
//!
//! Patch values may reference build parameters that are only known once all
//! sources have been merged.
//!
//! # Syntax
//!
//! - `{{name}}` - value of parameter `name` (surrounding spaces are trimmed)
//! - `\{{` - a literal `{{`
//!
//! A single `{` or `}` passes through unchanged.
//!
//! # Example
//!
//! ```
//! use pakmerge_lib::template::{parse, Segment};
//!
//! let segments = parse("x{{ scale }}").unwrap();
//! assert_eq!(segments, vec![
//!     Segment::Literal("x".to_string()),
//!     Segment::Input("scale".to_string()),
//! ]);
//! ```

use thiserror::Error;

use crate::types::ParameterMapping;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  Literal(String),
  Input(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
  #[error("unclosed template input at position {0}")]
  Unclosed(usize),

  #[error("empty template input name at position {0}")]
  EmptyName(usize),

  #[error("no value for template input '{0}'")]
  Unresolved(String),
}

/// Source of values for template inputs.
pub trait Resolver {
  fn resolve_input(&self, name: &str) -> Option<&str>;
}

impl Resolver for ParameterMapping {
  fn resolve_input(&self, name: &str) -> Option<&str> {
    self.get(name).map(String::as_str)
  }
}

/// Looks in `primary` first, then `fallback`.
pub struct Layered<'a> {
  pub primary: &'a ParameterMapping,
  pub fallback: &'a ParameterMapping,
}

impl Resolver for Layered<'_> {
  fn resolve_input(&self, name: &str) -> Option<&str> {
    self
      .primary
      .resolve_input(name)
      .or_else(|| self.fallback.resolve_input(name))
  }
}

pub fn parse(input: &str) -> Result<Vec<Segment>, TemplateError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut rest = input;
  let mut offset = 0;

  while !rest.is_empty() {
    if let Some(after) = rest.strip_prefix("\\{{") {
      literal.push_str("{{");
      offset += 3;
      rest = after;
      continue;
    }

    if let Some(after) = rest.strip_prefix("{{") {
      let Some(close) = after.find("}}") else {
        return Err(TemplateError::Unclosed(offset));
      };

      let name = after[..close].trim();
      if name.is_empty() {
        return Err(TemplateError::EmptyName(offset));
      }

      if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(&mut literal)));
      }
      segments.push(Segment::Input(name.to_string()));

      offset += 2 + close + 2;
      rest = &after[close + 2..];
      continue;
    }

    let Some(ch) = rest.chars().next() else {
      break;
    };
    literal.push(ch);
    offset += ch.len_utf8();
    rest = &rest[ch.len_utf8()..];
  }

  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(segments)
}

/// Parse `input` and substitute every input from `resolver`.
pub fn render(input: &str, resolver: &impl Resolver) -> Result<String, TemplateError> {
  let mut out = String::with_capacity(input.len());
  for segment in parse(input)? {
    match segment {
      Segment::Literal(text) => out.push_str(&text),
      Segment::Input(name) => match resolver.resolve_input(&name) {
        Some(value) => out.push_str(value),
        None => return Err(TemplateError::Unresolved(name)),
      },
    }
  }
  Ok(out)
}
