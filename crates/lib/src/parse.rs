//! Parsing of `$<...>` expressions into an immutable node tree.
//!
//! Parsing is pure syntax: it needs no context and never fails. Text without
//! a matching `>` is kept as an [`Node::Unterminated`] node and only reported
//! when evaluated.
//!
//! # Example
//!
//! ```
//! use genex_lib::parse::{parse, Node};
//!
//! let nodes = parse("-D$<CONFIG>");
//! assert_eq!(nodes.len(), 2);
//! assert_eq!(nodes[0], Node::Text("-D".to_string()));
//! ```

use crate::list::{matching_close, split_arguments};

/// One element of a parsed expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
  /// Literal text, emitted unchanged.
  Text(String),

  /// A complete `$<...>` expression.
  Call(Call),

  /// A `$<` without its closing `>`, up to the end of the input.
  Unterminated(String),
}

impl Node {
  pub fn is_text(&self) -> bool {
    matches!(self, Node::Text(_))
  }
}

/// A `$<identifier:param,param,...>` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
  /// Nodes producing the operator name. Usually a single text node, but the
  /// name may itself be computed, as in `$<$<CONFIG:Debug>:...>`.
  pub identifier: Vec<Node>,

  /// Parameters after the `:`, or `None` when there is no `:` at all.
  pub params: Option<Vec<Param>>,

  /// The original `$<...>` text.
  pub source: String,
}

impl Call {
  /// The operator name when it is spelled out literally.
  pub fn literal_identifier(&self) -> Option<&str> {
    match self.identifier.as_slice() {
      [Node::Text(name)] => Some(name),
      _ => None,
    }
  }

  pub fn param_count(&self) -> usize {
    self.params.as_ref().map_or(0, Vec::len)
  }
}

/// One comma-separated parameter of a [`Call`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
  pub raw: String,
  pub nodes: Vec<Node>,
}

/// Parse `input` into a node sequence.
pub fn parse(input: &str) -> Vec<Node> {
  let mut nodes = Vec::new();
  let mut pos = 0;

  while let Some(offset) = input[pos..].find("$<") {
    let open = pos + offset;
    push_text(&mut nodes, &input[pos..open]);

    let Some(close) = matching_close(input, open) else {
      nodes.push(Node::Unterminated(input[open..].to_string()));
      return nodes;
    };

    nodes.push(Node::Call(parse_call(&input[open..=close])));
    pos = close + 1;
  }

  push_text(&mut nodes, &input[pos..]);
  nodes
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
  if text.is_empty() {
    return;
  }
  if let Some(Node::Text(last)) = nodes.last_mut() {
    last.push_str(text);
  } else {
    nodes.push(Node::Text(text.to_string()));
  }
}

/// Parse a balanced `$<...>` slice.
fn parse_call(source: &str) -> Call {
  let body = &source[2..source.len() - 1];

  let (identifier, params) = match identifier_end(body) {
    Some(colon) => {
      let params = split_arguments(&body[colon + 1..])
        .into_iter()
        .map(|raw| Param {
          raw: raw.to_string(),
          nodes: parse(raw),
        })
        .collect();
      (&body[..colon], Some(params))
    }
    None => (body, None),
  };

  Call {
    identifier: parse(identifier),
    params,
    source: source.to_string(),
  }
}

/// Offset of the first `:` outside nested expressions.
fn identifier_end(body: &str) -> Option<usize> {
  let bytes = body.as_bytes();
  let mut depth = 0usize;
  let mut i = 0;

  while i < bytes.len() {
    match bytes[i] {
      b'$' if bytes.get(i + 1) == Some(&b'<') => {
        depth += 1;
        i += 2;
        continue;
      }
      b'>' => depth = depth.saturating_sub(1),
      b':' if depth == 0 => return Some(i),
      _ => {}
    }
    i += 1;
  }

  None
}
