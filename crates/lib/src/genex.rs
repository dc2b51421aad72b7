//! Entry point for parsing generator expressions, and text utilities that
//! work on unevaluated expressions.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::backtrace::Backtrace;
use crate::compiled::{CompiledExpression, EvalRequest};
use crate::list::{split_arguments, split_nested};
use crate::operators::OperatorRegistry;
use crate::parse::{Call, Node, parse};

pub use crate::list::strip_empty_list_elements;

/// Parses expression text into [`CompiledExpression`]s.
///
/// Every expression parsed by one instance shares its backtrace and operator
/// registry.
#[derive(Debug, Clone)]
pub struct GeneratorExpression {
  backtrace: Backtrace,
  registry: Arc<OperatorRegistry>,
}

impl GeneratorExpression {
  pub fn new(backtrace: Backtrace) -> Self {
    Self {
      backtrace,
      registry: OperatorRegistry::shared_builtin(),
    }
  }

  /// Use `registry` instead of the built-in catalog.
  pub fn with_registry(mut self, registry: Arc<OperatorRegistry>) -> Self {
    self.registry = registry;
    self
  }

  pub fn backtrace(&self) -> &Backtrace {
    &self.backtrace
  }

  pub fn parse(&self, input: &str) -> CompiledExpression {
    CompiledExpression::new(input, self.backtrace.clone(), Arc::clone(&self.registry))
  }

  /// Parse and evaluate `input` once.
  pub fn evaluate(&self, input: &str, request: EvalRequest<'_>) -> String {
    self.parse(input).evaluate_fresh(request).output
  }
}

/// Which parts of a usage requirement [`preprocess`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreprocessContext {
  /// Drop every generator expression.
  StripAllGeneratorExpressions,
  /// Keep `$<BUILD_INTERFACE:...>` content, drop install-only content.
  BuildInterface,
  /// Keep `$<INSTALL_INTERFACE:...>` content, drop build-only content.
  InstallInterface,
}

/// Raw text of everything after the `:` of `call`.
fn call_content(call: &Call) -> String {
  call
    .params
    .as_ref()
    .map(|params| params.iter().map(|p| p.raw.as_str()).collect::<Vec<_>>().join(","))
    .unwrap_or_default()
}

/// Whether `path` is absolute on any supported platform.
fn is_full_path(path: &str) -> bool {
  let bytes = path.as_bytes();
  path.starts_with(['/', '\\']) || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}

fn prefix_items(content: &str, prefix: &str, out: &mut String) {
  for (i, item) in split_list(content).iter().enumerate() {
    if i > 0 {
      out.push(';');
    }
    if !is_full_path(item) && find(item) != Some(0) {
      out.push_str(prefix);
    }
    out.push_str(item);
  }
}

/// Rewrite a usage requirement for `context`.
///
/// Only top-level expressions are inspected. Expressions other than the
/// build and install markers are kept verbatim unless every expression is
/// stripped. In [`PreprocessContext::InstallInterface`], relative items of
/// install content are prefixed with `import_prefix`.
pub fn preprocess(input: &str, context: PreprocessContext, import_prefix: Option<&str>) -> String {
  let mut result = String::with_capacity(input.len());

  for node in parse(input) {
    let call = match node {
      Node::Text(text) | Node::Unterminated(text) => {
        result.push_str(&text);
        continue;
      }
      Node::Call(call) => call,
    };
    if context == PreprocessContext::StripAllGeneratorExpressions {
      continue;
    }

    match (call.literal_identifier(), context) {
      (Some("BUILD_INTERFACE"), PreprocessContext::BuildInterface) => result.push_str(&call_content(&call)),
      (Some("INSTALL_INTERFACE"), PreprocessContext::InstallInterface) => {
        let content = call_content(&call);
        match import_prefix {
          Some(prefix) if !content.is_empty() => prefix_items(&content, prefix, &mut result),
          _ => result.push_str(&content),
        }
      }
      (Some("BUILD_INTERFACE" | "INSTALL_INTERFACE" | "BUILD_LOCAL_INTERFACE"), _) => {}
      _ => result.push_str(&call.source),
    }
  }

  strip_empty_list_elements(&result)
}

fn collect_into(input: &str, collected: &mut BTreeMap<String, Vec<String>>, mut remaining: Option<&mut String>) {
  for node in parse(input) {
    match node {
      Node::Text(text) | Node::Unterminated(text) => {
        if let Some(out) = remaining.as_mut() {
          out.push_str(&text);
        }
      }
      Node::Call(call) => {
        let Some(name) = call.literal_identifier() else {
          continue;
        };
        if call.params.is_none() {
          continue;
        }
        let content = call_content(&call);
        collect_into(&content, collected, None);
        collected.entry(name.to_string()).or_default().push(content);
      }
    }
  }
}

/// Move the content of every `$<NAME:content>` into `collected` under
/// `NAME`, and return the remaining text.
///
/// Nested expressions are collected too, inner ones first.
pub fn collect(input: &str, collected: &mut BTreeMap<String, Vec<String>>) -> String {
  let mut remaining = String::with_capacity(input.len());
  collect_into(input, collected, Some(&mut remaining));
  strip_empty_list_elements(&remaining)
}

/// Split at top-level commas, the way call parameters are split.
///
/// ```
/// use genex_lib::genex::split;
///
/// assert_eq!(split("$<A:x,y>,z"), vec!["$<A:x,y>", "z"]);
/// ```
pub fn split(input: &str) -> Vec<String> {
  split_arguments(input).into_iter().map(str::to_string).collect()
}

/// Split a `;`-list without breaking generator expressions apart.
///
/// Each expression stays in one element together with the text around it up
/// to the neighbouring separators. Empty elements are dropped.
pub fn split_list(input: &str) -> Vec<String> {
  split_nested(input, b';', false)
    .into_iter()
    .filter(|item| !item.is_empty())
    .map(str::to_string)
    .collect()
}

/// Split on top-level `;` keeping empty elements.
pub fn split_top_level_list(input: &str) -> Vec<&str> {
  split_nested(input, b';', false)
}

/// Offset of the first `$<` that has a `>` somewhere after it.
pub fn find(input: &str) -> Option<usize> {
  let open = input.find("$<")?;
  input[open..].contains('>').then_some(open)
}

pub fn starts_with_generator_expression(input: &str) -> bool {
  input.starts_with("$<")
}

/// Replace every `$<INSTALL_PREFIX>` in `input`.
pub fn replace_install_prefix(input: &mut String, replacement: &str) {
  if input.contains("$<INSTALL_PREFIX>") {
    *input = input.replace("$<INSTALL_PREFIX>", replacement);
  }
}

/// Whether `name` could name a target: non-empty, made of letters, digits and
/// `_.:+-`.
pub fn is_valid_target_name(name: &str) -> bool {
  !name.is_empty()
    && name
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '+' | '-'))
}
