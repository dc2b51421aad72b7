//! Tree walk over parsed expressions.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::context::EvalContext;
use crate::dag::{DagChecker, DagFrame, DagResult, transitive_base};
use crate::error::GenexError;
use crate::list::{append_list, strip_empty_list_elements};
use crate::operators::{Invocation, OperatorRegistry};
use crate::parse::{Call, Node, parse};
use crate::target::TargetId;

fn is_link_libraries_property(property: &str) -> bool {
  matches!(
    property,
    "LINK_LIBRARIES"
      | "INTERFACE_LINK_LIBRARIES"
      | "INTERFACE_LINK_LIBRARIES_DIRECT"
      | "INTERFACE_LINK_LIBRARIES_DIRECT_EXCLUDE"
  )
}

/// How a property fetch was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PropertyRequest {
  /// Named by a `$<TARGET_PROPERTY:...>` call.
  Explicit,
  /// Like `Explicit`, but only transitive content is wanted.
  TransitiveOnly,
  /// Implicit fetch of a dependency's usage requirement.
  Usage,
}

pub(crate) struct Evaluator<'e, 'g> {
  pub(crate) ctx: &'e mut EvalContext<'g>,
  pub(crate) dag: &'e mut DagChecker,
  registry: &'e OperatorRegistry,
  /// Usage requirements already appended by the current usage walk.
  appended: Option<HashSet<(TargetId, String)>>,
  /// Usage requirements left out of a value, by deduplication or a link cycle.
  omitted: usize,
}

impl<'e, 'g> Evaluator<'e, 'g> {
  pub(crate) fn new(ctx: &'e mut EvalContext<'g>, dag: &'e mut DagChecker, registry: &'e OperatorRegistry) -> Self {
    Self {
      ctx,
      dag,
      registry,
      appended: None,
      omitted: 0,
    }
  }

  pub(crate) fn evaluate_nodes(&mut self, nodes: &[Node]) -> String {
    let mut output = String::new();
    for node in nodes {
      output.push_str(&self.evaluate_node(node));
    }
    output
  }

  fn evaluate_node(&mut self, node: &Node) -> String {
    match node {
      Node::Text(text) => text.clone(),
      Node::Call(call) => self.evaluate_call(call),
      Node::Unterminated(text) => {
        self.ctx.report(GenexError::Unterminated { text: text.clone() }, text);
        String::new()
      }
    }
  }

  fn evaluate_call(&mut self, call: &Call) -> String {
    let errors_before = self.ctx.error_count();

    let name = self.evaluate_nodes(&call.identifier);
    if self.ctx.error_count() > errors_before {
      return String::new();
    }

    let registry = self.registry;
    let Some(operator) = registry.get(&name) else {
      self.ctx.report(GenexError::UnknownExpression { name }, &call.source);
      return String::new();
    };

    let count = operator.logical_count(call.param_count());
    if !operator.arity.accepts(count) {
      self.ctx.report(
        GenexError::ParameterCount {
          name,
          expected: operator.arity,
          actual: count,
        },
        &call.source,
      );
      return String::new();
    }

    trace!(operator = operator.name, params = count, "evaluate call");
    let output = (operator.eval)(&mut Invocation::new(self, operator, call));

    if self.ctx.error_count() > errors_before {
      String::new()
    } else {
      output
    }
  }

  /// Parse and evaluate `text`.
  pub(crate) fn evaluate_text(&mut self, text: &str) -> String {
    if !text.contains("$<") {
      return text.to_string();
    }
    self.evaluate_nodes(&parse(text))
  }

  fn with_frame<F>(&mut self, frame: DagFrame, f: F) -> String
  where
    F: FnOnce(&mut Self) -> String,
  {
    self.dag.push(frame);
    let output = f(self);
    self.dag.pop();
    output
  }

  /// Evaluate `property` of `target`, including the usage requirements of
  /// its link dependencies when the property is transitive.
  ///
  /// Values are memoized in the DAG checker. A value that reported an error
  /// is memoized as empty, and a value missing usage requirements another
  /// walk already supplied is not memoized at all.
  pub(crate) fn evaluate_property(
    &mut self,
    target: TargetId,
    property: &str,
    origin: &str,
    request: PropertyRequest,
  ) -> String {
    if request == PropertyRequest::Usage
      && let Some(appended) = self.appended.as_mut()
      && !appended.insert((target, property.to_string()))
    {
      self.omitted += 1;
      return String::new();
    }

    let result = self.dag.check(Some(target), property);
    match result {
      DagResult::Dag => {}
      DagResult::SelfReference | DagResult::CyclicReference if request == PropertyRequest::Usage => {
        debug!(
          target = %self.ctx.target_name(Some(target)),
          property = %property,
          "skipping link cycle"
        );
        self.omitted += 1;
        return String::new();
      }
      DagResult::SelfReference | DagResult::CyclicReference => {
        self.dag.report_error(self.ctx, result, Some(target), origin);
        return String::new();
      }
      DagResult::AlreadySeen => {
        if let Some(value) = self.dag.seen_value(Some(target), property) {
          return value.to_string();
        }
        // No complete value was recorded
      }
    }

    let lookup = self.ctx.lookup;
    let config = self.ctx.config.clone();
    let raw = lookup.lookup_property(target, property, &config);
    let base = transitive_base(lookup, Some(target), property);

    // Plain properties are returned as written
    if base.is_none() && !is_link_libraries_property(property) {
      let value = raw.unwrap_or_default();
      self.dag.record(Some(target), property, &value);
      return value;
    }

    debug!(
      target = %self.ctx.target_name(Some(target)),
      property = %property,
      depth = self.dag.depth() + 1,
      "evaluate property"
    );

    let frame = DagFrame::new(Some(target), property)
      .with_expression(origin)
      .with_backtrace(self.ctx.backtrace.clone())
      .with_transitive_properties_only(request == PropertyRequest::TransitiveOnly);

    let errors_before = self.ctx.error_count();
    let omitted_before = self.omitted;

    let value = self.with_frame(frame, |ev| {
      let previous = ev.ctx.current_target.replace(target);

      let mut value = match &raw {
        Some(raw) => ev.evaluate_text(raw),
        None => String::new(),
      };

      if let Some(base) = base {
        // An explicit request starts its own walk
        let outer = match request {
          PropertyRequest::Usage => None,
          _ => Some(ev.appended.replace(HashSet::new())),
        };

        let interface = format!("INTERFACE_{base}");
        for dependency in lookup.link_dependencies(target, &config) {
          let usage = ev.evaluate_property(dependency, &interface, origin, PropertyRequest::Usage);
          append_list(&mut value, &usage);
        }

        // Omissions inside its own walk leave the walk owner complete
        if let Some(outer) = outer {
          ev.appended = outer;
          ev.omitted = omitted_before;
        }
      }

      ev.ctx.current_target = previous;
      strip_empty_list_elements(&value)
    });

    if self.ctx.error_count() > errors_before {
      self.dag.record(Some(target), property, "");
      return String::new();
    }
    if self.omitted == omitted_before {
      self.dag.record(Some(target), property, &value);
    }
    value
  }

  /// Evaluate the content of a `GENEX_EVAL` style operator under its own
  /// DAG frame.
  pub(crate) fn evaluate_genex_content(
    &mut self,
    target: Option<TargetId>,
    label: &str,
    expression: &str,
    origin: &str,
    retarget: bool,
  ) -> String {
    let property = format!("{label}:{expression}");
    let result = self.dag.check(target, &property);
    match result {
      DagResult::Dag => {}
      DagResult::SelfReference | DagResult::CyclicReference => {
        self.dag.report_error(self.ctx, result, target, origin);
        return String::new();
      }
      DagResult::AlreadySeen => {
        return self.dag.seen_value(target, &property).unwrap_or_default().to_string();
      }
    }

    let frame = DagFrame::new(target, property.clone())
      .with_expression(origin)
      .with_backtrace(self.ctx.backtrace.clone());

    let errors_before = self.ctx.error_count();
    let value = self.with_frame(frame, |ev| {
      if !retarget {
        return ev.evaluate_text(expression);
      }
      let head = std::mem::replace(&mut ev.ctx.head_target, target);
      let current = std::mem::replace(&mut ev.ctx.current_target, target);
      let value = ev.evaluate_text(expression);
      ev.ctx.head_target = head;
      ev.ctx.current_target = current;
      value
    });

    if self.ctx.error_count() > errors_before {
      self.dag.record(target, &property, "");
      return String::new();
    }
    self.dag.record(target, &property, &value);
    value
  }
}
