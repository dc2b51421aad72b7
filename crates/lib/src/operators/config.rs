//! Operators that query the evaluation context.

use super::{Arity, Invocation, Operator, bool_output};
use crate::dag::ForGenex;
use crate::error::GenexError;
use crate::list::expand_list;

pub(super) const OPERATORS: &[Operator] = &[
  Operator::new("CONFIG", Arity::ZeroOrMore, config),
  Operator::new("PLATFORM_ID", Arity::ZeroOrMore, platform_id),
  Operator::new("COMPILE_LANGUAGE", Arity::ZeroOrMore, compile_language),
  Operator::new("LINK_LANGUAGE", Arity::ZeroOrMore, link_language),
  Operator::new("BUILD_INTERFACE", Arity::Exactly(1), build_interface).with_arbitrary_content(),
  Operator::new("BUILD_LOCAL_INTERFACE", Arity::Exactly(1), build_interface).with_arbitrary_content(),
  Operator::new("INSTALL_INTERFACE", Arity::Exactly(1), install_interface).with_arbitrary_content(),
  Operator::new("INSTALL_PREFIX", Arity::Exactly(0), install_prefix),
  Operator::new("GENEX_EVAL", Arity::Exactly(1), genex_eval).with_arbitrary_content(),
  Operator::new("TARGET_GENEX_EVAL", Arity::Exactly(2), target_genex_eval).with_arbitrary_content(),
];

fn is_config_name(value: &str) -> bool {
  value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn config(inv: &mut Invocation<'_, '_, '_>) -> String {
  inv.context_mut().mark_context_sensitive();
  if inv.is_empty() {
    return inv.context().config.clone();
  }

  let wanted = inv.args();
  if let Some(bad) = wanted.iter().find(|w| !is_config_name(w)) {
    return inv.error(GenexError::InvalidSyntax {
      name: "CONFIG".to_string(),
      value: bad.clone(),
    });
  }

  let ctx = inv.context();
  let active = ctx.config.as_str();
  if wanted.iter().any(|w| w.eq_ignore_ascii_case(active)) {
    return bool_output(true);
  }

  // Imported targets may map the active configuration to other ones
  if let Some(current) = ctx.current_target
    && ctx.lookup.is_imported(current)
  {
    let property = format!("MAP_IMPORTED_CONFIG_{}", active.to_ascii_uppercase());
    if let Some(mapped) = ctx.lookup.lookup_property(current, &property, "") {
      let matched = expand_list(&mapped)
        .iter()
        .any(|m| wanted.iter().any(|w| w.eq_ignore_ascii_case(m)));
      return bool_output(matched);
    }
  }

  bool_output(false)
}

fn platform_id(inv: &mut Invocation<'_, '_, '_>) -> String {
  let platform = inv.lookup().platform_id();
  if inv.is_empty() {
    return platform.to_string();
  }
  let wanted = inv.args();
  bool_output(wanted.iter().any(|w| w == platform))
}

fn compile_language(inv: &mut Invocation<'_, '_, '_>) -> String {
  let dag = inv.dag();
  if dag.evaluating_link_expression() || dag.evaluating_link_libraries(None, ForGenex::Any) {
    return inv.error(GenexError::NotAllowed {
      operator: "COMPILE_LANGUAGE".to_string(),
      message: "$<COMPILE_LANGUAGE:...> may not be used with link properties.".to_string(),
    });
  }

  let language = inv.context().language.clone();
  if language.is_empty() {
    return inv.error(GenexError::NotAllowed {
      operator: "COMPILE_LANGUAGE".to_string(),
      message: "$<COMPILE_LANGUAGE:...> may only be used to specify include directories, compile definitions, and compile options."
        .to_string(),
    });
  }

  if inv.is_empty() {
    return language;
  }
  let wanted = inv.args();
  bool_output(wanted.contains(&language))
}

fn link_language(inv: &mut Invocation<'_, '_, '_>) -> String {
  let ctx = inv.context();
  let dag = inv.dag();
  let link_libraries = dag.evaluating_link_libraries(None, ForGenex::Any);
  let allowed = ctx.head_target.is_some()
    && (dag.evaluating_link_expression() || link_libraries || dag.evaluating_linker_launcher());

  if !allowed {
    return inv.error(GenexError::NotAllowed {
      operator: "LINK_LANGUAGE".to_string(),
      message: "$<LINK_LANGUAGE:...> may only be used with binary targets to specify link libraries, link directories, link options and link depends."
        .to_string(),
    });
  }
  if link_libraries && inv.is_empty() {
    return inv.error(GenexError::NotAllowed {
      operator: "LINK_LANGUAGE".to_string(),
      message: "$<LINK_LANGUAGE> is not supported in link libraries expression.".to_string(),
    });
  }

  inv.context_mut().mark_link_language_sensitive();
  let language = inv.context().language.clone();
  if inv.is_empty() {
    return language;
  }
  let wanted = inv.args();
  bool_output(wanted.contains(&language))
}

fn build_interface(inv: &mut Invocation<'_, '_, '_>) -> String {
  inv.arg(0)
}

fn install_interface(_: &mut Invocation<'_, '_, '_>) -> String {
  String::new()
}

fn install_prefix(inv: &mut Invocation<'_, '_, '_>) -> String {
  inv.error(GenexError::NotAllowed {
    operator: "INSTALL_PREFIX".to_string(),
    message: "INSTALL_PREFIX is a marker for install(EXPORT) only.  It should never be evaluated.".to_string(),
  })
}

fn genex_eval(inv: &mut Invocation<'_, '_, '_>) -> String {
  let expression = inv.arg(0);
  if !expression.contains("$<") {
    return expression;
  }
  let target = inv.context().current_target;
  inv.evaluate_genex(target, &expression, false)
}

fn target_genex_eval(inv: &mut Invocation<'_, '_, '_>) -> String {
  let name = inv.arg(0);
  let expression = inv.arg(1);

  if !crate::genex::is_valid_target_name(&name) {
    return inv.error(GenexError::InvalidTargetName {
      operator: "TARGET_GENEX_EVAL".to_string(),
      name,
    });
  }
  let Some(target) = inv.lookup().find_target(&name) else {
    return inv.error(GenexError::TargetNotFound { name });
  };
  if !expression.contains("$<") {
    return expression;
  }
  inv.evaluate_genex(Some(target), &expression, true)
}
