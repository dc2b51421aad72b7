//! Operators that read targets and their properties.

use super::{Arity, Invocation, Operator, bool_output};
use crate::dag::ForGenex;
use crate::error::GenexError;
use crate::genex::is_valid_target_name;
use crate::target::{TargetId, TargetKind};

pub(super) const OPERATORS: &[Operator] = &[
  Operator::new("TARGET_PROPERTY", Arity::OneOrMore, target_property),
  Operator::new("TARGET_EXISTS", Arity::Exactly(1), target_exists),
  Operator::new("TARGET_NAME_IF_EXISTS", Arity::Exactly(1), target_name_if_exists),
  Operator::new("TARGET_NAME", Arity::Exactly(1), target_name).with_arbitrary_content(),
  Operator::new("TARGET_FILE", Arity::Exactly(1), target_file),
  Operator::new("TARGET_FILE_NAME", Arity::Exactly(1), target_file_name),
  Operator::new("TARGET_FILE_DIR", Arity::Exactly(1), target_file_dir),
  Operator::new("LINK_ONLY", Arity::Exactly(1), link_only).with_arbitrary_content(),
  Operator::new("COMPILE_FEATURES", Arity::OneOrMore, compile_features),
];

fn is_property_name(value: &str) -> bool {
  !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Resolve a target named by parameter text, reporting invalid or unknown
/// names.
fn resolve_target(inv: &mut Invocation<'_, '_, '_>, name: &str) -> Result<TargetId, String> {
  if !is_valid_target_name(name) {
    let operator = inv.name().to_string();
    return Err(inv.error(GenexError::InvalidTargetName {
      operator,
      name: name.to_string(),
    }));
  }
  inv.lookup().find_target(name).ok_or_else(|| {
    inv.error(GenexError::TargetNotFound {
      name: name.to_string(),
    })
  })
}

fn target_property(inv: &mut Invocation<'_, '_, '_>) -> String {
  if inv.len() > 2 {
    return inv.error(GenexError::InvalidArgument {
      operator: "TARGET_PROPERTY".to_string(),
      message: "$<TARGET_PROPERTY:...> expression requires one or two parameters".to_string(),
    });
  }

  let (target, name, property) = if inv.len() == 1 {
    let property = inv.arg(0);
    let Some(head) = inv.context().head_target else {
      return inv.error(GenexError::MissingHeadTarget {
        operator: "TARGET_PROPERTY".to_string(),
      });
    };
    inv.context_mut().mark_head_sensitive();
    (head, inv.lookup().target_name(head).to_string(), property)
  } else {
    let name = inv.arg(0);
    let property = inv.arg(1);
    match resolve_target(inv, &name) {
      Ok(target) => (target, name, property),
      Err(empty) => return empty,
    }
  };

  if !is_property_name(&property) {
    return inv.error(GenexError::InvalidPropertyName { name: property });
  }

  let lookup = inv.lookup();
  let ctx = inv.context_mut();
  ctx.all_targets.insert(target);
  ctx.seen_target_properties.insert(property.clone());
  if property == "SOURCES" {
    ctx.source_sensitive_targets.insert(target);
  }

  match property.as_str() {
    "NAME" => return lookup.target_name(target).to_string(),
    "TYPE" => return lookup.target_kind(target).to_string(),
    "ALIASED_TARGET" => {
      return match lookup.resolve_alias(&name) {
        Some(real) => lookup.target_name(real).to_string(),
        None => String::new(),
      };
    }
    _ => {}
  }

  let dag = inv.dag();
  let in_link_libraries = dag.evaluating_link_libraries(None, ForGenex::Any);
  if property == "LINKER_LANGUAGE"
    && lookup.target_kind(target) == TargetKind::StaticLibrary
    && (in_link_libraries || dag.evaluating_sources())
  {
    let message = format!(
      "LINKER_LANGUAGE for the static library target \"{}\" may not be used in link libraries or sources.",
      lookup.target_name(target)
    );
    return inv.error(GenexError::NotAllowed {
      operator: "TARGET_PROPERTY".to_string(),
      message,
    });
  }

  let transitive_only = property == "INTERFACE_LINK_LIBRARIES" && !in_link_libraries;
  inv.evaluate_property(target, &property, transitive_only)
}

fn target_exists(inv: &mut Invocation<'_, '_, '_>) -> String {
  let name = inv.arg(0);
  if !is_valid_target_name(&name) {
    return inv.error(GenexError::InvalidTargetName {
      operator: "TARGET_EXISTS".to_string(),
      name,
    });
  }
  bool_output(inv.lookup().find_target(&name).is_some())
}

fn target_name_if_exists(inv: &mut Invocation<'_, '_, '_>) -> String {
  let name = inv.arg(0);
  if !is_valid_target_name(&name) {
    return inv.error(GenexError::InvalidTargetName {
      operator: "TARGET_NAME_IF_EXISTS".to_string(),
      name,
    });
  }
  if inv.lookup().find_target(&name).is_some() {
    name
  } else {
    String::new()
  }
}

fn target_name(inv: &mut Invocation<'_, '_, '_>) -> String {
  inv.arg(0)
}

#[derive(Clone, Copy)]
enum ArtifactPart {
  File,
  Name,
  Dir,
}

fn target_artifact(inv: &mut Invocation<'_, '_, '_>, part: ArtifactPart) -> String {
  let name = inv.arg(0);
  let target = match resolve_target(inv, &name) {
    Ok(target) => target,
    Err(empty) => return empty,
  };

  let lookup = inv.lookup();
  if !lookup.target_kind(target).has_artifact() {
    let message = format!("Target \"{name}\" is not an executable or library.");
    let operator = inv.name().to_string();
    return inv.error(GenexError::NotAllowed { operator, message });
  }

  let dag = inv.dag();
  if dag.evaluating_link_libraries(Some(target), ForGenex::Any)
    || (dag.evaluating_sources() && dag.top_target() == Some(target))
  {
    let operator = inv.name().to_string();
    return inv.error(GenexError::NotAllowed {
      operator,
      message: "Expressions which require the linker language may not be used while evaluating link libraries"
        .to_string(),
    });
  }

  let ctx = inv.context_mut();
  ctx.depend_targets.insert(target);
  ctx.all_targets.insert(target);
  ctx.mark_context_sensitive();

  let Some(path) = lookup.artifact_path(target, &ctx.config) else {
    return String::new();
  };
  let (dir, file) = path.rsplit_once('/').unwrap_or(("", path.as_str()));
  match part {
    ArtifactPart::File => path.clone(),
    ArtifactPart::Name => file.to_string(),
    ArtifactPart::Dir => dir.to_string(),
  }
}

fn target_file(inv: &mut Invocation<'_, '_, '_>) -> String {
  target_artifact(inv, ArtifactPart::File)
}

fn target_file_name(inv: &mut Invocation<'_, '_, '_>) -> String {
  target_artifact(inv, ArtifactPart::Name)
}

fn target_file_dir(inv: &mut Invocation<'_, '_, '_>) -> String {
  target_artifact(inv, ArtifactPart::Dir)
}

fn link_only(inv: &mut Invocation<'_, '_, '_>) -> String {
  if inv.dag().depth() == 0 {
    return inv.error(GenexError::NotAllowed {
      operator: "LINK_ONLY".to_string(),
      message: "$<LINK_ONLY:...> may only be used for linking".to_string(),
    });
  }
  if inv.dag().transitive_properties_only() {
    return String::new();
  }
  inv.arg(0)
}

const C_STANDARDS: &[&str] = &["90", "99", "11", "17", "23"];
const CXX_STANDARDS: &[&str] = &["98", "11", "14", "17", "20", "23", "26"];

fn standards(language: &str) -> &'static [&'static str] {
  match language {
    "C" | "OBJC" => C_STANDARDS,
    _ => CXX_STANDARDS,
  }
}

/// Position of `standard` in the ordered standards of `language`.
fn standard_rank(language: &str, standard: &str) -> Option<usize> {
  standards(language).iter().position(|s| *s == standard)
}

/// Split a `<lang>_std_<N>` feature into language and standard.
fn parse_feature(feature: &str) -> Option<(&'static str, &str)> {
  let (prefix, standard) = feature.split_once("_std_")?;
  let language = match prefix {
    "c" => "C",
    "cxx" => "CXX",
    "cuda" => "CUDA",
    "hip" => "HIP",
    "objc" => "OBJC",
    "objcxx" => "OBJCXX",
    _ => return None,
  };
  standard_rank(language, standard).map(|_| (language, standard))
}

fn compile_features(inv: &mut Invocation<'_, '_, '_>) -> String {
  let Some(head) = inv.context().head_target else {
    return inv.error(GenexError::MissingHeadTarget {
      operator: "COMPILE_FEATURES".to_string(),
    });
  };

  let features = inv.args();
  let in_link_libraries = inv.dag().evaluating_link_libraries(None, ForGenex::Any);
  let lookup = inv.lookup();
  let config = inv.context().config.clone();
  let mut available = true;

  for feature in &features {
    let Some((language, standard)) = parse_feature(feature) else {
      return inv.error(GenexError::InvalidArgument {
        operator: "COMPILE_FEATURES".to_string(),
        message: format!("Feature \"{feature}\" is not known."),
      });
    };

    if in_link_libraries {
      let recorded = inv
        .context_mut()
        .max_language_standard
        .entry(head)
        .or_default()
        .entry(language.to_string())
        .or_insert_with(|| standard.to_string());
      if standard_rank(language, standard) > standard_rank(language, recorded) {
        *recorded = standard.to_string();
      }
      continue;
    }

    let actual = lookup.language_standard(head, language, &config);
    let met = actual
      .as_deref()
      .and_then(|a| standard_rank(language, a))
      .zip(standard_rank(language, standard))
      .is_some_and(|(have, need)| have >= need);
    available &= met;
  }

  inv.context_mut().mark_head_sensitive();
  if in_link_libraries {
    bool_output(true)
  } else {
    bool_output(available)
  }
}
