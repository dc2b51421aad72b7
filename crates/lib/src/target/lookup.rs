//! The interface the evaluator uses to query the target graph.

use std::collections::HashSet;

use super::types::{TargetId, TargetKind};

/// Read-only view of the build targets of one generate pass.
///
/// The evaluator holds this as a borrowed reference for the duration of one
/// evaluation and never mutates targets through it.
pub trait TargetLookup {
  /// Find a target by name, following aliases.
  fn find_target(&self, name: &str) -> Option<TargetId>;

  /// Resolve an alias name to the target it stands for.
  fn resolve_alias(&self, name: &str) -> Option<TargetId>;

  fn target_name(&self, target: TargetId) -> &str;

  fn target_kind(&self, target: TargetId) -> TargetKind;

  fn is_imported(&self, _target: TargetId) -> bool {
    false
  }

  /// The raw, unevaluated value of a property.
  fn lookup_property(&self, target: TargetId, property: &str, config: &str) -> Option<String>;

  /// Targets linked by `target`, in link order.
  fn link_dependencies(&self, target: TargetId, config: &str) -> Vec<TargetId>;

  /// Full path of the file `target` produces for `config`.
  fn artifact_path(&self, target: TargetId, config: &str) -> Option<String>;

  /// The language standard `target` compiles `language` with, e.g. `"17"`.
  fn language_standard(&self, target: TargetId, language: &str, config: &str) -> Option<String> {
    self.lookup_property(target, &format!("{language}_STANDARD"), config)
  }

  /// Whether `property` is declared transitive by the project for `target`,
  /// in addition to the built-in usage requirements.
  fn is_custom_transitive_property(&self, _target: TargetId, _property: &str) -> bool {
    false
  }

  /// Identifier of the platform being generated for, e.g. `"Linux"`.
  fn platform_id(&self) -> &str {
    ""
  }

  /// Whether `to` is reachable from `from` through link dependencies.
  fn is_reachable(&self, from: TargetId, to: TargetId, config: &str) -> bool {
    let mut stack = vec![from];
    let mut visited = HashSet::new();
    while let Some(target) = stack.pop() {
      if target == to {
        return true;
      }
      if visited.insert(target) {
        stack.extend(self.link_dependencies(target, config));
      }
    }
    false
  }
}
