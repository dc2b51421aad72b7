//! Types for build targets and project descriptions.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable handle of a target inside a graph.
///
/// Handles are arena indices: two handles refer to the same target exactly
/// when they are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetId(pub(crate) usize);

impl TargetId {
  pub fn index(self) -> usize {
    self.0
  }
}

impl fmt::Display for TargetId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// What a target produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
  Executable,
  StaticLibrary,
  SharedLibrary,
  ModuleLibrary,
  ObjectLibrary,
  InterfaceLibrary,
  Utility,
}

impl TargetKind {
  /// Whether the target produces a linkable or runnable file.
  pub fn has_artifact(self) -> bool {
    matches!(
      self,
      TargetKind::Executable | TargetKind::StaticLibrary | TargetKind::SharedLibrary | TargetKind::ModuleLibrary
    )
  }
}

impl fmt::Display for TargetKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      TargetKind::Executable => "EXECUTABLE",
      TargetKind::StaticLibrary => "STATIC_LIBRARY",
      TargetKind::SharedLibrary => "SHARED_LIBRARY",
      TargetKind::ModuleLibrary => "MODULE_LIBRARY",
      TargetKind::ObjectLibrary => "OBJECT_LIBRARY",
      TargetKind::InterfaceLibrary => "INTERFACE_LIBRARY",
      TargetKind::Utility => "UTILITY",
    };
    f.write_str(name)
  }
}

/// A target stored in a [`TargetGraph`](super::TargetGraph).
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
  pub name: String,
  pub kind: TargetKind,

  /// Imported targets describe prebuilt files outside the project.
  pub imported: bool,

  /// Raw property values. Values may contain generator expressions.
  pub properties: BTreeMap<String, String>,

  /// Directory artifacts are written to.
  pub output_dir: String,
}

/// A target entry of a JSON project description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDecl {
  pub name: String,
  pub kind: TargetKind,

  #[serde(default)]
  pub imported: bool,

  #[serde(default)]
  pub properties: BTreeMap<String, String>,

  /// Names of targets this one links to, in link order.
  #[serde(default)]
  pub links: Vec<String>,

  #[serde(default)]
  pub output_dir: Option<String>,
}

/// A complete project: platform, targets, and aliases.
///
/// ```json
/// {
///   "platform": "Linux",
///   "targets": [
///     { "name": "core", "kind": "static_library",
///       "properties": { "INTERFACE_INCLUDE_DIRECTORIES": "/src/core/include" } },
///     { "name": "app", "kind": "executable", "links": ["core"] }
///   ],
///   "aliases": { "proj::core": "core" }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectDescription {
  #[serde(default)]
  pub platform: String,

  #[serde(default)]
  pub targets: Vec<TargetDecl>,

  #[serde(default)]
  pub aliases: BTreeMap<String, String>,
}

/// Errors that can occur while building a target graph.
#[derive(Debug, Error)]
pub enum ProjectError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("invalid project description: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid target name: '{0}'")]
  InvalidTargetName(String),

  #[error("duplicate target: {0}")]
  DuplicateTarget(String),

  #[error("alias '{alias}' refers to unknown target '{target}'")]
  UnknownAliasTarget { alias: String, target: String },

  #[error("target '{target}' links to unknown target '{dependency}'")]
  UnknownLinkDependency { target: String, dependency: String },
}
