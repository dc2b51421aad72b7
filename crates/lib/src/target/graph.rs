//! Arena-backed target graph.
//!
//! Targets live in a `Vec` and are addressed by [`TargetId`]. Link edges are
//! kept in a petgraph `DiGraph` whose node indices mirror the arena indices,
//! from the linking target to the linked one.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use petgraph::Direction;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, info};

use super::lookup::TargetLookup;
use super::types::{ProjectDescription, ProjectError, Target, TargetId, TargetKind};
use crate::genex::is_valid_target_name;
use crate::list::expand_list;

/// Build targets of one generate pass and the links between them.
#[derive(Debug, Default)]
pub struct TargetGraph {
  targets: Vec<Target>,
  names: HashMap<String, TargetId>,
  aliases: HashMap<String, TargetId>,
  links: DiGraph<TargetId, ()>,
  platform: String,
  /// Custom transitive property names per target.
  custom_transitive: HashMap<TargetId, Vec<String>>,
}

impl TargetGraph {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
    self.platform = platform.into();
    self
  }

  /// Add a target and return its handle.
  ///
  /// # Errors
  ///
  /// Returns `InvalidTargetName` or `DuplicateTarget` when the name cannot be
  /// used.
  pub fn add_target(&mut self, name: &str, kind: TargetKind) -> Result<TargetId, ProjectError> {
    if !is_valid_target_name(name) {
      return Err(ProjectError::InvalidTargetName(name.to_string()));
    }
    if self.names.contains_key(name) || self.aliases.contains_key(name) {
      return Err(ProjectError::DuplicateTarget(name.to_string()));
    }

    let id = TargetId(self.targets.len());
    self.targets.push(Target {
      name: name.to_string(),
      kind,
      imported: false,
      properties: BTreeMap::new(),
      output_dir: String::new(),
    });
    let node = self.links.add_node(id);
    debug_assert_eq!(node.index(), id.0);
    self.names.insert(name.to_string(), id);

    debug!(target = %name, kind = %kind, "added target");
    Ok(id)
  }

  /// Make `alias` another name for `target`.
  pub fn add_alias(&mut self, alias: &str, target: TargetId) -> Result<(), ProjectError> {
    if !is_valid_target_name(alias) {
      return Err(ProjectError::InvalidTargetName(alias.to_string()));
    }
    if self.names.contains_key(alias) || self.aliases.contains_key(alias) {
      return Err(ProjectError::DuplicateTarget(alias.to_string()));
    }
    self.aliases.insert(alias.to_string(), target);
    Ok(())
  }

  pub fn set_property(&mut self, target: TargetId, name: &str, value: impl Into<String>) {
    let value = value.into();
    if name == "TRANSITIVE_COMPILE_PROPERTIES" || name == "TRANSITIVE_LINK_PROPERTIES" {
      self
        .custom_transitive
        .entry(target)
        .or_default()
        .extend(expand_list(&value).into_iter().filter(|p| !p.is_empty()).map(str::to_string));
    }
    self.targets[target.0].properties.insert(name.to_string(), value);
  }

  pub fn set_imported(&mut self, target: TargetId, imported: bool) {
    self.targets[target.0].imported = imported;
  }

  pub fn set_output_dir(&mut self, target: TargetId, dir: impl Into<String>) {
    self.targets[target.0].output_dir = dir.into();
  }

  /// Record that `target` links to `dependency`.
  pub fn link(&mut self, target: TargetId, dependency: TargetId) {
    self.links.add_edge(node(target), node(dependency), ());
  }

  pub fn target(&self, id: TargetId) -> &Target {
    &self.targets[id.0]
  }

  pub fn len(&self) -> usize {
    self.targets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.targets.is_empty()
  }

  /// Iterate over all targets in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = (TargetId, &Target)> {
    self.targets.iter().enumerate().map(|(i, t)| (TargetId(i), t))
  }

  /// Build a graph from a deserialized project description.
  ///
  /// All targets are created first so links may refer to targets declared
  /// later in the file.
  pub fn from_project(project: ProjectDescription) -> Result<Self, ProjectError> {
    let mut graph = TargetGraph::new().with_platform(project.platform);

    for decl in &project.targets {
      let id = graph.add_target(&decl.name, decl.kind)?;
      graph.set_imported(id, decl.imported);
      if let Some(dir) = &decl.output_dir {
        graph.set_output_dir(id, dir.clone());
      }
      for (name, value) in &decl.properties {
        graph.set_property(id, name, value.clone());
      }
    }

    for (alias, target) in &project.aliases {
      let id = graph.names.get(target).copied().ok_or_else(|| ProjectError::UnknownAliasTarget {
        alias: alias.clone(),
        target: target.clone(),
      })?;
      graph.add_alias(alias, id)?;
    }

    for decl in &project.targets {
      let Some(id) = graph.find_target(&decl.name) else {
        continue;
      };
      for dependency in &decl.links {
        let dep = graph
          .find_target(dependency)
          .ok_or_else(|| ProjectError::UnknownLinkDependency {
            target: decl.name.clone(),
            dependency: dependency.clone(),
          })?;
        graph.link(id, dep);
      }
    }

    Ok(graph)
  }

  pub fn from_json(json: &str) -> Result<Self, ProjectError> {
    let project: ProjectDescription = serde_json::from_str(json)?;
    Self::from_project(project)
  }

  /// Read a JSON project description from disk.
  pub fn load_project(path: &Path) -> Result<Self, ProjectError> {
    let content = fs::read_to_string(path)?;
    let graph = Self::from_json(&content)?;
    info!(path = %path.display(), targets = graph.len(), "loaded project");
    Ok(graph)
  }

  fn artifact_name(&self, target: &Target) -> String {
    let windows = self.platform == "Windows";
    let apple = self.platform == "Darwin";
    match target.kind {
      TargetKind::Executable if windows => format!("{}.exe", target.name),
      TargetKind::Executable => target.name.clone(),
      TargetKind::StaticLibrary if windows => format!("{}.lib", target.name),
      TargetKind::StaticLibrary => format!("lib{}.a", target.name),
      TargetKind::SharedLibrary | TargetKind::ModuleLibrary if windows => format!("{}.dll", target.name),
      TargetKind::SharedLibrary if apple => format!("lib{}.dylib", target.name),
      TargetKind::SharedLibrary | TargetKind::ModuleLibrary => format!("lib{}.so", target.name),
      TargetKind::ObjectLibrary | TargetKind::InterfaceLibrary | TargetKind::Utility => String::new(),
    }
  }
}

fn node(id: TargetId) -> NodeIndex {
  NodeIndex::new(id.0)
}

impl TargetLookup for TargetGraph {
  fn find_target(&self, name: &str) -> Option<TargetId> {
    self.names.get(name).copied().or_else(|| self.resolve_alias(name))
  }

  fn resolve_alias(&self, name: &str) -> Option<TargetId> {
    self.aliases.get(name).copied()
  }

  fn target_name(&self, target: TargetId) -> &str {
    &self.targets[target.0].name
  }

  fn target_kind(&self, target: TargetId) -> TargetKind {
    self.targets[target.0].kind
  }

  fn is_imported(&self, target: TargetId) -> bool {
    self.targets[target.0].imported
  }

  /// Configuration-specific `<NAME>_<CONFIG>` values take precedence over
  /// plain `<NAME>`.
  fn lookup_property(&self, target: TargetId, property: &str, config: &str) -> Option<String> {
    let properties = &self.targets.get(target.0)?.properties;
    if !config.is_empty()
      && let Some(value) = properties.get(&format!("{property}_{}", config.to_ascii_uppercase()))
    {
      return Some(value.clone());
    }
    properties.get(property).cloned()
  }

  fn link_dependencies(&self, target: TargetId, _config: &str) -> Vec<TargetId> {
    // petgraph yields the most recently added edge first
    let mut deps: Vec<TargetId> = self
      .links
      .neighbors_directed(node(target), Direction::Outgoing)
      .map(|n| self.links[n])
      .collect();
    deps.reverse();
    deps
  }

  fn artifact_path(&self, target: TargetId, config: &str) -> Option<String> {
    let t = self.targets.get(target.0)?;
    if !t.kind.has_artifact() {
      return None;
    }
    if t.imported {
      return self.lookup_property(target, "IMPORTED_LOCATION", config);
    }

    let mut dir = t.output_dir.trim_end_matches('/').to_string();
    if !config.is_empty() {
      if !dir.is_empty() {
        dir.push('/');
      }
      dir.push_str(config);
    }
    let name = self.artifact_name(t);
    if dir.is_empty() {
      Some(name)
    } else {
      Some(format!("{dir}/{name}"))
    }
  }

  fn is_custom_transitive_property(&self, target: TargetId, property: &str) -> bool {
    self
      .custom_transitive
      .get(&target)
      .is_some_and(|names| names.iter().any(|n| n == property))
  }

  fn platform_id(&self) -> &str {
    &self.platform
  }

  fn is_reachable(&self, from: TargetId, to: TargetId, _config: &str) -> bool {
    has_path_connecting(&self.links, node(from), node(to), None)
  }
}
