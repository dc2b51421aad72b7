//! Source location chains attached to expressions for diagnostics.
//!
//! A [`Backtrace`] is a persistent stack: pushing returns a new backtrace that
//! shares its tail with the original, so cloning one into every context and
//! DAG frame is cheap.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// A single location in a project description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
  /// File the expression was read from.
  pub file: String,

  /// 1-based line number.
  pub line: u32,

  /// The command or declaration that introduced the expression.
  pub command: String,
}

impl SourceLocation {
  pub fn new(file: impl Into<String>, line: u32, command: impl Into<String>) -> Self {
    Self {
      file: file.into(),
      line,
      command: command.into(),
    }
  }
}

impl fmt::Display for SourceLocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{} ({})", self.file, self.line, self.command)
  }
}

#[derive(Debug, PartialEq, Eq)]
struct Entry {
  location: SourceLocation,
  parent: Option<Rc<Entry>>,
}

/// Chain of source locations, innermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Backtrace {
  head: Option<Rc<Entry>>,
}

impl Backtrace {
  /// An empty backtrace.
  pub fn new() -> Self {
    Self::default()
  }

  /// Return a new backtrace with `location` as its innermost entry.
  pub fn push(&self, location: SourceLocation) -> Self {
    Self {
      head: Some(Rc::new(Entry {
        location,
        parent: self.head.clone(),
      })),
    }
  }

  /// Return the backtrace without its innermost entry.
  pub fn pop(&self) -> Self {
    Self {
      head: self.head.as_ref().and_then(|entry| entry.parent.clone()),
    }
  }

  /// The innermost location, if any.
  pub fn top(&self) -> Option<&SourceLocation> {
    self.head.as_deref().map(|entry| &entry.location)
  }

  pub fn is_empty(&self) -> bool {
    self.head.is_none()
  }

  pub fn depth(&self) -> usize {
    self.iter().count()
  }

  /// Iterate from the innermost location outwards.
  pub fn iter(&self) -> Iter<'_> {
    Iter {
      next: self.head.as_deref(),
    }
  }
}

impl fmt::Display for Backtrace {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, location) in self.iter().enumerate() {
      if i > 0 {
        writeln!(f)?;
      }
      write!(f, "  at {location}")?;
    }
    Ok(())
  }
}

/// Iterator over the locations of a [`Backtrace`].
pub struct Iter<'a> {
  next: Option<&'a Entry>,
}

impl<'a> Iterator for Iter<'a> {
  type Item = &'a SourceLocation;

  fn next(&mut self) -> Option<Self::Item> {
    let entry = self.next?;
    self.next = entry.parent.as_deref();
    Some(&entry.location)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn push_shares_tail() {
    let root = Backtrace::new().push(SourceLocation::new("project.json", 3, "target"));
    let inner = root.push(SourceLocation::new("project.json", 12, "set_property"));

    assert_eq!(root.depth(), 1);
    assert_eq!(inner.depth(), 2);
    assert_eq!(inner.top().map(|l| l.line), Some(12));
    assert_eq!(inner.pop(), root);
  }

  #[test]
  fn display_lists_innermost_first() {
    let trace = Backtrace::new()
      .push(SourceLocation::new("a.json", 1, "target"))
      .push(SourceLocation::new("b.json", 2, "property"));

    assert_eq!(trace.to_string(), "  at b.json:2 (property)\n  at a.json:1 (target)");
  }

  #[test]
  fn empty_backtrace() {
    let trace = Backtrace::new();
    assert!(trace.is_empty());
    assert!(trace.top().is_none());
    assert!(trace.pop().is_empty());
    assert_eq!(trace.to_string(), "");
  }
}
