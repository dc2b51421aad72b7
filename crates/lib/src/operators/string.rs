//! Text and list transforms.

use std::collections::HashSet;

use super::{Arity, Invocation, Operator};
use crate::error::GenexError;
use crate::list::{expand_list, join_list};

pub(super) const OPERATORS: &[Operator] = &[
  Operator::new("LOWER_CASE", Arity::Exactly(1), lower_case).with_arbitrary_content(),
  Operator::new("UPPER_CASE", Arity::Exactly(1), upper_case).with_arbitrary_content(),
  Operator::new("MAKE_C_IDENTIFIER", Arity::Exactly(1), make_c_identifier).with_arbitrary_content(),
  Operator::new("ANGLE-R", Arity::Exactly(0), angle_r),
  Operator::new("COMMA", Arity::Exactly(0), comma),
  Operator::new("SEMICOLON", Arity::Exactly(0), semicolon),
  Operator::new("QUOTE", Arity::Exactly(0), quote),
  Operator::new("JOIN", Arity::Exactly(2), join).with_arbitrary_content(),
  Operator::new("REMOVE_DUPLICATES", Arity::Exactly(1), remove_duplicates),
  Operator::new("SHELL_PATH", Arity::Exactly(1), shell_path),
];

fn lower_case(inv: &mut Invocation<'_, '_, '_>) -> String {
  inv.arg(0).to_ascii_lowercase()
}

fn upper_case(inv: &mut Invocation<'_, '_, '_>) -> String {
  inv.arg(0).to_ascii_uppercase()
}

/// Replace every character that is not valid in a C identifier with `_`.
pub(crate) fn c_identifier(value: &str) -> String {
  let mut out = String::with_capacity(value.len() + 1);
  if value.starts_with(|c: char| c.is_ascii_digit()) {
    out.push('_');
  }
  out.extend(
    value
      .chars()
      .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }),
  );
  out
}

fn make_c_identifier(inv: &mut Invocation<'_, '_, '_>) -> String {
  c_identifier(&inv.arg(0))
}

fn angle_r(_: &mut Invocation<'_, '_, '_>) -> String {
  ">".to_string()
}

fn comma(_: &mut Invocation<'_, '_, '_>) -> String {
  ",".to_string()
}

fn semicolon(_: &mut Invocation<'_, '_, '_>) -> String {
  ";".to_string()
}

fn quote(_: &mut Invocation<'_, '_, '_>) -> String {
  "\"".to_string()
}

fn join(inv: &mut Invocation<'_, '_, '_>) -> String {
  let list = inv.arg(0);
  let separator = inv.arg(1);
  expand_list(&list).join(separator.as_str())
}

fn remove_duplicates(inv: &mut Invocation<'_, '_, '_>) -> String {
  let list = inv.arg(0);
  let mut seen = HashSet::new();
  join_list(expand_list(&list).into_iter().filter(|item| seen.insert(*item)))
}

fn is_absolute(path: &str, windows: bool) -> bool {
  if path.starts_with('/') {
    return true;
  }
  if !windows {
    return false;
  }
  let bytes = path.as_bytes();
  path.starts_with('\\') || (bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && matches!(bytes[2], b'/' | b'\\'))
}

/// Quote `path` for a POSIX shell.
fn posix_shell_path(path: &str) -> String {
  let safe = |c: char| c.is_ascii_alphanumeric() || "/._-+@%:,=".contains(c);
  if path.chars().all(safe) {
    return path.to_string();
  }
  format!("'{}'", path.replace('\'', r"'\''"))
}

/// Quote `path` for `cmd.exe`.
fn windows_shell_path(path: &str) -> String {
  let path = path.replace('/', "\\");
  if path.contains([' ', '&', '(', ')', '^', ';']) {
    format!("\"{path}\"")
  } else {
    path
  }
}

fn shell_path(inv: &mut Invocation<'_, '_, '_>) -> String {
  let list = inv.arg(0);
  let windows = inv.lookup().platform_id() == "Windows";

  let paths = expand_list(&list);
  if paths.is_empty() {
    return inv.error(GenexError::InvalidArgument {
      operator: "SHELL_PATH".to_string(),
      message: "\"\" is not an absolute path.".to_string(),
    });
  }

  let mut converted = Vec::with_capacity(paths.len());
  for path in paths {
    if !is_absolute(path, windows) {
      return inv.error(GenexError::InvalidArgument {
        operator: "SHELL_PATH".to_string(),
        message: format!("\"{path}\" is not an absolute path."),
      });
    }
    converted.push(if windows {
      windows_shell_path(path)
    } else {
      posix_shell_path(path)
    });
  }
  join_list(converted)
}
