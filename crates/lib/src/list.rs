//! `;`-separated list handling and nesting-aware splitting.
//!
//! Lists keep empty elements: `"a;;b"` has three elements and `";a"` has two.
//! Only [`strip_empty_list_elements`] removes them.

/// Separator of list-valued strings.
pub const LIST_SEPARATOR: char = ';';

/// Split `input` at `separator` bytes that are not nested inside a `$<...>`
/// expression.
///
/// When `balance_parens` is set, separators inside a balanced `(...)` group at
/// the top level do not split either. An unmatched `)` is ignored.
pub(crate) fn split_nested(input: &str, separator: u8, balance_parens: bool) -> Vec<&str> {
  let bytes = input.as_bytes();
  let mut fields = Vec::new();
  let mut genex_depth = 0usize;
  let mut paren_depth = 0usize;
  let mut start = 0;
  let mut i = 0;

  while i < bytes.len() {
    match bytes[i] {
      b'$' if bytes.get(i + 1) == Some(&b'<') => {
        genex_depth += 1;
        i += 2;
        continue;
      }
      b'>' if genex_depth > 0 => genex_depth -= 1,
      b'(' if balance_parens && genex_depth == 0 => paren_depth += 1,
      b')' if balance_parens && genex_depth == 0 => paren_depth = paren_depth.saturating_sub(1),
      c if c == separator && genex_depth == 0 && paren_depth == 0 => {
        fields.push(&input[start..i]);
        start = i + 1;
      }
      _ => {}
    }
    i += 1;
  }

  fields.push(&input[start..]);
  fields
}

/// Split a parameter list at top-level commas.
///
/// This is the rule the parser applies to the text after `NAME:`.
pub(crate) fn split_arguments(input: &str) -> Vec<&str> {
  split_nested(input, b',', true)
}

/// Byte offset of the `>` closing the `$<` that starts at `open`.
pub(crate) fn matching_close(input: &str, open: usize) -> Option<usize> {
  let bytes = input.as_bytes();
  let mut depth = 0usize;
  let mut i = open;

  while i < bytes.len() {
    if bytes[i] == b'$' && bytes.get(i + 1) == Some(&b'<') {
      depth += 1;
      i += 2;
      continue;
    }
    if bytes[i] == b'>' {
      depth = depth.saturating_sub(1);
      if depth == 0 {
        return Some(i);
      }
    }
    i += 1;
  }

  None
}

/// Split a list value into its elements, keeping empty ones.
///
/// The empty string is the empty list.
pub fn expand_list(value: &str) -> Vec<&str> {
  if value.is_empty() {
    return Vec::new();
  }
  value.split(LIST_SEPARATOR).collect()
}

/// Join elements into a list value.
pub fn join_list<I, S>(items: I) -> String
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut out = String::new();
  for (i, item) in items.into_iter().enumerate() {
    if i > 0 {
      out.push(LIST_SEPARATOR);
    }
    out.push_str(item.as_ref());
  }
  out
}

/// Append `value` as further list element(s) of `list`.
///
/// Empty values are skipped so that collecting usage requirements from
/// targets without the property does not leave stray separators.
pub(crate) fn append_list(list: &mut String, value: &str) {
  if value.is_empty() {
    return;
  }
  if !list.is_empty() {
    list.push(LIST_SEPARATOR);
  }
  list.push_str(value);
}

/// Remove empty elements from a list value.
///
/// Runs of separators collapse to one, and leading or trailing separators
/// are dropped.
pub fn strip_empty_list_elements(input: &str) -> String {
  if !input.contains(LIST_SEPARATOR) {
    return input.to_string();
  }

  let mut result = String::with_capacity(input.len());
  let mut last = 0;
  let mut skip_separators = true;

  for (i, c) in input.char_indices() {
    if c == LIST_SEPARATOR {
      if skip_separators {
        result.push_str(&input[last..i]);
        last = i + 1;
      }
      skip_separators = true;
    } else {
      skip_separators = false;
    }
  }
  result.push_str(&input[last..]);

  if result.ends_with(LIST_SEPARATOR) {
    result.pop();
  }
  result
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn split_respects_nested_expressions() {
    assert_eq!(split_arguments("$<A:x,y>,z"), vec!["$<A:x,y>", "z"]);
    assert_eq!(split_arguments("a,$<B:$<C:1,2>,3>,d"), vec!["a", "$<B:$<C:1,2>,3>", "d"]);
  }

  #[test]
  fn split_respects_parentheses() {
    assert_eq!(split_arguments("f(a,b),c"), vec!["f(a,b)", "c"]);
    // Unmatched closing parens never hide later separators
    assert_eq!(split_arguments("a),b"), vec!["a)", "b"]);
  }

  #[test]
  fn split_keeps_empty_fields() {
    assert_eq!(split_arguments(""), vec![""]);
    assert_eq!(split_arguments(",a,"), vec!["", "a", ""]);
  }

  #[test]
  fn matching_close_finds_outer_bracket() {
    let input = "x$<A:$<B>>y";
    assert_eq!(matching_close(input, 1), Some(9));
    assert_eq!(matching_close("$<A:$<B>", 0), None);
  }

  #[test]
  fn expand_list_keeps_empty_elements() {
    assert!(expand_list("").is_empty());
    assert_eq!(expand_list("a;;b"), vec!["a", "", "b"]);
    assert_eq!(expand_list(";a;"), vec!["", "a", ""]);
  }

  #[test]
  fn strip_empty_elements() {
    assert_eq!(strip_empty_list_elements("a;;b"), "a;b");
    assert_eq!(strip_empty_list_elements(";;a;b;;"), "a;b");
    assert_eq!(strip_empty_list_elements("no-separators"), "no-separators");
    assert_eq!(strip_empty_list_elements(";;;"), "");
  }

  #[test]
  fn append_skips_empty_values() {
    let mut list = String::new();
    append_list(&mut list, "a");
    append_list(&mut list, "");
    append_list(&mut list, "b;c");
    assert_eq!(list, "a;b;c");
    assert_eq!(join_list(["x", "", "y"]), "x;;y");
  }
}
