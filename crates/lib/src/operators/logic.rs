//! Boolean, comparison and list membership operators.

use std::cmp::Ordering;

use super::{Arity, Invocation, Operator, bool_output};
use crate::error::GenexError;
use crate::list::expand_list;

pub(super) const OPERATORS: &[Operator] = &[
  Operator::new("0", Arity::Exactly(1), zero).with_arbitrary_content(),
  Operator::new("1", Arity::Exactly(1), one).with_arbitrary_content(),
  Operator::new("BOOL", Arity::Exactly(1), to_bool),
  Operator::new("NOT", Arity::Exactly(1), not),
  Operator::new("AND", Arity::OneOrMore, and),
  Operator::new("OR", Arity::OneOrMore, or),
  Operator::new("IF", Arity::Exactly(3), if_),
  Operator::new("EQUAL", Arity::Exactly(2), equal),
  Operator::new("STREQUAL", Arity::Exactly(2), strequal),
  Operator::new("VERSION_LESS", Arity::Exactly(2), version_less),
  Operator::new("VERSION_GREATER", Arity::Exactly(2), version_greater),
  Operator::new("VERSION_EQUAL", Arity::Exactly(2), version_equal),
  Operator::new("VERSION_LESS_EQUAL", Arity::Exactly(2), version_less_equal),
  Operator::new("VERSION_GREATER_EQUAL", Arity::Exactly(2), version_greater_equal),
  Operator::new("IN_LIST", Arity::Exactly(2), in_list),
];

fn zero(_: &mut Invocation<'_, '_, '_>) -> String {
  String::new()
}

fn one(inv: &mut Invocation<'_, '_, '_>) -> String {
  inv.arg(0)
}

/// Whether `value` is a true constant.
///
/// False values are the empty string, `0`, `FALSE`, `OFF`, `N`, `NO`,
/// `IGNORE` and `NOTFOUND` in any case, and anything ending in `-NOTFOUND`.
pub(crate) fn is_truthy(value: &str) -> bool {
  const FALSE_VALUES: &[&str] = &["0", "FALSE", "OFF", "N", "NO", "IGNORE", "NOTFOUND"];
  !(value.is_empty()
    || value.ends_with("-NOTFOUND")
    || FALSE_VALUES.iter().any(|f| f.eq_ignore_ascii_case(value)))
}

fn to_bool(inv: &mut Invocation<'_, '_, '_>) -> String {
  let value = inv.arg(0);
  bool_output(is_truthy(&value))
}

fn not(inv: &mut Invocation<'_, '_, '_>) -> String {
  match inv.arg(0).as_str() {
    "0" => bool_output(true),
    "1" => bool_output(false),
    other => {
      let message = format!("$<NOT> parameter must resolve to exactly one '0' or '1' value, got \"{other}\".");
      inv.error(GenexError::InvalidArgument {
        operator: "NOT".to_string(),
        message,
      })
    }
  }
}

/// Shared body of `AND` and `OR`: stop at the first `stop` value.
fn short_circuit(inv: &mut Invocation<'_, '_, '_>, stop: &str) -> String {
  for i in 0..inv.len() {
    let value = inv.arg(i);
    if value != "0" && value != "1" {
      let message = format!("Parameters to $<{}> must resolve to either '0' or '1'.", inv.name());
      let operator = inv.name().to_string();
      return inv.error(GenexError::InvalidArgument { operator, message });
    }
    if value == stop {
      return value;
    }
  }
  String::from(if stop == "0" { "1" } else { "0" })
}

fn and(inv: &mut Invocation<'_, '_, '_>) -> String {
  short_circuit(inv, "0")
}

fn or(inv: &mut Invocation<'_, '_, '_>) -> String {
  short_circuit(inv, "1")
}

fn if_(inv: &mut Invocation<'_, '_, '_>) -> String {
  match inv.arg(0).as_str() {
    "1" => inv.arg(1),
    "0" => inv.arg(2),
    _ => inv.error(GenexError::InvalidArgument {
      operator: "IF".to_string(),
      message: "First parameter to $<IF> must resolve to exactly one '0' or '1' value.".to_string(),
    }),
  }
}

/// Parse an integer with optional sign and `0x`, `0b` or leading-zero
/// octal prefix.
fn parse_integer(text: &str) -> Option<i64> {
  let (negative, digits) = match text.as_bytes().first() {
    Some(b'-') => (true, &text[1..]),
    Some(b'+') => (false, &text[1..]),
    _ => (false, text),
  };

  let lower = digits.to_ascii_lowercase();
  let (radix, digits) = if let Some(hex) = lower.strip_prefix("0x") {
    (16, hex.to_string())
  } else if let Some(bin) = lower.strip_prefix("0b") {
    (2, bin.to_string())
  } else if lower.len() > 1 && lower.starts_with('0') {
    (8, lower[1..].to_string())
  } else {
    (10, lower)
  };

  if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
    return None;
  }
  let magnitude = i64::from_str_radix(&digits, radix).ok()?;
  Some(if negative { -magnitude } else { magnitude })
}

fn equal(inv: &mut Invocation<'_, '_, '_>) -> String {
  let mut numbers = [0i64; 2];
  for (i, slot) in numbers.iter_mut().enumerate() {
    let value = inv.arg(i);
    match parse_integer(&value) {
      Some(n) => *slot = n,
      None => {
        return inv.error(GenexError::InvalidArgument {
          operator: "EQUAL".to_string(),
          message: format!("$<EQUAL> parameter {value} is not a valid integer."),
        });
      }
    }
  }
  bool_output(numbers[0] == numbers[1])
}

fn strequal(inv: &mut Invocation<'_, '_, '_>) -> String {
  let lhs = inv.arg(0);
  let rhs = inv.arg(1);
  bool_output(lhs == rhs)
}

/// Compare dotted version strings component by component.
///
/// Each component is read as its leading decimal digits; missing components
/// count as zero.
pub(crate) fn compare_versions(lhs: &str, rhs: &str) -> Ordering {
  fn components(version: &str) -> Vec<u64> {
    version
      .split('.')
      .map(|part| {
        let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
        digits.parse().unwrap_or(0)
      })
      .collect()
  }

  let (a, b) = (components(lhs), components(rhs));
  for i in 0..a.len().max(b.len()) {
    let x = a.get(i).copied().unwrap_or(0);
    let y = b.get(i).copied().unwrap_or(0);
    match x.cmp(&y) {
      Ordering::Equal => continue,
      other => return other,
    }
  }
  Ordering::Equal
}

fn compare(inv: &mut Invocation<'_, '_, '_>, accept: fn(Ordering) -> bool) -> String {
  let lhs = inv.arg(0);
  let rhs = inv.arg(1);
  bool_output(accept(compare_versions(&lhs, &rhs)))
}

fn version_less(inv: &mut Invocation<'_, '_, '_>) -> String {
  compare(inv, Ordering::is_lt)
}

fn version_greater(inv: &mut Invocation<'_, '_, '_>) -> String {
  compare(inv, Ordering::is_gt)
}

fn version_equal(inv: &mut Invocation<'_, '_, '_>) -> String {
  compare(inv, Ordering::is_eq)
}

fn version_less_equal(inv: &mut Invocation<'_, '_, '_>) -> String {
  compare(inv, Ordering::is_le)
}

fn version_greater_equal(inv: &mut Invocation<'_, '_, '_>) -> String {
  compare(inv, Ordering::is_ge)
}

fn in_list(inv: &mut Invocation<'_, '_, '_>) -> String {
  let needle = inv.arg(0);
  let list = inv.arg(1);
  bool_output(expand_list(&list).contains(&needle.as_str()))
}
