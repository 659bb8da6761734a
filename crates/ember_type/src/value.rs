use std::fmt::Display;

use ordered_float::OrderedFloat;

fn escape_byte_as_char_literal(value: u8) -> String {
  match value {
    b'\n' => "\\n".to_string(),
    b'\r' => "\\r".to_string(),
    b'\t' => "\\t".to_string(),
    b'\0' => "\\0".to_string(),
    b'\\' => "\\\\".to_string(),
    b'\'' => "\\'".to_string(),
    b'"' => "\\\"".to_string(),
    b if b.is_ascii_graphic() || b == b' ' => (b as char).to_string(),
    _ => format!("\\x{:02x}", value),
  }
}

fn escape_special_characters(value: &str) -> String {
  value
    .replace('\\', "\\\\")
    .replace('"', "\\\"")
    .replace('\n', "\\n")
    .replace('\r', "\\r")
    .replace('\t', "\\t")
    .replace('\0', "\\0")
}

/// Compile-time constant. Used both as expression literals and as value
/// template arguments, so equality here decides instance identity.
#[derive(Debug, PartialEq, Clone, Hash, Eq, PartialOrd, Ord)]
pub enum LiteralValue {
  Int8(i8),
  Int16(i16),
  Int32(i32),
  Int64(i64),
  UnsignedInt8(u8),
  UnsignedInt16(u16),
  UnsignedInt32(u32),
  UnsignedInt64(u64),
  Float32(OrderedFloat<f32>),
  Float64(OrderedFloat<f64>),
  Boolean(bool),
  Char(u8),
  String(String),
  Unit,
}

impl LiteralValue {
  /// Identifier-safe rendering used when building mangled instance names.
  pub fn mangle(&self) -> String {
    match self {
      LiteralValue::Int8(i) => mangle_signed(*i as i64),
      LiteralValue::Int16(i) => mangle_signed(*i as i64),
      LiteralValue::Int32(i) => mangle_signed(*i as i64),
      LiteralValue::Int64(i) => mangle_signed(*i),
      LiteralValue::UnsignedInt8(i) => i.to_string(),
      LiteralValue::UnsignedInt16(i) => i.to_string(),
      LiteralValue::UnsignedInt32(i) => i.to_string(),
      LiteralValue::UnsignedInt64(i) => i.to_string(),
      LiteralValue::Float32(x) => format!("f{:08x}", x.0.to_bits()),
      LiteralValue::Float64(x) => format!("f{:016x}", x.0.to_bits()),
      LiteralValue::Boolean(b) => b.to_string(),
      LiteralValue::Char(c) => format!("c{}", c),
      LiteralValue::String(s) => {
        let hex: String = s.bytes().map(|b| format!("{:02x}", b)).collect();
        format!("s{}", hex)
      },
      LiteralValue::Unit => "unit".to_string(),
    }
  }
}

fn mangle_signed(value: i64) -> String {
  if value < 0 {
    format!("n{}", value.unsigned_abs())
  } else {
    value.to_string()
  }
}

impl Display for LiteralValue {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    match self {
      LiteralValue::Int8(i) => write!(f, "{}", i),
      LiteralValue::Int16(i) => write!(f, "{}", i),
      LiteralValue::Int32(i) => write!(f, "{}", i),
      LiteralValue::Int64(i) => write!(f, "{}", i),
      LiteralValue::UnsignedInt8(i) => write!(f, "{}", i),
      LiteralValue::UnsignedInt16(i) => write!(f, "{}", i),
      LiteralValue::UnsignedInt32(i) => write!(f, "{}", i),
      LiteralValue::UnsignedInt64(i) => write!(f, "{}", i),
      LiteralValue::Float32(x) => write!(f, "{}", x),
      LiteralValue::Float64(x) => write!(f, "{}", x),
      LiteralValue::Boolean(x) => write!(f, "{}", x),
      LiteralValue::Char(x) => write!(f, "'{}'", escape_byte_as_char_literal(*x)),
      LiteralValue::String(x) => write!(f, "\"{}\"", escape_special_characters(x)),
      LiteralValue::Unit => write!(f, "()"),
    }
  }
}
