use crate::value::Value;
use std::fmt::{self, Write as _};

///
/// CQL literal rendering
///
/// `Display` renders a value as an inline CQL literal: text single-quoted
/// with `''` escaping, dates quoted ISO, lists `[..]`, sets `{..}`, maps and
/// structured values `{k:v}`, blobs `0x..`, uuids hyphenated,
/// non-finite floats as `NaN` / `Infinity`.
///

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::BigInt(v) | Self::Timestamp(v) => write!(f, "{v}"),
            Self::Varint(v) => write!(f, "{v}"),
            Self::Float(v) => write_float(f, *v),
            Self::Double(v) => write_float(f, *v),
            Self::Text(v) | Self::Enum(v) => write_quoted(f, v),
            Self::Blob(bytes) => {
                f.write_str("0x")?;
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Self::Uuid(v) => write!(f, "{}", v.hyphenated()),
            Self::Date(v) => write!(f, "'{v}'"),
            Self::List(values) => write_seq(f, "[", values, "]"),
            Self::Set(values) => write_seq(f, "{", values, "}"),
            Self::Tuple(values) => write_seq(f, "(", values, ")"),
            Self::Map(entries) => {
                f.write_char('{')?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{key}:{value}")?;
                }
                f.write_char('}')
            }
            Self::Object(object) => write_fields(f, object.fields()),
            Self::Udt(udt) => write_fields(f, udt.fields()),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_char('\'')?;
    f.write_str(&text.replace('\'', "''"))?;
    f.write_char('\'')
}

fn write_seq(f: &mut fmt::Formatter<'_>, open: &str, values: &[Value], close: &str) -> fmt::Result {
    f.write_str(open)?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        write!(f, "{value}")?;
    }
    f.write_str(close)
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &[(String, Value)]) -> fmt::Result {
    f.write_char('{')?;
    for (i, (name, value)) in fields.iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        write!(f, "{name}:{value}")?;
    }
    f.write_char('}')
}

// CQL spells non-finite floats `NaN`, `Infinity` and `-Infinity`.
fn write_float<F: fmt::Display + Into<f64> + Copy>(f: &mut fmt::Formatter<'_>, v: F) -> fmt::Result {
    let wide: f64 = v.into();

    if wide.is_nan() {
        f.write_str("NaN")
    } else if wide.is_infinite() {
        f.write_str(if wide.is_sign_positive() { "Infinity" } else { "-Infinity" })
    } else {
        write!(f, "{v}")
    }
}
