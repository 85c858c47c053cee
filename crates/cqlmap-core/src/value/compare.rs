use crate::value::Value;
use std::cmp::Ordering;

// Variant rank; cross-variant ordering only needs to be total and stable.
const fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int(_) => 2,
        Value::BigInt(_) => 3,
        Value::Varint(_) => 4,
        Value::Float(_) => 5,
        Value::Double(_) => 6,
        Value::Text(_) => 7,
        Value::Enum(_) => 8,
        Value::Blob(_) => 9,
        Value::Uuid(_) => 10,
        Value::Date(_) => 11,
        Value::Timestamp(_) => 12,
        Value::List(_) => 13,
        Value::Set(_) => 14,
        Value::Map(_) => 15,
        Value::Tuple(_) => 16,
        Value::Object(_) => 17,
        Value::Udt(_) => 18,
    }
}

/// Total canonical ordering used for set normalization.
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::BigInt(a), Value::BigInt(b)) | (Value::Timestamp(a), Value::Timestamp(b)) => {
            a.cmp(b)
        }
        (Value::Varint(a), Value::Varint(b)) => a.cmp(b),
        (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
        (Value::Double(a), Value::Double(b)) => a.total_cmp(b),
        (Value::Text(a), Value::Text(b)) | (Value::Enum(a), Value::Enum(b)) => a.cmp(b),
        (Value::Blob(a), Value::Blob(b)) => a.cmp(b),
        (Value::Uuid(a), Value::Uuid(b)) => a.cmp(b),
        (Value::Date(a), Value::Date(b)) => a.cmp(b),
        (Value::List(a), Value::List(b))
        | (Value::Set(a), Value::Set(b))
        | (Value::Tuple(a), Value::Tuple(b)) => cmp_slices(a, b),
        (Value::Map(a), Value::Map(b)) => {
            for ((ak, av), (bk, bv)) in a.iter().zip(b.iter()) {
                let ord = canonical_cmp(ak, bk).then_with(|| canonical_cmp(av, bv));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            a.len().cmp(&b.len())
        }
        (Value::Object(a), Value::Object(b)) => a
            .type_name()
            .cmp(b.type_name())
            .then_with(|| cmp_fields(a.fields(), b.fields())),
        (Value::Udt(a), Value::Udt(b)) => a
            .type_name()
            .cmp(b.type_name())
            .then_with(|| cmp_fields(a.fields(), b.fields())),
        _ => rank(left).cmp(&rank(right)),
    }
}

fn cmp_slices(a: &[Value], b: &[Value]) -> Ordering {
    for (left, right) in a.iter().zip(b.iter()) {
        let ord = canonical_cmp(left, right);
        if ord != Ordering::Equal {
            return ord;
        }
    }

    a.len().cmp(&b.len())
}

fn cmp_fields(a: &[(String, Value)], b: &[(String, Value)]) -> Ordering {
    for ((an, av), (bn, bv)) in a.iter().zip(b.iter()) {
        let ord = an.cmp(bn).then_with(|| canonical_cmp(av, bv));
        if ord != Ordering::Equal {
            return ord;
        }
    }

    a.len().cmp(&b.len())
}
