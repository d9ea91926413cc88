use bson::{Bson, Document};
use std::cmp::Ordering;

use crate::common::FIELD_SEPARATOR;

/// Numeric view of a BSON value, so that `Int32(20)`, `Int64(20)` and
/// `Double(20.0)` compare as the same number.
#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

#[inline]
fn as_number(value: &Bson) -> Option<Number> {
    match value {
        Bson::Int32(i) => Some(Number::Int(*i as i64)),
        Bson::Int64(i) => Some(Number::Int(*i)),
        Bson::Double(f) => Some(Number::Float(*f)),
        _ => None,
    }
}

#[inline]
fn num_cmp(a: Number, b: Number) -> Option<Ordering> {
    match (a, b) {
        (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
        (Number::Int(a), Number::Float(b)) => (a as f64).partial_cmp(&b),
        (Number::Float(a), Number::Int(b)) => a.partial_cmp(&(b as f64)),
        (Number::Float(a), Number::Float(b)) => a.partial_cmp(&b),
    }
}

/// Looks up a field in a document, following dot-separated paths into
/// embedded documents and array positions (`"address.city"`, `"tags.0"`).
///
/// Returns `None` when any segment of the path is missing.
pub fn get_field<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split(FIELD_SEPARATOR);
    let first = segments.next()?;
    let mut current = document.get(first)?;
    for segment in segments {
        current = match current {
            Bson::Document(embedded) => embedded.get(segment)?,
            Bson::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Value equality as the store applies it in queries: numbers compare by
/// value across widths, embedded documents and arrays compare element-wise.
pub fn values_equal(a: &Bson, b: &Bson) -> bool {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return num_cmp(x, y) == Some(Ordering::Equal);
    }

    match (a, b) {
        (Bson::Document(x), Bson::Document(y)) => {
            x.len() == y.len()
                && x.iter()
                    .zip(y.iter())
                    .all(|((ka, va), (kb, vb))| ka == kb && values_equal(va, vb))
        }
        (Bson::Array(x), Bson::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(va, vb)| values_equal(va, vb))
        }
        _ => a == b,
    }
}

/// Orders two values of the same type class.
///
/// Returns `None` when the values are not comparable (different type classes,
/// or a NaN is involved), which range filters treat as "no match".
pub fn compare_values(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return num_cmp(x, y);
    }

    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => {
            Some(x.timestamp_millis().cmp(&y.timestamp_millis()))
        }
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.bytes().cmp(&y.bytes())),
        (Bson::Timestamp(x), Bson::Timestamp(y)) => {
            Some((x.time, x.increment).cmp(&(y.time, y.increment)))
        }
        (Bson::Null, Bson::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

// cross-type ordering used by the store when sorting mixed values
fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        Some(Bson::MinKey) => 0,
        None | Some(Bson::Null) | Some(Bson::Undefined) => 1,
        Some(Bson::Int32(_)) | Some(Bson::Int64(_)) | Some(Bson::Double(_))
        | Some(Bson::Decimal128(_)) => 2,
        Some(Bson::String(_)) | Some(Bson::Symbol(_)) => 3,
        Some(Bson::Document(_)) => 4,
        Some(Bson::Array(_)) => 5,
        Some(Bson::Binary(_)) => 6,
        Some(Bson::ObjectId(_)) => 7,
        Some(Bson::Boolean(_)) => 8,
        Some(Bson::DateTime(_)) => 9,
        Some(Bson::Timestamp(_)) => 10,
        Some(Bson::RegularExpression(_)) => 11,
        Some(Bson::MaxKey) => 13,
        Some(_) => 12,
    }
}

/// Total order over optional values, used to sort query results.
///
/// Missing fields sort with nulls, before every other type.
pub fn sort_compare(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let (rank_a, rank_b) = (type_rank(a), type_rank(b));
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }

    match (a, b) {
        (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}
