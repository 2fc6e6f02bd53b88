//! Coercion of query values into their canonical string form.
//!
//! A [`QueryValue`] is a closed set of kinds: signed and unsigned integers,
//! floats, strings, and sequences of those. Everything else is
//! [`QueryValue::Unsupported`]. Coercion never fails with an error; a value
//! that cannot be represented yields `None` and the caller skips it.
//!
//! Formatting is locale-independent:
//!
//! | Kind | Example | Canonical |
//! |------|---------|-----------|
//! | signed | `-42` | `-42` |
//! | unsigned | `42` | `42` |
//! | float | `3.14159` | `3.1416` |
//! | string | `hello` | `hello` |

use std::collections::BTreeMap;

use crate::envelope::{MultiValueMap, SingleValueMap};

/// Fractional digits used for floats.
const FLOAT_PRECISION: usize = 4;

/// A scalar that can be coerced into a string.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Floating point.
    Float(f64),
    /// String, passed through unchanged.
    Str(String),
}

impl Scalar {
    /// The canonical string form of this scalar.
    #[must_use]
    pub fn to_canonical_string(&self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            Self::Uint(v) => v.to_string(),
            Self::Float(v) => format_float(*v),
            Self::Str(v) => v.clone(),
        }
    }
}

fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_owned()
    } else if v.is_infinite() {
        let sign = if v.is_sign_positive() { '+' } else { '-' };
        format!("{sign}Inf")
    } else {
        format!("{:.*}", FLOAT_PRECISION, v)
    }
}

/// A query value of a closed set of kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// A single scalar.
    Scalar(Scalar),
    /// An ordered sequence. Only sequences of scalars can be coerced.
    Sequence(Vec<QueryValue>),
    /// Any other kind (booleans, nulls, objects).
    Unsupported,
}

impl QueryValue {
    /// Coerce into a single string.
    ///
    /// Scalars coerce directly. A sequence coerces only when it holds exactly
    /// one scalar, which collapses to that scalar's string.
    #[must_use]
    pub fn coerce_single(&self) -> Option<String> {
        match self {
            Self::Scalar(s) => Some(s.to_canonical_string()),
            Self::Sequence(items) => match items.as_slice() {
                [Self::Scalar(s)] => Some(s.to_canonical_string()),
                _ => None,
            },
            Self::Unsupported => None,
        }
    }

    /// Coerce into an ordered sequence of strings.
    ///
    /// Only sequences whose every element is a scalar coerce; a single
    /// unsupported element rejects the whole sequence.
    #[must_use]
    pub fn coerce_multi(&self) -> Option<Vec<String>> {
        let Self::Sequence(items) = self else {
            return None;
        };

        items
            .iter()
            .map(|item| match item {
                Self::Scalar(s) => Some(s.to_canonical_string()),
                Self::Sequence(_) | Self::Unsupported => None,
            })
            .collect()
    }

    /// Number of raw entries behind this value.
    #[must_use]
    pub fn cardinality(&self) -> usize {
        match self {
            Self::Sequence(items) => items.len(),
            Self::Scalar(_) | Self::Unsupported => 1,
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident($conv:ty)),* $(,)?) => {
        $(
            impl From<$ty> for QueryValue {
                fn from(v: $ty) -> Self {
                    Self::Scalar(Scalar::$variant(<$conv>::from(v)))
                }
            }
        )*
    };
}

impl_from_scalar!(
    i8 => Int(i64),
    i16 => Int(i64),
    i32 => Int(i64),
    i64 => Int(i64),
    u8 => Uint(u64),
    u16 => Uint(u64),
    u32 => Uint(u64),
    u64 => Uint(u64),
    f32 => Float(f64),
    f64 => Float(f64),
    String => Str(String),
    &str => Str(String),
);

impl<T: Into<QueryValue>> From<Vec<T>> for QueryValue {
    fn from(items: Vec<T>) -> Self {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for QueryValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Number(n) => {
                if let Some(v) = n.as_u64() {
                    Self::Scalar(Scalar::Uint(v))
                } else if let Some(v) = n.as_i64() {
                    Self::Scalar(Scalar::Int(v))
                } else {
                    n.as_f64()
                        .map_or(Self::Unsupported, |v| Self::Scalar(Scalar::Float(v)))
                }
            }
            Value::String(s) => Self::Scalar(Scalar::Str(s)),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Null | Value::Bool(_) | Value::Object(_) => Self::Unsupported,
        }
    }
}

/// Split named query values into the single and multi-value envelope maps.
///
/// A name with one entry lands in the single map, a name with two or more
/// entries in the multi map. Names whose values cannot be coerced are dropped.
#[must_use]
pub fn partition_query_params<I>(params: I) -> (SingleValueMap, MultiValueMap)
where
    I: IntoIterator<Item = (String, QueryValue)>,
{
    let mut single = BTreeMap::new();
    let mut multi = BTreeMap::new();

    for (name, value) in params {
        if value.cardinality() < 2 {
            if let Some(v) = value.coerce_single() {
                single.insert(name, v);
            }
        } else if let Some(values) = value.coerce_multi().filter(|v| v.len() >= 2) {
            multi.insert(name, values);
        }
    }

    (single, multi)
}
