use crate::codec;
use crate::error::{DbError, Result};
use crate::types::{TypedLiteral, Value, WireValue};

/// One caller-supplied argument of `execute`/`callproc`.
///
/// A single `Sequence` argument stands for the whole parameter list, so both
/// `params![1, "a"]` and `params![vec![Value::from(1), Value::from("a")]]`
/// bind the same two markers.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Scalar(Value),
    Sequence(Vec<Value>),
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        Param::Scalar(value)
    }
}

impl From<Vec<Value>> for Param {
    fn from(values: Vec<Value>) -> Self {
        Param::Sequence(values)
    }
}

impl From<&[Value]> for Param {
    fn from(values: &[Value]) -> Self {
        Param::Sequence(values.to_vec())
    }
}

macro_rules! scalar_param_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Param {
                fn from(value: $t) -> Self {
                    Param::Scalar(Value::from(value))
                }
            }
        )*
    };
}

scalar_param_from!(i64, i32, f64, &str, String, TypedLiteral);

impl<T: Into<Value>> From<Option<T>> for Param {
    fn from(value: Option<T>) -> Self {
        Param::Scalar(value.map_or(Value::Null, Into::into))
    }
}

/// Build a `Vec<Param>` from heterogeneous expressions.
///
/// ```rust
/// use dbapi_cursor::params;
/// use dbapi_cursor::prelude::*;
///
/// let args = params![1, "a", None::<i64>];
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::params::Param>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::params::Param::from($value)),+]
    };
}

/// Normalize caller arguments into the positional list handed to the driver,
/// encoding every value on the way.
///
/// Arity and types are not checked here; the driver reports mismatches at
/// execute time.
///
/// # Errors
///
/// Returns `DbError::Interface` when a sequence appears next to other
/// arguments, since it cannot be bound to a single marker.
pub fn bind(args: &[Param]) -> Result<Vec<WireValue>> {
    if let [Param::Sequence(values)] = args {
        return Ok(values.iter().map(codec::encode).collect());
    }
    args.iter()
        .enumerate()
        .map(|(idx, arg)| match arg {
            Param::Scalar(value) => Ok(codec::encode(value)),
            Param::Sequence(_) => Err(DbError::Interface(format!(
                "argument {idx} is a sequence; pass a single sequence or only scalars"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types;

    #[test]
    fn single_sequence_is_the_parameter_list() {
        let spread = bind(&params![1, "a"]).unwrap();
        let packed = bind(&params![vec![Value::from(1), Value::from("a")]]).unwrap();
        assert_eq!(spread, packed);
        assert_eq!(spread, vec![WireValue::Int(1), WireValue::Text("a".into())]);
    }

    #[test]
    fn literals_are_encoded() {
        let bound = bind(&params![types::date(2005, 3, 3).unwrap(), None::<i64>]).unwrap();
        assert_eq!(bound, vec![WireValue::Text("2005-03-03".into()), WireValue::Null]);
    }

    #[test]
    fn single_scalar_and_empty() {
        assert_eq!(bind(&params![7]).unwrap(), vec![WireValue::Int(7)]);
        assert!(bind(&params![]).unwrap().is_empty());
        assert!(bind(&[Param::Sequence(vec![])]).unwrap().is_empty());
    }

    #[test]
    fn nested_sequence_among_scalars_is_rejected() {
        let args = vec![Param::from(1), Param::from(vec![Value::from(2)])];
        assert!(matches!(bind(&args), Err(DbError::Interface(_))));
    }
}
