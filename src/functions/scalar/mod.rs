// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Scalar Functions
//!
//! ## Arithmetic
//! - [`AddFunction`], [`SubFunction`], [`MulFunction`], [`DivFunction`],
//!   [`ModFunction`], [`PowFunction`] - binary arithmetic
//! - [`NegFunction`], [`AbsFunction`] - sign
//! - [`RoundFunction`] - ROUND(number [, digits])
//! - [`TruncateFunction`] - TRUNCATE(number)
//!
//! ## Comparison
//! - [`EqFunction`], [`NeqFunction`], [`LtFunction`], [`LteFunction`],
//!   [`GtFunction`], [`GteFunction`]
//! - [`CmpFunction`] - CMP(a, b), three-way comparison
//!
//! ## Logic
//! - [`AndFunction`], [`OrFunction`], [`NotFunction`] - three-valued logic
//! - [`IsNullFunction`] - ISNULL(value)
//!
//! ## String
//! - [`ConcatFunction`] - CONCAT(value, ...)
//! - [`UpperFunction`], [`LowerFunction`], [`LengthFunction`]
//! - [`SubstrFunction`] - SUBSTR(str, start [, length])
//! - [`LtrimFunction`], [`RtrimFunction`] - whitespace trimming
//! - [`StartsWithFunction`], [`EndsWithFunction`] - affix tests
//! - [`Fnv32Function`] - FNV32(value), 32-bit FNV-1a hash
//!
//! ## Conversion
//! - [`ToStringFunction`], [`ToInt64Function`], [`ToNilFunction`]
//!
//! Unless noted otherwise a NULL argument yields NULL.

mod cast;
mod comparison;
mod logic;
mod math;
mod string;

pub use cast::{ToInt64Function, ToNilFunction, ToStringFunction};
pub use comparison::{
    CmpFunction, EqFunction, GtFunction, GteFunction, LtFunction, LteFunction, NeqFunction,
};
pub use logic::{AndFunction, IsNullFunction, NotFunction, OrFunction};
pub use math::{
    AbsFunction, AddFunction, DivFunction, ModFunction, MulFunction, NegFunction, PowFunction,
    RoundFunction, SubFunction, TruncateFunction,
};
pub use string::{
    ConcatFunction, EndsWithFunction, Fnv32Function, LengthFunction, LowerFunction, LtrimFunction,
    RtrimFunction, StartsWithFunction, SubstrFunction, UpperFunction,
};

use crate::core::{Error, Result, Value};

/// Coerce an argument to INTEGER or FLOAT for function `name`
pub(crate) fn numeric_arg(name: &str, value: &Value) -> Result<Value> {
    value.to_numeric().map_err(|_| {
        Error::type_error(format!(
            "{}() argument must be a number, got {} '{}'",
            name,
            value.data_type(),
            value
        ))
    })
}

/// Returns true if any argument is NULL
#[inline]
pub(crate) fn any_null(args: &[Value]) -> bool {
    args.iter().any(Value::is_null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_arg() {
        assert!(matches!(
            numeric_arg("add", &Value::text("3")).unwrap(),
            Value::Integer(3)
        ));
        assert!(matches!(
            numeric_arg("add", &Value::boolean(true)).unwrap(),
            Value::Integer(1)
        ));
        let err = numeric_arg("add", &Value::text("x")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "type error: add() argument must be a number, got STRING 'x'"
        );
    }

    #[test]
    fn test_any_null() {
        assert!(any_null(&[Value::integer(1), Value::null()]));
        assert!(!any_null(&[Value::integer(1)]));
        assert!(!any_null(&[]));
    }
}
