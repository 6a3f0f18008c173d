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

//! Comparison scalar functions
//!
//! Integers and floats compare numerically. Comparing with NULL yields NULL.

use std::cmp::Ordering;

use crate::core::{Result, Value};
use crate::functions::{
    FunctionDataType, FunctionInfo, FunctionSignature, FunctionType, ScalarFunction,
};

use super::any_null;

fn compare_args(name: &str, args: &[Value], pred: fn(Ordering) -> bool) -> Result<Value> {
    validate_arg_count!(args, name, 2);
    if any_null(args) {
        return Ok(Value::Null);
    }
    let ordering = args[0].compare(&args[1])?;
    Ok(Value::Boolean(pred(ordering)))
}

macro_rules! comparison_function {
    ($(#[$meta:meta])* $ty:ident, $name:literal, $description:literal, $pred:expr) => {
        $(#[$meta])*
        #[derive(Default)]
        pub struct $ty;

        impl ScalarFunction for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn info(&self) -> FunctionInfo {
                FunctionInfo::new(
                    $name,
                    FunctionType::Scalar,
                    $description,
                    FunctionSignature::new(
                        FunctionDataType::Boolean,
                        vec![FunctionDataType::Any, FunctionDataType::Any],
                        2,
                        2,
                    ),
                )
            }

            fn evaluate(&self, args: &[Value]) -> Result<Value> {
                compare_args($name, args, $pred)
            }
        }
    };
}

comparison_function!(
    /// EQ function - a = b
    EqFunction,
    "eq",
    "Returns true if both arguments are equal",
    Ordering::is_eq
);

comparison_function!(
    /// NEQ function - a <> b
    NeqFunction,
    "neq",
    "Returns true if the arguments differ",
    Ordering::is_ne
);

comparison_function!(
    /// LT function - a < b
    LtFunction,
    "lt",
    "Returns true if the first argument is less than the second",
    Ordering::is_lt
);

comparison_function!(
    /// LTE function - a <= b
    LteFunction,
    "lte",
    "Returns true if the first argument is less than or equal to the second",
    Ordering::is_le
);

comparison_function!(
    /// GT function - a > b
    GtFunction,
    "gt",
    "Returns true if the first argument is greater than the second",
    Ordering::is_gt
);

comparison_function!(
    /// GTE function - a >= b
    GteFunction,
    "gte",
    "Returns true if the first argument is greater than or equal to the second",
    Ordering::is_ge
);

/// CMP function - three-way comparison returning -1, 0 or 1
#[derive(Default)]
pub struct CmpFunction;

impl ScalarFunction for CmpFunction {
    fn name(&self) -> &str {
        "cmp"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "cmp",
            FunctionType::Scalar,
            "Returns -1, 0 or 1 as the first argument is less than, equal to or greater than the second",
            FunctionSignature::new(
                FunctionDataType::Integer,
                vec![FunctionDataType::Any, FunctionDataType::Any],
                2,
                2,
            ),
        )
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "cmp", 2);
        if any_null(args) {
            return Ok(Value::Null);
        }
        let ordering = args[0].compare(&args[1])?;
        Ok(Value::Integer(ordering as i64))
    }
}
