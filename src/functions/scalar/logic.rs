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

//! Logical scalar functions (SQL three-valued logic)

use crate::core::{Result, Value};
use crate::functions::{
    FunctionDataType, FunctionInfo, FunctionSignature, FunctionType, ScalarFunction,
};

fn logic_info(name: &str, description: &str, args: usize) -> FunctionInfo {
    FunctionInfo::new(
        name,
        FunctionType::Scalar,
        description,
        FunctionSignature::new(
            FunctionDataType::Boolean,
            vec![FunctionDataType::Boolean; args],
            args,
            args,
        ),
    )
}

/// Truth value of an operand, None for NULL
fn truth(value: &Value) -> Option<bool> {
    if value.is_null() {
        None
    } else {
        Some(value.is_truthy())
    }
}

/// AND function
///
/// FALSE if either side is false, NULL if either side is NULL, else TRUE.
#[derive(Default)]
pub struct AndFunction;

impl ScalarFunction for AndFunction {
    fn name(&self) -> &str {
        "and"
    }

    fn info(&self) -> FunctionInfo {
        logic_info("and", "Logical conjunction", 2)
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "and", 2);
        Ok(match (truth(&args[0]), truth(&args[1])) {
            (Some(false), _) | (_, Some(false)) => Value::Boolean(false),
            (Some(true), Some(true)) => Value::Boolean(true),
            _ => Value::Null,
        })
    }
}

/// OR function
///
/// TRUE if either side is true, NULL if either side is NULL, else FALSE.
#[derive(Default)]
pub struct OrFunction;

impl ScalarFunction for OrFunction {
    fn name(&self) -> &str {
        "or"
    }

    fn info(&self) -> FunctionInfo {
        logic_info("or", "Logical disjunction", 2)
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "or", 2);
        Ok(match (truth(&args[0]), truth(&args[1])) {
            (Some(true), _) | (_, Some(true)) => Value::Boolean(true),
            (Some(false), Some(false)) => Value::Boolean(false),
            _ => Value::Null,
        })
    }
}

/// NOT function
#[derive(Default)]
pub struct NotFunction;

impl ScalarFunction for NotFunction {
    fn name(&self) -> &str {
        "not"
    }

    fn info(&self) -> FunctionInfo {
        logic_info("not", "Logical negation", 1)
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "not", 1);
        Ok(truth(&args[0]).map_or(Value::Null, |b| Value::Boolean(!b)))
    }
}

/// ISNULL function - true if the argument is NULL, never NULL itself
#[derive(Default)]
pub struct IsNullFunction;

impl ScalarFunction for IsNullFunction {
    fn name(&self) -> &str {
        "isnull"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "isnull",
            FunctionType::Scalar,
            "Returns true if the argument is NULL",
            FunctionSignature::new(FunctionDataType::Boolean, vec![FunctionDataType::Any], 1, 1),
        )
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "isnull", 1);
        Ok(Value::Boolean(args[0].is_null()))
    }
}
