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

//! Type conversion scalar functions

use crate::core::{Error, Result, Value};
use crate::functions::{
    FunctionDataType, FunctionInfo, FunctionSignature, FunctionType, ScalarFunction,
};

fn cast_info(name: &str, description: &str, return_type: FunctionDataType) -> FunctionInfo {
    FunctionInfo::new(
        name,
        FunctionType::Scalar,
        description,
        FunctionSignature::new(return_type, vec![FunctionDataType::Any], 1, 1),
    )
}

// ============================================================================
// TO_STRING
// ============================================================================

/// TO_STRING function - string form of any value
///
/// NULL converts to the text `NULL`.
#[derive(Default)]
pub struct ToStringFunction;

impl ScalarFunction for ToStringFunction {
    fn name(&self) -> &str {
        "to_string"
    }

    fn info(&self) -> FunctionInfo {
        cast_info(
            "to_string",
            "Converts a value to its string form",
            FunctionDataType::String,
        )
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "to_string", 1);
        match &args[0] {
            Value::Null => Ok(Value::text("NULL")),
            Value::Text(_) => Ok(args[0].clone()),
            other => Ok(Value::text(other.to_string())),
        }
    }
}

// ============================================================================
// TO_INT64
// ============================================================================

/// TO_INT64 function - converts to INTEGER, truncating toward zero
#[derive(Default)]
pub struct ToInt64Function;

impl ScalarFunction for ToInt64Function {
    fn name(&self) -> &str {
        "to_int64"
    }

    fn info(&self) -> FunctionInfo {
        cast_info(
            "to_int64",
            "Converts a value to a 64-bit integer",
            FunctionDataType::Integer,
        )
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "to_int64", 1);
        let value = &args[0];
        let number = match value {
            Value::Null => return Ok(Value::Null),
            Value::Integer(_) => return Ok(value.clone()),
            Value::Boolean(b) => return Ok(Value::Integer(*b as i64)),
            Value::Float(_) | Value::Text(_) => value.to_numeric().ok(),
        };
        match number {
            Some(Value::Integer(i)) => Ok(Value::Integer(i)),
            // Range check before the cast, which would saturate
            Some(Value::Float(f))
                if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 =>
            {
                Ok(Value::Integer(f.trunc() as i64))
            }
            _ => Err(Error::type_error(format!(
                "can't convert {} '{}' to INTEGER",
                value.data_type(),
                value
            ))),
        }
    }
}

// ============================================================================
// TO_NIL
// ============================================================================

/// TO_NIL function - discards its argument and returns NULL
#[derive(Default)]
pub struct ToNilFunction;

impl ScalarFunction for ToNilFunction {
    fn name(&self) -> &str {
        "to_nil"
    }

    fn info(&self) -> FunctionInfo {
        cast_info("to_nil", "Returns NULL for any input", FunctionDataType::Any)
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "to_nil", 1);
        Ok(Value::Null)
    }
}
