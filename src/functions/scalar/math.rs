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

//! Math scalar functions
//!
//! INTEGER op INTEGER stays INTEGER (falling back to FLOAT on overflow),
//! any FLOAT operand makes the result FLOAT. DIV always returns FLOAT.

use std::sync::Arc;

use crate::core::{Error, Result, Value};
use crate::functions::{
    FunctionDataType, FunctionInfo, FunctionSignature, FunctionType, ScalarFunction,
};

use super::{any_null, numeric_arg};

/// Integer and float implementations of one binary operator
struct BinaryOp {
    name: &'static str,
    /// None means the integer result does not fit and FLOAT is used instead
    int: fn(i64, i64) -> Result<Option<i64>>,
    float: fn(f64, f64) -> Result<f64>,
}

impl BinaryOp {
    fn apply(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, self.name, 2);
        if any_null(args) {
            return Ok(Value::Null);
        }

        let left = numeric_arg(self.name, &args[0])?;
        let right = numeric_arg(self.name, &args[1])?;
        match (&left, &right) {
            (Value::Integer(a), Value::Integer(b)) => match (self.int)(*a, *b)? {
                Some(v) => Ok(Value::Integer(v)),
                None => Ok(Value::Float((self.float)(*a as f64, *b as f64)?)),
            },
            _ => Ok(Value::Float((self.float)(
                left.to_float()?,
                right.to_float()?,
            )?)),
        }
    }
}

fn binary_info(name: &str, description: &str) -> FunctionInfo {
    FunctionInfo::new(
        name,
        FunctionType::Scalar,
        description,
        FunctionSignature::new(
            FunctionDataType::Numeric,
            vec![FunctionDataType::Numeric, FunctionDataType::Numeric],
            2,
            2,
        ),
    )
}

fn unary_info(name: &str, description: &str) -> FunctionInfo {
    FunctionInfo::new(
        name,
        FunctionType::Scalar,
        description,
        FunctionSignature::new(
            FunctionDataType::Numeric,
            vec![FunctionDataType::Numeric],
            1,
            1,
        ),
    )
}

// ============================================================================
// ADD
// ============================================================================

const ADD: BinaryOp = BinaryOp {
    name: "add",
    int: |a, b| Ok(a.checked_add(b)),
    float: |a, b| Ok(a + b),
};

/// ADD function - sum of two numbers
///
/// When either side is text that does not parse as a number the operands
/// are concatenated instead.
#[derive(Default)]
pub struct AddFunction;

impl ScalarFunction for AddFunction {
    fn name(&self) -> &str {
        "add"
    }

    fn info(&self) -> FunctionInfo {
        binary_info("add", "Adds two numbers, or concatenates non-numeric text")
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "add", 2);
        if any_null(args) {
            return Ok(Value::Null);
        }

        let is_text = |v: &Value| matches!(v, Value::Text(_)) && !v.is_convertible_to_numeric();
        if is_text(&args[0]) || is_text(&args[1]) {
            let mut result = args[0].as_string().unwrap_or_default();
            result.push_str(&args[1].as_string().unwrap_or_default());
            return Ok(Value::Text(Arc::from(result.as_str())));
        }

        ADD.apply(args)
    }
}

// ============================================================================
// SUB
// ============================================================================

const SUB: BinaryOp = BinaryOp {
    name: "sub",
    int: |a, b| Ok(a.checked_sub(b)),
    float: |a, b| Ok(a - b),
};

/// SUB function - difference of two numbers
#[derive(Default)]
pub struct SubFunction;

impl ScalarFunction for SubFunction {
    fn name(&self) -> &str {
        "sub"
    }

    fn info(&self) -> FunctionInfo {
        binary_info("sub", "Subtracts the second number from the first")
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        SUB.apply(args)
    }
}

// ============================================================================
// MUL
// ============================================================================

const MUL: BinaryOp = BinaryOp {
    name: "mul",
    int: |a, b| Ok(a.checked_mul(b)),
    float: |a, b| Ok(a * b),
};

/// MUL function - product of two numbers
#[derive(Default)]
pub struct MulFunction;

impl ScalarFunction for MulFunction {
    fn name(&self) -> &str {
        "mul"
    }

    fn info(&self) -> FunctionInfo {
        binary_info("mul", "Multiplies two numbers")
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        MUL.apply(args)
    }
}

// ============================================================================
// DIV
// ============================================================================

const DIV: BinaryOp = BinaryOp {
    name: "div",
    // Always FLOAT
    int: |_, b| {
        if b == 0 {
            Err(Error::DivisionByZero)
        } else {
            Ok(None)
        }
    },
    float: |a, b| {
        if b == 0.0 {
            Err(Error::DivisionByZero)
        } else {
            Ok(a / b)
        }
    },
};

/// DIV function - quotient of two numbers, always FLOAT
#[derive(Default)]
pub struct DivFunction;

impl ScalarFunction for DivFunction {
    fn name(&self) -> &str {
        "div"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "div",
            FunctionType::Scalar,
            "Divides the first number by the second",
            FunctionSignature::new(
                FunctionDataType::Float,
                vec![FunctionDataType::Numeric, FunctionDataType::Numeric],
                2,
                2,
            ),
        )
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        DIV.apply(args)
    }
}

// ============================================================================
// MOD
// ============================================================================

const MOD: BinaryOp = BinaryOp {
    name: "mod",
    int: |a, b| {
        if b == 0 {
            Err(Error::DivisionByZero)
        } else {
            Ok(a.checked_rem(b))
        }
    },
    float: |a, b| {
        if b == 0.0 {
            Err(Error::DivisionByZero)
        } else {
            Ok(a % b)
        }
    },
};

/// MOD function - remainder of a division
#[derive(Default)]
pub struct ModFunction;

impl ScalarFunction for ModFunction {
    fn name(&self) -> &str {
        "mod"
    }

    fn info(&self) -> FunctionInfo {
        binary_info("mod", "Returns the remainder of a division")
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        MOD.apply(args)
    }
}

// ============================================================================
// POW
// ============================================================================

const POW: BinaryOp = BinaryOp {
    name: "pow",
    // Negative exponents fall back to FLOAT
    int: |a, b| Ok(u32::try_from(b).ok().and_then(|e| a.checked_pow(e))),
    float: |a, b| Ok(a.powf(b)),
};

/// POW function - raises a number to a power
#[derive(Default)]
pub struct PowFunction;

impl ScalarFunction for PowFunction {
    fn name(&self) -> &str {
        "pow"
    }

    fn info(&self) -> FunctionInfo {
        binary_info("pow", "Raises the first number to the power of the second")
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        POW.apply(args)
    }
}

// ============================================================================
// NEG
// ============================================================================

/// NEG function - arithmetic negation
#[derive(Default)]
pub struct NegFunction;

impl ScalarFunction for NegFunction {
    fn name(&self) -> &str {
        "neg"
    }

    fn info(&self) -> FunctionInfo {
        unary_info("neg", "Negates a number")
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "neg", 1);
        if args[0].is_null() {
            return Ok(Value::Null);
        }

        match numeric_arg("neg", &args[0])? {
            Value::Integer(i) => Ok(i
                .checked_neg()
                .map_or(Value::Float(-(i as f64)), Value::Integer)),
            other => Ok(Value::Float(-other.to_float()?)),
        }
    }
}

// ============================================================================
// ABS
// ============================================================================

/// ABS function - returns the absolute value of a number
#[derive(Default)]
pub struct AbsFunction;

impl ScalarFunction for AbsFunction {
    fn name(&self) -> &str {
        "abs"
    }

    fn info(&self) -> FunctionInfo {
        unary_info("abs", "Returns the absolute value of a number")
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "abs", 1);
        if args[0].is_null() {
            return Ok(Value::Null);
        }

        // Preserve integer type if possible
        match numeric_arg("abs", &args[0])? {
            Value::Integer(i) => Ok(i
                .checked_abs()
                .map_or(Value::Float((i as f64).abs()), Value::Integer)),
            other => Ok(Value::Float(other.to_float()?.abs())),
        }
    }
}

// ============================================================================
// ROUND
// ============================================================================

/// ROUND function - rounds a number to a specified number of decimal places
///
/// Negative precision rounds to the left of the decimal point.
#[derive(Default)]
pub struct RoundFunction;

impl ScalarFunction for RoundFunction {
    fn name(&self) -> &str {
        "round"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "round",
            FunctionType::Scalar,
            "Rounds a number to a specified number of decimal places",
            FunctionSignature::new(
                FunctionDataType::Numeric,
                vec![FunctionDataType::Numeric, FunctionDataType::Integer],
                1,
                2,
            ),
        )
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "round", 1, 2);
        if any_null(args) {
            return Ok(Value::Null);
        }

        let digits = match args.get(1) {
            Some(d) => numeric_arg("round", d)?
                .as_int64()
                .unwrap_or(0)
                .clamp(-308, 308) as i32,
            None => 0,
        };

        match numeric_arg("round", &args[0])? {
            Value::Integer(i) if digits >= 0 => Ok(Value::Integer(i)),
            Value::Integer(i) => {
                let factor = 10f64.powi(-digits);
                Ok(Value::Integer(((i as f64 / factor).round() * factor) as i64))
            }
            other => {
                let num = other.to_float()?;
                let factor = 10f64.powi(digits);
                let rounded = (num * factor).round() / factor;
                Ok(Value::Float(if rounded.is_finite() { rounded } else { num }))
            }
        }
    }
}

// ============================================================================
// TRUNCATE
// ============================================================================

/// TRUNCATE function - drops the fractional part of a number
#[derive(Default)]
pub struct TruncateFunction;

impl ScalarFunction for TruncateFunction {
    fn name(&self) -> &str {
        "truncate"
    }

    fn info(&self) -> FunctionInfo {
        unary_info("truncate", "Truncates a number toward zero")
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "truncate", 1);
        if args[0].is_null() {
            return Ok(Value::Null);
        }

        match numeric_arg("truncate", &args[0])? {
            Value::Integer(i) => Ok(Value::Integer(i)),
            other => Ok(Value::Float(other.to_float()?.trunc())),
        }
    }
}
