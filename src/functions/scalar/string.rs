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

//! String scalar functions

use std::sync::Arc;

use crate::core::{Error, Result, Value};
use crate::functions::{
    FunctionDataType, FunctionInfo, FunctionSignature, FunctionType, ScalarFunction,
};

use super::any_null;

/// Convert a value to its string form for string functions
fn value_to_string(value: &Value) -> String {
    value.as_string().unwrap_or_default()
}

// ============================================================================
// CONCAT
// ============================================================================

/// CONCAT function - concatenates its arguments, skipping NULLs
#[derive(Default)]
pub struct ConcatFunction;

impl ScalarFunction for ConcatFunction {
    fn name(&self) -> &str {
        "concat"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "concat",
            FunctionType::Scalar,
            "Concatenates multiple strings",
            FunctionSignature::variadic(FunctionDataType::String, FunctionDataType::Any),
        )
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        if args.is_empty() {
            return Err(Error::arity_range("concat", 1, usize::MAX, 0));
        }

        let mut result = String::new();
        for arg in args {
            if !arg.is_null() {
                result.push_str(&value_to_string(arg));
            }
        }

        Ok(Value::Text(Arc::from(result.as_str())))
    }
}

// ============================================================================
// UPPER / LOWER
// ============================================================================

fn string_info(name: &str, description: &str, return_type: FunctionDataType) -> FunctionInfo {
    FunctionInfo::new(
        name,
        FunctionType::Scalar,
        description,
        FunctionSignature::new(return_type, vec![FunctionDataType::String], 1, 1),
    )
}

/// UPPER function - converts a string to uppercase
#[derive(Default)]
pub struct UpperFunction;

impl ScalarFunction for UpperFunction {
    fn name(&self) -> &str {
        "upper"
    }

    fn info(&self) -> FunctionInfo {
        string_info("upper", "Converts a string to uppercase", FunctionDataType::String)
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "upper", 1);
        if args[0].is_null() {
            return Ok(Value::Null);
        }
        Ok(Value::text(value_to_string(&args[0]).to_uppercase()))
    }
}

/// LOWER function - converts a string to lowercase
#[derive(Default)]
pub struct LowerFunction;

impl ScalarFunction for LowerFunction {
    fn name(&self) -> &str {
        "lower"
    }

    fn info(&self) -> FunctionInfo {
        string_info("lower", "Converts a string to lowercase", FunctionDataType::String)
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "lower", 1);
        if args[0].is_null() {
            return Ok(Value::Null);
        }
        Ok(Value::text(value_to_string(&args[0]).to_lowercase()))
    }
}

// ============================================================================
// LENGTH
// ============================================================================

/// LENGTH function - number of characters in a string
#[derive(Default)]
pub struct LengthFunction;

impl ScalarFunction for LengthFunction {
    fn name(&self) -> &str {
        "length"
    }

    fn info(&self) -> FunctionInfo {
        string_info(
            "length",
            "Returns the number of characters in a string",
            FunctionDataType::Integer,
        )
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "length", 1);
        match &args[0] {
            Value::Null => Ok(Value::Null),
            Value::Text(s) => Ok(Value::Integer(s.chars().count() as i64)),
            other => Ok(Value::Integer(value_to_string(other).chars().count() as i64)),
        }
    }
}

// ============================================================================
// SUBSTR
// ============================================================================

/// SUBSTR function - SUBSTR(str, start [, length]) with 1-based positions
///
/// A start below 1 counts from the first character. A negative length
/// yields the empty string.
#[derive(Default)]
pub struct SubstrFunction;

impl ScalarFunction for SubstrFunction {
    fn name(&self) -> &str {
        "substr"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "substr",
            FunctionType::Scalar,
            "Extracts a substring from a string",
            FunctionSignature::new(
                FunctionDataType::String,
                vec![
                    FunctionDataType::Any,
                    FunctionDataType::Integer,
                    FunctionDataType::Integer,
                ],
                2,
                3,
            ),
        )
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "substr", 2, 3);
        if any_null(args) {
            return Ok(Value::Null);
        }

        let s = value_to_string(&args[0]);
        let start = args[1]
            .as_int64()
            .ok_or_else(|| Error::invalid_argument("substr start position must be an integer"))?;
        let start_idx = if start < 1 { 0 } else { (start - 1) as usize };

        let tail = s.chars().skip(start_idx);
        let result: String = match args.get(2) {
            Some(length) => {
                let length = length
                    .as_int64()
                    .ok_or_else(|| Error::invalid_argument("substr length must be an integer"))?;
                if length < 0 {
                    return Ok(Value::text(""));
                }
                tail.take(length as usize).collect()
            }
            None => tail.collect(),
        };

        Ok(Value::Text(Arc::from(result.as_str())))
    }
}

// ============================================================================
// LTRIM / RTRIM
// ============================================================================

/// LTRIM function - removes leading whitespace
#[derive(Default)]
pub struct LtrimFunction;

impl ScalarFunction for LtrimFunction {
    fn name(&self) -> &str {
        "ltrim"
    }

    fn info(&self) -> FunctionInfo {
        string_info("ltrim", "Removes leading whitespace", FunctionDataType::String)
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "ltrim", 1);
        if args[0].is_null() {
            return Ok(Value::Null);
        }
        Ok(Value::text(value_to_string(&args[0]).trim_start()))
    }
}

/// RTRIM function - removes trailing whitespace
#[derive(Default)]
pub struct RtrimFunction;

impl ScalarFunction for RtrimFunction {
    fn name(&self) -> &str {
        "rtrim"
    }

    fn info(&self) -> FunctionInfo {
        string_info("rtrim", "Removes trailing whitespace", FunctionDataType::String)
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "rtrim", 1);
        if args[0].is_null() {
            return Ok(Value::Null);
        }
        Ok(Value::text(value_to_string(&args[0]).trim_end()))
    }
}

// ============================================================================
// STARTSWITH / ENDSWITH
// ============================================================================

fn affix_info(name: &str, description: &str) -> FunctionInfo {
    FunctionInfo::new(
        name,
        FunctionType::Scalar,
        description,
        FunctionSignature::new(
            FunctionDataType::Boolean,
            vec![FunctionDataType::String, FunctionDataType::String],
            2,
            2,
        ),
    )
}

/// STARTSWITH function - true if the string begins with the prefix
#[derive(Default)]
pub struct StartsWithFunction;

impl ScalarFunction for StartsWithFunction {
    fn name(&self) -> &str {
        "startswith"
    }

    fn info(&self) -> FunctionInfo {
        affix_info("startswith", "Returns true if a string starts with a prefix")
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "startswith", 2);
        if any_null(args) {
            return Ok(Value::Null);
        }
        let s = value_to_string(&args[0]);
        Ok(Value::Boolean(s.starts_with(&value_to_string(&args[1]))))
    }
}

/// ENDSWITH function - true if the string ends with the suffix
#[derive(Default)]
pub struct EndsWithFunction;

impl ScalarFunction for EndsWithFunction {
    fn name(&self) -> &str {
        "endswith"
    }

    fn info(&self) -> FunctionInfo {
        affix_info("endswith", "Returns true if a string ends with a suffix")
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "endswith", 2);
        if any_null(args) {
            return Ok(Value::Null);
        }
        let s = value_to_string(&args[0]);
        Ok(Value::Boolean(s.ends_with(&value_to_string(&args[1]))))
    }
}

// ============================================================================
// FNV32
// ============================================================================

const FNV32_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV32_PRIME: u32 = 16_777_619;

/// 32-bit FNV-1a over raw bytes
fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV32_OFFSET_BASIS, |hash, &b| {
        (hash ^ b as u32).wrapping_mul(FNV32_PRIME)
    })
}

/// FNV32 function - 32-bit FNV-1a hash of the string form, as INTEGER
#[derive(Default)]
pub struct Fnv32Function;

impl ScalarFunction for Fnv32Function {
    fn name(&self) -> &str {
        "fnv32"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "fnv32",
            FunctionType::Scalar,
            "Returns the 32-bit FNV-1a hash of a value",
            FunctionSignature::new(FunctionDataType::Integer, vec![FunctionDataType::Any], 1, 1),
        )
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        validate_arg_count!(args, "fnv32", 1);
        if args[0].is_null() {
            return Ok(Value::Null);
        }
        let s = value_to_string(&args[0]);
        Ok(Value::Integer(fnv1a_32(s.as_bytes()) as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat() {
        let result = ConcatFunction
            .evaluate(&[Value::text("a"), Value::null(), Value::integer(1)])
            .unwrap();
        assert_eq!(result.as_str(), Some("a1"));
        assert!(matches!(
            ConcatFunction.evaluate(&[]),
            Err(Error::Arity { got: 0, .. })
        ));
    }

    #[test]
    fn test_upper_lower() {
        let up = UpperFunction.evaluate(&[Value::text("MiXeD")]).unwrap();
        assert_eq!(up.as_str(), Some("MIXED"));
        let low = LowerFunction.evaluate(&[Value::text("MiXeD")]).unwrap();
        assert_eq!(low.as_str(), Some("mixed"));
        assert!(UpperFunction.evaluate(&[Value::null()]).unwrap().is_null());
    }

    #[test]
    fn test_length() {
        assert!(matches!(
            LengthFunction.evaluate(&[Value::text("héllo")]).unwrap(),
            Value::Integer(5)
        ));
        assert!(matches!(
            LengthFunction.evaluate(&[Value::integer(1234)]).unwrap(),
            Value::Integer(4)
        ));
        assert!(LengthFunction.evaluate(&[Value::null()]).unwrap().is_null());
    }

    #[test]
    fn test_substr() {
        let eval = |args: &[Value]| SubstrFunction.evaluate(args).unwrap();
        let s = Value::text("héllo world");
        assert_eq!(
            eval(&[s.clone(), Value::integer(2), Value::integer(4)]).as_str(),
            Some("éllo")
        );
        assert_eq!(eval(&[s.clone(), Value::integer(7)]).as_str(), Some("world"));
        assert_eq!(
            eval(&[s.clone(), Value::integer(0), Value::integer(2)]).as_str(),
            Some("hé")
        );
        assert_eq!(eval(&[s.clone(), Value::integer(50)]).as_str(), Some(""));
        assert_eq!(
            eval(&[s.clone(), Value::integer(1), Value::integer(-1)]).as_str(),
            Some("")
        );
        assert!(eval(&[s.clone(), Value::null()]).is_null());

        assert!(matches!(
            SubstrFunction.evaluate(&[s.clone(), Value::text("x")]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            SubstrFunction.evaluate(&[s]),
            Err(Error::Arity { got: 1, .. })
        ));
    }

    #[test]
    fn test_trim() {
        let s = Value::text("  pad  ");
        let left = LtrimFunction.evaluate(std::slice::from_ref(&s)).unwrap();
        assert_eq!(left.as_str(), Some("pad  "));
        let right = RtrimFunction.evaluate(&[s]).unwrap();
        assert_eq!(right.as_str(), Some("  pad"));
        assert!(LtrimFunction.evaluate(&[Value::null()]).unwrap().is_null());
    }

    #[test]
    fn test_starts_ends_with() {
        let s = Value::text("prefix-body-suffix");
        assert!(matches!(
            StartsWithFunction
                .evaluate(&[s.clone(), Value::text("prefix")])
                .unwrap(),
            Value::Boolean(true)
        ));
        assert!(matches!(
            StartsWithFunction
                .evaluate(&[s.clone(), Value::text("body")])
                .unwrap(),
            Value::Boolean(false)
        ));
        assert!(matches!(
            EndsWithFunction
                .evaluate(&[s.clone(), Value::text("suffix")])
                .unwrap(),
            Value::Boolean(true)
        ));
        assert!(matches!(
            EndsWithFunction.evaluate(&[Value::integer(1234), Value::integer(34)]).unwrap(),
            Value::Boolean(true)
        ));
        assert!(EndsWithFunction
            .evaluate(&[s, Value::null()])
            .unwrap()
            .is_null());
    }

    #[test]
    fn test_fnv32() {
        // Published FNV-1a 32-bit test vectors
        assert_eq!(fnv1a_32(b""), 0x811c_9dc5);
        assert_eq!(fnv1a_32(b"a"), 0xe40c_292c);
        assert_eq!(fnv1a_32(b"foobar"), 0xbf9c_f968);

        assert!(matches!(
            Fnv32Function.evaluate(&[Value::text("a")]).unwrap(),
            Value::Integer(v) if v == 0xe40c_292c
        ));
        // Hashes the string form
        assert_eq!(
            Fnv32Function.evaluate(&[Value::integer(42)]).unwrap(),
            Fnv32Function.evaluate(&[Value::text("42")]).unwrap()
        );
        assert!(Fnv32Function.evaluate(&[Value::null()]).unwrap().is_null());
    }
}
