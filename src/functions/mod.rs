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

//! Function system
//!
//! Functions come in two kinds:
//!
//! - [`ScalarFunction`] - pure functions of their arguments (ADD, EQ, UPPER, ...)
//! - [`AggregateFunction`] - functions that fold rows into an
//!   [`AggregateState`] (COUNT, SUM, MEAN, MIN, MAX)
//!
//! Both are registered by name in a [`SymbolTable`], which the compiler
//! consults to resolve every call in an expression tree.

use std::any::Any;
use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

use crate::core::{Error, Result, Value};

/// Validate the argument count of a function call
///
/// Expands to an early `return Err(Error::Arity { .. })`.
macro_rules! validate_arg_count {
    // Exact count
    ($args:expr, $name:expr, $exact:expr) => {
        if $args.len() != $exact {
            return Err($crate::core::Error::arity($name, $exact, $args.len()));
        }
    };
    // Range (min to max inclusive)
    ($args:expr, $name:expr, $min:expr, $max:expr) => {
        if $args.len() < $min || $args.len() > $max {
            return Err($crate::core::Error::arity_range(
                $name,
                $min,
                $max,
                $args.len(),
            ));
        }
    };
}

pub mod aggregate;
pub mod registry;
pub mod scalar;

/// Function type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionType {
    /// Aggregate function (folds many rows into one value)
    Aggregate,
    /// Scalar function (operates on a single row)
    Scalar,
}

/// Data type for function signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionDataType {
    /// Any type
    Any,
    /// Integer type
    Integer,
    /// Float type
    Float,
    /// Integer or float, depending on the inputs
    Numeric,
    /// String type
    String,
    /// Boolean type
    Boolean,
}

/// Function signature information
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    /// Return type
    pub return_type: FunctionDataType,
    /// Argument types
    pub argument_types: Vec<FunctionDataType>,
    /// Minimum number of arguments
    pub min_args: usize,
    /// Maximum number of arguments
    pub max_args: usize,
    /// Whether the function is variadic
    pub is_variadic: bool,
}

impl FunctionSignature {
    /// Create a new function signature
    pub fn new(
        return_type: FunctionDataType,
        argument_types: Vec<FunctionDataType>,
        min_args: usize,
        max_args: usize,
    ) -> Self {
        Self {
            return_type,
            argument_types,
            min_args,
            max_args,
            is_variadic: false,
        }
    }

    /// Create a variadic function signature
    pub fn variadic(return_type: FunctionDataType, arg_type: FunctionDataType) -> Self {
        Self {
            return_type,
            argument_types: vec![arg_type],
            min_args: 1,
            max_args: usize::MAX,
            is_variadic: true,
        }
    }

    /// Validate argument count for a call to `name`
    pub fn validate_arg_count(&self, name: &str, count: usize) -> Result<()> {
        if count < self.min_args || count > self.max_args {
            return Err(Error::arity_range(name, self.min_args, self.max_args, count));
        }
        Ok(())
    }
}

/// Function information
#[derive(Debug, Clone)]
pub struct FunctionInfo {
    /// Function name
    pub name: String,
    /// Function type
    pub function_type: FunctionType,
    /// Description
    pub description: String,
    /// Signature
    pub signature: FunctionSignature,
}

impl FunctionInfo {
    /// Create a new function info
    pub fn new(
        name: impl Into<String>,
        function_type: FunctionType,
        description: impl Into<String>,
        signature: FunctionSignature,
    ) -> Self {
        Self {
            name: name.into(),
            function_type,
            description: description.into(),
            signature,
        }
    }

    /// Get the function name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the signature
    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }
}

/// Trait for scalar functions
pub trait ScalarFunction: Send + Sync {
    /// Get the function name
    fn name(&self) -> &str;

    /// Get function information
    fn info(&self) -> FunctionInfo;

    /// Evaluate the function with the given arguments
    ///
    /// Must be deterministic and free of side effects.
    fn evaluate(&self, args: &[Value]) -> Result<Value>;
}

/// Trait for aggregate function descriptors
///
/// A descriptor is shared by every program that calls it. The per-group
/// accumulator lives in the [`AggregateState`] returned by [`init`].
///
/// [`init`]: AggregateFunction::init
pub trait AggregateFunction: Send + Sync {
    /// Get the function name
    fn name(&self) -> &str;

    /// Get function information
    fn info(&self) -> FunctionInfo;

    /// Size in bytes of the accumulator, used for the program's scratch layout
    fn scratch_size(&self) -> usize;

    /// Create a fresh accumulator
    fn init(&self) -> Box<dyn AggregateState>;
}

/// Accumulator of one aggregate call within one instance
pub trait AggregateState: Send {
    /// Fold one row's evaluated arguments into the state
    fn accumulate(&mut self, args: &[Value]) -> Result<()>;

    /// Current result
    fn get(&self) -> Value;

    /// Return to the freshly initialised state
    fn reset(&mut self);

    /// Combine another partial state of the same aggregate into this one
    fn merge(&mut self, other: &dyn AggregateState) -> Result<()>;

    /// Serialize the state, returning the number of bytes written
    fn save_state(&self, sink: &mut dyn Write) -> Result<usize>;

    /// Replace the state with one read from `source`
    fn load_state(&mut self, source: &mut dyn Read) -> Result<()>;

    /// Release resources held by the state
    fn free(&mut self) {}

    /// Downcast support for merge
    fn as_any(&self) -> &dyn Any;
}

/// A registered function
#[derive(Clone)]
pub enum Function {
    /// Pure function of its arguments
    Pure(Arc<dyn ScalarFunction>),
    /// Aggregate with per-instance state
    Aggregate(Arc<dyn AggregateFunction>),
}

impl Function {
    /// Wrap a scalar function
    pub fn pure(function: impl ScalarFunction + 'static) -> Self {
        Function::Pure(Arc::new(function))
    }

    /// Wrap an aggregate function
    pub fn aggregate(function: impl AggregateFunction + 'static) -> Self {
        Function::Aggregate(Arc::new(function))
    }

    /// Get the function name
    pub fn name(&self) -> &str {
        match self {
            Function::Pure(f) => f.name(),
            Function::Aggregate(f) => f.name(),
        }
    }

    /// Get function information
    pub fn info(&self) -> FunctionInfo {
        match self {
            Function::Pure(f) => f.info(),
            Function::Aggregate(f) => f.info(),
        }
    }

    /// Returns true for aggregate functions
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Function::Aggregate(_))
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Pure(func) => write!(f, "Pure({})", func.name()),
            Function::Aggregate(func) => write!(f, "Aggregate({})", func.name()),
        }
    }
}

// Re-export main types
pub use aggregate::{CountFunction, MaxFunction, MeanFunction, MinFunction, SumFunction};
pub use registry::SymbolTable;
pub use scalar::{
    AbsFunction, AddFunction, AndFunction, CmpFunction, ConcatFunction, DivFunction,
    EndsWithFunction, EqFunction, Fnv32Function, GtFunction, GteFunction, IsNullFunction,
    LengthFunction, LowerFunction, LtFunction, LteFunction, LtrimFunction, ModFunction,
    MulFunction, NegFunction, NeqFunction, NotFunction, OrFunction, PowFunction, RoundFunction,
    RtrimFunction, StartsWithFunction, SubFunction, SubstrFunction, ToInt64Function,
    ToNilFunction, ToStringFunction, TruncateFunction, UpperFunction,
};
