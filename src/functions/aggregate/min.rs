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

//! MIN aggregate function

use std::any::Any;
use std::io::{Read, Write};

use crate::core::{codec, Result, Value};
use crate::functions::{
    AggregateFunction, AggregateState, FunctionDataType, FunctionInfo, FunctionSignature,
    FunctionType,
};

use super::{downcast_state, numeric_input, read_flag};

/// MIN aggregate function
///
/// Tracks the smallest numeric value seen. NULL until a non-NULL value
/// arrives.
#[derive(Default)]
pub struct MinFunction;

impl AggregateFunction for MinFunction {
    fn name(&self) -> &str {
        "min"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "min",
            FunctionType::Aggregate,
            "Returns the minimum of all non-NULL values",
            FunctionSignature::new(FunctionDataType::Float, vec![FunctionDataType::Numeric], 1, 1),
        )
    }

    fn scratch_size(&self) -> usize {
        std::mem::size_of::<MinState>()
    }

    fn init(&self) -> Box<dyn AggregateState> {
        Box::new(MinState::default())
    }
}

/// Accumulator for MIN
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MinState {
    value: f64,
    has_value: bool,
}

impl MinState {
    /// NaN never becomes the extreme, so input order cannot change the result
    fn observe(&mut self, v: f64) {
        if v.is_nan() {
            return;
        }
        if !self.has_value || self.value.is_nan() || v < self.value {
            self.value = v;
            self.has_value = true;
        }
    }
}

impl AggregateState for MinState {
    fn accumulate(&mut self, args: &[Value]) -> Result<()> {
        validate_arg_count!(args, "min", 1);

        if let Some(v) = numeric_input("min", &args[0])? {
            self.observe(v);
        }
        Ok(())
    }

    fn get(&self) -> Value {
        if self.has_value {
            Value::Float(self.value)
        } else {
            Value::Null
        }
    }

    fn reset(&mut self) {
        *self = MinState::default();
    }

    fn merge(&mut self, other: &dyn AggregateState) -> Result<()> {
        let other = downcast_state::<MinState>("min", other)?;
        if other.has_value {
            self.observe(other.value);
        }
        Ok(())
    }

    fn save_state(&self, sink: &mut dyn Write) -> Result<usize> {
        let written = codec::write_varint(sink, self.has_value as u64)?;
        Ok(written + codec::write_f64(sink, self.value)?)
    }

    fn load_state(&mut self, source: &mut dyn Read) -> Result<()> {
        let has_value = read_flag(source, "min")?;
        self.value = codec::read_f64(source)?;
        self.has_value = has_value;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
