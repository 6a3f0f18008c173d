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

//! MEAN (AVG) aggregate function

use std::any::Any;
use std::io::{Read, Write};

use crate::core::{codec, Result, Value};
use crate::functions::{
    AggregateFunction, AggregateState, FunctionDataType, FunctionInfo, FunctionSignature,
    FunctionType,
};

use super::{downcast_state, numeric_input};

/// MEAN aggregate function
///
/// Returns the arithmetic mean of the non-NULL values as FLOAT, or NULL
/// when no value was seen.
#[derive(Default)]
pub struct MeanFunction;

impl AggregateFunction for MeanFunction {
    fn name(&self) -> &str {
        "mean"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "mean",
            FunctionType::Aggregate,
            "Returns the average of all non-NULL values",
            FunctionSignature::new(FunctionDataType::Float, vec![FunctionDataType::Numeric], 1, 1),
        )
    }

    fn scratch_size(&self) -> usize {
        std::mem::size_of::<MeanState>()
    }

    fn init(&self) -> Box<dyn AggregateState> {
        Box::new(MeanState::default())
    }
}

/// Accumulator for MEAN
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MeanState {
    sum: f64,
    count: u64,
}

impl MeanState {
    /// Number of values averaged so far
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl AggregateState for MeanState {
    fn accumulate(&mut self, args: &[Value]) -> Result<()> {
        validate_arg_count!(args, "mean", 1);

        if let Some(v) = numeric_input("mean", &args[0])? {
            self.sum += v;
            self.count += 1;
        }
        Ok(())
    }

    fn get(&self) -> Value {
        if self.count == 0 {
            return Value::Null;
        }
        Value::Float(self.sum / self.count as f64)
    }

    fn reset(&mut self) {
        *self = MeanState::default();
    }

    fn merge(&mut self, other: &dyn AggregateState) -> Result<()> {
        let other = downcast_state::<MeanState>("mean", other)?;
        self.sum += other.sum;
        self.count = self.count.saturating_add(other.count);
        Ok(())
    }

    fn save_state(&self, sink: &mut dyn Write) -> Result<usize> {
        let written = codec::write_varint(sink, self.count)?;
        Ok(written + codec::write_f64(sink, self.sum)?)
    }

    fn load_state(&mut self, source: &mut dyn Read) -> Result<()> {
        let count = codec::read_varint(source)?;
        self.sum = codec::read_f64(source)?;
        self.count = count;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
