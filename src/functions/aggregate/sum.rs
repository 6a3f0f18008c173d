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

//! SUM aggregate function

use std::any::Any;
use std::io::{Read, Write};

use crate::core::{codec, Error, Result, Value};
use crate::functions::{
    AggregateFunction, AggregateState, FunctionDataType, FunctionInfo, FunctionSignature,
    FunctionType,
};

use super::{downcast_state, numeric_input};

/// SUM aggregate function
///
/// Adds up its argument, skipping NULLs. The result stays INTEGER until a
/// FLOAT input (or a merge with a FLOAT partial sum) is seen.
#[derive(Default)]
pub struct SumFunction;

impl AggregateFunction for SumFunction {
    fn name(&self) -> &str {
        "sum"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "sum",
            FunctionType::Aggregate,
            "Returns the sum of all non-NULL values",
            FunctionSignature::new(
                FunctionDataType::Numeric,
                vec![FunctionDataType::Numeric],
                1,
                1,
            ),
        )
    }

    fn scratch_size(&self) -> usize {
        std::mem::size_of::<SumState>()
    }

    fn init(&self) -> Box<dyn AggregateState> {
        Box::new(SumState::default())
    }
}

/// Result subtype of a running sum
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SumKind {
    #[default]
    Integer = 0,
    Float = 1,
}

/// Accumulator for SUM
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SumState {
    kind: SumKind,
    sum: f64,
}

impl SumState {
    /// Result subtype so far
    pub fn kind(&self) -> SumKind {
        self.kind
    }
}

impl AggregateState for SumState {
    fn accumulate(&mut self, args: &[Value]) -> Result<()> {
        validate_arg_count!(args, "sum", 1);

        if let Value::Float(_) = args[0] {
            self.kind = SumKind::Float;
        }
        if let Some(v) = numeric_input("sum", &args[0])? {
            if v.fract() != 0.0 {
                self.kind = SumKind::Float;
            }
            self.sum += v;
        }
        Ok(())
    }

    fn get(&self) -> Value {
        match self.kind {
            SumKind::Integer => Value::Integer(self.sum as i64),
            SumKind::Float => Value::Float(self.sum),
        }
    }

    fn reset(&mut self) {
        *self = SumState::default();
    }

    fn merge(&mut self, other: &dyn AggregateState) -> Result<()> {
        let other = downcast_state::<SumState>("sum", other)?;
        if other.kind == SumKind::Float {
            self.kind = SumKind::Float;
        }
        self.sum += other.sum;
        Ok(())
    }

    fn save_state(&self, sink: &mut dyn Write) -> Result<usize> {
        let written = codec::write_varint(sink, self.kind as u64)?;
        Ok(written + codec::write_f64(sink, self.sum)?)
    }

    fn load_state(&mut self, source: &mut dyn Read) -> Result<()> {
        let kind = match codec::read_varint(source)? {
            0 => SumKind::Integer,
            1 => SumKind::Float,
            other => {
                return Err(Error::internal(format!(
                    "corrupt sum state: invalid type tag {}",
                    other
                )))
            }
        };
        self.sum = codec::read_f64(source)?;
        self.kind = kind;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
