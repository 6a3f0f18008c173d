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

//! COUNT aggregate function

use std::any::Any;
use std::io::{Read, Write};

use crate::core::{codec, Error, Result, Value};
use crate::functions::{
    AggregateFunction, AggregateState, FunctionDataType, FunctionInfo, FunctionSignature,
    FunctionType,
};

use super::downcast_state;

/// COUNT aggregate function
///
/// - COUNT() counts every row
/// - COUNT(expr) counts rows where expr is not NULL
#[derive(Default)]
pub struct CountFunction;

impl AggregateFunction for CountFunction {
    fn name(&self) -> &str {
        "count"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "count",
            FunctionType::Aggregate,
            "Returns the number of rows, or of non-NULL values of its argument",
            FunctionSignature::new(
                FunctionDataType::Integer,
                vec![FunctionDataType::Any],
                0, // count() counts rows
                1,
            ),
        )
    }

    fn scratch_size(&self) -> usize {
        std::mem::size_of::<CountState>()
    }

    fn init(&self) -> Box<dyn AggregateState> {
        Box::new(CountState::default())
    }
}

/// Accumulator for COUNT
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CountState {
    count: u64,
}

impl CountState {
    /// Number of rows counted so far
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl AggregateState for CountState {
    fn accumulate(&mut self, args: &[Value]) -> Result<()> {
        if args.len() > 1 {
            return Err(Error::arity_range("count", 0, 1, args.len()));
        }
        if args.first().map_or(true, |v| !v.is_null()) {
            self.count += 1;
        }
        Ok(())
    }

    fn get(&self) -> Value {
        Value::Integer(self.count as i64)
    }

    fn reset(&mut self) {
        self.count = 0;
    }

    fn merge(&mut self, other: &dyn AggregateState) -> Result<()> {
        let other = downcast_state::<CountState>("count", other)?;
        self.count = self.count.saturating_add(other.count);
        Ok(())
    }

    fn save_state(&self, sink: &mut dyn Write) -> Result<usize> {
        codec::write_varint(sink, self.count)
    }

    fn load_state(&mut self, source: &mut dyn Read) -> Result<()> {
        self.count = codec::read_varint(source)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
