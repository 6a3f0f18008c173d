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

//! Aggregate Functions
//!
//! This module provides the built-in aggregates:
//!
//! - [`CountFunction`] - COUNT() and COUNT(column)
//! - [`SumFunction`] - SUM(column)
//! - [`MeanFunction`] - MEAN(column), also registered as AVG
//! - [`MinFunction`] - MIN(column)
//! - [`MaxFunction`] - MAX(column)
//!
//! Every state serializes to a compact layout built from the primitives in
//! [`crate::core::codec`]:
//!
//! | aggregate | layout                                  |
//! |-----------|-----------------------------------------|
//! | count     | varint(count)                           |
//! | sum       | varint(0=INTEGER, 1=FLOAT) + f64(sum)   |
//! | mean      | varint(count) + f64(sum)                |
//! | min / max | varint(0=empty, 1=present) + f64(value) |

mod count;
mod max;
mod mean;
mod min;
mod sum;

pub use count::{CountFunction, CountState};
pub use max::{MaxFunction, MaxState};
pub use mean::{MeanFunction, MeanState};
pub use min::{MinFunction, MinState};
pub use sum::{SumFunction, SumState};

use crate::core::{Error, Result, Value};

use super::AggregateState;

/// Downcast the other side of a merge to this aggregate's concrete state
pub(crate) fn downcast_state<'a, T: 'static>(
    name: &str,
    other: &'a dyn AggregateState,
) -> Result<&'a T> {
    other.as_any().downcast_ref::<T>().ok_or_else(|| {
        Error::state(format!(
            "cannot merge {} state with state of a different aggregate",
            name
        ))
    })
}

/// Coerce an aggregate input to f64, None for NULL
pub(crate) fn numeric_input(name: &str, value: &Value) -> Result<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::Integer(i) => Ok(Some(*i as f64)),
        Value::Float(f) => Ok(Some(*f)),
        other => other.to_float().map(Some).map_err(|_| {
            Error::type_error(format!(
                "{}() argument must be numeric, got {} '{}'",
                name,
                other.data_type(),
                other
            ))
        }),
    }
}

/// Read a 0/1 presence flag
pub(crate) fn read_flag(source: &mut dyn std::io::Read, name: &str) -> Result<bool> {
    match crate::core::codec::read_varint(source)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(Error::internal(format!(
            "corrupt {} state: invalid presence flag {}",
            name, other
        ))),
    }
}
