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

// Evaluation instances
//
// An Instance is one evaluation context of a Program: one aggregation
// bucket, one partition's partial result, or just the last row's value for
// programs without aggregates.

use std::fmt;

use super::instruction::ScratchSlot;
use crate::core::{Error, Result, Value};
use crate::functions::AggregateState;

/// Backing storage of an instance
pub(crate) enum Storage {
    /// Programs without aggregates keep the last evaluated value
    Scalar(Value),

    /// One state per aggregate slot, in compile order
    Aggregate(Vec<Box<dyn AggregateState>>),
}

/// Evaluation context allocated by [`VM::alloc_instance`](super::VM::alloc_instance)
///
/// Bound to the program it was allocated for; using it with any other
/// program fails with a state error.
pub struct Instance {
    program_id: u64,
    storage_size: usize,
    pub(crate) storage: Storage,
}

impl Instance {
    pub(crate) fn new(program_id: u64, storage_size: usize, storage: Storage) -> Self {
        Self {
            program_id,
            storage_size,
            storage,
        }
    }

    /// Id of the program this instance belongs to
    #[inline]
    pub fn program_id(&self) -> u64 {
        self.program_id
    }

    /// Bytes of scratch storage reserved for this instance
    #[inline]
    pub fn storage_size(&self) -> usize {
        self.storage_size
    }

    /// Returns true if the instance holds aggregate state
    #[inline]
    pub fn is_aggregate(&self) -> bool {
        matches!(self.storage, Storage::Aggregate(_))
    }

    /// State of an aggregate slot
    pub(crate) fn state(&self, slot: ScratchSlot) -> Result<&dyn AggregateState> {
        match &self.storage {
            Storage::Aggregate(states) => states
                .get(slot.index)
                .map(|s| &**s)
                .ok_or_else(|| Error::index(slot.index, states.len())),
            Storage::Scalar(_) => Err(Error::state("instance holds no aggregate state")),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Instance");
        s.field("program_id", &self.program_id)
            .field("storage_size", &self.storage_size);
        match &self.storage {
            Storage::Scalar(value) => s.field("value", value),
            Storage::Aggregate(states) => s.field(
                "aggregates",
                &states.iter().map(|st| st.get()).collect::<Vec<_>>(),
            ),
        };
        s.finish()
    }
}
