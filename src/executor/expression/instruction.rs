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

// Instructions
//
// A compiled expression is a tree of instructions stored in a flat arena
// owned by its Program. Children are referenced by arena index and keep the
// left-to-right order of the source tree.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::functions::{AggregateFunction, ScalarFunction};

/// Index of an instruction inside its program's arena
pub type InstrId = usize;

/// Children inline capacity; most calls take at most four arguments
const CHILDREN_INLINE_CAPACITY: usize = 4;

/// Child list of an instruction
pub type Children = SmallVec<[InstrId; CHILDREN_INLINE_CAPACITY]>;

/// Location of one aggregate's state inside an instance
///
/// `index` is the dense slot number used by the instance arena. `offset` and
/// `size` describe the byte layout of the scratch area the aggregate was
/// assigned at compile time; ranges of different slots never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScratchSlot {
    pub index: usize,
    pub offset: usize,
    pub size: usize,
}

impl ScratchSlot {
    /// End of this slot's byte range (exclusive)
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.size
    }
}

/// What an instruction does
#[derive(Clone)]
pub enum InstructionKind {
    /// Load a literal from the program's literal arena
    Literal(usize),

    /// Load a column from the input row
    Input(usize),

    /// Evaluate children, then call a pure function
    CallPure(Arc<dyn ScalarFunction>),

    /// Aggregate call; its children are the aggregate's arguments
    CallAggregate {
        function: Arc<dyn AggregateFunction>,
        slot: ScratchSlot,
    },

    /// Children are condition, then branch, else branch
    If,
}

impl fmt::Debug for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstructionKind::Literal(idx) => write!(f, "Literal({})", idx),
            InstructionKind::Input(idx) => write!(f, "Input({})", idx),
            InstructionKind::CallPure(func) => write!(f, "CallPure({})", func.name()),
            InstructionKind::CallAggregate { function, slot } => write!(
                f,
                "CallAggregate({}, slot={}, offset={}, size={})",
                function.name(),
                slot.index,
                slot.offset,
                slot.size
            ),
            InstructionKind::If => write!(f, "If"),
        }
    }
}

/// A single node of a compiled expression
#[derive(Debug, Clone)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub children: Children,
    /// True if this node or any descendant is an aggregate call
    pub contains_aggregate: bool,
}

impl Instruction {
    /// Leaf instruction
    pub fn leaf(kind: InstructionKind) -> Self {
        Self {
            kind,
            children: Children::new(),
            contains_aggregate: false,
        }
    }

    /// Returns true for aggregate calls
    #[inline]
    pub fn is_aggregate(&self) -> bool {
        matches!(self.kind, InstructionKind::CallAggregate { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::{AddFunction, SumFunction};

    #[test]
    fn test_debug_output() {
        let kind = InstructionKind::CallPure(Arc::new(AddFunction));
        assert_eq!(format!("{:?}", kind), "CallPure(add)");

        let kind = InstructionKind::CallAggregate {
            function: Arc::new(SumFunction),
            slot: ScratchSlot {
                index: 1,
                offset: 8,
                size: 16,
            },
        };
        assert_eq!(
            format!("{:?}", kind),
            "CallAggregate(sum, slot=1, offset=8, size=16)"
        );
    }

    #[test]
    fn test_slot_end() {
        let slot = ScratchSlot {
            index: 0,
            offset: 8,
            size: 16,
        };
        assert_eq!(slot.end(), 24);
        assert!(!Instruction::leaf(InstructionKind::Input(0)).is_aggregate());
    }
}
