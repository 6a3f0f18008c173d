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

// Compiled Expression Program
//
// A Program is the compiled form of a resolved expression tree.
// It contains:
// - The instruction arena and its root
// - The literal arena
// - The scratch layout of every aggregate call, in compile order

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::instruction::{Children, InstrId, Instruction, InstructionKind, ScratchSlot};
use crate::core::Value;
use crate::functions::AggregateFunction;

/// Source of unique program ids
static NEXT_PROGRAM_ID: AtomicU64 = AtomicU64::new(1);

/// Compiled expression program
///
/// Immutable once built and safe to share between threads. Every instance
/// allocated from a program is stamped with the program's [`id`](Self::id).
#[derive(Debug, Clone)]
pub struct Program {
    /// Unique id, used to reject instances of other programs
    id: u64,

    /// Instruction arena
    instructions: Vec<Instruction>,

    /// Root of the tree
    root: InstrId,

    /// Literal arena
    literals: Vec<Value>,

    /// Aggregate instructions, indexed by slot
    aggregates: Vec<InstrId>,

    /// Total scratch bytes over all aggregates
    dynamic_storage_size: usize,
}

impl Program {
    /// Unique id of this program
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Root instruction id
    #[inline]
    pub fn root(&self) -> InstrId {
        self.root
    }

    /// Get an instruction by id
    #[inline]
    pub fn instruction(&self, id: InstrId) -> &Instruction {
        &self.instructions[id]
    }

    /// All instructions, children before parents
    #[inline]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Get a literal by index
    #[inline]
    pub fn literal(&self, index: usize) -> &Value {
        &self.literals[index]
    }

    /// Whether any aggregate call was compiled
    #[inline]
    pub fn has_aggregate(&self) -> bool {
        !self.aggregates.is_empty()
    }

    /// Number of aggregate calls
    #[inline]
    pub fn aggregate_count(&self) -> usize {
        self.aggregates.len()
    }

    /// Number of instructions
    #[inline]
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    /// Total scratch bytes needed by one instance
    #[inline]
    pub fn dynamic_storage_size(&self) -> usize {
        self.dynamic_storage_size
    }

    /// Aggregate calls with their scratch slots, in compile order
    pub fn aggregates(
        &self,
    ) -> impl Iterator<Item = (&Arc<dyn AggregateFunction>, ScratchSlot)> + '_ {
        self.aggregates
            .iter()
            .filter_map(|&id| match &self.instructions[id].kind {
                InstructionKind::CallAggregate { function, slot } => Some((function, *slot)),
                _ => None,
            })
    }

    /// Render the instruction tree, one node per line
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        self.disassemble_node(self.root, 0, &mut out);
        out
    }

    fn disassemble_node(&self, id: InstrId, depth: usize, out: &mut String) {
        let instr = &self.instructions[id];
        out.push_str(&"  ".repeat(depth));
        match &instr.kind {
            InstructionKind::Literal(idx) => {
                out.push_str(&format!("Literal {}\n", self.literals[*idx]));
            }
            kind => out.push_str(&format!("{:?}\n", kind)),
        }
        for &child in &instr.children {
            self.disassemble_node(child, depth + 1, out);
        }
    }
}

/// Program builder, used by the compiler
#[derive(Default)]
pub struct ProgramBuilder {
    instructions: Vec<Instruction>,
    literals: Vec<Value>,
    aggregates: Vec<InstrId>,
    next_offset: usize,
}

impl ProgramBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a literal and return its index
    pub fn add_literal(&mut self, value: Value) -> usize {
        self.literals.push(value);
        self.literals.len() - 1
    }

    /// Reserve the next scratch slot of `size` bytes
    pub fn allocate_slot(&mut self, size: usize) -> ScratchSlot {
        let slot = ScratchSlot {
            index: self.aggregates.len(),
            offset: self.next_offset,
            size,
        };
        self.next_offset += size;
        // Placeholder until the instruction is pushed
        self.aggregates.push(InstrId::MAX);
        slot
    }

    /// Append an instruction and return its id
    pub fn push(&mut self, kind: InstructionKind, children: Children) -> InstrId {
        let id = self.instructions.len();
        if let InstructionKind::CallAggregate { slot, .. } = &kind {
            self.aggregates[slot.index] = id;
        }
        let contains_aggregate = matches!(kind, InstructionKind::CallAggregate { .. })
            || children
                .iter()
                .any(|&child| self.instructions[child].contains_aggregate);
        self.instructions.push(Instruction {
            kind,
            children,
            contains_aggregate,
        });
        id
    }

    /// Finish the program with `root` as its entry point
    pub fn build(self, root: InstrId) -> Program {
        Program {
            id: NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed),
            instructions: self.instructions,
            root,
            literals: self.literals,
            aggregates: self.aggregates,
            dynamic_storage_size: self.next_offset,
        }
    }
}
