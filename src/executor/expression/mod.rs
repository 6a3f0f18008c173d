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

// Compiled Expression VM
//
// Resolved expression trees are compiled once into a Program, then evaluated
// row by row. Aggregate calls fold rows into per-instance state that can be
// merged across partitions and serialized between processes.
//
// Architecture:
//
//   ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//   │  ExprNode   │ ──► │   Compiler   │ ──► │   Program   │
//   │   (tree)    │     │              │     │   (arena)   │
//   └─────────────┘     └──────────────┘     └─────────────┘
//                                                   │
//                                                   ▼
//   ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//   │   Result    │ ◄── │      VM      │ ◄── │  Row Data   │
//   │   (Value)   │     │  + Instance  │     │             │
//   └─────────────┘     └──────────────┘     └─────────────┘

mod compiler;
mod instance;
mod instruction;
mod program;
mod vm;

pub use compiler::{compile, Compiler};
pub use instance::Instance;
pub use instruction::{Children, InstrId, Instruction, InstructionKind, ScratchSlot};
pub use program::{Program, ProgramBuilder};
pub use vm::VM;

#[cfg(test)]
mod tests;
