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

//! # sqlvm - compiled scalar and aggregate expressions
//!
//! sqlvm turns already-resolved SQL expression trees into compact programs and
//! evaluates them against rows. Aggregate calls fold rows into per-instance
//! state that can be merged across partitions and serialized, so partial
//! results computed by independent workers combine into one answer.
//!
//! ## Key Features
//!
//! - **Extensible functions** - pure and aggregate functions registered by name
//! - **Static scratch layout** - every aggregate gets a fixed, non-overlapping slot
//! - **Deterministic evaluation** - no side effects, safe for partitioned execution
//! - **Mergeable state** - binary save/load and merge for every built-in aggregate
//!
//! ## Quick Start
//!
//! ```rust
//! use sqlvm::{Compiler, ExprNode, SymbolTable, Value, VM};
//!
//! let symbols = SymbolTable::with_builtins();
//!
//! // sum(c0) / count(c0)
//! let tree = ExprNode::call(
//!     "div",
//!     vec![
//!         ExprNode::call("sum", vec![ExprNode::column("c0", 0)]),
//!         ExprNode::call("count", vec![ExprNode::column("c0", 0)]),
//!     ],
//! );
//! let program = Compiler::new(&symbols).compile(&tree).unwrap();
//!
//! let vm = VM::new();
//! let mut left = vm.alloc_instance(&program);
//! let mut right = vm.alloc_instance(&program);
//! vm.accumulate(&program, &mut left, &[Value::integer(2)]).unwrap();
//! vm.accumulate(&program, &mut right, &[Value::integer(4)]).unwrap();
//!
//! // Ship the right partition's state and merge it
//! let mut wire = Vec::new();
//! vm.save_state(&program, &right, &mut wire).unwrap();
//! let mut received = vm.alloc_instance(&program);
//! vm.load_state(&program, &mut received, &mut wire.as_slice()).unwrap();
//! vm.merge(&program, &mut left, &received).unwrap();
//!
//! assert_eq!(vm.result(&program, &left).unwrap(), Value::float(3.0));
//! ```
//!
//! ## Modules
//!
//! - [`core`] - Core types ([`DataType`], [`Value`], [`Error`], [`CompilerConfig`])
//! - [`functions`] - Function traits, built-ins and the [`SymbolTable`]
//! - [`plan`] - Resolved expression trees ([`ExprNode`])
//! - [`executor`] - [`Compiler`], [`Program`], [`VM`] and [`Instance`]

pub mod core;
pub mod executor;
pub mod functions;
pub mod plan;

// Re-export main types for convenience
pub use crate::core::{CompilerConfig, DataType, Error, Result, Value};

// Re-export function types
pub use functions::{
    AggregateFunction, AggregateState, Function, FunctionDataType, FunctionInfo,
    FunctionSignature, FunctionType, ScalarFunction, SymbolTable,
};

// Re-export built-in aggregates
pub use functions::{CountFunction, MaxFunction, MeanFunction, MinFunction, SumFunction};

// Re-export executor types
pub use executor::expression::{InstructionKind, ScratchSlot};
pub use executor::{compile, Compiler, Instance, Program, VM};

pub use plan::ExprNode;
