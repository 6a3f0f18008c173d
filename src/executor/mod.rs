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

//! Expression executor
//!
//! # Architecture
//!
//! ```text
//! ExprNode tree
//!   ↓  Compiler (+ SymbolTable)
//! Program
//!   ↓  VM::alloc_instance
//! Instance per partition
//!   ↓  VM::accumulate per row
//! partial state
//!   ↓  VM::save_state / VM::load_state / VM::merge
//! combined state
//!   ↓  VM::result
//! Value
//! ```
//!
//! # Components
//!
//! - [`Compiler`] - turns resolved trees into programs
//! - [`Program`] - immutable compiled expression with its scratch layout
//! - [`VM`] - evaluates programs and drives instance state
//! - [`Instance`] - one aggregation context

pub mod expression;

pub use expression::{compile, Compiler, Instance, Program, VM};
