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

// Expression Compiler
//
// Transforms resolved expression trees into Programs.
//
// Design principles:
// 1. Resolve everything at compile time (function references, scratch layout)
// 2. Reject malformed trees here so evaluation never sees them
// 3. Aggregate slots are numbered in source order

use tracing::debug;

use super::instruction::{Children, InstrId, InstructionKind};
use super::program::{Program, ProgramBuilder};
use crate::core::{CompilerConfig, Error, Result};
use crate::functions::{Function, SymbolTable};
use crate::plan::ExprNode;

/// Compile a tree with default limits
pub fn compile(tree: &ExprNode, symbols: &SymbolTable) -> Result<Program> {
    Compiler::new(symbols).compile(tree)
}

/// Expression compiler
///
/// Holds a read-only reference to the symbol table; any number of compilers
/// can share one table.
pub struct Compiler<'a> {
    symbols: &'a SymbolTable,
    config: CompilerConfig,
}

impl<'a> Compiler<'a> {
    /// Create a compiler with default limits
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self::with_config(symbols, CompilerConfig::default())
    }

    /// Create a compiler with custom limits
    pub fn with_config(symbols: &'a SymbolTable, config: CompilerConfig) -> Self {
        Self { symbols, config }
    }

    /// The limits in effect
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile one expression tree
    pub fn compile(&self, tree: &ExprNode) -> Result<Program> {
        let mut builder = ProgramBuilder::new();
        let root = self.compile_node(tree, &mut builder, 0, false)?;
        let program = builder.build(root);

        debug!(
            program_id = program.id(),
            instructions = program.instruction_count(),
            aggregates = program.aggregate_count(),
            scratch_size = program.dynamic_storage_size(),
            "compiled expression"
        );
        Ok(program)
    }

    /// Compile a select list, one program per expression
    pub fn compile_many(&self, trees: &[ExprNode]) -> Result<Vec<Program>> {
        trees.iter().map(|tree| self.compile(tree)).collect()
    }

    fn compile_node(
        &self,
        node: &ExprNode,
        builder: &mut ProgramBuilder,
        depth: usize,
        in_aggregate: bool,
    ) -> Result<InstrId> {
        if depth > self.config.max_depth {
            return Err(Error::internal(format!(
                "expression nesting exceeds maximum depth of {}",
                self.config.max_depth
            )));
        }

        match node {
            ExprNode::ColumnReference { name, index } => match index {
                Some(index) => Ok(builder.push(InstructionKind::Input(*index), Children::new())),
                None => Err(Error::internal(format!(
                    "unresolved column reference '{}'",
                    name
                ))),
            },

            ExprNode::Literal(value) => {
                let idx = builder.add_literal(value.clone());
                Ok(builder.push(InstructionKind::Literal(idx), Children::new()))
            }

            ExprNode::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut children = Children::new();
                for child in [condition, then_branch, else_branch] {
                    children.push(self.compile_node(child, builder, depth + 1, in_aggregate)?);
                }
                Ok(builder.push(InstructionKind::If, children))
            }

            ExprNode::Call { name, args } => {
                self.compile_call(name, args, builder, depth, in_aggregate)
            }
        }
    }

    fn compile_call(
        &self,
        name: &str,
        args: &[ExprNode],
        builder: &mut ProgramBuilder,
        depth: usize,
        in_aggregate: bool,
    ) -> Result<InstrId> {
        if name.is_empty() {
            return Err(Error::internal("function call without a name"));
        }
        let function = self.symbols.lookup(name)?;
        if args.len() > self.config.max_call_args {
            return Err(Error::Arity {
                function: name.to_string(),
                expected: format!("at most {}", self.config.max_call_args),
                got: args.len(),
            });
        }
        function
            .info()
            .signature()
            .validate_arg_count(name, args.len())?;

        match function {
            Function::Pure(f) => {
                let mut children = Children::new();
                for arg in args {
                    children.push(self.compile_node(arg, builder, depth + 1, in_aggregate)?);
                }
                Ok(builder.push(InstructionKind::CallPure(f.clone()), children))
            }
            Function::Aggregate(f) => {
                if in_aggregate {
                    return Err(Error::internal(format!(
                        "nested aggregate call to '{}'",
                        name
                    )));
                }
                let slot = builder.allocate_slot(f.scratch_size());
                let mut children = Children::new();
                for arg in args {
                    children.push(self.compile_node(arg, builder, depth + 1, true)?);
                }
                Ok(builder.push(
                    InstructionKind::CallAggregate {
                        function: f.clone(),
                        slot,
                    },
                    children,
                ))
            }
        }
    }
}
