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

// Expression Virtual Machine
//
// The VM executes compiled Programs against rows and drives the aggregate
// state held by Instances.
// Design goals:
// - No heap allocation for call arguments in the common case
// - IF evaluates exactly one branch
// - Every failure is returned, never retried or swallowed

use std::io::{Read, Write};

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::instance::{Instance, Storage};
use super::instruction::{InstrId, InstructionKind};
use super::program::Program;
use crate::core::{Error, Result, Value};
use crate::functions::AggregateState;

/// Argument buffer inline capacity
/// Most calls take one to three arguments, so 8 covers the common case.
const ARGS_INLINE_CAPACITY: usize = 8;

type ArgStack = SmallVec<[Value; ARGS_INLINE_CAPACITY]>;

/// Expression virtual machine
///
/// Stateless; a single VM can drive any number of programs and instances,
/// from any number of threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct VM;

impl VM {
    /// Create a new VM
    pub fn new() -> Self {
        VM
    }

    // =========================================================================
    // Instance lifecycle
    // =========================================================================

    /// Allocate a fresh instance for `program`
    pub fn alloc_instance(&self, program: &Program) -> Instance {
        let instance = if program.has_aggregate() {
            let states = program.aggregates().map(|(f, _)| f.init()).collect();
            Instance::new(
                program.id(),
                program.dynamic_storage_size(),
                Storage::Aggregate(states),
            )
        } else {
            Instance::new(
                program.id(),
                std::mem::size_of::<Value>(),
                Storage::Scalar(Value::Null),
            )
        };
        trace!(
            program_id = program.id(),
            storage_size = instance.storage_size(),
            "allocated instance"
        );
        instance
    }

    /// Return every aggregate of the instance to its initial state
    pub fn reset_instance(&self, program: &Program, instance: &mut Instance) -> Result<()> {
        check_instance(program, instance)?;
        match &mut instance.storage {
            Storage::Scalar(value) => *value = Value::Null,
            Storage::Aggregate(states) => states.iter_mut().for_each(|s| s.reset()),
        }
        trace!(program_id = program.id(), "reset instance");
        Ok(())
    }

    /// Release the instance and every resource its aggregates hold
    pub fn free_instance(&self, program: &Program, mut instance: Instance) -> Result<()> {
        check_instance(program, &instance)?;
        if let Storage::Aggregate(states) = &mut instance.storage {
            states.iter_mut().for_each(|s| s.free());
        }
        trace!(program_id = program.id(), "freed instance");
        Ok(())
    }

    // =========================================================================
    // Row processing
    // =========================================================================

    /// Fold one row into the instance
    ///
    /// For programs without aggregates this evaluates the row and stores the
    /// result in the instance.
    pub fn accumulate(
        &self,
        program: &Program,
        instance: &mut Instance,
        row: &[Value],
    ) -> Result<()> {
        check_instance(program, instance)?;
        match &mut instance.storage {
            Storage::Scalar(value) => {
                *value = self.eval(program, None, row, program.root())?;
                Ok(())
            }
            Storage::Aggregate(states) => {
                self.accumulate_node(program, states, row, program.root())
            }
        }
    }

    /// Fold a batch of rows into the instance
    pub fn accumulate_batch<R: AsRef<[Value]>>(
        &self,
        program: &Program,
        instance: &mut Instance,
        rows: &[R],
    ) -> Result<()> {
        for row in rows {
            self.accumulate(program, instance, row.as_ref())?;
        }
        Ok(())
    }

    /// Evaluate the program against one row
    ///
    /// Aggregate calls read their current value from `instance` and fail
    /// with a state error when no instance is given.
    pub fn evaluate(
        &self,
        program: &Program,
        instance: Option<&Instance>,
        row: &[Value],
    ) -> Result<Value> {
        if let Some(instance) = instance {
            check_instance(program, instance)?;
        }
        self.eval(program, instance, row, program.root())
    }

    /// Evaluate the program against each row of a batch
    pub fn evaluate_batch<R: AsRef<[Value]>>(
        &self,
        program: &Program,
        rows: &[R],
    ) -> Result<Vec<Value>> {
        rows.iter()
            .map(|row| self.eval(program, None, row.as_ref(), program.root()))
            .collect()
    }

    /// Evaluate the program as a filter over a batch
    ///
    /// Returns the selection (true where the result is truthy) and the number
    /// of selected rows.
    pub fn evaluate_predicate_batch<R: AsRef<[Value]>>(
        &self,
        program: &Program,
        rows: &[R],
    ) -> Result<(Vec<bool>, usize)> {
        let mut selection = Vec::with_capacity(rows.len());
        let mut selected = 0;
        for row in rows {
            let keep = self
                .eval(program, None, row.as_ref(), program.root())?
                .is_truthy();
            selected += keep as usize;
            selection.push(keep);
        }
        Ok((selection, selected))
    }

    /// Final value of the instance
    ///
    /// Aggregate programs evaluate the root with no input row, so column
    /// references outside aggregate calls fail with an index error.
    pub fn result(&self, program: &Program, instance: &Instance) -> Result<Value> {
        check_instance(program, instance)?;
        match &instance.storage {
            Storage::Scalar(value) => Ok(value.clone()),
            Storage::Aggregate(_) => self.eval(program, Some(instance), &[], program.root()),
        }
    }

    /// Current value of every aggregate slot, in compile order
    pub fn aggregate_values(&self, program: &Program, instance: &Instance) -> Result<Vec<Value>> {
        check_instance(program, instance)?;
        match &instance.storage {
            Storage::Aggregate(states) => Ok(states.iter().map(|s| s.get()).collect()),
            Storage::Scalar(_) => Ok(Vec::new()),
        }
    }

    // =========================================================================
    // Partial results
    // =========================================================================

    /// Merge `src` into `dst`; both must belong to `program`
    pub fn merge(&self, program: &Program, dst: &mut Instance, src: &Instance) -> Result<()> {
        check_instance(program, dst)?;
        check_instance(program, src)?;

        match (&mut dst.storage, &src.storage) {
            (Storage::Scalar(d), Storage::Scalar(s)) => *d = s.clone(),
            (Storage::Aggregate(d), Storage::Aggregate(s)) => {
                if d.len() != s.len() {
                    return Err(Error::state(format!(
                        "cannot merge instances with {} and {} aggregates",
                        d.len(),
                        s.len()
                    )));
                }
                for (dst_state, src_state) in d.iter_mut().zip(s.iter()) {
                    dst_state.merge(&**src_state)?;
                }
            }
            _ => return Err(Error::state("cannot merge scalar and aggregate instances")),
        }
        debug!(program_id = program.id(), "merged instance");
        Ok(())
    }

    /// Serialize the instance state, returning the number of bytes written
    pub fn save_state(
        &self,
        program: &Program,
        instance: &Instance,
        sink: &mut dyn Write,
    ) -> Result<usize> {
        check_instance(program, instance)?;
        let written = match &instance.storage {
            Storage::Scalar(value) => value.encode(sink)?,
            Storage::Aggregate(states) => {
                let mut written = 0;
                for state in states {
                    written += state.save_state(sink)?;
                }
                written
            }
        };
        debug!(program_id = program.id(), bytes = written, "saved instance state");
        Ok(written)
    }

    /// Replace the instance state with one written by [`save_state`](Self::save_state)
    ///
    /// On failure the instance keeps its previous state.
    pub fn load_state(
        &self,
        program: &Program,
        instance: &mut Instance,
        source: &mut dyn Read,
    ) -> Result<()> {
        check_instance(program, instance)?;
        match &mut instance.storage {
            Storage::Scalar(value) => *value = Value::decode(source)?,
            Storage::Aggregate(states) => {
                let mut loaded: Vec<Box<dyn AggregateState>> =
                    program.aggregates().map(|(f, _)| f.init()).collect();
                for state in loaded.iter_mut() {
                    state.load_state(source)?;
                }
                *states = loaded;
            }
        }
        debug!(program_id = program.id(), "loaded instance state");
        Ok(())
    }

    // =========================================================================
    // Tree walks
    // =========================================================================

    fn eval(
        &self,
        program: &Program,
        instance: Option<&Instance>,
        row: &[Value],
        id: InstrId,
    ) -> Result<Value> {
        let instr = program.instruction(id);
        match &instr.kind {
            InstructionKind::Literal(idx) => Ok(program.literal(*idx).clone()),

            InstructionKind::Input(index) => row
                .get(*index)
                .cloned()
                .ok_or_else(|| Error::index(*index, row.len())),

            InstructionKind::If => {
                let condition = self.eval(program, instance, row, instr.children[0])?;
                let branch = if condition.is_truthy() {
                    instr.children[1]
                } else {
                    instr.children[2]
                };
                self.eval(program, instance, row, branch)
            }

            InstructionKind::CallPure(function) => {
                let mut args = ArgStack::new();
                for &child in &instr.children {
                    args.push(self.eval(program, instance, row, child)?);
                }
                function.evaluate(&args)
            }

            InstructionKind::CallAggregate { function, slot } => {
                let instance = instance.ok_or_else(|| {
                    Error::state(format!(
                        "aggregate {}() evaluated without an instance",
                        function.name()
                    ))
                })?;
                Ok(instance.state(*slot)?.get())
            }
        }
    }

    fn accumulate_node(
        &self,
        program: &Program,
        states: &mut [Box<dyn AggregateState>],
        row: &[Value],
        id: InstrId,
    ) -> Result<()> {
        let instr = program.instruction(id);
        if !instr.contains_aggregate {
            return Ok(());
        }

        match &instr.kind {
            InstructionKind::CallAggregate { slot, .. } => {
                let mut args = ArgStack::new();
                for &child in &instr.children {
                    args.push(self.eval(program, None, row, child)?);
                }
                let len = states.len();
                states
                    .get_mut(slot.index)
                    .ok_or_else(|| Error::index(slot.index, len))?
                    .accumulate(&args)
            }

            // Conditional aggregation: only the taken branch sees the row
            InstructionKind::If
                if !program.instruction(instr.children[0]).contains_aggregate =>
            {
                let condition = self.eval(program, None, row, instr.children[0])?;
                let branch = if condition.is_truthy() {
                    instr.children[1]
                } else {
                    instr.children[2]
                };
                self.accumulate_node(program, states, row, branch)
            }

            // The branch depends on aggregate state, so it is only known at
            // result time
            _ => {
                for &child in &instr.children {
                    self.accumulate_node(program, states, row, child)?;
                }
                Ok(())
            }
        }
    }
}

/// Reject instances allocated for a different program
fn check_instance(program: &Program, instance: &Instance) -> Result<()> {
    if instance.program_id() != program.id() {
        return Err(Error::state(format!(
            "instance belongs to program {}, not program {}",
            instance.program_id(),
            program.id()
        )));
    }
    Ok(())
}
