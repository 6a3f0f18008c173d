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

//! Compiler configuration

/// Default maximum nesting depth of an expression tree
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default maximum number of arguments to a single call
pub const DEFAULT_MAX_CALL_ARGS: usize = 64;

/// Limits applied while compiling expression trees
///
/// Both limits bound resources the VM uses at evaluation time: `max_depth`
/// bounds recursion, `max_call_args` bounds the argument buffer of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Maximum nesting depth; deeper trees are rejected
    pub max_depth: usize,

    /// Maximum number of arguments to one function call
    pub max_call_args: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_call_args: DEFAULT_MAX_CALL_ARGS,
        }
    }
}

impl CompilerConfig {
    /// Creates a configuration with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the maximum nesting depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Builder method to set the maximum argument count per call
    pub fn with_max_call_args(mut self, max_call_args: usize) -> Self {
        self.max_call_args = max_call_args;
        self
    }
}
