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

//! Core types and definitions
//!
//! This module contains the fundamental types used throughout the engine:
//!
//! - [`DataType`] - Type tags (INTEGER, FLOAT, STRING, etc.)
//! - [`Value`] - Runtime values with type information
//! - [`Error`] - Error types for compilation, evaluation and state I/O
//! - [`CompilerConfig`] - Compilation limits
//! - [`codec`] - Varint and double wire encoding for aggregate state

pub mod codec;
pub mod config;
pub mod error;
pub mod types;
pub mod value;

// Re-export main types for convenience
pub use config::CompilerConfig;
pub use error::{Error, Result};
pub use types::DataType;
pub use value::Value;
