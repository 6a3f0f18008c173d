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

//! Error types for the expression engine
//!
//! Every failure in compilation, evaluation, merging or state serialization
//! is reported through [`Error`]. Nothing in this crate retries or swallows
//! an error; the caller decides whether it aborts a row or a whole query.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the expression engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Compile-time errors
    // =========================================================================
    /// Function name is not registered in the symbol table
    #[error("symbol not found: '{0}'")]
    Symbol(String),

    /// Function called with the wrong number of arguments
    #[error("wrong number of arguments for {function}(). expected: {expected}, got: {got}")]
    Arity {
        function: String,
        expected: String,
        got: usize,
    },

    // =========================================================================
    // Evaluation errors
    // =========================================================================
    /// Column index or scratch slot outside the valid range
    #[error("index {index} out of bounds (len {len})")]
    Index { index: usize, len: usize },

    /// Operation requires aggregate state that is missing or incompatible
    #[error("invalid state: {0}")]
    State(String),

    /// Value could not be coerced to the required type
    #[error("type error: {0}")]
    Type(String),

    /// Integer division or modulo by zero
    #[error("division by zero")]
    DivisionByZero,

    /// Invalid argument for an API call or function
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // =========================================================================
    // State serialization errors
    // =========================================================================
    /// Sink or source failure while saving/loading state
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error for malformed input trees and corrupt state
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Create a new Symbol error
    pub fn symbol(name: impl Into<String>) -> Self {
        Error::Symbol(name.into())
    }

    /// Create a new Arity error with an exact expected count
    pub fn arity(function: impl Into<String>, expected: usize, got: usize) -> Self {
        Error::Arity {
            function: function.into(),
            expected: expected.to_string(),
            got,
        }
    }

    /// Create a new Arity error for a range of accepted counts
    pub fn arity_range(function: impl Into<String>, min: usize, max: usize, got: usize) -> Self {
        let expected = if max == usize::MAX {
            format!("at least {}", min)
        } else if min == max {
            min.to_string()
        } else {
            format!("{} to {}", min, max)
        };
        Error::Arity {
            function: function.into(),
            expected,
            got,
        }
    }

    /// Create a new Index error
    pub fn index(index: usize, len: usize) -> Self {
        Error::Index { index, len }
    }

    /// Create a new State error
    pub fn state(message: impl Into<String>) -> Self {
        Error::State(message.into())
    }

    /// Create a new Type error
    pub fn type_error(message: impl Into<String>) -> Self {
        Error::Type(message.into())
    }

    /// Create a new InvalidArgument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    /// Create a new IO error
    pub fn io(message: impl Into<String>) -> Self {
        Error::Io {
            message: message.into(),
        }
    }

    /// Create a new Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Returns true for errors raised while compiling a tree
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Error::Symbol(_) | Error::Arity { .. } | Error::Internal { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::symbol("frobnicate").to_string(),
            "symbol not found: 'frobnicate'"
        );
        assert_eq!(
            Error::arity("sum", 1, 2).to_string(),
            "wrong number of arguments for sum(). expected: 1, got: 2"
        );
        assert_eq!(
            Error::index(5, 2).to_string(),
            "index 5 out of bounds (len 2)"
        );
        assert_eq!(Error::DivisionByZero.to_string(), "division by zero");
    }

    #[test]
    fn test_arity_range_wording() {
        let err = Error::arity_range("round", 1, 2, 3);
        assert_eq!(
            err.to_string(),
            "wrong number of arguments for round(). expected: 1 to 2, got: 3"
        );

        let err = Error::arity_range("concat", 1, usize::MAX, 0);
        assert_eq!(
            err.to_string(),
            "wrong number of arguments for concat(). expected: at least 1, got: 0"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_is_compile_error() {
        assert!(Error::symbol("x").is_compile_error());
        assert!(Error::internal("bad tree").is_compile_error());
        assert!(!Error::index(1, 0).is_compile_error());
        assert!(!Error::state("no instance").is_compile_error());
    }
}
