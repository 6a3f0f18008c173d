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

//! Resolved expression trees
//!
//! [`ExprNode`] is the input to the compiler. The planner hands over trees in
//! which every column reference already carries its final row index and
//! every call carries the name it was written with.

use std::fmt;

use crate::core::Value;

/// A node of a resolved expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    /// Column reference; `index` is its position in the input row
    ColumnReference {
        name: String,
        index: Option<usize>,
    },

    /// Constant value
    Literal(Value),

    /// Conditional: IF(condition, then_branch, else_branch)
    If {
        condition: Box<ExprNode>,
        then_branch: Box<ExprNode>,
        else_branch: Box<ExprNode>,
    },

    /// Function call, resolved against the symbol table by name
    Call { name: String, args: Vec<ExprNode> },
}

impl ExprNode {
    /// Resolved column reference
    pub fn column(name: impl Into<String>, index: usize) -> Self {
        ExprNode::ColumnReference {
            name: name.into(),
            index: Some(index),
        }
    }

    /// Column reference the planner failed to resolve
    pub fn unresolved_column(name: impl Into<String>) -> Self {
        ExprNode::ColumnReference {
            name: name.into(),
            index: None,
        }
    }

    /// Literal value
    pub fn literal(value: impl Into<Value>) -> Self {
        ExprNode::Literal(value.into())
    }

    /// NULL literal
    pub fn null() -> Self {
        ExprNode::Literal(Value::Null)
    }

    /// Conditional expression
    pub fn if_then_else(condition: ExprNode, then_branch: ExprNode, else_branch: ExprNode) -> Self {
        ExprNode::If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }

    /// Function call
    pub fn call(name: impl Into<String>, args: Vec<ExprNode>) -> Self {
        ExprNode::Call {
            name: name.into(),
            args,
        }
    }

    /// Direct children in evaluation order
    pub fn children(&self) -> Vec<&ExprNode> {
        match self {
            ExprNode::ColumnReference { .. } | ExprNode::Literal(_) => Vec::new(),
            ExprNode::If {
                condition,
                then_branch,
                else_branch,
            } => vec![&**condition, &**then_branch, &**else_branch],
            ExprNode::Call { args, .. } => args.iter().collect(),
        }
    }
}

impl fmt::Display for ExprNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprNode::ColumnReference { name, index } => match index {
                Some(i) => write!(f, "{}#{}", name, i),
                None => write!(f, "{}#?", name),
            },
            ExprNode::Literal(Value::Text(s)) => write!(f, "'{}'", s),
            ExprNode::Literal(v) => write!(f, "{}", v),
            ExprNode::If {
                condition,
                then_branch,
                else_branch,
            } => write!(f, "if({}, {}, {})", condition, then_branch, else_branch),
            ExprNode::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
