// Copyright 2026 Rowlift Contributors
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

//! Native expression composition
//!
//! [`ColExpr`] is the engine's expression language as the code generator
//! targets it: a call sequence rooted at one named column. `Display`
//! renders the expression text with explicit parenthesization sufficient
//! to preserve the original grouping regardless of any reader's
//! precedence rules.
//!
//! Boolean combinations use the elementwise combinators `&`, `|` and
//! `~`, never a short-circuit form: vectorized columns are fully
//! materialized.

use std::fmt;

use crate::core::Value;
use crate::expr::{BinaryOperator, CompareOperator};

/// Elementwise boolean combinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineOp {
    And, // &
    Or,  // |
}

impl CombineOp {
    /// Combinator symbol in the expression text
    pub fn symbol(&self) -> &'static str {
        match self {
            CombineOp::And => "&",
            CombineOp::Or => "|",
        }
    }
}

/// A composed native expression over one named column
#[derive(Debug, Clone, PartialEq)]
pub enum ColExpr {
    /// Reference to a named column
    Col(String),
    /// Literal, broadcast over the column length
    Lit(Value),
    /// Arithmetic negation
    Neg(Box<ColExpr>),
    /// Elementwise boolean negation
    Not(Box<ColExpr>),
    /// Binary operation
    Binary {
        op: BinaryOperator,
        left: Box<ColExpr>,
        right: Box<ColExpr>,
    },
    /// Elementwise comparison
    Compare {
        op: CompareOperator,
        left: Box<ColExpr>,
        right: Box<ColExpr>,
    },
    /// Elementwise boolean combination
    Combine {
        op: CombineOp,
        operands: Vec<ColExpr>,
    },
    /// Native operator applied method-style to a receiver
    Func {
        name: String,
        receiver: Box<ColExpr>,
        args: Vec<ColExpr>,
    },
}

impl ColExpr {
    /// Reference a column
    pub fn col(name: impl Into<String>) -> Self {
        ColExpr::Col(name.into())
    }

    /// Literal expression
    pub fn lit(value: Value) -> Self {
        ColExpr::Lit(value)
    }

    /// Apply a native operator method-style
    pub fn func(name: impl Into<String>, receiver: ColExpr, args: Vec<ColExpr>) -> Self {
        ColExpr::Func {
            name: name.into(),
            receiver: Box::new(receiver),
            args,
        }
    }

    /// True for expressions that render without needing parentheses
    fn is_atom(&self) -> bool {
        matches!(
            self,
            ColExpr::Col(_) | ColExpr::Lit(_) | ColExpr::Func { .. }
        )
    }
}

/// Writes `child`, parenthesized unless it is atomic
fn fmt_child(child: &ColExpr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if child.is_atom() {
        write!(f, "{}", child)
    } else {
        write!(f, "({})", child)
    }
}

impl fmt::Display for ColExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColExpr::Col(name) => write!(f, "col(\"{}\")", name),
            ColExpr::Lit(value) => write!(f, "{}", value),
            ColExpr::Neg(child) => {
                write!(f, "-")?;
                fmt_child(child, f)
            }
            ColExpr::Not(child) => write!(f, "~({})", child),
            ColExpr::Binary { op, left, right } => {
                fmt_child(left, f)?;
                write!(f, " {} ", op.symbol())?;
                fmt_child(right, f)
            }
            ColExpr::Compare { op, left, right } => {
                fmt_child(left, f)?;
                write!(f, " {} ", op.symbol())?;
                fmt_child(right, f)
            }
            ColExpr::Combine { op, operands } => {
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", op.symbol())?;
                    }
                    write!(f, "({})", operand)?;
                }
                Ok(())
            }
            ColExpr::Func {
                name,
                receiver,
                args,
            } => {
                fmt_child(receiver, f)?;
                write!(f, ".{}(", name)?;
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
