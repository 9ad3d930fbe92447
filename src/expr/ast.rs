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

//! Expression model - the reconstructed semantic tree
//!
//! An [`Expr`] tree is the central entity of an analysis: the simulator
//! builds exactly one tree per callback, and the feasibility gate and the
//! code generator both traverse it read-only. Nodes are immutable once
//! built and owned exclusively by their tree.

use crate::core::Value;

/// Binary operator (pre-computed at trace decode time for enum dispatch,
/// never matched as strings)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,      // +
    Sub,      // -
    Mul,      // *
    TrueDiv,  // /
    FloorDiv, // //
    Mod,      // %
    Pow,      // **
    BitAnd,   // &
    BitOr,    // |
}

impl BinaryOperator {
    /// Operator symbol in the engine's expression language
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::TrueDiv => "/",
            BinaryOperator::FloorDiv => "//",
            BinaryOperator::Mod => "%",
            BinaryOperator::Pow => "**",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitOr => "|",
        }
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOperator {
    Eq,    // ==
    Ne,    // !=
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=
    Is,    // identity with null
    IsNot, // negated identity with null
    In,    // membership
    NotIn, // negated membership
}

impl CompareOperator {
    /// Operator symbol in the engine's expression language, for the
    /// operators that render as infix operators
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOperator::Eq => "==",
            CompareOperator::Ne => "!=",
            CompareOperator::Lt => "<",
            CompareOperator::Le => "<=",
            CompareOperator::Gt => ">",
            CompareOperator::Ge => ">=",
            CompareOperator::Is => "is",
            CompareOperator::IsNot => "is not",
            CompareOperator::In => "in",
            CompareOperator::NotIn => "not in",
        }
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// Arithmetic negation
    Neg,
    /// Arithmetic identity
    Pos,
    /// Truthiness negation. The simulator normalizes this into
    /// [`Expr::Logical`] with [`LogicalKind::Not`]; it never survives
    /// into a finished tree.
    Not,
}

/// Boolean combination kind
///
/// Carries the short-circuit truthiness semantics of the source
/// evaluation model, not bitwise semantics. The code generator lowers
/// these to the engine's elementwise combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalKind {
    And,
    Or,
    Not,
}

/// One node of the reconstructed semantic tree
///
/// Trees are single-rooted, acyclic, and unshared. Every `Operand` leaf
/// refers to the callback's sole input; every `Constant` leaf is fully
/// known at analysis time.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// The callback's sole input (the column element)
    Operand,
    /// A literal known at analysis time
    Constant(Value),
    /// Unary operation
    Unary {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    /// Binary operation
    Binary {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Comparison
    Compare {
        op: CompareOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Boolean combination with truthiness semantics. `And`/`Or` hold two
    /// or more operands (flat, left-to-right); `Not` holds exactly one.
    Logical {
        kind: LogicalKind,
        operands: Vec<Expr>,
    },
    /// Named attribute access rooted at `base`
    Attribute { base: Box<Expr>, name: String },
    /// Method call rooted at `base`
    MethodCall {
        base: Box<Expr>,
        name: String,
        args: Vec<Expr>,
    },
    /// Free function call
    Call { name: String, args: Vec<Expr> },
}

impl Expr {
    /// Build a constant node
    pub fn constant(value: Value) -> Self {
        Expr::Constant(value)
    }

    /// Build a binary node
    pub fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Build a comparison node
    pub fn compare(op: CompareOperator, left: Expr, right: Expr) -> Self {
        Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Build a truthiness negation
    pub fn logical_not(operand: Expr) -> Self {
        Expr::Logical {
            kind: LogicalKind::Not,
            operands: vec![operand],
        }
    }

    /// Number of `Operand` leaves anywhere in the tree. A tree with zero
    /// operand leaves is a constants-only callback and never produces a
    /// rewrite suggestion.
    pub fn operand_count(&self) -> usize {
        match self {
            Expr::Operand => 1,
            Expr::Constant(_) => 0,
            Expr::Unary { operand, .. } => operand.operand_count(),
            Expr::Binary { left, right, .. } | Expr::Compare { left, right, .. } => {
                left.operand_count() + right.operand_count()
            }
            Expr::Logical { operands, .. } => operands.iter().map(Expr::operand_count).sum(),
            Expr::Attribute { base, .. } => base.operand_count(),
            Expr::MethodCall { base, args, .. } => {
                base.operand_count() + args.iter().map(Expr::operand_count).sum::<usize>()
            }
            Expr::Call { args, .. } => args.iter().map(Expr::operand_count).sum(),
        }
    }
}
