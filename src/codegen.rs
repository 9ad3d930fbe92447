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

//! Code generation - lowering a reconstructed tree to a native expression
//!
//! Rewrites the single operand to a reference to the target column and
//! maps every node to its native counterpart. Short-circuit boolean
//! combinations become the elementwise combinators `&`, `|` and `~`;
//! null-identity comparisons and membership tests become the `is_null`,
//! `is_not_null` and `is_in` operators.
//!
//! Lowering is total: it never fails and never panics. Trees the
//! feasibility gate would refuse still lower to something printable,
//! which keeps this stage decoupled from the gate's verdict.

use crate::core::Value;
use crate::engine::{ColExpr, CombineOp};
use crate::expr::{CompareOperator, Expr, LogicalKind, UnaryOperator};
use crate::registry::global_registry;

/// Lower a reconstructed tree to a native expression over `column`
pub fn lower(tree: &Expr, column: &str) -> ColExpr {
    match tree {
        Expr::Operand => ColExpr::col(column),
        Expr::Constant(value) => ColExpr::lit(value.clone()),
        Expr::Unary { op, operand } => {
            let child = lower(operand, column);
            match op {
                UnaryOperator::Neg => ColExpr::Neg(Box::new(child)),
                UnaryOperator::Pos => child,
                UnaryOperator::Not => ColExpr::Not(Box::new(child)),
            }
        }
        Expr::Binary { op, left, right } => ColExpr::Binary {
            op: *op,
            left: Box::new(lower(left, column)),
            right: Box::new(lower(right, column)),
        },
        Expr::Compare { op, left, right } => lower_compare(*op, left, right, column),
        Expr::Logical { kind, operands } => match kind {
            LogicalKind::Not => match operands.first() {
                Some(operand) => ColExpr::Not(Box::new(lower(operand, column))),
                None => ColExpr::lit(Value::Null),
            },
            LogicalKind::And | LogicalKind::Or => {
                let op = if *kind == LogicalKind::And {
                    CombineOp::And
                } else {
                    CombineOp::Or
                };
                ColExpr::Combine {
                    op,
                    operands: operands.iter().map(|o| lower(o, column)).collect(),
                }
            }
        },
        Expr::Attribute { base, name } => {
            ColExpr::func(name.clone(), lower(base, column), Vec::new())
        }
        Expr::MethodCall { base, name, args } => {
            let native = global_registry()
                .lookup_method(name)
                .map(|entry| entry.native_name)
                .unwrap_or(name.as_str());
            ColExpr::func(
                native,
                lower(base, column),
                args.iter().map(|a| lower(a, column)).collect(),
            )
        }
        Expr::Call { name, args } => {
            let native = global_registry()
                .lookup_function(name)
                .map(|entry| entry.native_name)
                .unwrap_or_else(|| name.rsplit('.').next().unwrap_or(name));
            // a free function's first argument becomes the receiver
            let mut lowered = args.iter().map(|a| lower(a, column));
            let receiver = lowered.next().unwrap_or_else(|| ColExpr::col(column));
            ColExpr::func(native, receiver, lowered.collect())
        }
    }
}

fn lower_compare(op: CompareOperator, left: &Expr, right: &Expr, column: &str) -> ColExpr {
    match op {
        CompareOperator::Is => {
            ColExpr::func("is_null", lower(left, column), Vec::new())
        }
        CompareOperator::IsNot => {
            ColExpr::func("is_not_null", lower(left, column), Vec::new())
        }
        CompareOperator::In => ColExpr::func(
            "is_in",
            lower(left, column),
            vec![lower(right, column)],
        ),
        CompareOperator::NotIn => ColExpr::Not(Box::new(ColExpr::func(
            "is_in",
            lower(left, column),
            vec![lower(right, column)],
        ))),
        _ => ColExpr::Compare {
            op,
            left: Box::new(lower(left, column)),
            right: Box::new(lower(right, column)),
        },
    }
}

/// Render the native expression text for a reconstructed tree
pub fn expression_text(tree: &Expr, column: &str) -> String {
    lower(tree, column).to_string()
}
