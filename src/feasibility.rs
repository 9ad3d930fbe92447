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

//! Feasibility gate
//!
//! A pure decision function over a completed expression tree plus the
//! callback's shape: the same tree and metadata always yield the same
//! verdict. Acceptance means the code generator can lower every node;
//! refusal carries the specific reason the suggestion is withheld.

use crate::core::{Error, Result, Value};
use crate::expr::{CompareOperator, Expr};
use crate::registry::global_registry;
use crate::trace::SymbolTable;

/// Decide whether a reconstructed tree can be lowered to a native
/// expression
pub fn check(tree: &Expr, symbols: &SymbolTable) -> Result<()> {
    if symbols.arity() != 1 {
        return Err(Error::MultiArgument(symbols.arity()));
    }
    // a bare operand is the identity callback: valid, but there is no
    // operation to vectorize
    if matches!(tree, Expr::Operand) {
        return Err(Error::unsupported("identity callback"));
    }
    if tree.operand_count() == 0 {
        return Err(Error::ConstantsOnly);
    }
    walk(tree)
}

/// Convenience verdict form of [`check`]
pub fn is_rewritable(tree: &Expr, symbols: &SymbolTable) -> bool {
    check(tree, symbols).is_ok()
}

fn walk(node: &Expr) -> Result<()> {
    match node {
        Expr::Operand | Expr::Constant(_) => Ok(()),
        Expr::Unary { operand, .. } => walk(operand),
        Expr::Binary { left, right, .. } => {
            walk(left)?;
            walk(right)
        }
        Expr::Compare { op, left, right } => {
            match op {
                // identity comparison is only meaningful against null
                CompareOperator::Is | CompareOperator::IsNot => {
                    if !matches!(**right, Expr::Constant(Value::Null)) {
                        return Err(Error::unsupported(
                            "identity comparison with a non-null value",
                        ));
                    }
                }
                // membership requires a fully-known sequence
                CompareOperator::In | CompareOperator::NotIn => {
                    if !matches!(**right, Expr::Constant(Value::List(_))) {
                        return Err(Error::unsupported(
                            "membership test against a non-literal sequence",
                        ));
                    }
                }
                _ => {}
            }
            walk(left)?;
            walk(right)
        }
        Expr::Logical { operands, .. } => {
            for operand in operands {
                walk(operand)?;
            }
            Ok(())
        }
        // a bare attribute access has no call to resolve
        Expr::Attribute { name, .. } => Err(Error::unknown_callee(name.clone())),
        Expr::MethodCall { base, name, args } => {
            let entry = global_registry()
                .lookup_method(name)
                .ok_or_else(|| Error::unknown_callee(name.clone()))?;
            // only calls on the input itself are rewritten; a same-named
            // method on an unrelated object must not match
            if !matches!(**base, Expr::Operand) {
                return Err(Error::unknown_callee(name.clone()));
            }
            if args.len() != entry.arg_count {
                return Err(Error::unknown_callee(name.clone()));
            }
            for arg in args {
                walk(arg)?;
            }
            Ok(())
        }
        Expr::Call { name, args } => {
            let entry = global_registry()
                .lookup_function(name)
                .ok_or_else(|| Error::unknown_callee(name.clone()))?;
            if args.len() != entry.arg_count {
                return Err(Error::unknown_callee(name.clone()));
            }
            for arg in args {
                walk(arg)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::expr::BinaryOperator;

    fn one_param() -> SymbolTable {
        SymbolTable::new(vec!["x".into()], Vec::new())
    }

    fn x_plus_one() -> Expr {
        Expr::binary(
            BinaryOperator::Add,
            Expr::Operand,
            Expr::Constant(Value::integer(1)),
        )
    }

    #[test]
    fn test_accepts_simple_arithmetic() {
        assert!(check(&x_plus_one(), &one_param()).is_ok());
    }

    #[test]
    fn test_rejects_wrong_arity() {
        let two = SymbolTable::new(vec!["x".into(), "y".into()], Vec::new());
        assert_eq!(
            check(&x_plus_one(), &two).unwrap_err(),
            Error::MultiArgument(2)
        );
        let zero = SymbolTable::new(Vec::new(), Vec::new());
        assert_eq!(
            check(&x_plus_one(), &zero).unwrap_err(),
            Error::MultiArgument(0)
        );
    }

    #[test]
    fn test_rejects_identity() {
        assert_eq!(
            check(&Expr::Operand, &one_param()).unwrap_err(),
            Error::unsupported("identity callback")
        );
    }

    #[test]
    fn test_rejects_constants_only() {
        let tree = Expr::binary(
            BinaryOperator::Add,
            Expr::Constant(Value::integer(3)),
            Expr::Constant(Value::integer(42)),
        );
        assert_eq!(check(&tree, &one_param()).unwrap_err(), Error::ConstantsOnly);
    }

    #[test]
    fn test_rejects_unknown_callees() {
        let tree = Expr::Call {
            name: "frobnicate".into(),
            args: vec![Expr::Operand],
        };
        assert_eq!(
            check(&tree, &one_param()).unwrap_err(),
            Error::unknown_callee("frobnicate")
        );

        // known name, wrong arity
        let tree = Expr::Call {
            name: "sqrt".into(),
            args: vec![Expr::Operand, Expr::Constant(Value::integer(2))],
        };
        assert_eq!(
            check(&tree, &one_param()).unwrap_err(),
            Error::unknown_callee("sqrt")
        );
    }

    #[test]
    fn test_rejects_method_on_non_operand_receiver() {
        // (x + 1).upper(): receiver is not the sole input
        let tree = Expr::MethodCall {
            base: Box::new(x_plus_one()),
            name: "upper".into(),
            args: Vec::new(),
        };
        assert_eq!(
            check(&tree, &one_param()).unwrap_err(),
            Error::unknown_callee("upper")
        );
    }

    #[test]
    fn test_accepts_method_on_operand() {
        let tree = Expr::MethodCall {
            base: Box::new(Expr::Operand),
            name: "title".into(),
            args: Vec::new(),
        };
        assert!(check(&tree, &one_param()).is_ok());
    }

    #[test]
    fn test_identity_comparison_requires_null() {
        let is_null = Expr::compare(
            CompareOperator::Is,
            Expr::Operand,
            Expr::Constant(Value::Null),
        );
        assert!(check(&is_null, &one_param()).is_ok());

        let is_two = Expr::compare(
            CompareOperator::Is,
            Expr::Operand,
            Expr::Constant(Value::integer(2)),
        );
        assert!(check(&is_two, &one_param()).is_err());
    }

    #[test]
    fn test_membership_requires_literal_sequence() {
        let good = Expr::compare(
            CompareOperator::In,
            Expr::Operand,
            Expr::Constant(Value::list(vec![Value::integer(2), Value::integer(3)])),
        );
        assert!(check(&good, &one_param()).is_ok());

        let bad = Expr::compare(CompareOperator::In, Expr::Operand, Expr::Operand);
        assert!(check(&bad, &one_param()).is_err());
    }

    #[test]
    fn test_verdict_is_deterministic() {
        let tree = x_plus_one();
        let symbols = one_param();
        assert_eq!(
            check(&tree, &symbols).is_ok(),
            check(&tree, &symbols).is_ok()
        );
        assert!(is_rewritable(&tree, &symbols));
    }
}
