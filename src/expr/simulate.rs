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

//! Stack-machine simulator
//!
//! Replays a callable's instruction trace against a symbolic operand
//! stack of [`Expr`] nodes, producing exactly one root node or a typed
//! failure. On failure the whole analysis aborts; there is no partial
//! tree.
//!
//! Short-circuit boolean combinations are reconstructed structurally
//! rather than by replaying jumps. The supported template whitelist:
//!
//! - flat same-kind chains (`a and b and c`, `a or b or c`), folded
//!   left-to-right into one flat `Logical` node;
//! - truthiness negation applied as a unary operator, which combines
//!   freely with a single chain (`not (x > 1) or x == 2`);
//! - a finished chain feeding the next one as its first operand
//!   (`(a and b) or c`), since at most one jump kind is ever pending.
//!
//! Opening a jump of one kind while a jump of the other kind is still
//! unresolved (`x > 0 and (x < 100 or x % 2 == 0)`) does not match any
//! template and is refused with `UnsupportedControlFlow` rather than
//! mis-rewritten.

use smallvec::SmallVec;

use crate::core::{Error, Result, Value};
use crate::expr::{Expr, LogicalKind, UnaryOperator};
use crate::trace::{FnTrace, Opcode};

/// An unresolved short-circuit jump: `lhs` is the truthiness-tested
/// operand, `target` the offset where the combination completes
struct Pending {
    kind: LogicalKind,
    target: u32,
    lhs: Expr,
}

/// Replay the trace and reconstruct the callback's expression tree
pub fn simulate(trace: &FnTrace) -> Result<Expr> {
    let mut stack: SmallVec<[Expr; 8]> = SmallVec::new();
    let mut pending: Vec<Pending> = Vec::new();
    let mut param_slot: Option<u32> = None;
    let mut result: Option<Expr> = None;

    for instr in &trace.instructions {
        // complete any short-circuit combination targeting this offset
        while pending.last().is_some_and(|p| p.target == instr.offset) {
            let p = match pending.pop() {
                Some(p) => p,
                None => break,
            };
            let rhs = pop(&mut stack, instr.offset)?;
            stack.push(fold_logical(p.kind, p.lhs, rhs));
        }

        if result.is_some() {
            return Err(Error::malformed(format!(
                "{} after RETURN at offset {}",
                instr.opcode.mnemonic(),
                instr.offset
            )));
        }

        match instr.opcode {
            Opcode::LoadConst(idx) => {
                let value = trace.consts.get(idx as usize).ok_or_else(|| {
                    Error::malformed(format!("constant pool index {} out of range", idx))
                })?;
                stack.push(Expr::Constant(value.clone()));
            }
            Opcode::LoadParam(slot) => {
                if trace.symbols.param_name(slot).is_none() {
                    return Err(Error::malformed(format!(
                        "parameter slot {} out of range",
                        slot
                    )));
                }
                match param_slot {
                    Some(seen) if seen != slot => {
                        return Err(Error::MultiArgument(trace.symbols.arity()));
                    }
                    _ => param_slot = Some(slot),
                }
                stack.push(Expr::Operand);
            }
            Opcode::LoadBinding(slot) => {
                let (_, value) = trace.symbols.binding(slot).ok_or_else(|| {
                    Error::malformed(format!("binding slot {} out of range", slot))
                })?;
                stack.push(Expr::Constant(value.clone()));
            }
            Opcode::LoadAttr(idx) | Opcode::LoadMethod(idx) => {
                let name = pool_name(trace, idx)?;
                let base = pop(&mut stack, instr.offset)?;
                stack.push(Expr::Attribute {
                    base: Box::new(base),
                    name,
                });
            }
            Opcode::Binary(op) => {
                let right = pop(&mut stack, instr.offset)?;
                let left = pop(&mut stack, instr.offset)?;
                stack.push(Expr::binary(op, left, right));
            }
            Opcode::Unary(op) => {
                let operand = pop(&mut stack, instr.offset)?;
                match op {
                    // truthiness negation lives in the Logical space
                    UnaryOperator::Not => stack.push(Expr::logical_not(operand)),
                    // arithmetic identity folds away
                    UnaryOperator::Pos => stack.push(operand),
                    UnaryOperator::Neg => stack.push(Expr::Unary {
                        op,
                        operand: Box::new(operand),
                    }),
                }
            }
            Opcode::Compare(op) => {
                let right = pop(&mut stack, instr.offset)?;
                let left = pop(&mut stack, instr.offset)?;
                stack.push(Expr::compare(op, left, right));
            }
            Opcode::JumpIfFalseOrPop(target) => {
                push_pending(&mut pending, &mut stack, LogicalKind::And, target, instr.offset)?;
            }
            Opcode::JumpIfTrueOrPop(target) => {
                push_pending(&mut pending, &mut stack, LogicalKind::Or, target, instr.offset)?;
            }
            Opcode::CallFunction { name, argc } => {
                let name = pool_name(trace, name)?;
                let args = pop_n(&mut stack, argc as usize, instr.offset)?;
                stack.push(Expr::Call { name, args });
            }
            Opcode::CallMethod(argc) => {
                let args = pop_n(&mut stack, argc as usize, instr.offset)?;
                match pop(&mut stack, instr.offset)? {
                    Expr::Attribute { base, name } => {
                        stack.push(Expr::MethodCall { base, name, args });
                    }
                    _ => {
                        return Err(Error::malformed(format!(
                            "CALL_METHOD without a method receiver at offset {}",
                            instr.offset
                        )));
                    }
                }
            }
            Opcode::BuildList(count) => {
                let items = pop_n(&mut stack, count as usize, instr.offset)?;
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Expr::Constant(v) => values.push(v),
                        _ => {
                            return Err(Error::unsupported(
                                "sequence literal with non-constant element",
                            ));
                        }
                    }
                }
                stack.push(Expr::Constant(Value::list(values)));
            }
            Opcode::Subscript => {
                return Err(Error::unsupported("subscript"));
            }
            Opcode::Return => {
                result = Some(pop(&mut stack, instr.offset)?);
            }
        }
    }

    if let Some(p) = pending.last() {
        return Err(Error::UnsupportedControlFlow(p.target));
    }
    if !stack.is_empty() {
        return Err(Error::malformed(format!(
            "{} values left on the stack at end of trace",
            stack.len()
        )));
    }
    result.ok_or_else(|| Error::malformed("trace ended without RETURN"))
}

/// Open a short-circuit combination, refusing shapes outside the
/// supported template whitelist
fn push_pending(
    pending: &mut Vec<Pending>,
    stack: &mut SmallVec<[Expr; 8]>,
    kind: LogicalKind,
    target: u32,
    offset: u32,
) -> Result<()> {
    if pending.last().is_some_and(|p| p.kind != kind) {
        return Err(Error::UnsupportedControlFlow(offset));
    }
    let lhs = pop(stack, offset)?;
    pending.push(Pending { kind, target, lhs });
    Ok(())
}

/// Fold one completed short-circuit combination, flattening chained
/// same-kind combinations into a single flat node
fn fold_logical(kind: LogicalKind, lhs: Expr, rhs: Expr) -> Expr {
    let mut operands = vec![lhs];
    match rhs {
        Expr::Logical {
            kind: rhs_kind,
            operands: rest,
        } if rhs_kind == kind => operands.extend(rest),
        other => operands.push(other),
    }
    Expr::Logical { kind, operands }
}

fn pop(stack: &mut SmallVec<[Expr; 8]>, offset: u32) -> Result<Expr> {
    stack
        .pop()
        .ok_or_else(|| Error::malformed(format!("stack underflow at offset {}", offset)))
}

fn pop_n(stack: &mut SmallVec<[Expr; 8]>, n: usize, offset: u32) -> Result<Vec<Expr>> {
    let mut items = Vec::with_capacity(n);
    for _ in 0..n {
        items.push(pop(stack, offset)?);
    }
    items.reverse();
    Ok(items)
}

fn pool_name(trace: &FnTrace, idx: u32) -> Result<String> {
    trace
        .names
        .get(idx as usize)
        .cloned()
        .ok_or_else(|| Error::malformed(format!("name pool index {} out of range", idx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{BinaryOperator, CompareOperator};
    use crate::trace::{Introspect, TracedFn};

    fn tree_of(f: &TracedFn) -> Result<Expr> {
        simulate(f.introspect()?)
    }

    #[test]
    fn test_arithmetic_chain() {
        // x + 1 - (2 / 3)
        let f = TracedFn::builder("lambda")
            .param("x")
            .constant(Value::integer(1))
            .constant(Value::integer(2))
            .constant(Value::integer(3))
            .instr(Opcode::LoadParam(0))
            .instr(Opcode::LoadConst(0))
            .instr(Opcode::Binary(BinaryOperator::Add))
            .instr(Opcode::LoadConst(1))
            .instr(Opcode::LoadConst(2))
            .instr(Opcode::Binary(BinaryOperator::TrueDiv))
            .instr(Opcode::Binary(BinaryOperator::Sub))
            .instr(Opcode::Return)
            .build();
        let tree = tree_of(&f).expect("arithmetic chain should simulate");
        assert_eq!(
            tree,
            Expr::binary(
                BinaryOperator::Sub,
                Expr::binary(
                    BinaryOperator::Add,
                    Expr::Operand,
                    Expr::Constant(Value::integer(1))
                ),
                Expr::binary(
                    BinaryOperator::TrueDiv,
                    Expr::Constant(Value::integer(2)),
                    Expr::Constant(Value::integer(3))
                ),
            )
        );
    }

    #[test]
    fn test_flat_and_chain_folds() {
        // x > 0 and x < 9 and x != 5
        // operands jump to the RETURN offset (14)
        let f = TracedFn::builder("lambda")
            .param("x")
            .constant(Value::integer(0))
            .constant(Value::integer(9))
            .constant(Value::integer(5))
            .instr(Opcode::LoadParam(0)) // 0
            .instr(Opcode::LoadConst(0)) // 2
            .instr(Opcode::Compare(CompareOperator::Gt)) // 4
            .instr(Opcode::JumpIfFalseOrPop(22)) // 6
            .instr(Opcode::LoadParam(0)) // 8
            .instr(Opcode::LoadConst(1)) // 10
            .instr(Opcode::Compare(CompareOperator::Lt)) // 12
            .instr(Opcode::JumpIfFalseOrPop(22)) // 14
            .instr(Opcode::LoadParam(0)) // 16
            .instr(Opcode::LoadConst(2)) // 18
            .instr(Opcode::Compare(CompareOperator::Ne)) // 20
            .instr(Opcode::Return) // 22
            .build();
        let tree = tree_of(&f).expect("flat and-chain should simulate");
        match tree {
            Expr::Logical {
                kind: LogicalKind::And,
                operands,
            } => assert_eq!(operands.len(), 3),
            other => panic!("expected flat Logical(And), got {:?}", other),
        }
    }

    #[test]
    fn test_not_or_combination() {
        // not (x > 1) or x == 2
        let f = TracedFn::builder("lambda")
            .param("x")
            .constant(Value::integer(1))
            .constant(Value::integer(2))
            .instr(Opcode::LoadParam(0)) // 0
            .instr(Opcode::LoadConst(0)) // 2
            .instr(Opcode::Compare(CompareOperator::Gt)) // 4
            .instr(Opcode::Unary(UnaryOperator::Not)) // 6
            .instr(Opcode::JumpIfTrueOrPop(18)) // 8
            .instr(Opcode::LoadParam(0)) // 10
            .instr(Opcode::LoadConst(1)) // 12
            .instr(Opcode::Compare(CompareOperator::Eq)) // 14
            .instr(Opcode::Return) // 16... target lands on 18? no
            .build();
        // target 18 is past the RETURN at 16, so the pending never resolves
        assert_eq!(
            tree_of(&f).unwrap_err(),
            Error::UnsupportedControlFlow(18)
        );

        // same callback with the jump landing on RETURN (offset 16)
        let f = TracedFn::builder("lambda")
            .param("x")
            .constant(Value::integer(1))
            .constant(Value::integer(2))
            .instr(Opcode::LoadParam(0)) // 0
            .instr(Opcode::LoadConst(0)) // 2
            .instr(Opcode::Compare(CompareOperator::Gt)) // 4
            .instr(Opcode::Unary(UnaryOperator::Not)) // 6
            .instr(Opcode::JumpIfTrueOrPop(16)) // 8
            .instr(Opcode::LoadParam(0)) // 10
            .instr(Opcode::LoadConst(1)) // 12
            .instr(Opcode::Compare(CompareOperator::Eq)) // 14
            .instr(Opcode::Return) // 16
            .build();
        let tree = tree_of(&f).expect("not/or combination should simulate");
        match tree {
            Expr::Logical {
                kind: LogicalKind::Or,
                operands,
            } => {
                assert_eq!(operands.len(), 2);
                assert!(matches!(
                    operands[0],
                    Expr::Logical {
                        kind: LogicalKind::Not,
                        ..
                    }
                ));
            }
            other => panic!("expected Logical(Or), got {:?}", other),
        }
    }

    #[test]
    fn test_mixed_nesting_rejected() {
        // x > 0 and (x < 100 or x % 2 == 0): the inner `or` opens while
        // the outer `and` is still pending
        let f = TracedFn::builder("lambda")
            .param("x")
            .constant(Value::integer(0))
            .constant(Value::integer(100))
            .constant(Value::integer(2))
            .instr(Opcode::LoadParam(0)) // 0
            .instr(Opcode::LoadConst(0)) // 2
            .instr(Opcode::Compare(CompareOperator::Gt)) // 4
            .instr(Opcode::JumpIfFalseOrPop(30)) // 6
            .instr(Opcode::LoadParam(0)) // 8
            .instr(Opcode::LoadConst(1)) // 10
            .instr(Opcode::Compare(CompareOperator::Lt)) // 12
            .instr(Opcode::JumpIfTrueOrPop(30)) // 14
            .instr(Opcode::LoadParam(0)) // 16
            .instr(Opcode::LoadConst(2)) // 18
            .instr(Opcode::Binary(BinaryOperator::Mod)) // 20
            .instr(Opcode::LoadConst(0)) // 22
            .instr(Opcode::Compare(CompareOperator::Eq)) // 24
            .instr(Opcode::Return) // 26
            .build();
        assert_eq!(
            tree_of(&f).unwrap_err(),
            Error::UnsupportedControlFlow(14)
        );
    }

    #[test]
    fn test_second_parameter_slot_rejected() {
        // x + y
        let f = TracedFn::builder("lambda")
            .param("x")
            .param("y")
            .instr(Opcode::LoadParam(0))
            .instr(Opcode::LoadParam(1))
            .instr(Opcode::Binary(BinaryOperator::Add))
            .instr(Opcode::Return)
            .build();
        assert_eq!(tree_of(&f).unwrap_err(), Error::MultiArgument(2));
    }

    #[test]
    fn test_subscript_rejected() {
        // x[0] + 1
        let f = TracedFn::builder("lambda")
            .param("x")
            .constant(Value::integer(0))
            .constant(Value::integer(1))
            .instr(Opcode::LoadParam(0))
            .instr(Opcode::LoadConst(0))
            .instr(Opcode::Subscript)
            .instr(Opcode::LoadConst(1))
            .instr(Opcode::Binary(BinaryOperator::Add))
            .instr(Opcode::Return)
            .build();
        assert_eq!(
            tree_of(&f).unwrap_err(),
            Error::unsupported("subscript")
        );
    }

    #[test]
    fn test_method_call_shape() {
        // x.upper()
        let f = TracedFn::builder("lambda")
            .param("x")
            .name("upper")
            .instr(Opcode::LoadParam(0))
            .instr(Opcode::LoadMethod(0))
            .instr(Opcode::CallMethod(0))
            .instr(Opcode::Return)
            .build();
        let tree = tree_of(&f).expect("method call should simulate");
        assert_eq!(
            tree,
            Expr::MethodCall {
                base: Box::new(Expr::Operand),
                name: "upper".into(),
                args: Vec::new(),
            }
        );
    }

    #[test]
    fn test_function_call_shape() {
        // sin(x) + 1
        let f = TracedFn::builder("lambda")
            .param("x")
            .constant(Value::integer(1))
            .name("sin")
            .instr(Opcode::LoadParam(0))
            .instr(Opcode::CallFunction { name: 0, argc: 1 })
            .instr(Opcode::LoadConst(0))
            .instr(Opcode::Binary(BinaryOperator::Add))
            .instr(Opcode::Return)
            .build();
        let tree = tree_of(&f).expect("function call should simulate");
        assert_eq!(
            tree,
            Expr::binary(
                BinaryOperator::Add,
                Expr::Call {
                    name: "sin".into(),
                    args: vec![Expr::Operand],
                },
                Expr::Constant(Value::integer(1)),
            )
        );
    }

    #[test]
    fn test_membership_over_built_sequence() {
        // x in (2, 3, 4), with the sequence built instruction by instruction
        let f = TracedFn::builder("lambda")
            .param("x")
            .constant(Value::integer(2))
            .constant(Value::integer(3))
            .constant(Value::integer(4))
            .instr(Opcode::LoadParam(0))
            .instr(Opcode::LoadConst(0))
            .instr(Opcode::LoadConst(1))
            .instr(Opcode::LoadConst(2))
            .instr(Opcode::BuildList(3))
            .instr(Opcode::Compare(CompareOperator::In))
            .instr(Opcode::Return)
            .build();
        let tree = tree_of(&f).expect("membership should simulate");
        assert_eq!(
            tree,
            Expr::compare(
                CompareOperator::In,
                Expr::Operand,
                Expr::Constant(Value::list(vec![
                    Value::integer(2),
                    Value::integer(3),
                    Value::integer(4)
                ])),
            )
        );
    }

    #[test]
    fn test_non_constant_sequence_rejected() {
        // (x, 1) built from a live operand
        let f = TracedFn::builder("lambda")
            .param("x")
            .constant(Value::integer(1))
            .instr(Opcode::LoadParam(0))
            .instr(Opcode::LoadConst(0))
            .instr(Opcode::BuildList(2))
            .instr(Opcode::Return)
            .build();
        assert_eq!(
            tree_of(&f).unwrap_err(),
            Error::unsupported("sequence literal with non-constant element")
        );
    }

    #[test]
    fn test_malformed_traces() {
        // no RETURN
        let f = TracedFn::builder("lambda")
            .param("x")
            .instr(Opcode::LoadParam(0))
            .build();
        assert!(matches!(
            tree_of(&f).unwrap_err(),
            Error::MalformedTrace(_)
        ));

        // stack underflow
        let f = TracedFn::builder("lambda")
            .param("x")
            .instr(Opcode::Binary(BinaryOperator::Add))
            .instr(Opcode::Return)
            .build();
        assert!(matches!(
            tree_of(&f).unwrap_err(),
            Error::MalformedTrace(_)
        ));

        // two values left at RETURN
        let f = TracedFn::builder("lambda")
            .param("x")
            .constant(Value::integer(1))
            .instr(Opcode::LoadParam(0))
            .instr(Opcode::LoadConst(0))
            .instr(Opcode::LoadConst(0))
            .instr(Opcode::Return)
            .build();
        assert!(matches!(
            tree_of(&f).unwrap_err(),
            Error::MalformedTrace(_)
        ));
    }

    #[test]
    fn test_simulation_is_idempotent() {
        let f = TracedFn::builder("lambda")
            .param("x")
            .constant(Value::integer(10))
            .instr(Opcode::LoadParam(0))
            .instr(Opcode::LoadConst(0))
            .instr(Opcode::Binary(BinaryOperator::Mul))
            .instr(Opcode::Return)
            .build();
        let first = tree_of(&f).expect("should simulate");
        let second = tree_of(&f).expect("should simulate again");
        assert_eq!(first, second);
    }
}
