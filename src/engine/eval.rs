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

//! Vectorized evaluation of native expressions
//!
//! Evaluates a [`ColExpr`] over the columns of a [`Frame`], fully
//! materializing every operand: there is no short-circuit. The scalar
//! operator helpers are public because they are the engine's elementwise
//! semantics; the row-wise path uses the same semantics one cell at a
//! time.
//!
//! Arithmetic follows the source evaluation model: true division always
//! produces floats, floor division and modulo round toward negative
//! infinity, `+` concatenates text. NULL propagates through arithmetic
//! and comparisons; division by zero yields NULL.

use rustc_hash::FxHashMap;

use crate::core::{Error, Result, Value};
use crate::engine::expr::{ColExpr, CombineOp};
use crate::expr::{BinaryOperator, CompareOperator};

/// A materialized column
pub type Column = Vec<Value>;

/// A set of equal-length named columns
#[derive(Debug, Clone, Default)]
pub struct Frame {
    columns: FxHashMap<String, Column>,
    nrows: usize,
}

impl Frame {
    /// Create an empty frame
    pub fn new() -> Self {
        Frame::default()
    }

    /// Insert a column; every column must have the same length
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        if self.columns.is_empty() {
            self.nrows = column.len();
        } else if column.len() != self.nrows {
            return Err(Error::ColumnLengthMismatch {
                expected: self.nrows,
                got: column.len(),
            });
        }
        self.columns.insert(name.into(), column);
        Ok(())
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// Number of rows
    pub fn nrows(&self) -> usize {
        self.nrows
    }
}

impl ColExpr {
    /// Evaluate this expression over a frame, producing one column
    pub fn evaluate(&self, frame: &Frame) -> Result<Column> {
        match self {
            ColExpr::Col(name) => frame.column(name).cloned(),
            ColExpr::Lit(value) => Ok(vec![value.clone(); frame.nrows()]),
            ColExpr::Neg(child) => {
                let column = child.evaluate(frame)?;
                column.iter().map(neg_op).collect()
            }
            ColExpr::Not(child) => {
                let column = child.evaluate(frame)?;
                column.iter().map(not_op).collect()
            }
            ColExpr::Binary { op, left, right } => {
                let left = left.evaluate(frame)?;
                let right = right.evaluate(frame)?;
                left.iter()
                    .zip(right.iter())
                    .map(|(a, b)| binary_op(*op, a, b))
                    .collect()
            }
            ColExpr::Compare { op, left, right } => {
                let left = left.evaluate(frame)?;
                let right = right.evaluate(frame)?;
                left.iter()
                    .zip(right.iter())
                    .map(|(a, b)| compare_op(*op, a, b))
                    .collect()
            }
            ColExpr::Combine { op, operands } => {
                let mut columns = Vec::with_capacity(operands.len());
                for operand in operands {
                    columns.push(operand.evaluate(frame)?);
                }
                let mut result = match columns.first() {
                    Some(first) => first.clone(),
                    None => return Ok(Vec::new()),
                };
                for column in &columns[1..] {
                    for (acc, cell) in result.iter_mut().zip(column.iter()) {
                        *acc = combine_op(*op, acc, cell)?;
                    }
                }
                Ok(result)
            }
            ColExpr::Func {
                name,
                receiver,
                args,
            } => {
                let receiver = receiver.evaluate(frame)?;
                let mut arg_columns = Vec::with_capacity(args.len());
                for arg in args {
                    arg_columns.push(arg.evaluate(frame)?);
                }
                receiver
                    .iter()
                    .enumerate()
                    .map(|(row, cell)| {
                        let row_args: Vec<&Value> =
                            arg_columns.iter().map(|c| &c[row]).collect();
                        apply_native(name, cell, &row_args)
                    })
                    .collect()
            }
        }
    }
}

// =============================================================================
// Scalar operator semantics
// =============================================================================

enum Num {
    Int(i64),
    Float(f64),
}

fn as_num(value: &Value) -> Option<Num> {
    match value {
        Value::Integer(v) => Some(Num::Int(*v)),
        Value::Float(v) => Some(Num::Float(*v)),
        Value::Boolean(b) => Some(Num::Int(i64::from(*b))),
        _ => None,
    }
}

fn numeric_pair(a: &Value, b: &Value) -> Option<(Num, Num)> {
    Some((as_num(a)?, as_num(b)?))
}

/// Floor division rounding toward negative infinity
fn floor_div_i64(a: i64, b: i64) -> i64 {
    let q = a.wrapping_div(b);
    let r = a.wrapping_rem(b);
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

/// Modulo taking the divisor's sign
fn floor_mod_i64(a: i64, b: i64) -> i64 {
    let r = a.wrapping_rem(b);
    if r != 0 && (r < 0) != (b < 0) {
        r + b
    } else {
        r
    }
}

fn floor_mod_f64(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        r + b
    } else {
        r
    }
}

/// Apply a binary operator to two cells
pub fn binary_op(op: BinaryOperator, a: &Value, b: &Value) -> Result<Value> {
    if a.is_null() || b.is_null() {
        return Ok(Value::Null);
    }

    // text concatenation
    if op == BinaryOperator::Add {
        if let (Value::Text(l), Value::Text(r)) = (a, b) {
            let mut s = String::with_capacity(l.len() + r.len());
            s.push_str(l);
            s.push_str(r);
            return Ok(Value::text(s));
        }
    }

    // boolean & / | stay boolean
    if let (Value::Boolean(l), Value::Boolean(r)) = (a, b) {
        match op {
            BinaryOperator::BitAnd => return Ok(Value::boolean(l & r)),
            BinaryOperator::BitOr => return Ok(Value::boolean(l | r)),
            _ => {}
        }
    }

    let (left, right) = numeric_pair(a, b).ok_or_else(|| type_error(op.symbol(), a, b))?;

    let result = match (left, right) {
        (Num::Int(l), Num::Int(r)) => match op {
            BinaryOperator::Add => Value::integer(l.wrapping_add(r)),
            BinaryOperator::Sub => Value::integer(l.wrapping_sub(r)),
            BinaryOperator::Mul => Value::integer(l.wrapping_mul(r)),
            BinaryOperator::TrueDiv => {
                if r == 0 {
                    Value::Null
                } else {
                    Value::float(l as f64 / r as f64)
                }
            }
            BinaryOperator::FloorDiv => {
                if r == 0 {
                    Value::Null
                } else {
                    Value::integer(floor_div_i64(l, r))
                }
            }
            BinaryOperator::Mod => {
                if r == 0 {
                    Value::Null
                } else {
                    Value::integer(floor_mod_i64(l, r))
                }
            }
            BinaryOperator::Pow => match u32::try_from(r) {
                Ok(exp) => match l.checked_pow(exp) {
                    Some(v) => Value::integer(v),
                    None => Value::float((l as f64).powf(r as f64)),
                },
                Err(_) => Value::float((l as f64).powf(r as f64)),
            },
            BinaryOperator::BitAnd => Value::integer(l & r),
            BinaryOperator::BitOr => Value::integer(l | r),
        },
        (l, r) => {
            let l = match l {
                Num::Int(v) => v as f64,
                Num::Float(v) => v,
            };
            let r = match r {
                Num::Int(v) => v as f64,
                Num::Float(v) => v,
            };
            match op {
                BinaryOperator::Add => Value::float(l + r),
                BinaryOperator::Sub => Value::float(l - r),
                BinaryOperator::Mul => Value::float(l * r),
                BinaryOperator::TrueDiv => {
                    if r == 0.0 {
                        Value::Null
                    } else {
                        Value::float(l / r)
                    }
                }
                BinaryOperator::FloorDiv => {
                    if r == 0.0 {
                        Value::Null
                    } else {
                        Value::float((l / r).floor())
                    }
                }
                BinaryOperator::Mod => {
                    if r == 0.0 {
                        Value::Null
                    } else {
                        Value::float(floor_mod_f64(l, r))
                    }
                }
                BinaryOperator::Pow => Value::float(l.powf(r)),
                BinaryOperator::BitAnd | BinaryOperator::BitOr => {
                    return Err(type_error(op.symbol(), a, b));
                }
            }
        }
    };
    Ok(result)
}

/// Apply a comparison operator to two cells
///
/// Only the ordering comparisons live here; identity-with-null and
/// membership lower to `is_null`/`is_in` before evaluation.
pub fn compare_op(op: CompareOperator, a: &Value, b: &Value) -> Result<Value> {
    if a.is_null() || b.is_null() {
        return Ok(Value::Null);
    }

    let ordering = match (a, b) {
        (Value::Text(l), Value::Text(r)) => Some(l.cmp(r)),
        (Value::Boolean(l), Value::Boolean(r)) => Some(l.cmp(r)),
        (Value::List(l), Value::List(r)) => {
            return match op {
                CompareOperator::Eq => Ok(Value::boolean(l == r)),
                CompareOperator::Ne => Ok(Value::boolean(l != r)),
                _ => Err(type_error(op.symbol(), a, b)),
            };
        }
        _ => match numeric_pair(a, b) {
            Some((Num::Int(l), Num::Int(r))) => Some(l.cmp(&r)),
            Some((l, r)) => {
                let l = match l {
                    Num::Int(v) => v as f64,
                    Num::Float(v) => v,
                };
                let r = match r {
                    Num::Int(v) => v as f64,
                    Num::Float(v) => v,
                };
                l.partial_cmp(&r)
            }
            None => None,
        },
    };

    let ordering = match ordering {
        Some(o) => o,
        // incomparable types: equality is decidable, ordering is not
        None => {
            return match op {
                CompareOperator::Eq => Ok(Value::boolean(false)),
                CompareOperator::Ne => Ok(Value::boolean(true)),
                _ => Err(type_error(op.symbol(), a, b)),
            };
        }
    };

    let result = match op {
        CompareOperator::Eq => ordering.is_eq(),
        CompareOperator::Ne => !ordering.is_eq(),
        CompareOperator::Lt => ordering.is_lt(),
        CompareOperator::Le => ordering.is_le(),
        CompareOperator::Gt => ordering.is_gt(),
        CompareOperator::Ge => ordering.is_ge(),
        CompareOperator::Is
        | CompareOperator::IsNot
        | CompareOperator::In
        | CompareOperator::NotIn => {
            return Err(type_error(op.symbol(), a, b));
        }
    };
    Ok(Value::boolean(result))
}

/// Elementwise boolean combination with three-valued NULL handling
pub fn combine_op(op: CombineOp, a: &Value, b: &Value) -> Result<Value> {
    let left = match a {
        Value::Null => None,
        Value::Boolean(v) => Some(*v),
        _ => return Err(type_error(op.symbol(), a, b)),
    };
    let right = match b {
        Value::Null => None,
        Value::Boolean(v) => Some(*v),
        _ => return Err(type_error(op.symbol(), a, b)),
    };
    let result = match op {
        CombineOp::And => match (left, right) {
            (Some(false), _) | (_, Some(false)) => Value::boolean(false),
            (Some(true), Some(true)) => Value::boolean(true),
            _ => Value::Null,
        },
        CombineOp::Or => match (left, right) {
            (Some(true), _) | (_, Some(true)) => Value::boolean(true),
            (Some(false), Some(false)) => Value::boolean(false),
            _ => Value::Null,
        },
    };
    Ok(result)
}

/// Arithmetic negation of one cell
pub fn neg_op(value: &Value) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Integer(v) => Ok(Value::integer(v.wrapping_neg())),
        Value::Float(v) => Ok(Value::float(-v)),
        Value::Boolean(b) => Ok(Value::integer(-i64::from(*b))),
        other => Err(type_error("-", other, &Value::Null)),
    }
}

/// Elementwise boolean negation of one cell
pub fn not_op(value: &Value) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Boolean(b) => Ok(Value::boolean(!b)),
        other => Err(type_error("~", other, &Value::Null)),
    }
}

/// Membership of one cell in a literal sequence
pub fn is_in(value: &Value, items: &[Value]) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    Value::boolean(items.iter().any(|item| item == value))
}

/// Apply a named native operator to one cell
pub fn apply_native(name: &str, receiver: &Value, args: &[&Value]) -> Result<Value> {
    match name {
        // null checks observe NULL rather than propagating it
        "is_null" => return Ok(Value::boolean(receiver.is_null())),
        "is_not_null" => return Ok(Value::boolean(!receiver.is_null())),
        "is_in" => {
            return match args.first() {
                Some(Value::List(items)) => Ok(is_in(receiver, items)),
                _ => Err(Error::invalid_operation(
                    "is_in",
                    receiver.data_type().to_string(),
                    "non-list argument".to_string(),
                )),
            };
        }
        _ => {}
    }

    if receiver.is_null() {
        return Ok(Value::Null);
    }

    // string operators
    match name {
        "to_uppercase" | "to_lowercase" | "to_titlecase" | "strip_chars" => {
            let s = receiver.as_str().ok_or_else(|| {
                Error::invalid_operation(name, receiver.data_type().to_string(), "".to_string())
            })?;
            let result = match name {
                "to_uppercase" => s.to_uppercase(),
                "to_lowercase" => s.to_lowercase(),
                "to_titlecase" => titlecase(s),
                _ => s.trim().to_string(),
            };
            return Ok(Value::text(result));
        }
        _ => {}
    }

    // elementwise math; sign keeps integer inputs integral
    if name == "sign" {
        return match receiver {
            Value::Integer(v) => Ok(Value::integer(v.signum())),
            Value::Float(v) => Ok(Value::float(if *v == 0.0 { 0.0 } else { v.signum() })),
            other => Err(Error::invalid_operation(
                name,
                other.data_type().to_string(),
                "".to_string(),
            )),
        };
    }

    let x = receiver.as_float64().ok_or_else(|| {
        Error::invalid_operation(name, receiver.data_type().to_string(), "".to_string())
    })?;
    let result = match name {
        "sqrt" => x.sqrt(),
        "cbrt" => x.cbrt(),
        "sin" => x.sin(),
        "cos" => x.cos(),
        "tan" => x.tan(),
        "sinh" => x.sinh(),
        "cosh" => x.cosh(),
        "tanh" => x.tanh(),
        "arcsin" => x.asin(),
        "arccos" => x.acos(),
        "arctan" => x.atan(),
        "exp" => x.exp(),
        "log" => x.ln(),
        "log10" => x.log10(),
        "log1p" => x.ln_1p(),
        _ => return Err(Error::unknown_callee(name)),
    };
    Ok(Value::float(result))
}

/// Uppercase the first letter of each word, lowercase the rest
fn titlecase(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

fn type_error(op: &str, a: &Value, b: &Value) -> Error {
    Error::invalid_operation(op, a.data_type().to_string(), b.data_type().to_string())
}
