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

//! End-to-end scenarios: analysis, generated text, and soundness of the
//! generated expression against row-wise application of the callback.

use rowlift::core::{Error, Value};
use rowlift::engine::Frame;
use rowlift::expr::BinaryOperator;
use rowlift::trace::{Opcode, TracedFn};
use rowlift::{ApplyTarget, CallbackAnalyzer};

/// Generated expression evaluated over the frame must match the callback
/// applied row by row
fn assert_equivalent(frame: &Frame, column: &str, callback: &TracedFn) {
    let analyzer = CallbackAnalyzer::new(callback, ApplyTarget::Expression);
    let rewrite = analyzer.rewrite(column).expect("callback should rewrite");
    let vectorized = rewrite
        .expr
        .evaluate(frame)
        .expect("generated expression should evaluate");
    let row_wise: Vec<Value> = frame
        .column(column)
        .expect("column exists")
        .iter()
        .map(|cell| callback.call(cell))
        .collect();
    assert_eq!(
        vectorized, row_wise,
        "generated expression '{}' must match row-wise results",
        rewrite.text
    );
}

#[test]
fn test_scenario_arithmetic_chain() {
    // x + 1 - (2 / 3) over a = [1, 2, 3]
    let callback = TracedFn::builder("lambda")
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
        .body(|v| match v.as_float64() {
            Some(x) => Value::float(x + 1.0 - 2.0 / 3.0),
            None => Value::Null,
        })
        .build();

    let analyzer = CallbackAnalyzer::new(&callback, ApplyTarget::Expression);
    assert_eq!(
        analyzer.expression_text("a").expect("should rewrite"),
        "(col(\"a\") + 1) - (2 / 3)"
    );

    let mut frame = Frame::new();
    frame
        .insert(
            "a",
            vec![Value::integer(1), Value::integer(2), Value::integer(3)],
        )
        .expect("insert");
    assert_equivalent(&frame, "a", &callback);
}

#[test]
fn test_scenario_string_composition() {
    // x.upper() + ":" + x.lower() over b = ["AB", "cd"]
    let callback = TracedFn::builder("lambda")
        .param("x")
        .constant(Value::text(":"))
        .name("upper")
        .name("lower")
        .instr(Opcode::LoadParam(0))
        .instr(Opcode::LoadMethod(0))
        .instr(Opcode::CallMethod(0))
        .instr(Opcode::LoadConst(0))
        .instr(Opcode::Binary(BinaryOperator::Add))
        .instr(Opcode::LoadParam(0))
        .instr(Opcode::LoadMethod(1))
        .instr(Opcode::CallMethod(0))
        .instr(Opcode::Binary(BinaryOperator::Add))
        .instr(Opcode::Return)
        .body(|v| match v.as_str() {
            Some(s) => Value::text(format!("{}:{}", s.to_uppercase(), s.to_lowercase())),
            None => Value::Null,
        })
        .build();

    let analyzer = CallbackAnalyzer::new(&callback, ApplyTarget::Expression);
    assert_eq!(
        analyzer.expression_text("b").expect("should rewrite"),
        "(col(\"b\").to_uppercase() + \":\") + col(\"b\").to_lowercase()"
    );

    let mut frame = Frame::new();
    frame
        .insert("b", vec![Value::text("AB"), Value::text("cd")])
        .expect("insert");
    assert_equivalent(&frame, "b", &callback);

    let vectorized = CallbackAnalyzer::new(&callback, ApplyTarget::Expression)
        .rewrite("b")
        .expect("should rewrite")
        .expr
        .evaluate(&frame)
        .expect("should evaluate");
    assert_eq!(vectorized, vec![Value::text("AB:ab"), Value::text("CD:cd")]);
}

#[test]
fn test_scenario_two_parameter_callback() {
    // x + y: refused, no suggestion
    let callback = TracedFn::builder("lambda")
        .param("x")
        .param("y")
        .instr(Opcode::LoadParam(0))
        .instr(Opcode::LoadParam(1))
        .instr(Opcode::Binary(BinaryOperator::Add))
        .instr(Opcode::Return)
        .build();

    let analyzer = CallbackAnalyzer::new(&callback, ApplyTarget::Expression);
    assert_eq!(analyzer.rewrite("a").unwrap_err(), Error::MultiArgument(2));
    assert!(!analyzer.can_rewrite("a"));
}

#[test]
fn test_scenario_constants_only_callback() {
    // MY_CONSTANT + 42: parses, but there is nothing to vectorize
    let callback = TracedFn::builder("lambda")
        .param("x")
        .bind("MY_CONSTANT", Value::integer(3))
        .constant(Value::integer(42))
        .instr(Opcode::LoadBinding(0))
        .instr(Opcode::LoadConst(0))
        .instr(Opcode::Binary(BinaryOperator::Add))
        .instr(Opcode::Return)
        .build();

    let analyzer = CallbackAnalyzer::new(&callback, ApplyTarget::Expression);
    assert_eq!(analyzer.rewrite("a").unwrap_err(), Error::ConstantsOnly);
}

#[test]
fn test_scenario_bound_method_callback() {
    // a bound method computing x * 10
    let callback = TracedFn::builder("Test.x10")
        .param("x")
        .constant(Value::integer(10))
        .instr(Opcode::LoadParam(0))
        .instr(Opcode::LoadConst(0))
        .instr(Opcode::Binary(BinaryOperator::Mul))
        .instr(Opcode::Return)
        .body(|v| match v.as_int64() {
            Some(n) => Value::integer(n * 10),
            None => Value::Null,
        })
        .build();

    let analyzer = CallbackAnalyzer::new(&callback, ApplyTarget::Expression);
    assert_eq!(
        analyzer.expression_text("colx").expect("should rewrite"),
        "col(\"colx\") * 10"
    );

    let mut frame = Frame::new();
    frame
        .insert(
            "colx",
            vec![Value::integer(-2), Value::integer(0), Value::integer(7)],
        )
        .expect("insert");
    assert_equivalent(&frame, "colx", &callback);
}

#[test]
fn test_scenario_captured_constant_folds() {
    // x + CONST with CONST captured as 3
    let callback = TracedFn::builder("lambda")
        .param("x")
        .bind("CONST", Value::integer(3))
        .instr(Opcode::LoadParam(0))
        .instr(Opcode::LoadBinding(0))
        .instr(Opcode::Binary(BinaryOperator::Add))
        .instr(Opcode::Return)
        .body(|v| match v.as_int64() {
            Some(n) => Value::integer(n + 3),
            None => Value::Null,
        })
        .build();

    let analyzer = CallbackAnalyzer::new(&callback, ApplyTarget::Expression);
    assert_eq!(
        analyzer.expression_text("a").expect("should rewrite"),
        "col(\"a\") + 3"
    );

    let mut frame = Frame::new();
    frame
        .insert("a", vec![Value::integer(1), Value::integer(2)])
        .expect("insert");
    assert_equivalent(&frame, "a", &callback);
}
