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

//! Row-wise apply path
//!
//! The escape hatch the analysis exists to discourage: run a callback
//! over a column one element at a time. The diagnostic fires exactly
//! once per call, before any row is evaluated, and its outcome never
//! changes the mapped result.

use crate::analyzer::ApplyTarget;
use crate::core::Result;
use crate::diagnostics::{warn_on_inefficient_apply, DiagnosticSink};
use crate::engine::eval::{Column, Frame};
use crate::trace::TracedFn;

/// Apply `callback` to every element of `column`, emitting the
/// performance diagnostic to `sink`
#[track_caller]
pub fn apply_elementwise(
    frame: &Frame,
    column: &str,
    callback: &TracedFn,
    sink: &dyn DiagnosticSink,
) -> Result<Column> {
    let call_site = std::panic::Location::caller().to_string();
    warn_on_inefficient_apply(callback, ApplyTarget::Expression, column, &call_site, sink);

    let input = frame.column(column)?;
    Ok(input.iter().map(|cell| callback.call(cell)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Error, Value};
    use crate::diagnostics::CollectingSink;
    use crate::expr::BinaryOperator;
    use crate::trace::Opcode;

    fn frame_a() -> Frame {
        let mut frame = Frame::new();
        frame
            .insert(
                "a",
                vec![Value::integer(1), Value::integer(2), Value::integer(3)],
            )
            .expect("column insert");
        frame
    }

    #[test]
    fn test_apply_maps_rows_and_warns_once() {
        let callback = TracedFn::builder("lambda")
            .param("x")
            .constant(Value::integer(1))
            .instr(Opcode::LoadParam(0))
            .instr(Opcode::LoadConst(0))
            .instr(Opcode::Binary(BinaryOperator::Add))
            .instr(Opcode::Return)
            .body(|v| match v.as_int64() {
                Some(n) => Value::integer(n + 1),
                None => Value::Null,
            })
            .build();

        let sink = CollectingSink::new();
        let result = apply_elementwise(&frame_a(), "a", &callback, &sink).expect("apply");
        assert_eq!(
            result,
            vec![Value::integer(2), Value::integer(3), Value::integer(4)]
        );
        assert_eq!(sink.take().len(), 1, "diagnostic fires exactly once");
    }

    #[test]
    fn test_rejected_callback_still_runs() {
        // opaque callable: no suggestion, identical results
        let callback = TracedFn::opaque("custom_fn", |v| match v.as_int64() {
            Some(n) => Value::integer(n * n),
            None => Value::Null,
        });

        let sink = CollectingSink::new();
        let result = apply_elementwise(&frame_a(), "a", &callback, &sink).expect("apply");
        assert_eq!(
            result,
            vec![Value::integer(1), Value::integer(4), Value::integer(9)]
        );
        let warnings = sink.take();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].suggestion.is_none());
    }

    #[test]
    fn test_missing_column() {
        let callback = TracedFn::opaque("f", |v| v.clone());
        let sink = CollectingSink::new();
        assert_eq!(
            apply_elementwise(&frame_a(), "missing", &callback, &sink).unwrap_err(),
            Error::ColumnNotFound("missing".into())
        );
    }
}
