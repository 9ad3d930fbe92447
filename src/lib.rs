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

//! # Rowlift - Row-wise callback rewrite analysis
//!
//! Rowlift decides whether a user callback applied row by row over a
//! column is equivalent to a composition of native vectorized operators,
//! and if so synthesizes that composition and surfaces it as a
//! performance diagnostic. Analysis inspects the callback's compiled
//! instruction trace; it never executes the callback and never changes
//! evaluation results.
//!
//! ## Pipeline
//!
//! Extraction obtains the instruction trace; the simulator replays it
//! symbolically into an expression tree; the feasibility gate decides
//! whether every node has a native counterpart; the code generator
//! lowers accepted trees to engine expressions. Any refusal only
//! suppresses the suggestion.
//!
//! ## Quick Start
//!
//! ```rust
//! use rowlift::analyzer::{ApplyTarget, CallbackAnalyzer};
//! use rowlift::core::Value;
//! use rowlift::expr::BinaryOperator;
//! use rowlift::trace::{Opcode, TracedFn};
//!
//! // a callback computing x * 10
//! let callback = TracedFn::builder("lambda")
//!     .param("x")
//!     .constant(Value::integer(10))
//!     .instr(Opcode::LoadParam(0))
//!     .instr(Opcode::LoadConst(0))
//!     .instr(Opcode::Binary(BinaryOperator::Mul))
//!     .instr(Opcode::Return)
//!     .build();
//!
//! let analyzer = CallbackAnalyzer::new(&callback, ApplyTarget::Expression);
//! let rewrite = analyzer.rewrite("colx").unwrap();
//! assert_eq!(rewrite.text, "col(\"colx\") * 10");
//! ```
//!
//! ## Modules
//!
//! - [`analyzer`] - The full pipeline behind one call ([`analyzer::CallbackAnalyzer`])
//! - [`core`] - Core types ([`Value`], [`DataType`], [`Error`])
//! - [`trace`] - Instruction traces and extraction ([`trace::TracedFn`])
//! - [`expr`] - The reconstructed tree and the stack-machine simulator
//! - [`feasibility`] - The accept/refuse gate over completed trees
//! - [`registry`] - Static mapping from recognized callees to native operators
//! - [`codegen`] - Lowering accepted trees to engine expressions
//! - [`engine`] - Engine expression surface, evaluator, and row-wise apply
//! - [`diagnostics`] - Performance warnings and sinks

pub mod analyzer;
pub mod codegen;
pub mod core;
pub mod diagnostics;
pub mod engine;
pub mod expr;
pub mod feasibility;
pub mod registry;
pub mod trace;

// Re-export commonly used types
pub use analyzer::{ApplyTarget, CallbackAnalyzer, Rewrite};
pub use core::{DataType, Error, Result, Value};
pub use diagnostics::{
    warn_on_inefficient_apply, CollectingSink, DiagnosticSink, PerfWarning, TracingSink,
};
pub use engine::{apply_elementwise, ColExpr, Column, CombineOp, Frame};
pub use trace::{Introspect, TracedFn};
