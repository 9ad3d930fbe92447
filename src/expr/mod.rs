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

//! Expression model and the simulator that builds it
//!
//! - [`Expr`] and the operator enums - the reconstructed semantic tree
//! - [`simulate`] - the stack-machine replay that turns an instruction
//!   trace into exactly one tree

pub mod ast;
pub mod simulate;

pub use ast::{BinaryOperator, CompareOperator, Expr, LogicalKind, UnaryOperator};
pub use simulate::simulate;
