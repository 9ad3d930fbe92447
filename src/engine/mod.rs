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

//! Engine expression surface
//!
//! The native expression language the code generator targets, its
//! vectorized evaluator over in-memory column frames, and the row-wise
//! apply path the analysis exists to discourage.

pub mod apply;
pub mod eval;
pub mod expr;

pub use apply::apply_elementwise;
pub use eval::{Column, Frame};
pub use expr::{ColExpr, CombineOp};
