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

//! Instruction traces and their extraction
//!
//! This module provides:
//!
//! - [`Opcode`] / [`Instruction`] - the decoded operation sequence the
//!   host runtime produces for a compiled callable
//! - [`FnTrace`] / [`SymbolTable`] - one callable's trace plus constant
//!   pool and variable-binding metadata
//! - [`Introspect`] / [`extract`] - the introspection facility, with
//!   [`TracedFn`] as the concrete compiled-callback handle

pub mod extract;
pub mod opcode;

pub use extract::{extract, FnTrace, Introspect, SymbolTable, TraceBuilder, TracedFn};
pub use opcode::{Instruction, Opcode};
