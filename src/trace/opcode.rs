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

//! Instruction model for compiled callback traces
//!
//! The host runtime's introspection facility yields an ordered sequence
//! of [`Instruction`]s per callable. Opcodes form a closed enum so the
//! simulator is a single exhaustive match loop; operations the analysis
//! does not model (subscripting) still decode, and are refused during
//! simulation rather than at decode time.

use crate::expr::{BinaryOperator, CompareOperator, UnaryOperator};

/// One decoded operation of a compiled callback
///
/// Index arguments refer to the owning trace's pools: `LoadConst` into
/// the constant pool, `LoadParam` into the parameter slots,
/// `LoadBinding` into the captured-binding slots, and the name-carrying
/// opcodes into the name pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Push constant-pool entry `.0`
    LoadConst(u32),
    /// Push the parameter in slot `.0`
    LoadParam(u32),
    /// Push the captured binding in slot `.0`, folded to a constant
    LoadBinding(u32),
    /// Pop a base, push the attribute named by pool entry `.0`
    LoadAttr(u32),
    /// Pop a base, push a bound-method reference named by pool entry `.0`
    LoadMethod(u32),
    /// Pop two operands, push a binary operation
    Binary(BinaryOperator),
    /// Pop one operand, push a unary operation
    Unary(UnaryOperator),
    /// Pop two operands, push a comparison
    Compare(CompareOperator),
    /// Short-circuit `and`: if the top of stack is falsy, jump to offset
    /// `.0` leaving it in place; otherwise pop it
    JumpIfFalseOrPop(u32),
    /// Short-circuit `or`: if the top of stack is truthy, jump to offset
    /// `.0` leaving it in place; otherwise pop it
    JumpIfTrueOrPop(u32),
    /// Pop `argc` arguments, push a call of the free function named by
    /// pool entry `name`
    CallFunction { name: u32, argc: u32 },
    /// Pop `.0` arguments and a bound-method reference, push the call
    CallMethod(u32),
    /// Pop `.0` values, push a sequence literal
    BuildList(u32),
    /// Subscripting; decoded but never modeled
    Subscript,
    /// End of trace; the single remaining stack entry is the result
    Return,
}

impl Opcode {
    /// Mnemonic used in trace dumps and malformed-trace diagnostics
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::LoadConst(_) => "LOAD_CONST",
            Opcode::LoadParam(_) => "LOAD_PARAM",
            Opcode::LoadBinding(_) => "LOAD_BINDING",
            Opcode::LoadAttr(_) => "LOAD_ATTR",
            Opcode::LoadMethod(_) => "LOAD_METHOD",
            Opcode::Binary(_) => "BINARY_OP",
            Opcode::Unary(_) => "UNARY_OP",
            Opcode::Compare(_) => "COMPARE_OP",
            Opcode::JumpIfFalseOrPop(_) => "JUMP_IF_FALSE_OR_POP",
            Opcode::JumpIfTrueOrPop(_) => "JUMP_IF_TRUE_OR_POP",
            Opcode::CallFunction { .. } => "CALL_FUNCTION",
            Opcode::CallMethod(_) => "CALL_METHOD",
            Opcode::BuildList(_) => "BUILD_LIST",
            Opcode::Subscript => "SUBSCRIPT",
            Opcode::Return => "RETURN",
        }
    }
}

/// One instruction with its position in the trace
///
/// `offset` is the unit jump targets are expressed in, and doubles as
/// position metadata for diagnostics. Instructions are immutable and
/// produced once per analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub offset: u32,
}

impl Instruction {
    /// Create an instruction at the given offset
    pub fn new(opcode: Opcode, offset: u32) -> Self {
        Instruction { opcode, offset }
    }
}
