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

//! Error types for Rowlift
//!
//! Every failure here is recoverable at the call site: a failed analysis
//! only means "no rewrite suggestion", never a computation error. The
//! row-wise evaluation the analysis was attached to proceeds unchanged.

use thiserror::Error;

/// Result type alias for Rowlift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for callback analysis and expression evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // =========================================================================
    // Analysis failures (suggestion withheld, row-wise path unaffected)
    // =========================================================================
    /// The callable's instruction trace cannot be obtained (opaque/native
    /// callable with no inspectable body)
    #[error("callable '{0}' has no inspectable instruction trace")]
    Unintrospectable(String),

    /// The callback takes more than one input; only single-parameter scalar
    /// transforms over one column are rewrite candidates
    #[error("callback takes {0} parameters; only single-parameter callbacks can be rewritten")]
    MultiArgument(usize),

    /// The trace contains an operation with no modeled native equivalent
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A boolean combination does not match any supported short-circuit
    /// nesting template
    #[error("unsupported boolean control flow at offset {0}")]
    UnsupportedControlFlow(u32),

    /// A called function or method has no registry entry mapping it to a
    /// native vectorized operator
    #[error("no native equivalent registered for callee '{0}'")]
    UnknownCallee(String),

    /// The reconstructed tree never references the callback's input, so
    /// there is nothing to vectorize
    #[error("callback never references its input; nothing to vectorize")]
    ConstantsOnly,

    /// Internal invariant violation while replaying the trace (stack
    /// under/overflow, bad pool index). Should never trigger on a
    /// well-formed single-expression callback.
    #[error("malformed instruction trace: {0}")]
    MalformedTrace(String),

    // =========================================================================
    // Engine expression evaluation errors
    // =========================================================================
    /// Column not found in the frame
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    /// Column length does not match the frame
    #[error("column length mismatch, expected {expected}, got {got}")]
    ColumnLengthMismatch { expected: usize, got: usize },

    /// An operator was applied to values it is not defined for
    #[error("cannot apply '{op}' to {left} and {right}")]
    InvalidOperation {
        op: String,
        left: String,
        right: String,
    },
}

impl Error {
    /// Create an `UnsupportedOperation` error
    pub fn unsupported(what: impl Into<String>) -> Self {
        Error::UnsupportedOperation(what.into())
    }

    /// Create a `MalformedTrace` error
    pub fn malformed(detail: impl Into<String>) -> Self {
        Error::MalformedTrace(detail.into())
    }

    /// Create an `UnknownCallee` error
    pub fn unknown_callee(name: impl Into<String>) -> Self {
        Error::UnknownCallee(name.into())
    }

    /// Create an `InvalidOperation` error
    pub fn invalid_operation(
        op: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Error::InvalidOperation {
            op: op.into(),
            left: left.into(),
            right: right.into(),
        }
    }

    /// Returns true if this failure belongs to the analysis pipeline (as
    /// opposed to engine expression evaluation)
    pub fn is_analysis_failure(&self) -> bool {
        matches!(
            self,
            Error::Unintrospectable(_)
                | Error::MultiArgument(_)
                | Error::UnsupportedOperation(_)
                | Error::UnsupportedControlFlow(_)
                | Error::UnknownCallee(_)
                | Error::ConstantsOnly
                | Error::MalformedTrace(_)
        )
    }
}
