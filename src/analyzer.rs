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

//! Callback analyzer - the full analysis pipeline behind one call
//!
//! Runs extraction, stack-machine replay, the feasibility gate and code
//! generation in order, short-circuiting on the first refusal. The
//! analyzer holds no mutable state and reuses nothing between calls, so
//! re-analyzing the same callable is idempotent by construction.

use tracing::debug;

use crate::codegen;
use crate::core::Result;
use crate::engine::ColExpr;
use crate::expr::simulate;
use crate::feasibility;
use crate::trace::{extract, Introspect};

/// What the row-wise callback is attached to
///
/// Analysis is identical for every target; the target names the API
/// surface in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyTarget {
    /// Callback applied inside an engine expression
    Expression,
}

impl ApplyTarget {
    /// API surface name used in diagnostic messages
    pub fn surface(&self) -> &'static str {
        match self {
            ApplyTarget::Expression => "expression",
        }
    }
}

/// An accepted rewrite: the native expression and its rendered text
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    /// The composed native expression
    pub expr: ColExpr,
    /// Rendered expression text, as surfaced in diagnostics
    pub text: String,
}

/// Analysis pipeline for one row-wise callback
pub struct CallbackAnalyzer<'a> {
    callable: &'a dyn Introspect,
    target: ApplyTarget,
}

impl<'a> CallbackAnalyzer<'a> {
    /// Create an analyzer for a callback attached to `target`
    pub fn new(callable: &'a dyn Introspect, target: ApplyTarget) -> Self {
        CallbackAnalyzer { callable, target }
    }

    /// The surface this callback is attached to
    pub fn target(&self) -> ApplyTarget {
        self.target
    }

    /// Name of the callable under analysis
    pub fn callable_name(&self) -> &str {
        self.callable.name()
    }

    /// Run the full pipeline, producing the equivalent native expression
    /// over `column`
    pub fn rewrite(&self, column: &str) -> Result<Rewrite> {
        let trace = extract(self.callable)?;
        let tree = simulate(trace)?;
        feasibility::check(&tree, &trace.symbols)?;
        let expr = codegen::lower(&tree, column);
        let text = expr.to_string();
        debug!(
            callable = %self.callable.name(),
            column = %column,
            expression = %text,
            "callback accepted for rewrite"
        );
        Ok(Rewrite { expr, text })
    }

    /// Rendered expression text for an accepted callback
    pub fn expression_text(&self, column: &str) -> Result<String> {
        self.rewrite(column).map(|r| r.text)
    }

    /// Verdict form: true when the callback lowers to a native expression
    pub fn can_rewrite(&self, column: &str) -> bool {
        self.rewrite(column).is_ok()
    }
}
