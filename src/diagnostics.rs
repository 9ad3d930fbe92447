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

//! Performance diagnostics for row-wise callbacks
//!
//! The diagnostic surface is advisory: it fires whenever a row-wise
//! callback is attached, whether or not the analysis produced a rewrite,
//! and it never changes what gets evaluated. A [`DiagnosticSink`] decides
//! where warnings go; the default sink routes through `tracing::warn!`.

use std::sync::Mutex;

use tracing::warn;

use crate::analyzer::{ApplyTarget, CallbackAnalyzer};
use crate::core::Error;
use crate::engine::ColExpr;
use crate::registry::global_registry;
use crate::trace::Introspect;

/// Category attached to every warning emitted here
pub const WARNING_CATEGORY: &str = "inefficient row-wise evaluation";

/// One emitted performance warning
#[derive(Debug, Clone, PartialEq)]
pub struct PerfWarning {
    /// Warning category, always [`WARNING_CATEGORY`]
    pub category: &'static str,
    /// Source location that attached the callback
    pub call_site: String,
    /// The generic slowness message
    pub message: String,
    /// Equivalent native expression text, when one was found
    pub suggestion: Option<String>,
}

/// Destination for emitted warnings
pub trait DiagnosticSink: Send + Sync {
    /// Deliver one warning
    fn emit(&self, warning: PerfWarning);
}

/// Default sink: structured `tracing` warnings
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, warning: PerfWarning) {
        match &warning.suggestion {
            Some(suggestion) => warn!(
                category = warning.category,
                call_site = %warning.call_site,
                suggestion = %suggestion,
                "{}",
                warning.message
            ),
            None => warn!(
                category = warning.category,
                call_site = %warning.call_site,
                "{}",
                warning.message
            ),
        }
    }
}

/// Test sink that retains every warning
#[derive(Debug, Default)]
pub struct CollectingSink {
    warnings: Mutex<Vec<PerfWarning>>,
}

impl CollectingSink {
    /// Create an empty collecting sink
    pub fn new() -> Self {
        CollectingSink::default()
    }

    /// Snapshot of the warnings emitted so far
    pub fn warnings(&self) -> Vec<PerfWarning> {
        self.warnings.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// Drain and return the warnings emitted so far
    pub fn take(&self) -> Vec<PerfWarning> {
        self.warnings
            .lock()
            .map(|mut w| std::mem::take(&mut *w))
            .unwrap_or_default()
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, warning: PerfWarning) {
        if let Ok(mut warnings) = self.warnings.lock() {
            warnings.push(warning);
        }
    }
}

/// Analyze `callable` and emit the performance warning for a row-wise
/// application over `column`
///
/// The warning always fires. When the pipeline accepts the callback, the
/// warning carries the equivalent native expression text. When the
/// callable is opaque but is itself a recognized native operator, the
/// suggestion is to call that operator directly. Every other refusal
/// yields the generic warning with no suggestion.
pub fn warn_on_inefficient_apply(
    callable: &dyn Introspect,
    target: ApplyTarget,
    column: &str,
    call_site: &str,
    sink: &dyn DiagnosticSink,
) {
    let analyzer = CallbackAnalyzer::new(callable, target);
    let suggestion = match analyzer.rewrite(column) {
        Ok(rewrite) => Some(rewrite.text),
        // an opaque callable can still be a native operator passed
        // directly as the callback
        Err(Error::Unintrospectable(_)) => global_registry()
            .vectorized_equivalent(callable.name())
            .map(|entry| {
                ColExpr::func(entry.native_name, ColExpr::col(column), Vec::new()).to_string()
            }),
        Err(_) => None,
    };

    let message = format!(
        "row-wise callback '{}' over column \"{}\" is significantly slower than the native {} API",
        callable.name(),
        column,
        target.surface(),
    );
    let suggestion = suggestion
        .map(|text| format!("in this case, you can replace the callback with: {}", text));

    sink.emit(PerfWarning {
        category: WARNING_CATEGORY,
        call_site: call_site.to_string(),
        message,
        suggestion,
    });
}
