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

//! Trace extraction - the host runtime's introspection facility
//!
//! Given a callable, extraction yields the ordered instruction sequence
//! plus its constant pool and variable-binding metadata, or fails with
//! [`Error::Unintrospectable`] for opaque/native callables. Extraction is
//! side-effect-free and never executes the callable.
//!
//! Captured bindings are resolved exactly once, at trace construction
//! time, into [`Value`]s; the analysis folds them as constants and never
//! re-reads them.

use crate::core::{Error, Result, Value};
use crate::trace::{Instruction, Opcode};

/// Per-analysis symbol metadata: parameter slots and captured bindings
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    params: Vec<String>,
    bindings: Vec<(String, Value)>,
}

impl SymbolTable {
    /// Create a symbol table from parameter names and resolved captures
    pub fn new(params: Vec<String>, bindings: Vec<(String, Value)>) -> Self {
        SymbolTable { params, bindings }
    }

    /// Number of parameters the callable declares
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Name of the parameter in `slot`
    pub fn param_name(&self, slot: u32) -> Option<&str> {
        self.params.get(slot as usize).map(String::as_str)
    }

    /// Resolved value of the captured binding in `slot`
    pub fn binding(&self, slot: u32) -> Option<&(String, Value)> {
        self.bindings.get(slot as usize)
    }
}

/// The introspection product for one callable: instruction sequence plus
/// auxiliary metadata
#[derive(Debug, Clone)]
pub struct FnTrace {
    /// Callable name, as the host runtime reports it
    pub name: String,
    /// Constant pool
    pub consts: Vec<Value>,
    /// Name pool (attributes, methods, free functions)
    pub names: Vec<String>,
    /// Parameter slots and folded captures
    pub symbols: SymbolTable,
    /// Ordered instruction sequence
    pub instructions: Vec<Instruction>,
}

/// A callable the host runtime can describe
///
/// Implementations must not execute the callable to answer either method.
pub trait Introspect {
    /// Callable name, for diagnostics and the direct-native lookup
    fn name(&self) -> &str;

    /// The compiled instruction trace, or `Unintrospectable` when the
    /// callable's underlying representation cannot be obtained
    fn introspect(&self) -> Result<&FnTrace>;
}

/// Obtain the instruction trace for a callable
///
/// Thin front door over [`Introspect::introspect`], kept so the pipeline
/// stages read uniformly as free functions.
pub fn extract(callable: &dyn Introspect) -> Result<&FnTrace> {
    callable.introspect()
}

type Body = Box<dyn Fn(&Value) -> Value + Send + Sync>;

/// A compiled-callback handle from the host runtime
///
/// Pairs an introspectable trace with the executable body, so the
/// row-wise evaluation path can still invoke the callback. Analysis only
/// ever touches the trace. Opaque handles model native callables: they
/// carry a body but no trace.
pub struct TracedFn {
    name: String,
    trace: Option<FnTrace>,
    body: Body,
}

impl std::fmt::Debug for TracedFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracedFn")
            .field("name", &self.name)
            .field("traced", &self.trace.is_some())
            .finish()
    }
}

impl TracedFn {
    /// Start building a traced callable
    pub fn builder(name: impl Into<String>) -> TraceBuilder {
        TraceBuilder::new(name)
    }

    /// An opaque/native callable: executable, but with no inspectable body
    pub fn opaque(name: impl Into<String>, body: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        TracedFn {
            name: name.into(),
            trace: None,
            body: Box::new(body),
        }
    }

    /// Invoke the callback on one element (the row-wise path)
    pub fn call(&self, value: &Value) -> Value {
        (self.body)(value)
    }
}

impl Introspect for TracedFn {
    fn name(&self) -> &str {
        &self.name
    }

    fn introspect(&self) -> Result<&FnTrace> {
        self.trace
            .as_ref()
            .ok_or_else(|| Error::Unintrospectable(self.name.clone()))
    }
}

/// Builder for [`TracedFn`]
///
/// Instruction offsets are assigned automatically, two units apart, in
/// the order instructions are appended; jump targets are expressed in
/// the same units.
pub struct TraceBuilder {
    name: String,
    params: Vec<String>,
    bindings: Vec<(String, Value)>,
    consts: Vec<Value>,
    names: Vec<String>,
    opcodes: Vec<Opcode>,
    body: Option<Body>,
}

impl TraceBuilder {
    fn new(name: impl Into<String>) -> Self {
        TraceBuilder {
            name: name.into(),
            params: Vec::new(),
            bindings: Vec::new(),
            consts: Vec::new(),
            names: Vec::new(),
            opcodes: Vec::new(),
            body: None,
        }
    }

    /// Declare a parameter (slot order is declaration order)
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(name.into());
        self
    }

    /// Declare a captured binding, resolved to its analysis-time value
    pub fn bind(mut self, name: impl Into<String>, value: Value) -> Self {
        self.bindings.push((name.into(), value));
        self
    }

    /// Append a constant-pool entry
    pub fn constant(mut self, value: Value) -> Self {
        self.consts.push(value);
        self
    }

    /// Append a name-pool entry
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Append an instruction
    pub fn instr(mut self, opcode: Opcode) -> Self {
        self.opcodes.push(opcode);
        self
    }

    /// Attach the executable body (identity when omitted)
    pub fn body(mut self, body: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.body = Some(Box::new(body));
        self
    }

    /// Finish the handle
    pub fn build(self) -> TracedFn {
        let instructions = self
            .opcodes
            .into_iter()
            .enumerate()
            .map(|(i, opcode)| Instruction::new(opcode, (i as u32) * 2))
            .collect();
        let trace = FnTrace {
            name: self.name.clone(),
            consts: self.consts,
            names: self.names,
            symbols: SymbolTable::new(self.params, self.bindings),
            instructions,
        };
        TracedFn {
            name: self.name,
            trace: Some(trace),
            body: self.body.unwrap_or_else(|| Box::new(|v: &Value| v.clone())),
        }
    }
}
