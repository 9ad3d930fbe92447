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

//! Function/Method Registry
//!
//! A static, read-only mapping from recognized external function and
//! method names to the engine's native operator names. Built once behind
//! a `OnceLock` so feasibility decisions stay total and auditable; there
//! is no dynamic registration.
//!
//! Two lookup paths exist: free functions invoked by name (matched bare
//! or module-qualified), and attribute-style calls matched by method
//! name. The feasibility gate additionally requires method receivers to
//! be the callback's sole input, so calls on unrelated objects are never
//! rewritten.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

/// Global registry instance
static GLOBAL_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

/// Get the global function registry
#[inline]
pub fn global_registry() -> &'static FunctionRegistry {
    GLOBAL_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// One registry entry: the native operator a recognized callee maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeFn {
    /// Native operator name in the engine's expression language
    pub native_name: &'static str,
    /// Arguments the callee requires beyond its receiver/input
    pub arg_count: usize,
    /// Whether the callee is itself already a native vectorized
    /// operation when passed directly as the callback
    pub vectorized: bool,
}

/// Elementwise free functions with a native equivalent
///
/// These are all native vectorized operations: wrapping one of them in a
/// row-wise callback is flagged even when the trace itself cannot be
/// obtained.
const FUNCTIONS: &[(&str, &str)] = &[
    ("sqrt", "sqrt"),
    ("cbrt", "cbrt"),
    ("sin", "sin"),
    ("cos", "cos"),
    ("tan", "tan"),
    ("sinh", "sinh"),
    ("cosh", "cosh"),
    ("tanh", "tanh"),
    ("arcsin", "arcsin"),
    ("arccos", "arccos"),
    ("arctan", "arctan"),
    ("exp", "exp"),
    ("log", "log"),
    ("log10", "log10"),
    ("log1p", "log1p"),
    ("sign", "sign"),
];

/// Recognized methods (receiver must be the callback's sole input)
const METHODS: &[(&str, &str)] = &[
    ("upper", "to_uppercase"),
    ("lower", "to_lowercase"),
    ("title", "to_titlecase"),
    ("strip", "strip_chars"),
];

/// Registry of recognized callees
pub struct FunctionRegistry {
    functions: FxHashMap<&'static str, NativeFn>,
    methods: FxHashMap<&'static str, NativeFn>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Create a registry with all recognized callees
    pub fn new() -> Self {
        let mut functions = FxHashMap::default();
        for &(external, native) in FUNCTIONS {
            functions.insert(
                external,
                NativeFn {
                    native_name: native,
                    arg_count: 1,
                    vectorized: true,
                },
            );
        }

        let mut methods = FxHashMap::default();
        for &(external, native) in METHODS {
            methods.insert(
                external,
                NativeFn {
                    native_name: native,
                    arg_count: 0,
                    vectorized: false,
                },
            );
        }

        FunctionRegistry { functions, methods }
    }

    /// Look up a free function by bare or module-qualified name
    /// ("sqrt" and "math.sqrt" resolve identically)
    pub fn lookup_function(&self, name: &str) -> Option<&NativeFn> {
        let bare = name.rsplit('.').next().unwrap_or(name);
        self.functions.get(bare)
    }

    /// Look up a method by name
    pub fn lookup_method(&self, name: &str) -> Option<&NativeFn> {
        self.methods.get(name)
    }

    /// If `name` names a callee that is itself already a native
    /// vectorized operation, return its entry. Used when such a callee
    /// is passed directly as the row-wise callback: there is no tree to
    /// build, but the user should call the native operator instead.
    pub fn vectorized_equivalent(&self, name: &str) -> Option<&NativeFn> {
        self.lookup_function(name).filter(|f| f.vectorized)
    }

    /// List all recognized free-function names
    pub fn function_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// List all recognized method names
    pub fn method_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.methods.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
