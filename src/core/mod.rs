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

//! Core types for Rowlift
//!
//! This module provides the fundamental types shared by every analysis
//! stage: the [`Error`] enum with its [`Result`] alias, and the [`Value`]
//! type used for constant-pool entries, folded captures, and column cells.

pub mod error;
pub mod value;

pub use error::{Error, Result};
pub use value::{DataType, Value};
