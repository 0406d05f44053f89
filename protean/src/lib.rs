// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! # Protean
//!
//! Protean is a format-agnostic serialization framework: application types
//! convert to and from arbitrary wire formats through one type-driven
//! engine, with no per-type, per-format glue.
//!
//! The engine classifies every type into a structural *shape*, resolves a
//! strategy graph bottom-up (self-referential types included), and caches
//! the result for concurrent reuse. Format backends plug in by implementing
//! the two-trait traversal protocol: [`Sink`](protean_core::protocol::Sink)
//! on the push side, [`Source`](protean_core::protocol::Source) on the pull
//! side.
//!
//! ## Example
//!
//! ```
//! use protean::Protean;
//! use std::collections::HashMap;
//!
//! let engine = Protean::default();
//!
//! let mut scores = HashMap::new();
//! scores.insert("a".to_string(), 1i64);
//! scores.insert("b".to_string(), 2i64);
//!
//! let bytes = engine.to_bytes(&scores).unwrap();
//! let back: HashMap<String, i64> = engine.from_bytes(&bytes).unwrap();
//! assert_eq!(back, scores);
//! ```
//!
//! Application structs and enums register through the definition builders;
//! see [`describe`](protean_core::describe) for the registration idiom,
//! including self-referential types.

pub use protean_core::backend;
pub use protean_core::config;
pub use protean_core::describe;
pub use protean_core::error;
pub use protean_core::model;
pub use protean_core::protocol;
pub use protean_core::resolve;
pub use protean_core::strategy;
pub use protean_core::types;

pub use protean_core::{
    Describe, DuplicateKeys, Error, Nullability, PrimitiveKind, PrimitiveValue, Protean, Shape,
    StrategyOverride, TypeToken, UnionStyle,
};

/// Commonly used items in one import.
pub mod prelude {
    pub use protean_core::backend::packed::{PackedSink, PackedSource};
    pub use protean_core::backend::record::{Event, RecordingSink, ReplaySource};
    pub use protean_core::describe::{cast_payload, Describe, StructDef, UnionDef};
    pub use protean_core::model::meta::{FieldMeta, TypeMeta, VariantMeta};
    pub use protean_core::protocol::{Sink, Source};
    pub use protean_core::{DuplicateKeys, Error, Protean, Shape, TypeToken, UnionStyle};
}
