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

//! # Protean Core
//!
//! Core implementation of the Protean serialization framework: a
//! format-agnostic engine that converts application types to and from
//! arbitrary wire formats without per-type, per-format glue.
//!
//! ## Architecture
//!
//! - **`model`**: descriptors — metadata, capability records, the arena
//!   registry, and shape classification
//! - **`protocol`**: the push/pull traversal contract format backends
//!   implement (`Sink` for serialization, `Source` for deserialization)
//! - **`strategy`**: compiled per-shape strategies, one per descriptor per
//!   direction
//! - **`resolve`**: recursive bottom-up resolution with cycle-breaking
//!   placeholder bindings, wrapper composition, and the strategy cache
//! - **`describe`**: how Rust types register — built-in adapters plus
//!   struct/union definition builders
//! - **`backend`**: in-repo protocol implementers (recording/replay and a
//!   packed binary format)
//! - **`protean`**: the engine value tying it all together
//!
//! ## Key Concepts
//!
//! Every type is classified into exactly one *shape* — primitive, text,
//! bytes, option, seq, map, tuple, struct, or union — by priority-ordered
//! rules over its capability record. The resolver walks the dependency
//! graph depth-first, breaks cycles with late-bound placeholder bindings,
//! composes cross-cutting wrappers in a fixed order, and caches the result
//! per engine for concurrent reuse.
//!
//! Statically-known types go through [`Protean::serialize`] /
//! [`Protean::deserialize`]; values typed only at runtime go through
//! [`Protean::serialize_value`] / [`Protean::deserialize_value`] against
//! the same cached strategies.

pub mod backend;
pub mod config;
pub mod describe;
pub mod error;
pub mod model;
pub mod protean;
pub mod protocol;
pub mod resolve;
pub mod strategy;
pub mod types;
pub mod util;

pub use config::StrategyOverride;
pub use describe::Describe;
pub use error::Error;
pub use protean::Protean;
pub use types::{
    DuplicateKeys, Nullability, PrimitiveKind, PrimitiveValue, Shape, TypeToken, UnionStyle,
};
