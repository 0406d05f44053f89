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

//! Type description: how Rust types enter the engine.
//!
//! [`Describe`] registers a type's descriptor — metadata plus capability
//! record — into a [`TypeRegistry`] on first request. Built-in adapters
//! cover primitives, strings, byte buffers, collections, maps, tuples,
//! arrays, options, pointers and chrono dates; application structs and
//! unions register through [`StructDef`](struct_::StructDef) and
//! [`UnionDef`](union_::UnionDef).
//!
//! Self-referential types must claim their token with
//! [`TypeRegistry::reserve`] *before* describing nested fields, so the
//! recursive lookup finds the reserved token:
//!
//! ```
//! use protean_core::describe::{Describe, StructDef};
//! use protean_core::error::Error;
//! use protean_core::model::meta::TypeMeta;
//! use protean_core::model::registry::TypeRegistry;
//! use protean_core::types::TypeToken;
//!
//! struct Node {
//!     value: i64,
//!     children: Vec<Node>,
//! }
//!
//! impl Describe for Node {
//!     fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
//!         let token = types.reserve::<Node>(TypeMeta::named("Node"))?;
//!         let caps = StructDef::new()
//!             .field(types, "value", |node: &Node| &node.value)?
//!             .field(types, "children", |node: &Node| &node.children)?
//!             .assemble(|mut parts| {
//!                 Ok(Node {
//!                     value: parts.take(0)?,
//!                     children: parts.take(1)?,
//!                 })
//!             })
//!             .into_caps()?;
//!         types.complete(token, caps)
//!     }
//! }
//! ```

use std::any::Any;

use crate::error::Error;
use crate::model::registry::TypeRegistry;
use crate::types::TypeToken;

pub mod collection;
pub mod datetime;
pub mod map;
pub mod option;
pub mod pointer;
pub mod primitive;
pub mod struct_;
pub mod text;
pub mod tuple;
pub mod union_;

pub use struct_::StructDef;
pub use union_::UnionDef;

/// A type the engine can resolve strategies for.
pub trait Describe: Sized + 'static {
    /// Registers this type's descriptor (and, transitively, its nested
    /// descriptors) and returns its token. Called at most once per registry;
    /// later requests hit the identity map.
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error>;
}

/// Downcasts a borrowed erased value.
pub fn cast_ref<T: 'static>(value: &dyn Any) -> Result<&T, Error> {
    value.downcast_ref::<T>().ok_or_else(|| {
        Error::type_error(format!("value is not a {}", std::any::type_name::<T>()))
    })
}

/// Downcasts a mutable erased accumulator.
pub fn cast_mut<T: 'static>(value: &mut dyn Any) -> Result<&mut T, Error> {
    match value.downcast_mut::<T>() {
        Some(typed) => Ok(typed),
        None => Err(Error::type_error(format!(
            "accumulator is not a {}",
            std::any::type_name::<T>()
        ))),
    }
}

/// Downcasts an owned erased value.
pub fn cast_box<T: 'static>(value: Box<dyn Any>) -> Result<T, Error> {
    match value.downcast::<T>() {
        Ok(boxed) => Ok(*boxed),
        Err(_) => Err(Error::type_error(format!(
            "boxed value is not a {}",
            std::any::type_name::<T>()
        ))),
    }
}

/// Unwraps and downcasts a union payload inside a `build` function.
pub fn cast_payload<T: 'static>(payload: Option<Box<dyn Any>>) -> Result<T, Error> {
    match payload {
        Some(payload) => cast_box(payload),
        None => Err(Error::mismatched_shape(format!(
            "variant payload of type {} is missing",
            std::any::type_name::<T>()
        ))),
    }
}
