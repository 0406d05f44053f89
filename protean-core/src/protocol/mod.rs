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

//! The traversal protocol: the sole contract format backends implement.
//!
//! Serialization pushes: a strategy walks one value and feeds shape events
//! into a caller-supplied [`Sink`]. Deserialization pulls: a strategy asks a
//! caller-supplied [`Source`] for parsed events and accumulates the value
//! from parts. Backends never see concrete Rust types — only the shape
//! vocabulary plus wire labels.
//!
//! Struct and union traversal hand the backend an indexed accessor
//! ([`StructAccess`], [`PayloadAccess`]) instead of a fixed event stream, so
//! the backend controls field iteration order and may skip fields entirely
//! (partial or columnar output).
//!
//! Backend failures travel as [`crate::error::Error::Format`] and pass
//! through the engine unchanged. A backend whose methods block simply blocks
//! the traversal; the engine itself performs no I/O.

use crate::error::Error;
use crate::types::{PrimitiveKind, PrimitiveValue, UnionStyle};

/// Wire-facing label of one struct field, precomputed at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireField {
    /// Effective label after rename rules.
    pub label: String,
    /// Compact integer key for formats that prefer numbers.
    pub int_key: Option<u32>,
}

/// Wire-facing label of one union variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireVariant {
    pub label: String,
    pub tag: u32,
    pub has_payload: bool,
}

/// Declared or unknown element count reported by a pull backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeHint {
    Known(usize),
    Unknown,
}

impl SizeHint {
    pub fn known(self) -> Option<usize> {
        match self {
            SizeHint::Known(n) => Some(n),
            SizeHint::Unknown => None,
        }
    }
}

/// Indexed accessor over one struct value, exposed to the sink during
/// traversal. Only ser-included fields are visible.
pub trait StructAccess {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn field(&self, index: usize) -> &WireField;

    /// Serializes field `index` into `sink`.
    fn drive(&self, index: usize, sink: &mut dyn Sink) -> Result<(), Error>;
}

/// Accessor over a union variant's payload.
pub trait PayloadAccess {
    fn drive(&self, sink: &mut dyn Sink) -> Result<(), Error>;
}

/// Push side: the format backend consuming one traversal.
pub trait Sink {
    fn primitive(&mut self, value: PrimitiveValue) -> Result<(), Error>;

    fn text(&mut self, text: &str) -> Result<(), Error>;

    fn bytes(&mut self, bytes: &[u8]) -> Result<(), Error>;

    /// An absent optional or a null reference.
    fn none(&mut self) -> Result<(), Error>;

    /// Marks a present optional; the inner value follows immediately.
    fn some(&mut self) -> Result<(), Error>;

    fn begin_seq(&mut self, len: usize) -> Result<(), Error>;

    fn end_seq(&mut self) -> Result<(), Error>;

    fn begin_map(&mut self, len: usize) -> Result<(), Error>;

    /// Called before each key; the key value follows, then the value.
    fn map_key(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn map_value(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn end_map(&mut self) -> Result<(), Error>;

    fn begin_tuple(&mut self, arity: usize) -> Result<(), Error>;

    fn end_tuple(&mut self) -> Result<(), Error>;

    /// One struct value. The sink drives the accessor in whatever order it
    /// wants and may skip fields.
    fn strukt(&mut self, name: &str, access: &dyn StructAccess) -> Result<(), Error>;

    /// One union value: the selected variant plus its payload, if any.
    fn union(
        &mut self,
        name: &str,
        variant: &WireVariant,
        style: UnionStyle,
        payload: Option<&dyn PayloadAccess>,
    ) -> Result<(), Error>;
}

/// Pull side: the format backend feeding one accumulation.
pub trait Source {
    /// The next scalar, expected to be of `kind`. Backends may coerce their
    /// native representation; the strategy verifies the kind on return.
    fn primitive(&mut self, kind: PrimitiveKind) -> Result<PrimitiveValue, Error>;

    fn text(&mut self) -> Result<String, Error>;

    fn bytes(&mut self) -> Result<Vec<u8>, Error>;

    /// Presence flag of an optional or guarded value.
    fn is_some(&mut self) -> Result<bool, Error>;

    fn begin_seq(&mut self) -> Result<SizeHint, Error>;

    /// Consulted only when `begin_seq` reported [`SizeHint::Unknown`].
    fn seq_more(&mut self) -> Result<bool, Error>;

    fn end_seq(&mut self) -> Result<(), Error>;

    fn begin_map(&mut self) -> Result<SizeHint, Error>;

    fn map_more(&mut self) -> Result<bool, Error>;

    fn end_map(&mut self) -> Result<(), Error>;

    fn begin_tuple(&mut self, arity: usize) -> Result<(), Error>;

    fn end_tuple(&mut self) -> Result<(), Error>;

    fn begin_struct(&mut self, name: &str, fields: &[WireField]) -> Result<(), Error>;

    /// The ordinal (into `fields`) of the next present field, or `None` at
    /// the end of the struct. Backends resolve labels or integer keys to
    /// ordinals and skip unknown fields themselves.
    fn field_ordinal(&mut self, fields: &[WireField]) -> Result<Option<usize>, Error>;

    fn end_struct(&mut self) -> Result<(), Error>;

    /// The ordinal (into `variants`) of the encoded variant.
    fn variant(
        &mut self,
        name: &str,
        variants: &[WireVariant],
        style: UnionStyle,
    ) -> Result<usize, Error>;

    fn end_variant(&mut self) -> Result<(), Error>;
}
