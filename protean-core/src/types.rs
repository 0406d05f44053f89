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

//! Core type identities, the shape vocabulary, and wire-level constants.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Stable identity of one type under resolution.
///
/// A token is an index into the engine's descriptor arena. The same Rust type
/// registered under a different [`Nullability`] context yields a distinct
/// token, and therefore a distinct strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeToken(pub(crate) u32);

impl TypeToken {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub(crate) fn from_index(index: usize) -> TypeToken {
        TypeToken(index as u32)
    }
}

/// Nullability context of a descriptor. Part of token identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nullability {
    /// A value must always be present.
    Required,
    /// Absence is representable and tolerated on both directions.
    Nullable,
}

/// Structural classification of a value. Every descriptor maps to exactly
/// one shape; the priority rules live in [`crate::model::shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Primitive(PrimitiveKind),
    Text,
    Bytes,
    Option,
    Seq,
    Map,
    Tuple,
    Struct,
    Union,
}

/// The closed set of primitive kinds the protocol speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
}

/// A primitive scalar crossing the traversal protocol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveValue {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
}

impl PrimitiveValue {
    #[inline(always)]
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            PrimitiveValue::Bool(_) => PrimitiveKind::Bool,
            PrimitiveValue::I8(_) => PrimitiveKind::I8,
            PrimitiveValue::I16(_) => PrimitiveKind::I16,
            PrimitiveValue::I32(_) => PrimitiveKind::I32,
            PrimitiveValue::I64(_) => PrimitiveKind::I64,
            PrimitiveValue::U8(_) => PrimitiveKind::U8,
            PrimitiveValue::U16(_) => PrimitiveKind::U16,
            PrimitiveValue::U32(_) => PrimitiveKind::U32,
            PrimitiveValue::U64(_) => PrimitiveKind::U64,
            PrimitiveValue::F32(_) => PrimitiveKind::F32,
            PrimitiveValue::F64(_) => PrimitiveKind::F64,
            PrimitiveValue::Char(_) => PrimitiveKind::Char,
        }
    }
}

/// How a union variant tag is encoded relative to its payload.
///
/// Chosen by the external metadata layer; the engine only threads the choice
/// through to the constructed strategy and the format backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum UnionStyle {
    /// `{"Variant": payload}`-style wrapping.
    External = 0,
    /// Tag embedded inside the payload record.
    Internal = 1,
    /// Tag and payload as two adjacent entries.
    Adjacent = 2,
    /// No tag; backends must infer the variant.
    Untagged = 3,
}

/// Policy applied when a map deserialization sees the same key twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeys {
    /// Last value wins.
    #[default]
    Overwrite,
    /// A repeated key is a [`crate::error::Error::DuplicateKey`].
    Unique,
}

/// Role of one dependency slot in a resolution plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRole {
    Item,
    Key,
    Value,
    Field(u32),
    Variant(u32),
    Inner,
}

impl SlotRole {
    /// Whether the slot can be constructed around a placeholder binding.
    ///
    /// Items, keys, values and inners are consulted lazily per element at
    /// traversal time; fields, tuple slots and variant payloads are direct
    /// and must be resolved before construction.
    #[inline(always)]
    pub fn deferrable(&self) -> bool {
        matches!(
            self,
            SlotRole::Item | SlotRole::Key | SlotRole::Value | SlotRole::Inner
        )
    }
}

/// One-byte value tag written by the packed backend ahead of every value and
/// validated on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ValueTag {
    Bool = 1,
    I8 = 2,
    I16 = 3,
    I32 = 4,
    I64 = 5,
    U8 = 6,
    U16 = 7,
    U32 = 8,
    U64 = 9,
    F32 = 10,
    F64 = 11,
    Char = 12,
    Text = 13,
    Bytes = 14,
    None = 15,
    Some = 16,
    Seq = 17,
    Map = 18,
    Tuple = 19,
    Struct = 20,
    Union = 21,
}

impl From<PrimitiveKind> for ValueTag {
    fn from(kind: PrimitiveKind) -> ValueTag {
        match kind {
            PrimitiveKind::Bool => ValueTag::Bool,
            PrimitiveKind::I8 => ValueTag::I8,
            PrimitiveKind::I16 => ValueTag::I16,
            PrimitiveKind::I32 => ValueTag::I32,
            PrimitiveKind::I64 => ValueTag::I64,
            PrimitiveKind::U8 => ValueTag::U8,
            PrimitiveKind::U16 => ValueTag::U16,
            PrimitiveKind::U32 => ValueTag::U32,
            PrimitiveKind::U64 => ValueTag::U64,
            PrimitiveKind::F32 => ValueTag::F32,
            PrimitiveKind::F64 => ValueTag::F64,
            PrimitiveKind::Char => ValueTag::Char,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_tag_round_trips_through_u8() {
        for tag in [ValueTag::Bool, ValueTag::Text, ValueTag::Union] {
            let raw: u8 = tag.into();
            assert_eq!(ValueTag::try_from(raw).unwrap(), tag);
        }
        assert!(ValueTag::try_from(0u8).is_err());
        assert!(ValueTag::try_from(99u8).is_err());
    }

    #[test]
    fn slot_roles_split_into_deferrable_and_direct() {
        assert!(SlotRole::Item.deferrable());
        assert!(SlotRole::Inner.deferrable());
        assert!(!SlotRole::Field(0).deferrable());
        assert!(!SlotRole::Variant(3).deferrable());
    }
}
