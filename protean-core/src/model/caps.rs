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

//! Capability records: the type-erased accessor and builder tables one
//! descriptor exposes to the engine.
//!
//! A capability record is the runtime analog of a reflection surface. Each
//! group covers one structural ability — "enumerate ordered elements",
//! "enumerate key/value pairs", "exactly N typed slots" — and a type may
//! carry several groups at once; the classification rules in
//! [`crate::model::shape`] pick the shape deterministically.
//!
//! Ser-side functions borrow from a `&dyn Any` value; De-side functions
//! build accumulators and convert them into the final value. Strategies hold
//! `Arc<TypeDef>` clones, so every function here must be `Send + Sync`.

use std::any::Any;

use crate::error::Error;
use crate::model::meta::{FieldMeta, VariantMeta};
use crate::types::{DuplicateKeys, PrimitiveKind, PrimitiveValue, TypeToken};

pub type GetPrimitiveFn = Box<dyn Fn(&dyn Any) -> Result<PrimitiveValue, Error> + Send + Sync>;
pub type BuildPrimitiveFn =
    Box<dyn Fn(PrimitiveValue) -> Result<Box<dyn Any>, Error> + Send + Sync>;
pub type GetTextFn = Box<dyn for<'a> Fn(&'a dyn Any) -> Result<&'a str, Error> + Send + Sync>;
pub type BuildTextFn = Box<dyn Fn(String) -> Result<Box<dyn Any>, Error> + Send + Sync>;
pub type GetBytesFn = Box<dyn for<'a> Fn(&'a dyn Any) -> Result<&'a [u8], Error> + Send + Sync>;
pub type BuildBytesFn = Box<dyn Fn(Vec<u8>) -> Result<Box<dyn Any>, Error> + Send + Sync>;

pub type ProjectOptionFn =
    Box<dyn for<'a> Fn(&'a dyn Any) -> Result<Option<&'a dyn Any>, Error> + Send + Sync>;
pub type BuildSomeFn = Box<dyn Fn(Box<dyn Any>) -> Result<Box<dyn Any>, Error> + Send + Sync>;
pub type BuildNoneFn = Box<dyn Fn() -> Box<dyn Any> + Send + Sync>;

pub type LenFn = Box<dyn Fn(&dyn Any) -> Result<usize, Error> + Send + Sync>;
pub type VisitItemsFn = Box<
    dyn Fn(&dyn Any, &mut dyn FnMut(&dyn Any) -> Result<(), Error>) -> Result<(), Error>
        + Send
        + Sync,
>;
pub type VisitPairsFn = Box<
    dyn Fn(&dyn Any, &mut dyn FnMut(&dyn Any, &dyn Any) -> Result<(), Error>) -> Result<(), Error>
        + Send
        + Sync,
>;
pub type NewBuilderFn = Box<dyn Fn(Option<usize>) -> Box<dyn Any> + Send + Sync>;
pub type PushItemFn = Box<dyn Fn(&mut dyn Any, Box<dyn Any>) -> Result<(), Error> + Send + Sync>;
pub type InsertPairFn = Box<
    dyn Fn(&mut dyn Any, Box<dyn Any>, Box<dyn Any>, DuplicateKeys) -> Result<(), Error>
        + Send
        + Sync,
>;
pub type FinishFn = Box<dyn Fn(Box<dyn Any>) -> Result<Box<dyn Any>, Error> + Send + Sync>;

pub type GetSlotFn =
    Box<dyn for<'a> Fn(&'a dyn Any, usize) -> Result<&'a dyn Any, Error> + Send + Sync>;
pub type AssembleFn = Box<dyn Fn(FieldParts) -> Result<Box<dyn Any>, Error> + Send + Sync>;
pub type InspectUnionFn = Box<
    dyn for<'a> Fn(&'a dyn Any) -> Result<(u32, Option<&'a dyn Any>), Error> + Send + Sync,
>;
pub type BuildVariantFn =
    Box<dyn Fn(u32, Option<Box<dyn Any>>) -> Result<Box<dyn Any>, Error> + Send + Sync>;

pub type ProjectDelegateFn = Box<
    dyn Fn(&dyn Any, &mut dyn FnMut(&dyn Any) -> Result<(), Error>) -> Result<(), Error>
        + Send
        + Sync,
>;
pub type WrapDelegateFn = Box<dyn Fn(Box<dyn Any>) -> Result<Box<dyn Any>, Error> + Send + Sync>;
pub type IsNullFn = Box<dyn Fn(&dyn Any) -> Result<bool, Error> + Send + Sync>;
pub type MakeNullFn = Box<dyn Fn() -> Box<dyn Any> + Send + Sync>;

/// Accumulated parts of a struct or tuple, handed to the `assemble` function.
///
/// Slots are in declared order. By the time `assemble` runs, absent optional
/// slots have already been filled with their none value; a remaining empty
/// slot is a genuinely missing required field.
pub struct FieldParts {
    parts: Vec<Option<Box<dyn Any>>>,
}

impl FieldParts {
    pub(crate) fn new(parts: Vec<Option<Box<dyn Any>>>) -> FieldParts {
        FieldParts { parts }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Removes and downcasts the part at `index`.
    pub fn take<T: 'static>(&mut self, index: usize) -> Result<T, Error> {
        let boxed = self.take_boxed(index)?;
        match boxed.downcast::<T>() {
            Ok(v) => Ok(*v),
            Err(_) => Err(Error::type_error(format!(
                "part {} is not a {}",
                index,
                std::any::type_name::<T>()
            ))),
        }
    }

    /// Removes the part at `index` if the stream filled it. `None` for
    /// slots that never arrived, such as fields excluded from
    /// deserialization.
    pub fn take_opt<T: 'static>(&mut self, index: usize) -> Result<Option<T>, Error> {
        match self.parts.get_mut(index) {
            Some(slot) => match slot.take() {
                Some(boxed) => match boxed.downcast::<T>() {
                    Ok(v) => Ok(Some(*v)),
                    Err(_) => Err(Error::type_error(format!(
                        "part {} is not a {}",
                        index,
                        std::any::type_name::<T>()
                    ))),
                },
                None => Ok(None),
            },
            None => Err(Error::type_error(format!(
                "part index {} out of range ({} parts)",
                index,
                self.parts.len()
            ))),
        }
    }

    pub fn take_boxed(&mut self, index: usize) -> Result<Box<dyn Any>, Error> {
        match self.parts.get_mut(index) {
            Some(slot) => slot
                .take()
                .ok_or_else(|| Error::missing_field(format!("missing part {}", index))),
            None => Err(Error::type_error(format!(
                "part index {} out of range ({} parts)",
                index,
                self.parts.len()
            ))),
        }
    }
}

pub struct PrimitiveCaps {
    pub kind: PrimitiveKind,
    pub get: GetPrimitiveFn,
    pub build: BuildPrimitiveFn,
}

pub struct TextCaps {
    pub get: GetTextFn,
    pub build: BuildTextFn,
}

pub struct BytesCaps {
    pub get: GetBytesFn,
    pub build: BuildBytesFn,
}

pub struct OptionCaps {
    pub inner: TypeToken,
    pub project: ProjectOptionFn,
    pub build_some: BuildSomeFn,
    pub build_none: BuildNoneFn,
}

/// "Exposes an ordered enumeration of elements."
pub struct SeqCaps {
    pub item: TypeToken,
    pub len: LenFn,
    pub visit: VisitItemsFn,
    pub builder: NewBuilderFn,
    pub push: PushItemFn,
    pub finish: FinishFn,
}

/// "Exposes an enumeration of key/value pairs."
pub struct MapCaps {
    pub key: TypeToken,
    pub value: TypeToken,
    pub len: LenFn,
    pub visit: VisitPairsFn,
    pub builder: NewBuilderFn,
    pub insert: InsertPairFn,
    pub finish: FinishFn,
    /// Per-registration duplicate-key override; `None` defers to the engine.
    pub duplicate_keys: Option<DuplicateKeys>,
}

/// "Exactly N statically-typed slots."
pub struct TupleCaps {
    pub slots: Vec<TypeToken>,
    pub get: GetSlotFn,
    pub assemble: AssembleFn,
}

pub struct FieldDef {
    pub meta: FieldMeta,
    pub ty: TypeToken,
}

/// Named, keyed members discovered reflectively. Zero fields is valid.
pub struct StructCaps {
    pub fields: Vec<FieldDef>,
    pub get: GetSlotFn,
    pub assemble: AssembleFn,
}

pub struct VariantDef {
    pub meta: VariantMeta,
    pub payload: Option<TypeToken>,
}

/// "A tagged set of mutually exclusive cases."
pub struct UnionCaps {
    pub variants: Vec<VariantDef>,
    pub inspect: InspectUnionFn,
    pub build: BuildVariantFn,
}

/// Pointer-style indirection to a single inner value (`Box`, `Rc`, `Arc`).
/// Indirection slots may defer their inner strategy across a cycle.
pub struct DelegateCaps {
    pub inner: TypeToken,
    pub project: ProjectDelegateFn,
    pub wrap: WrapDelegateFn,
}

/// A representation that can hold a null reference distinct from "option
/// absent" (weak pointers whose referent is gone).
pub struct NullReprCaps {
    pub is_null: IsNullFn,
    pub make_null: MakeNullFn,
}

/// The full capability record of one descriptor.
#[derive(Default)]
pub struct Caps {
    pub primitive: Option<PrimitiveCaps>,
    pub text: Option<TextCaps>,
    pub bytes: Option<BytesCaps>,
    pub option: Option<OptionCaps>,
    pub seq: Option<SeqCaps>,
    pub map: Option<MapCaps>,
    pub tuple: Option<TupleCaps>,
    pub strukt: Option<StructCaps>,
    pub union_: Option<UnionCaps>,
    pub delegate: Option<DelegateCaps>,
    pub null_repr: Option<NullReprCaps>,
}

macro_rules! caps_accessor {
    ($name:ident, $field:ident, $ty:ty, $what:literal) => {
        /// The capability group, or a shape mismatch if the descriptor
        /// lacks it.
        pub fn $name(&self) -> Result<&$ty, Error> {
            self.$field
                .as_ref()
                .ok_or_else(|| Error::mismatched_shape(concat!("descriptor has no ", $what, " capability")))
        }
    };
}

impl Caps {
    caps_accessor!(primitive, primitive, PrimitiveCaps, "primitive");
    caps_accessor!(text, text, TextCaps, "text");
    caps_accessor!(bytes, bytes, BytesCaps, "bytes");
    caps_accessor!(option, option, OptionCaps, "option");
    caps_accessor!(seq, seq, SeqCaps, "seq");
    caps_accessor!(map, map, MapCaps, "map");
    caps_accessor!(tuple, tuple, TupleCaps, "tuple");
    caps_accessor!(strukt, strukt, StructCaps, "struct");
    caps_accessor!(union_, union_, UnionCaps, "union");
    caps_accessor!(delegate, delegate, DelegateCaps, "delegate");
    caps_accessor!(null_repr, null_repr, NullReprCaps, "null-representation");

    pub fn is_empty(&self) -> bool {
        self.primitive.is_none()
            && self.text.is_none()
            && self.bytes.is_none()
            && self.option.is_none()
            && self.seq.is_none()
            && self.map.is_none()
            && self.tuple.is_none()
            && self.strukt.is_none()
            && self.union_.is_none()
            && self.delegate.is_none()
    }
}
