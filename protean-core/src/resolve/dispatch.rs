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

//! The strategy dispatcher: maps a classified descriptor and its resolved
//! dependency slots onto one concrete construction pattern, per direction.
//! Overrides and the fallback are consulted by the resolver before any rule
//! here fires.

use std::sync::Arc;

use crate::error::Error;
use crate::model::caps::Caps;
use crate::model::registry::{TypeDef, TypeRegistry};
use crate::model::shape::{classify, Classified};
use crate::resolve::binding::Slot;
use crate::resolve::plan::Plan;
use crate::resolve::resolver::{BuildCx, BuildDir};
use crate::resolve::wrap;
use crate::strategy::delegate::{DelegateDe, DelegateSer};
use crate::strategy::map::{MapDe, MapSer};
use crate::strategy::primitive::{PrimitiveDe, PrimitiveSer};
use crate::strategy::seq::{SeqDe, SeqSer};
use crate::strategy::struct_::{StructDe, StructSer};
use crate::strategy::text::{BytesDe, BytesSer, TextDe, TextSer};
use crate::strategy::tuple::{TupleDe, TupleSer};
use crate::strategy::union_::{UnionDe, UnionSer};
use crate::strategy::wrappers::{OptionDe, OptionSer};
use crate::strategy::{DeRef, DeStrategy, SerRef, SerStrategy};
use crate::types::Shape;

/// The protocol shape of a descriptor, looking through pointer indirection.
pub(crate) fn protocol_shape(registry: &TypeRegistry, token: crate::types::TypeToken) -> Result<Shape, Error> {
    let mut current = token;
    loop {
        let def = registry.def(current)?;
        match classify(def)? {
            Classified::Shape(shape) => return Ok(shape),
            Classified::Delegate => current = def.caps()?.delegate()?.inner,
        }
    }
}

fn one_slot<S: ?Sized>(slots: Vec<Slot<S>>, def: &TypeDef) -> Result<Slot<S>, Error> {
    slots.into_iter().next().ok_or_else(|| {
        Error::resolution(format!("missing dependency slot for {}", def.rust_name))
    })
}

fn two_slots<S: ?Sized>(slots: Vec<Slot<S>>, def: &TypeDef) -> Result<(Slot<S>, Slot<S>), Error> {
    let mut iter = slots.into_iter();
    match (iter.next(), iter.next()) {
        (Some(key), Some(value)) => Ok((key, value)),
        _ => Err(Error::resolution(format!(
            "missing key/value slots for {}",
            def.rust_name
        ))),
    }
}

/// Regroups the flat payload-slot list into per-variant options.
fn variant_slots<S: ?Sized>(caps: &Caps, slots: Vec<Slot<S>>) -> Result<Vec<Option<Slot<S>>>, Error> {
    let mut iter = slots.into_iter();
    let grouped = caps
        .union_()?
        .variants
        .iter()
        .map(|variant| {
            if variant.payload.is_some() {
                iter.next().map(Some).ok_or_else(|| {
                    Error::resolution("variant payload slot list out of sync".to_string())
                })
            } else {
                Ok(None)
            }
        })
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(grouped)
}

fn struct_field_caps(registry: &TypeRegistry, caps: &Caps) -> Result<Vec<Arc<Caps>>, Error> {
    caps.strukt()?
        .fields
        .iter()
        .map(|field| Ok(registry.def(field.ty)?.caps()?.clone()))
        .collect()
}

pub(crate) struct SerDir;

impl BuildDir for SerDir {
    type S = dyn SerStrategy;

    fn direction() -> &'static str {
        "ser"
    }

    fn from_override(
        ov: &dyn crate::config::StrategyOverride,
        def: &TypeDef,
    ) -> Result<SerRef, Error> {
        ov.ser(def)
    }

    fn build_core(
        cx: &BuildCx<'_>,
        def: &TypeDef,
        plan: &Plan,
        slots: Vec<Slot<Self::S>>,
    ) -> Result<SerRef, Error> {
        let caps = def.caps()?.clone();
        Ok(match plan.classified {
            Classified::Delegate => {
                let inner_shape = protocol_shape(cx.registry, caps.delegate()?.inner)?;
                Arc::new(DelegateSer::new(
                    caps.clone(),
                    one_slot(slots, def)?,
                    inner_shape,
                ))
            }
            Classified::Shape(Shape::Primitive(kind)) => Arc::new(PrimitiveSer::new(caps, kind)),
            Classified::Shape(Shape::Text) => Arc::new(TextSer::new(caps)),
            Classified::Shape(Shape::Bytes) => Arc::new(BytesSer::new(caps)),
            Classified::Shape(Shape::Option) => {
                Arc::new(OptionSer::new(caps.clone(), one_slot(slots, def)?))
            }
            Classified::Shape(Shape::Seq) => {
                Arc::new(SeqSer::new(caps.clone(), one_slot(slots, def)?))
            }
            Classified::Shape(Shape::Map) => {
                let (key, value) = two_slots(slots, def)?;
                Arc::new(MapSer::new(caps, key, value))
            }
            Classified::Shape(Shape::Tuple) => Arc::new(TupleSer::new(caps, slots)),
            Classified::Shape(Shape::Struct) => Arc::new(StructSer::new(def, caps, &slots)?),
            Classified::Shape(Shape::Union) => {
                let grouped = variant_slots(&caps, slots)?;
                Arc::new(UnionSer::new(def, caps, grouped)?)
            }
        })
    }

    fn wrap(def: &TypeDef, core: SerRef) -> Result<SerRef, Error> {
        wrap::wrap_ser(def, core)
    }
}

pub(crate) struct DeDir;

impl BuildDir for DeDir {
    type S = dyn DeStrategy;

    fn direction() -> &'static str {
        "de"
    }

    fn from_override(
        ov: &dyn crate::config::StrategyOverride,
        def: &TypeDef,
    ) -> Result<DeRef, Error> {
        ov.de(def)
    }

    fn build_core(
        cx: &BuildCx<'_>,
        def: &TypeDef,
        plan: &Plan,
        slots: Vec<Slot<Self::S>>,
    ) -> Result<DeRef, Error> {
        let caps = def.caps()?.clone();
        Ok(match plan.classified {
            Classified::Delegate => {
                let inner_shape = protocol_shape(cx.registry, caps.delegate()?.inner)?;
                Arc::new(DelegateDe::new(
                    caps.clone(),
                    one_slot(slots, def)?,
                    inner_shape,
                ))
            }
            Classified::Shape(Shape::Primitive(kind)) => Arc::new(PrimitiveDe::new(caps, kind)),
            Classified::Shape(Shape::Text) => Arc::new(TextDe::new(caps)),
            Classified::Shape(Shape::Bytes) => Arc::new(BytesDe::new(caps)),
            Classified::Shape(Shape::Option) => {
                Arc::new(OptionDe::new(caps.clone(), one_slot(slots, def)?))
            }
            Classified::Shape(Shape::Seq) => {
                Arc::new(SeqDe::new(caps.clone(), one_slot(slots, def)?))
            }
            Classified::Shape(Shape::Map) => {
                let (key, value) = two_slots(slots, def)?;
                let policy = caps
                    .map()?
                    .duplicate_keys
                    .unwrap_or(cx.options.duplicate_keys);
                Arc::new(MapDe::new(caps, key, value, policy))
            }
            Classified::Shape(Shape::Tuple) => Arc::new(TupleDe::new(caps, slots)),
            Classified::Shape(Shape::Struct) => {
                let field_caps = struct_field_caps(cx.registry, &caps)?;
                Arc::new(StructDe::new(def, caps, &slots, field_caps)?)
            }
            Classified::Shape(Shape::Union) => {
                let grouped = variant_slots(&caps, slots)?;
                Arc::new(UnionDe::new(def, caps, grouped)?)
            }
        })
    }

    fn wrap(def: &TypeDef, core: DeRef) -> Result<DeRef, Error> {
        wrap::wrap_de(def, core)
    }
}
