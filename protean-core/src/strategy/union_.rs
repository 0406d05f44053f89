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

//! Tagged-union strategies. The tag style and variant labels come from the
//! external metadata table; the engine threads them through to the backend
//! without interpreting them.

use std::any::Any;
use std::sync::Arc;

use crate::error::Error;
use crate::model::caps::Caps;
use crate::model::registry::TypeDef;
use crate::protocol::{PayloadAccess, Sink, Source, WireVariant};
use crate::strategy::{DeSlot, DeStrategy, SerSlot, SerStrategy};
use crate::types::{Shape, UnionStyle};

fn wire_variants(def: &TypeDef, caps: &Caps) -> Result<Vec<WireVariant>, Error> {
    let rule = def.meta.rename_all;
    Ok(caps
        .union_()?
        .variants
        .iter()
        .map(|variant| WireVariant {
            label: variant.meta.wire_name(rule),
            tag: variant.meta.tag,
            has_payload: variant.payload.is_some(),
        })
        .collect())
}

pub struct UnionSer {
    caps: Arc<Caps>,
    name: String,
    style: UnionStyle,
    wires: Vec<WireVariant>,
    slots: Vec<Option<SerSlot>>,
}

impl UnionSer {
    pub(crate) fn new(
        def: &TypeDef,
        caps: Arc<Caps>,
        slots: Vec<Option<SerSlot>>,
    ) -> Result<UnionSer, Error> {
        let wires = wire_variants(def, &caps)?;
        Ok(UnionSer {
            caps,
            name: def.meta.declared_name.clone(),
            style: def.meta.union_style,
            wires,
            slots,
        })
    }
}

struct Payload<'a> {
    slot: &'a SerSlot,
    value: &'a dyn Any,
}

impl PayloadAccess for Payload<'_> {
    fn drive(&self, sink: &mut dyn Sink) -> Result<(), Error> {
        self.slot.get()?.drive(self.value, sink)
    }
}

impl SerStrategy for UnionSer {
    fn shape(&self) -> Shape {
        Shape::Union
    }

    fn drive(&self, value: &dyn Any, sink: &mut dyn Sink) -> Result<(), Error> {
        let union_ = self.caps.union_()?;
        let (index, payload) = (union_.inspect)(value)?;
        let index = index as usize;
        let wire = self.wires.get(index).ok_or_else(|| {
            Error::unknown_variant(format!(
                "variant index {} out of range for {}",
                index, self.name
            ))
        })?;
        match (payload, &self.slots[index]) {
            (Some(payload), Some(slot)) => {
                let access = Payload {
                    slot,
                    value: payload,
                };
                sink.union(&self.name, wire, self.style, Some(&access))
            }
            (None, None) => sink.union(&self.name, wire, self.style, None),
            _ => Err(Error::mismatched_shape(format!(
                "variant {} of {} does not match its declared payload",
                wire.label, self.name
            ))),
        }
    }
}

pub struct UnionDe {
    caps: Arc<Caps>,
    name: String,
    style: UnionStyle,
    wires: Vec<WireVariant>,
    slots: Vec<Option<DeSlot>>,
}

impl UnionDe {
    pub(crate) fn new(
        def: &TypeDef,
        caps: Arc<Caps>,
        slots: Vec<Option<DeSlot>>,
    ) -> Result<UnionDe, Error> {
        let wires = wire_variants(def, &caps)?;
        Ok(UnionDe {
            caps,
            name: def.meta.declared_name.clone(),
            style: def.meta.union_style,
            wires,
            slots,
        })
    }
}

impl DeStrategy for UnionDe {
    fn shape(&self) -> Shape {
        Shape::Union
    }

    fn pull(&self, source: &mut dyn Source) -> Result<Box<dyn Any>, Error> {
        let index = source.variant(&self.name, &self.wires, self.style)?;
        if index >= self.wires.len() {
            return Err(Error::unknown_variant(format!(
                "variant index {} out of range for {}",
                index, self.name
            )));
        }
        let payload = match &self.slots[index] {
            Some(slot) => Some(slot.get()?.pull(source)?),
            None => None,
        };
        source.end_variant()?;
        (self.caps.union_()?.build)(index as u32, payload)
    }
}
