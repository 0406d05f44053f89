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

//! Struct strategies.
//!
//! Serialization exposes an indexed [`StructAccess`] so the backend decides
//! iteration order and may skip fields. Deserialization accepts fields in
//! any order the source reports them, fills absent optional fields with
//! their none value, and rejects genuinely missing required fields.
//!
//! Wire labels are precomputed here: explicit rename beats the type-level
//! rename rule beats the declared name. Fields excluded per direction never
//! appear in the wire tables.

use std::any::Any;
use std::sync::Arc;

use crate::error::Error;
use crate::model::caps::{Caps, FieldParts};
use crate::model::registry::TypeDef;
use crate::protocol::{Sink, Source, StructAccess, WireField};
use crate::strategy::{DeSlot, DeStrategy, SerSlot, SerStrategy};
use crate::types::Shape;

struct SerField {
    declared_index: usize,
    wire: WireField,
    slot: SerSlot,
}

pub struct StructSer {
    caps: Arc<Caps>,
    name: String,
    fields: Vec<SerField>,
}

impl StructSer {
    pub(crate) fn new(def: &TypeDef, caps: Arc<Caps>, slots: &[SerSlot]) -> Result<StructSer, Error> {
        let rule = def.meta.rename_all;
        let mut fields = Vec::new();
        for (index, field) in caps.strukt()?.fields.iter().enumerate() {
            if !field.meta.include_ser {
                continue;
            }
            fields.push(SerField {
                declared_index: index,
                wire: WireField {
                    label: field.meta.wire_name(rule),
                    int_key: field.meta.int_key,
                },
                slot: slots[index].clone(),
            });
        }
        Ok(StructSer {
            caps: caps.clone(),
            name: def.meta.declared_name.clone(),
            fields,
        })
    }
}

struct Access<'a> {
    strategy: &'a StructSer,
    value: &'a dyn Any,
}

impl StructAccess for Access<'_> {
    fn len(&self) -> usize {
        self.strategy.fields.len()
    }

    fn field(&self, index: usize) -> &WireField {
        &self.strategy.fields[index].wire
    }

    fn drive(&self, index: usize, sink: &mut dyn Sink) -> Result<(), Error> {
        let field = &self.strategy.fields[index];
        let strukt = self.strategy.caps.strukt()?;
        let value = (strukt.get)(self.value, field.declared_index)?;
        field.slot.get()?.drive(value, sink)
    }
}

impl SerStrategy for StructSer {
    fn shape(&self) -> Shape {
        Shape::Struct
    }

    fn drive(&self, value: &dyn Any, sink: &mut dyn Sink) -> Result<(), Error> {
        let access = Access {
            strategy: self,
            value,
        };
        sink.strukt(&self.name, &access)
    }
}

struct DeField {
    declared_index: usize,
    label: String,
    slot: DeSlot,
    /// Capability record of the field's type, for filling absent optionals.
    field_caps: Arc<Caps>,
}

pub struct StructDe {
    caps: Arc<Caps>,
    name: String,
    table: Vec<WireField>,
    entries: Vec<DeField>,
    declared_len: usize,
}

impl StructDe {
    pub(crate) fn new(
        def: &TypeDef,
        caps: Arc<Caps>,
        slots: &[DeSlot],
        field_caps: Vec<Arc<Caps>>,
    ) -> Result<StructDe, Error> {
        let rule = def.meta.rename_all;
        let declared = &caps.strukt()?.fields;
        let declared_len = declared.len();
        let mut table = Vec::new();
        let mut entries = Vec::new();
        for (index, field) in declared.iter().enumerate() {
            if !field.meta.include_de {
                continue;
            }
            let label = field.meta.wire_name(rule);
            table.push(WireField {
                label: label.clone(),
                int_key: field.meta.int_key,
            });
            entries.push(DeField {
                declared_index: index,
                label,
                slot: slots[index].clone(),
                field_caps: field_caps[index].clone(),
            });
        }
        Ok(StructDe {
            caps: caps.clone(),
            name: def.meta.declared_name.clone(),
            table,
            entries,
            declared_len,
        })
    }
}

impl DeStrategy for StructDe {
    fn shape(&self) -> Shape {
        Shape::Struct
    }

    fn pull(&self, source: &mut dyn Source) -> Result<Box<dyn Any>, Error> {
        source.begin_struct(&self.name, &self.table)?;
        let mut parts: Vec<Option<Box<dyn Any>>> =
            (0..self.declared_len).map(|_| None).collect();
        while let Some(ordinal) = source.field_ordinal(&self.table)? {
            let entry = self.entries.get(ordinal).ok_or_else(|| {
                Error::mismatched_shape(format!(
                    "field ordinal {} out of range for {}",
                    ordinal, self.name
                ))
            })?;
            // A repeated field keeps the last occurrence.
            parts[entry.declared_index] = Some(entry.slot.get()?.pull(source)?);
        }
        source.end_struct()?;
        for entry in &self.entries {
            if parts[entry.declared_index].is_some() {
                continue;
            }
            if let Some(option) = &entry.field_caps.option {
                parts[entry.declared_index] = Some((option.build_none)());
            } else if let Some(null_repr) = &entry.field_caps.null_repr {
                parts[entry.declared_index] = Some((null_repr.make_null)());
            } else {
                return Err(Error::missing_field(format!(
                    "missing field {} of {}",
                    entry.label, self.name
                )));
            }
        }
        (self.caps.strukt()?.assemble)(FieldParts::new(parts))
    }
}
