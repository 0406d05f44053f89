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

//! The struct definition builder: declares fields in order with their
//! metadata and accessors, then produces the capability record.

use std::any::Any;

use crate::describe::{cast_ref, Describe};
use crate::error::Error;
use crate::model::caps::{AssembleFn, Caps, FieldDef, FieldParts, GetSlotFn, StructCaps};
use crate::model::meta::FieldMeta;
use crate::model::registry::TypeRegistry;

type Getter<T> = Box<dyn for<'a> Fn(&'a T) -> &'a (dyn Any) + Send + Sync>;

pub struct StructDef<T> {
    fields: Vec<FieldDef>,
    getters: Vec<Getter<T>>,
    assemble: Option<Box<dyn Fn(FieldParts) -> Result<T, Error> + Send + Sync>>,
}

impl<T: 'static> Default for StructDef<T> {
    fn default() -> StructDef<T> {
        StructDef::new()
    }
}

impl<T: 'static> StructDef<T> {
    pub fn new() -> StructDef<T> {
        StructDef {
            fields: Vec::new(),
            getters: Vec::new(),
            assemble: None,
        }
    }

    /// Declares the next field: metadata plus a borrow accessor. The field
    /// type is described (and its token claimed) on the spot.
    pub fn field<F: Describe>(
        mut self,
        types: &mut TypeRegistry,
        meta: impl Into<FieldMeta>,
        get: fn(&T) -> &F,
    ) -> Result<StructDef<T>, Error> {
        let ty = types.token_of::<F>()?;
        self.fields.push(FieldDef {
            meta: meta.into(),
            ty,
        });
        self.getters
            .push(Box::new(move |value| get(value) as &dyn Any));
        Ok(self)
    }

    /// Installs the constructor run after all parts are accumulated.
    pub fn assemble(
        mut self,
        build: impl Fn(FieldParts) -> Result<T, Error> + Send + Sync + 'static,
    ) -> StructDef<T> {
        self.assemble = Some(Box::new(build));
        self
    }

    pub fn into_caps(self) -> Result<Caps, Error> {
        let assemble = self.assemble.ok_or_else(|| {
            Error::type_error(format!(
                "struct definition for {} has no assemble function",
                std::any::type_name::<T>()
            ))
        })?;
        let getters = self.getters;
        let get: GetSlotFn = Box::new(move |value, index| {
            let typed = cast_ref::<T>(value)?;
            let getter = getters.get(index).ok_or_else(|| {
                Error::type_error(format!("field index {} out of range", index))
            })?;
            Ok(getter(typed))
        });
        let assemble: AssembleFn = Box::new(move |parts| Ok(Box::new(assemble(parts)?)));
        Ok(Caps {
            strukt: Some(StructCaps {
                fields: self.fields,
                get,
                assemble,
            }),
            ..Caps::default()
        })
    }
}
