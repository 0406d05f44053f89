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

//! The union definition builder: variants in declared order (tags default
//! to declaration indices), one inspector that maps a value to its variant
//! index and payload, and one constructor that rebuilds the value.

use std::any::Any;

use crate::describe::{cast_ref, Describe};
use crate::error::Error;
use crate::model::caps::{BuildVariantFn, Caps, InspectUnionFn, UnionCaps, VariantDef};
use crate::model::meta::VariantMeta;
use crate::model::registry::TypeRegistry;

type Inspect<T> = fn(&T) -> (u32, Option<&dyn Any>);

pub struct UnionDef<T> {
    variants: Vec<VariantDef>,
    inspect: Option<Inspect<T>>,
    build: Option<Box<dyn Fn(u32, Option<Box<dyn Any>>) -> Result<T, Error> + Send + Sync>>,
}

impl<T: 'static> Default for UnionDef<T> {
    fn default() -> UnionDef<T> {
        UnionDef::new()
    }
}

impl<T: 'static> UnionDef<T> {
    pub fn new() -> UnionDef<T> {
        UnionDef {
            variants: Vec::new(),
            inspect: None,
            build: None,
        }
    }

    /// Declares a payload-free variant; the tag is the declaration index.
    pub fn variant(mut self, name: &str) -> UnionDef<T> {
        let tag = self.variants.len() as u32;
        self.variants.push(VariantDef {
            meta: VariantMeta::new(name, tag),
            payload: None,
        });
        self
    }

    /// Declares a variant carrying a payload of type `P`.
    pub fn variant_with<P: Describe>(
        mut self,
        types: &mut TypeRegistry,
        name: &str,
    ) -> Result<UnionDef<T>, Error> {
        let tag = self.variants.len() as u32;
        let payload = types.token_of::<P>()?;
        self.variants.push(VariantDef {
            meta: VariantMeta::new(name, tag),
            payload: Some(payload),
        });
        Ok(self)
    }

    /// Declares a payload-free variant with explicit metadata (rename,
    /// custom tag).
    pub fn variant_meta(mut self, meta: VariantMeta) -> UnionDef<T> {
        self.variants.push(VariantDef {
            meta,
            payload: None,
        });
        self
    }

    /// Installs the inspector mapping a value to (variant index, payload).
    pub fn inspect(mut self, inspect: Inspect<T>) -> UnionDef<T> {
        self.inspect = Some(inspect);
        self
    }

    /// Installs the constructor from (variant index, payload).
    pub fn build(
        mut self,
        build: impl Fn(u32, Option<Box<dyn Any>>) -> Result<T, Error> + Send + Sync + 'static,
    ) -> UnionDef<T> {
        self.build = Some(Box::new(build));
        self
    }

    pub fn into_caps(self) -> Result<Caps, Error> {
        let inspect = self.inspect.ok_or_else(|| {
            Error::type_error(format!(
                "union definition for {} has no inspect function",
                std::any::type_name::<T>()
            ))
        })?;
        let build = self.build.ok_or_else(|| {
            Error::type_error(format!(
                "union definition for {} has no build function",
                std::any::type_name::<T>()
            ))
        })?;
        let inspect_fn: InspectUnionFn = Box::new(move |value| Ok(inspect(cast_ref::<T>(value)?)));
        let build_fn: BuildVariantFn =
            Box::new(move |index, payload| Ok(Box::new(build(index, payload)?)));
        Ok(Caps {
            union_: Some(UnionCaps {
                variants: self.variants,
                inspect: inspect_fn,
                build: build_fn,
            }),
            ..Caps::default()
        })
    }
}
