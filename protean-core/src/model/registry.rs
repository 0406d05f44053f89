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

//! The descriptor arena.
//!
//! Descriptors live in an append-only arena indexed by [`TypeToken`] and are
//! keyed by `(std::any::TypeId, Nullability)`. Self-referential types
//! register through a reserve/complete pair: [`TypeRegistry::reserve`]
//! claims the token before any nested description runs, so a recursive
//! lookup finds the token instead of re-entering description.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::describe::Describe;
use crate::error::Error;
use crate::model::caps::Caps;
use crate::model::meta::TypeMeta;
use crate::types::{Nullability, TypeToken};

/// One entry of the arena: identity, metadata, and (once completed) the
/// capability record.
pub struct TypeDef {
    pub rust_id: TypeId,
    pub rust_name: &'static str,
    pub nullability: Nullability,
    pub meta: TypeMeta,
    caps: Option<Arc<Caps>>,
}

impl TypeDef {
    /// The capability record; an error while the entry is merely reserved.
    pub fn caps(&self) -> Result<&Arc<Caps>, Error> {
        self.caps.as_ref().ok_or_else(|| {
            Error::resolution(format!(
                "type {} was reserved but never completed",
                self.rust_name
            ))
        })
    }
}

#[derive(Default)]
pub struct TypeRegistry {
    defs: Vec<TypeDef>,
    index: HashMap<(TypeId, Nullability), TypeToken>,
}

impl TypeRegistry {
    pub fn new() -> TypeRegistry {
        TypeRegistry::default()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Looks up the token of `T` in the required-nullability context.
    pub fn find<T: 'static>(&self) -> Option<TypeToken> {
        self.find_with(TypeId::of::<T>(), Nullability::Required)
    }

    pub fn find_with(&self, rust_id: TypeId, nullability: Nullability) -> Option<TypeToken> {
        self.index.get(&(rust_id, nullability)).copied()
    }

    /// Returns the token of `T`, running its description on first request.
    pub fn token_of<T: Describe>(&mut self) -> Result<TypeToken, Error> {
        if let Some(token) = self.find::<T>() {
            return Ok(token);
        }
        let token = T::describe(self)?;
        if self.find::<T>() != Some(token) {
            return Err(Error::type_error(format!(
                "describe for {} returned a token it did not register",
                std::any::type_name::<T>()
            )));
        }
        Ok(token)
    }

    /// Claims a token for `T` before its nested types are described.
    ///
    /// Idempotent: a second reserve for the same identity returns the
    /// existing token untouched.
    pub fn reserve<T: 'static>(&mut self, meta: TypeMeta) -> Result<TypeToken, Error> {
        let key = (TypeId::of::<T>(), Nullability::Required);
        if let Some(token) = self.index.get(&key) {
            return Ok(*token);
        }
        let token = TypeToken::from_index(self.defs.len());
        self.defs.push(TypeDef {
            rust_id: key.0,
            rust_name: std::any::type_name::<T>(),
            nullability: Nullability::Required,
            meta,
            caps: None,
        });
        self.index.insert(key, token);
        Ok(token)
    }

    /// Installs the capability record of a reserved entry. Exactly once.
    pub fn complete(&mut self, token: TypeToken, caps: Caps) -> Result<TypeToken, Error> {
        let def = self.def_mut(token)?;
        if def.caps.is_some() {
            return Err(Error::type_error(format!(
                "type {} described twice",
                def.rust_name
            )));
        }
        def.caps = Some(Arc::new(caps));
        Ok(token)
    }

    /// Reserve-and-complete in one step, for types with no self reference.
    pub fn define<T: 'static>(&mut self, meta: TypeMeta, caps: Caps) -> Result<TypeToken, Error> {
        let token = self.reserve::<T>(meta)?;
        if self.def(token)?.caps.is_some() {
            // Concurrent describe paths may race through generic impls that
            // define the same leaf; the first completion wins.
            return Ok(token);
        }
        self.complete(token, caps)
    }

    /// A distinct descriptor for the same type in a nullable context.
    ///
    /// The capability record is shared; only the nullability (and therefore
    /// the token, the wrapper composition, and the cached strategies)
    /// differs. The base entry must already be completed.
    pub fn nullable_variant(&mut self, token: TypeToken) -> Result<TypeToken, Error> {
        let (rust_id, rust_name, meta, caps) = {
            let def = self.def(token)?;
            (
                def.rust_id,
                def.rust_name,
                def.meta.clone(),
                def.caps()?.clone(),
            )
        };
        let key = (rust_id, Nullability::Nullable);
        if let Some(existing) = self.index.get(&key) {
            return Ok(*existing);
        }
        let nullable = TypeToken::from_index(self.defs.len());
        self.defs.push(TypeDef {
            rust_id,
            rust_name,
            nullability: Nullability::Nullable,
            meta,
            caps: Some(caps),
        });
        self.index.insert(key, nullable);
        Ok(nullable)
    }

    pub fn def(&self, token: TypeToken) -> Result<&TypeDef, Error> {
        self.defs.get(token.index()).ok_or_else(|| {
            Error::type_error(format!("unknown type token {}", token.index()))
        })
    }

    fn def_mut(&mut self, token: TypeToken) -> Result<&mut TypeDef, Error> {
        self.defs.get_mut(token.index()).ok_or_else(|| {
            Error::type_error(format!("unknown type token {}", token.index()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn reserve_is_idempotent_per_identity() {
        let mut types = TypeRegistry::new();
        let a = types.reserve::<Marker>(TypeMeta::named("Marker")).unwrap();
        let b = types.reserve::<Marker>(TypeMeta::named("Marker")).unwrap();
        assert_eq!(a, b);
        assert_eq!(types.len(), 1);
    }

    #[test]
    fn complete_twice_is_an_error() {
        let mut types = TypeRegistry::new();
        let token = types.reserve::<Marker>(TypeMeta::named("Marker")).unwrap();
        types.complete(token, Caps::default()).unwrap();
        assert!(types.complete(token, Caps::default()).is_err());
    }

    #[test]
    fn nullable_context_yields_a_distinct_descriptor() {
        let mut types = TypeRegistry::new();
        let token = types.reserve::<Marker>(TypeMeta::named("Marker")).unwrap();
        types.complete(token, Caps::default()).unwrap();
        let nullable = types.nullable_variant(token).unwrap();
        assert_ne!(token, nullable);
        assert_eq!(types.nullable_variant(token).unwrap(), nullable);
        assert_eq!(types.def(nullable).unwrap().nullability, Nullability::Nullable);
        assert_eq!(types.def(token).unwrap().nullability, Nullability::Required);
    }

    #[test]
    fn caps_of_a_reserved_entry_are_unavailable() {
        let mut types = TypeRegistry::new();
        let token = types.reserve::<Marker>(TypeMeta::named("Marker")).unwrap();
        assert!(types.def(token).unwrap().caps().is_err());
    }
}
