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

//! Associative adapters. [`MapStore`] is the minimal capability set a map
//! container needs — new-with-capacity, contains, insert-one, visit — so one
//! generic constructor serves every store.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::describe::{cast_box, cast_mut, cast_ref, Describe};
use crate::error::Error;
use crate::model::caps::{Caps, MapCaps};
use crate::model::meta::TypeMeta;
use crate::model::registry::TypeRegistry;
use crate::types::{DuplicateKeys, TypeToken};

pub trait MapStore<K, V>: 'static {
    fn with_capacity(capacity: Option<usize>) -> Self;

    fn len(&self) -> usize;

    fn contains(&self, key: &K) -> bool;

    fn insert(&mut self, key: K, value: V);

    fn visit(&self, visit: &mut dyn FnMut(&K, &V) -> Result<(), Error>) -> Result<(), Error>;
}

impl<K: Hash + Eq + 'static, V: 'static> MapStore<K, V> for HashMap<K, V> {
    fn with_capacity(capacity: Option<usize>) -> HashMap<K, V> {
        match capacity {
            Some(capacity) => HashMap::with_capacity(capacity),
            None => HashMap::new(),
        }
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn insert(&mut self, key: K, value: V) {
        HashMap::insert(self, key, value);
    }

    fn visit(&self, visit: &mut dyn FnMut(&K, &V) -> Result<(), Error>) -> Result<(), Error> {
        for (key, value) in self.iter() {
            visit(key, value)?;
        }
        Ok(())
    }
}

impl<K: Ord + 'static, V: 'static> MapStore<K, V> for BTreeMap<K, V> {
    fn with_capacity(_capacity: Option<usize>) -> BTreeMap<K, V> {
        BTreeMap::new()
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn insert(&mut self, key: K, value: V) {
        BTreeMap::insert(self, key, value);
    }

    fn visit(&self, visit: &mut dyn FnMut(&K, &V) -> Result<(), Error>) -> Result<(), Error> {
        for (key, value) in self.iter() {
            visit(key, value)?;
        }
        Ok(())
    }
}

/// Builds the map capability record for store `M`.
pub fn map_caps<M, K, V>(key: TypeToken, value: TypeToken) -> Caps
where
    M: MapStore<K, V>,
    K: 'static,
    V: 'static,
{
    Caps {
        map: Some(MapCaps {
            key,
            value,
            len: Box::new(|map| Ok(cast_ref::<M>(map)?.len())),
            visit: Box::new(|map, visit| {
                cast_ref::<M>(map)?.visit(&mut |k, v| visit(k, v))
            }),
            builder: Box::new(|capacity| Box::new(M::with_capacity(capacity))),
            insert: Box::new(|acc, k, v, policy| {
                let store = cast_mut::<M>(acc)?;
                let k = cast_box::<K>(k)?;
                if store.contains(&k) && policy == DuplicateKeys::Unique {
                    return Err(Error::duplicate_key(
                        "duplicate map key rejected by unique-keys policy",
                    ));
                }
                store.insert(k, cast_box::<V>(v)?);
                Ok(())
            }),
            finish: Box::new(Ok),
            duplicate_keys: None,
        }),
        ..Caps::default()
    }
}

impl<K: Describe + Hash + Eq, V: Describe> Describe for HashMap<K, V> {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        let key = types.token_of::<K>()?;
        let value = types.token_of::<V>()?;
        types.define::<HashMap<K, V>>(
            TypeMeta::named("HashMap"),
            map_caps::<HashMap<K, V>, K, V>(key, value),
        )
    }
}

impl<K: Describe + Ord, V: Describe> Describe for BTreeMap<K, V> {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        let key = types.token_of::<K>()?;
        let value = types.token_of::<V>()?;
        types.define::<BTreeMap<K, V>>(
            TypeMeta::named("BTreeMap"),
            map_caps::<BTreeMap<K, V>, K, V>(key, value),
        )
    }
}
