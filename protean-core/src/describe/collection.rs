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

//! Sequence adapters: one generic capability constructor covers every
//! container that can iterate its elements and extend from an iterator,
//! instead of one hand-written adapter per container type.
//!
//! `Vec<u8>` additionally exposes the bytes capability; the well-known rule
//! classifies it as Bytes ahead of the generic sequence rule.

use std::any::TypeId;
use std::collections::{BTreeSet, HashSet, LinkedList, VecDeque};
use std::hash::Hash;

use crate::describe::{cast_box, cast_mut, cast_ref, Describe};
use crate::error::Error;
use crate::model::caps::{BytesCaps, Caps, SeqCaps};
use crate::model::meta::TypeMeta;
use crate::model::registry::TypeRegistry;
use crate::types::TypeToken;

/// Builds the sequence capability record for container `C` with element `T`.
pub fn seq_caps<C, T>(item: TypeToken) -> Caps
where
    C: Default + Extend<T> + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
    T: 'static,
{
    Caps {
        seq: Some(SeqCaps {
            item,
            len: Box::new(|value| Ok(cast_ref::<C>(value)?.into_iter().count())),
            visit: Box::new(|value, visit| {
                for element in cast_ref::<C>(value)? {
                    visit(element)?;
                }
                Ok(())
            }),
            builder: Box::new(|_capacity| Box::new(C::default())),
            push: Box::new(|acc, element| {
                cast_mut::<C>(acc)?.extend(std::iter::once(cast_box::<T>(element)?));
                Ok(())
            }),
            finish: Box::new(Ok),
        }),
        ..Caps::default()
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        let item = types.token_of::<T>()?;
        let mut caps = seq_caps::<Vec<T>, T>(item);
        if TypeId::of::<T>() == TypeId::of::<u8>() {
            caps.bytes = Some(BytesCaps {
                get: Box::new(|value| Ok(cast_ref::<Vec<u8>>(value)?.as_slice())),
                build: Box::new(|bytes| Ok(Box::new(bytes))),
            });
        }
        types.define::<Vec<T>>(TypeMeta::named("Vec"), caps)
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        let item = types.token_of::<T>()?;
        types.define::<VecDeque<T>>(TypeMeta::named("VecDeque"), seq_caps::<VecDeque<T>, T>(item))
    }
}

impl<T: Describe> Describe for LinkedList<T> {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        let item = types.token_of::<T>()?;
        types.define::<LinkedList<T>>(
            TypeMeta::named("LinkedList"),
            seq_caps::<LinkedList<T>, T>(item),
        )
    }
}

impl<T: Describe + Hash + Eq> Describe for HashSet<T> {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        let item = types.token_of::<T>()?;
        types.define::<HashSet<T>>(TypeMeta::named("HashSet"), seq_caps::<HashSet<T>, T>(item))
    }
}

impl<T: Describe + Ord> Describe for BTreeSet<T> {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        let item = types.token_of::<T>()?;
        types.define::<BTreeSet<T>>(
            TypeMeta::named("BTreeSet"),
            seq_caps::<BTreeSet<T>, T>(item),
        )
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        let item = types.token_of::<T>()?;
        types.define::<[T; N]>(
            TypeMeta::named("Array"),
            Caps {
                seq: Some(SeqCaps {
                    item,
                    len: Box::new(|_| Ok(N)),
                    visit: Box::new(|value, visit| {
                        for element in cast_ref::<[T; N]>(value)?.iter() {
                            visit(element)?;
                        }
                        Ok(())
                    }),
                    builder: Box::new(|_capacity| Box::new(Vec::<T>::with_capacity(N))),
                    push: Box::new(|acc, element| {
                        cast_mut::<Vec<T>>(acc)?.push(cast_box::<T>(element)?);
                        Ok(())
                    }),
                    finish: Box::new(|acc| {
                        let elements = cast_box::<Vec<T>>(acc)?;
                        let array = <[T; N]>::try_from(elements).map_err(|leftover| {
                            Error::mismatched_shape(format!(
                                "expected {} array elements, got {}",
                                N,
                                leftover.len()
                            ))
                        })?;
                        Ok(Box::new(array))
                    }),
                }),
                ..Caps::default()
            },
        )
    }
}
