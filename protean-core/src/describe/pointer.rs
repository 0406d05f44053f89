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

//! Pointer adapters.
//!
//! `Box`, `Rc` and `Arc` are transparent indirection: they project to the
//! pointee and count as cycle-breaking points. Weak pointers additionally
//! carry a null representation — a dead weak is a null reference distinct
//! from "option absent" — and therefore resolve behind a null guard.
//!
//! Weak pointers deserialize to a dangling weak: without reference
//! tracking there is no strong pointer to attach to, so a present payload
//! is consumed and dropped.

use std::rc;
use std::sync;

use crate::describe::{cast_box, cast_ref, Describe};
use crate::error::Error;
use crate::model::caps::{Caps, DelegateCaps, NullReprCaps};
use crate::model::meta::TypeMeta;
use crate::model::registry::TypeRegistry;
use crate::types::TypeToken;

macro_rules! impl_pointer {
    ($pointer:ident, $name:literal, $wrap:expr) => {
        impl<T: Describe> Describe for $pointer<T> {
            fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
                let inner = types.token_of::<T>()?;
                types.define::<$pointer<T>>(
                    TypeMeta::named($name),
                    Caps {
                        delegate: Some(DelegateCaps {
                            inner,
                            project: Box::new(|value, forward| {
                                forward(cast_ref::<$pointer<T>>(value)?.as_ref())
                            }),
                            wrap: Box::new(|pointee| {
                                let wrap: fn(T) -> $pointer<T> = $wrap;
                                Ok(Box::new(wrap(cast_box::<T>(pointee)?)))
                            }),
                        }),
                        ..Caps::default()
                    },
                )
            }
        }
    };
}

use std::boxed::Box as StdBox;
use std::rc::Rc;
use std::sync::Arc;

impl_pointer!(StdBox, "Box", StdBox::new);
impl_pointer!(Rc, "Rc", Rc::new);
impl_pointer!(Arc, "Arc", Arc::new);

macro_rules! impl_weak {
    ($module:ident, $name:literal) => {
        impl<T: Describe> Describe for $module::Weak<T> {
            fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
                let inner = types.token_of::<T>()?;
                types.define::<$module::Weak<T>>(
                    TypeMeta::named($name),
                    Caps {
                        delegate: Some(DelegateCaps {
                            inner,
                            project: Box::new(|value, forward| {
                                match cast_ref::<$module::Weak<T>>(value)?.upgrade() {
                                    Some(strong) => forward(strong.as_ref()),
                                    None => Err(Error::mismatched_shape(
                                        "dead weak reference reached traversal without a null guard",
                                    )),
                                }
                            }),
                            // No strong pointer to attach to: the payload is
                            // consumed and the weak comes back dangling.
                            wrap: Box::new(|_pointee| Ok(Box::new($module::Weak::<T>::new()))),
                        }),
                        null_repr: Some(NullReprCaps {
                            is_null: Box::new(|value| {
                                Ok(cast_ref::<$module::Weak<T>>(value)?.upgrade().is_none())
                            }),
                            make_null: Box::new(|| Box::new($module::Weak::<T>::new())),
                        }),
                        ..Caps::default()
                    },
                )
            }
        }
    };
}

impl_weak!(rc, "rc::Weak");
impl_weak!(sync, "sync::Weak");
