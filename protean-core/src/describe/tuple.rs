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

//! Tuple adapters, arities 1 through 4.

use std::any::Any;

use crate::describe::{cast_ref, Describe};
use crate::error::Error;
use crate::model::caps::{Caps, TupleCaps};
use crate::model::meta::TypeMeta;
use crate::model::registry::TypeRegistry;
use crate::types::TypeToken;

macro_rules! impl_tuple {
    ($(($idx:tt, $name:ident)),+) => {
        impl<$($name: Describe),+> Describe for ($($name,)+) {
            fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
                let slots = vec![$(types.token_of::<$name>()?),+];
                types.define::<($($name,)+)>(
                    TypeMeta::named("Tuple"),
                    Caps {
                        tuple: Some(TupleCaps {
                            slots,
                            get: Box::new(|value, index| {
                                let tuple = cast_ref::<($($name,)+)>(value)?;
                                match index {
                                    $($idx => Ok(&tuple.$idx as &dyn Any),)+
                                    _ => Err(Error::type_error(format!(
                                        "tuple slot {} out of range",
                                        index
                                    ))),
                                }
                            }),
                            assemble: Box::new(|mut parts| {
                                Ok(Box::new(($(parts.take::<$name>($idx)?,)+)))
                            }),
                        }),
                        ..Caps::default()
                    },
                )
            }
        }
    };
}

impl_tuple!((0, A));
impl_tuple!((0, A), (1, B));
impl_tuple!((0, A), (1, B), (2, C));
impl_tuple!((0, A), (1, B), (2, C), (3, D));
