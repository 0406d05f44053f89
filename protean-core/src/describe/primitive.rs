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

//! Primitive adapters.

use crate::describe::{cast_ref, Describe};
use crate::error::Error;
use crate::model::caps::{Caps, PrimitiveCaps};
use crate::model::meta::TypeMeta;
use crate::model::registry::TypeRegistry;
use crate::types::{PrimitiveKind, PrimitiveValue, TypeToken};

macro_rules! impl_primitive {
    ($ty:ty, $kind:ident) => {
        impl Describe for $ty {
            fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
                types.define::<$ty>(
                    TypeMeta::named(stringify!($ty)),
                    Caps {
                        primitive: Some(PrimitiveCaps {
                            kind: PrimitiveKind::$kind,
                            get: Box::new(|value| {
                                Ok(PrimitiveValue::$kind(*cast_ref::<$ty>(value)?))
                            }),
                            build: Box::new(|scalar| match scalar {
                                PrimitiveValue::$kind(v) => Ok(Box::new(v)),
                                other => Err(Error::mismatched_shape(format!(
                                    concat!("expected ", stringify!($ty), ", got {:?}"),
                                    other.kind()
                                ))),
                            }),
                        }),
                        ..Caps::default()
                    },
                )
            }
        }
    };
}

impl_primitive!(bool, Bool);
impl_primitive!(i8, I8);
impl_primitive!(i16, I16);
impl_primitive!(i32, I32);
impl_primitive!(i64, I64);
impl_primitive!(u8, U8);
impl_primitive!(u16, U16);
impl_primitive!(u32, U32);
impl_primitive!(u64, U64);
impl_primitive!(f32, F32);
impl_primitive!(f64, F64);
impl_primitive!(char, Char);
