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

//! chrono adapters: timestamps as microseconds since the epoch, dates as
//! days from the common era. Both ride the primitive shape.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use crate::describe::{cast_ref, Describe};
use crate::error::Error;
use crate::model::caps::{Caps, PrimitiveCaps};
use crate::model::meta::TypeMeta;
use crate::model::registry::TypeRegistry;
use crate::types::{PrimitiveKind, PrimitiveValue, TypeToken};

impl Describe for NaiveDateTime {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        types.define::<NaiveDateTime>(
            TypeMeta::named("NaiveDateTime"),
            Caps {
                primitive: Some(PrimitiveCaps {
                    kind: PrimitiveKind::I64,
                    get: Box::new(|value| {
                        Ok(PrimitiveValue::I64(
                            cast_ref::<NaiveDateTime>(value)?.and_utc().timestamp_micros(),
                        ))
                    }),
                    build: Box::new(|scalar| match scalar {
                        PrimitiveValue::I64(micros) => DateTime::<Utc>::from_timestamp_micros(micros)
                            .map(|timestamp| Box::new(timestamp.naive_utc()) as Box<dyn std::any::Any>)
                            .ok_or_else(|| {
                                Error::type_error(format!("timestamp {} out of range", micros))
                            }),
                        other => Err(Error::mismatched_shape(format!(
                            "expected i64 timestamp, got {:?}",
                            other.kind()
                        ))),
                    }),
                }),
                ..Caps::default()
            },
        )
    }
}

impl Describe for NaiveDate {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        types.define::<NaiveDate>(
            TypeMeta::named("NaiveDate"),
            Caps {
                primitive: Some(PrimitiveCaps {
                    kind: PrimitiveKind::I32,
                    get: Box::new(|value| {
                        Ok(PrimitiveValue::I32(
                            cast_ref::<NaiveDate>(value)?.num_days_from_ce(),
                        ))
                    }),
                    build: Box::new(|scalar| match scalar {
                        PrimitiveValue::I32(days) => NaiveDate::from_num_days_from_ce_opt(days)
                            .map(|date| Box::new(date) as Box<dyn std::any::Any>)
                            .ok_or_else(|| {
                                Error::type_error(format!("day count {} out of range", days))
                            }),
                        other => Err(Error::mismatched_shape(format!(
                            "expected i32 day count, got {:?}",
                            other.kind()
                        ))),
                    }),
                }),
                ..Caps::default()
            },
        )
    }
}
