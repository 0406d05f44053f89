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

//! End-to-end round trips through the packed binary backend.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use protean::describe::{cast_payload, Describe, StructDef, UnionDef};
use protean::error::Error;
use protean::model::meta::TypeMeta;
use protean::model::registry::TypeRegistry;
use protean::types::TypeToken;
use protean::Protean;

fn round_trip<T: Describe + PartialEq + std::fmt::Debug + Clone>(engine: &Protean, value: &T) {
    let bytes = engine.to_bytes(value).unwrap();
    let back: T = engine.from_bytes(&bytes).unwrap();
    assert_eq!(&back, value);
}

#[test]
fn scalars_and_containers_round_trip() {
    let engine = Protean::default();
    round_trip(&engine, &false);
    round_trip(&engine, &i64::MIN);
    round_trip(&engine, &u64::MAX);
    round_trip(&engine, &-1.25f32);
    round_trip(&engine, &'é');
    round_trip(&engine, &"packed ✓".to_string());
    round_trip(&engine, &vec![1i64, -2, 3]);
    round_trip(&engine, &vec![0u8, 1, 255]);
    round_trip(&engine, &Some(77i32));
    round_trip(&engine, &None::<i32>);
    round_trip(&engine, &(1i32, "two".to_string()));
    round_trip(&engine, &[5i64, 6, 7]);

    let mut scores: HashMap<String, i64> = HashMap::new();
    scores.insert("a".to_string(), 1);
    scores.insert("b".to_string(), 2);
    round_trip(&engine, &scores);

    let mut nested: BTreeMap<String, Vec<bool>> = BTreeMap::new();
    nested.insert("flags".to_string(), vec![true, false, true]);
    round_trip(&engine, &nested);
}

#[test]
fn pointer_indirection_round_trips() {
    let engine = Protean::default();
    round_trip(&engine, &Box::new(41i64));
    round_trip(&engine, &std::rc::Rc::new("shared".to_string()));
    round_trip(&engine, &std::sync::Arc::new(vec![1i32, 2]));
}

#[test]
fn chrono_values_round_trip() {
    let engine = Protean::default();
    let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
    round_trip(&engine, &date);
    let timestamp: NaiveDateTime = date.and_hms_micro_opt(13, 14, 15, 161_718).unwrap();
    round_trip(&engine, &timestamp);
}

#[derive(Debug, Clone, PartialEq)]
struct Packet {
    id: u32,
    label: Option<String>,
    payload: Vec<u8>,
    checksum: (u16, u16),
}

impl Describe for Packet {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        let token = types.reserve::<Packet>(TypeMeta::named("Packet"))?;
        let caps = StructDef::new()
            .field(types, "id", |packet: &Packet| &packet.id)?
            .field(types, "label", |packet: &Packet| &packet.label)?
            .field(types, "payload", |packet: &Packet| &packet.payload)?
            .field(types, "checksum", |packet: &Packet| &packet.checksum)?
            .assemble(|mut parts| {
                Ok(Packet {
                    id: parts.take(0)?,
                    label: parts.take(1)?,
                    payload: parts.take(2)?,
                    checksum: parts.take(3)?,
                })
            })
            .into_caps()?;
        types.complete(token, caps)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Frame {
    Ping,
    Data(Packet),
    Batch(Vec<Frame>),
}

impl Describe for Frame {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        let token = types.reserve::<Frame>(TypeMeta::named("Frame"))?;
        let caps = UnionDef::new()
            .variant("Ping")
            .variant_with::<Packet>(types, "Data")?
            .variant_with::<Vec<Frame>>(types, "Batch")?
            .inspect(|frame: &Frame| match frame {
                Frame::Ping => (0, None),
                Frame::Data(packet) => (1, Some(packet)),
                Frame::Batch(frames) => (2, Some(frames)),
            })
            .build(|index, payload| match index {
                0 => Ok(Frame::Ping),
                1 => Ok(Frame::Data(cast_payload(payload)?)),
                2 => Ok(Frame::Batch(cast_payload(payload)?)),
                other => Err(Error::unknown_variant(format!(
                    "Frame has no variant {}",
                    other
                ))),
            })
            .into_caps()?;
        types.complete(token, caps)
    }
}

#[test]
fn structs_and_self_referential_unions_round_trip() {
    let engine = Protean::default();
    let packet = Packet {
        id: 7,
        label: Some("seven".to_string()),
        payload: vec![7, 7, 7],
        checksum: (1, 2),
    };
    round_trip(&engine, &packet);

    let unlabeled = Packet {
        label: None,
        ..packet.clone()
    };
    round_trip(&engine, &unlabeled);

    let frame = Frame::Batch(vec![
        Frame::Ping,
        Frame::Data(packet),
        Frame::Batch(vec![Frame::Ping]),
    ]);
    round_trip(&engine, &frame);
}

#[test]
fn shape_drift_between_writer_and_reader_is_detected() {
    let engine = Protean::default();
    let bytes = engine.to_bytes(&42i64).unwrap();
    let result: Result<String, Error> = engine.from_bytes(&bytes);
    assert!(matches!(result, Err(Error::MismatchedShape(_))));
}

#[test]
fn truncated_buffers_surface_bound_errors() {
    let engine = Protean::default();
    let bytes = engine.to_bytes(&"a longer string".to_string()).unwrap();
    let result: Result<String, Error> = engine.from_bytes(&bytes[..bytes.len() / 2]);
    assert!(matches!(result, Err(Error::BufferOutOfBound(..))));
}
