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

//! Round trips through the recording backend, one per shape, plus the
//! event-sequence assertions for the literal scenarios.

use std::collections::{BTreeMap, HashMap};

use protean::describe::{cast_payload, Describe, StructDef, UnionDef};
use protean::error::Error;
use protean::model::meta::{FieldMeta, RenameRule, TypeMeta};
use protean::model::registry::TypeRegistry;
use protean::prelude::{Event, RecordingSink, ReplaySource};
use protean::types::{PrimitiveValue, TypeToken, UnionStyle};
use protean::Protean;

fn record<T: Describe>(engine: &Protean, value: &T) -> Vec<Event> {
    let mut sink = RecordingSink::new();
    engine.serialize(value, &mut sink).unwrap();
    sink.into_events()
}

fn replay<T: Describe>(engine: &Protean, events: Vec<Event>) -> T {
    let mut source = ReplaySource::new(events);
    let value = engine.deserialize(&mut source).unwrap();
    assert!(source.is_exhausted());
    value
}

fn round_trip<T: Describe>(engine: &Protean, value: &T) -> T {
    let events = record(engine, value);
    replay(engine, events)
}

#[test]
fn seq_of_ints_records_the_literal_event_sequence() {
    let engine = Protean::default();
    let events = record(&engine, &vec![1i64, 2, 3]);
    assert_eq!(
        events,
        vec![
            Event::Seq(3),
            Event::Primitive(PrimitiveValue::I64(1)),
            Event::Primitive(PrimitiveValue::I64(2)),
            Event::Primitive(PrimitiveValue::I64(3)),
            Event::SeqEnd,
        ]
    );
    let back: Vec<i64> = replay(&engine, events);
    assert_eq!(back, vec![1, 2, 3]);
}

#[test]
fn map_builds_from_pulled_pairs() {
    let engine = Protean::default();
    let events = vec![
        Event::Map(2),
        Event::Text("a".to_string()),
        Event::Primitive(PrimitiveValue::I64(1)),
        Event::Text("b".to_string()),
        Event::Primitive(PrimitiveValue::I64(2)),
        Event::MapEnd,
    ];
    let map: HashMap<String, i64> = replay(&engine, events);
    assert_eq!(map.len(), 2);
    assert_eq!(map["a"], 1);
    assert_eq!(map["b"], 2);
}

#[test]
fn primitive_string_bytes_round_trips() {
    let engine = Protean::default();
    assert_eq!(round_trip(&engine, &true), true);
    assert_eq!(round_trip(&engine, &-7i32), -7);
    assert_eq!(round_trip(&engine, &3.5f64), 3.5);
    assert_eq!(round_trip(&engine, &'z'), 'z');
    assert_eq!(round_trip(&engine, &"hello".to_string()), "hello");
    let blob: Vec<u8> = vec![0, 1, 2, 255];
    assert_eq!(round_trip(&engine, &blob), blob);
}

#[test]
fn byte_vectors_classify_as_bytes_not_seq() {
    let engine = Protean::default();
    let events = record(&engine, &vec![1u8, 2, 3]);
    assert_eq!(events, vec![Event::Bytes(vec![1, 2, 3])]);
}

#[test]
fn nested_composites_round_trip() {
    let engine = Protean::default();
    let mut value: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    value.insert("evens".to_string(), vec![2, 4]);
    value.insert("odds".to_string(), vec![1, 3, 5]);
    assert_eq!(round_trip(&engine, &value), value);

    let tuple = (1i32, "mixed".to_string(), vec![true, false]);
    assert_eq!(round_trip(&engine, &tuple), tuple);

    let optional: Option<Vec<i64>> = Some(vec![9]);
    assert_eq!(round_trip(&engine, &optional), optional);
    assert_eq!(round_trip(&engine, &None::<Vec<i64>>), None);

    let array = [10i64, 20, 30];
    assert_eq!(round_trip(&engine, &array), array);

    let mut deque = std::collections::VecDeque::new();
    deque.extend([1i32, 2, 3]);
    assert_eq!(round_trip(&engine, &deque), deque);

    let mut set = std::collections::BTreeSet::new();
    set.extend(["x".to_string(), "y".to_string()]);
    assert_eq!(round_trip(&engine, &set), set);
}

#[derive(Debug, Clone, PartialEq)]
struct Person {
    name: String,
    nickname: Option<String>,
    age: i32,
}

impl Describe for Person {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        let token = types.reserve::<Person>(TypeMeta::named("Person"))?;
        let caps = StructDef::new()
            .field(types, "name", |person: &Person| &person.name)?
            .field(types, "nickname", |person: &Person| &person.nickname)?
            .field(types, "age", |person: &Person| &person.age)?
            .assemble(|mut parts| {
                Ok(Person {
                    name: parts.take(0)?,
                    nickname: parts.take(1)?,
                    age: parts.take(2)?,
                })
            })
            .into_caps()?;
        types.complete(token, caps)
    }
}

#[test]
fn struct_with_absent_optional_field_reads_back_as_absent() {
    let engine = Protean::default();
    let person = Person {
        name: "Ada".to_string(),
        nickname: None,
        age: 36,
    };
    assert_eq!(round_trip(&engine, &person), person);

    // The same struct with the optional field missing from the stream
    // entirely, not just encoded as none.
    let events = vec![
        Event::Struct("Person".to_string()),
        Event::Field("name".to_string()),
        Event::Text("Ada".to_string()),
        Event::Field("age".to_string()),
        Event::Primitive(PrimitiveValue::I32(36)),
        Event::StructEnd,
    ];
    let back: Person = replay(&engine, events);
    assert_eq!(back, person);
}

#[test]
fn missing_required_field_is_an_error() {
    let engine = Protean::default();
    let events = vec![
        Event::Struct("Person".to_string()),
        Event::Field("name".to_string()),
        Event::Text("Ada".to_string()),
        Event::StructEnd,
    ];
    let mut source = ReplaySource::new(events);
    let result: Result<Person, Error> = engine.deserialize(&mut source);
    assert!(matches!(result, Err(Error::MissingField(_))));
}

#[test]
fn unknown_fields_are_skipped_by_the_replay_source() {
    let engine = Protean::default();
    let events = vec![
        Event::Struct("Person".to_string()),
        Event::Field("name".to_string()),
        Event::Text("Ada".to_string()),
        Event::Field("shoe_size".to_string()),
        Event::Seq(2),
        Event::Primitive(PrimitiveValue::I64(41)),
        Event::Primitive(PrimitiveValue::I64(42)),
        Event::SeqEnd,
        Event::Field("age".to_string()),
        Event::Primitive(PrimitiveValue::I32(36)),
        Event::StructEnd,
    ];
    let back: Person = replay(&engine, events);
    assert_eq!(back.age, 36);
    assert_eq!(back.nickname, None);
}

#[derive(Debug, Clone, PartialEq)]
struct Renamed {
    user_id: i64,
    display_name: String,
}

impl Describe for Renamed {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        let token = types.reserve::<Renamed>(
            TypeMeta::named("Renamed").rename_all(RenameRule::CamelCase),
        )?;
        let caps = StructDef::new()
            .field(types, "user_id", |value: &Renamed| &value.user_id)?
            .field(
                types,
                FieldMeta::new("display_name").rename("displayName2"),
                |value: &Renamed| &value.display_name,
            )?
            .assemble(|mut parts| {
                Ok(Renamed {
                    user_id: parts.take(0)?,
                    display_name: parts.take(1)?,
                })
            })
            .into_caps()?;
        types.complete(token, caps)
    }
}

#[test]
fn rename_rules_shape_wire_labels() {
    let engine = Protean::default();
    let value = Renamed {
        user_id: 9,
        display_name: "nine".to_string(),
    };
    let events = record(&engine, &value);
    assert!(events.contains(&Event::Field("userId".to_string())));
    assert!(events.contains(&Event::Field("displayName2".to_string())));
    assert_eq!(replay::<Renamed>(&engine, events), value);
}

#[derive(Debug, Clone, PartialEq)]
struct Audit {
    id: i64,
    secret: String,
    cached: Option<i64>,
}

impl Describe for Audit {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        let token = types.reserve::<Audit>(TypeMeta::named("Audit"))?;
        let caps = StructDef::new()
            .field(types, "id", |audit: &Audit| &audit.id)?
            .field(
                types,
                FieldMeta::new("secret").skip_ser().skip_de(),
                |audit: &Audit| &audit.secret,
            )?
            .field(
                types,
                FieldMeta::new("cached").skip_de(),
                |audit: &Audit| &audit.cached,
            )?
            .assemble(|mut parts| {
                Ok(Audit {
                    id: parts.take(0)?,
                    secret: parts.take_opt(1)?.unwrap_or_default(),
                    cached: parts.take_opt(2)?.unwrap_or_default(),
                })
            })
            .into_caps()?;
        types.complete(token, caps)
    }
}

#[test]
fn per_direction_include_flags_are_honored() {
    let engine = Protean::default();
    let audit = Audit {
        id: 5,
        secret: "hunter2".to_string(),
        cached: Some(9),
    };
    let events = record(&engine, &audit);
    // Ser-excluded fields never hit the wire.
    assert!(!events.contains(&Event::Field("secret".to_string())));
    assert!(events.contains(&Event::Field("cached".to_string())));

    // De-excluded fields are ignored on the way back in.
    let back: Audit = replay(&engine, events);
    assert_eq!(back.id, 5);
    assert_eq!(back.secret, "");
    assert_eq!(back.cached, None);
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Halt,
    Step(i64),
    Move((f64, f64)),
}

impl Describe for Command {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        let token = types.reserve::<Command>(
            TypeMeta::named("Command").union_style(UnionStyle::External),
        )?;
        let caps = UnionDef::new()
            .variant("Halt")
            .variant_with::<i64>(types, "Step")?
            .variant_with::<(f64, f64)>(types, "Move")?
            .inspect(|command: &Command| match command {
                Command::Halt => (0, None),
                Command::Step(steps) => (1, Some(steps)),
                Command::Move(to) => (2, Some(to)),
            })
            .build(|index, payload| match index {
                0 => Ok(Command::Halt),
                1 => Ok(Command::Step(cast_payload(payload)?)),
                2 => Ok(Command::Move(cast_payload(payload)?)),
                other => Err(Error::unknown_variant(format!(
                    "Command has no variant {}",
                    other
                ))),
            })
            .into_caps()?;
        types.complete(token, caps)
    }
}

#[test]
fn union_variants_round_trip_with_tag_and_payload() {
    let engine = Protean::default();
    for command in [
        Command::Halt,
        Command::Step(-3),
        Command::Move((1.5, -2.5)),
    ] {
        assert_eq!(round_trip(&engine, &command), command);
    }

    let events = record(&engine, &Command::Step(-3));
    assert_eq!(
        events,
        vec![
            Event::Union {
                name: "Command".to_string(),
                variant: "Step".to_string(),
                tag: 1,
                style: UnionStyle::External,
            },
            Event::Primitive(PrimitiveValue::I64(-3)),
            Event::UnionEnd,
        ]
    );
}

#[derive(Debug, Clone, PartialEq)]
enum Light {
    Red,
    Green,
}

impl Describe for Light {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        let token = types.reserve::<Light>(
            TypeMeta::named("Light").union_style(UnionStyle::Internal),
        )?;
        let caps = UnionDef::new()
            .variant("Red")
            .variant("Green")
            .inspect(|light: &Light| match light {
                Light::Red => (0, None),
                Light::Green => (1, None),
            })
            .build(|index, _payload| match index {
                0 => Ok(Light::Red),
                1 => Ok(Light::Green),
                other => Err(Error::unknown_variant(format!(
                    "Light has no variant {}",
                    other
                ))),
            })
            .into_caps()?;
        types.complete(token, caps)
    }
}

#[test]
fn union_tag_style_is_threaded_through_to_the_backend() {
    let engine = Protean::default();
    let events = record(&engine, &Light::Green);
    assert_eq!(
        events,
        vec![
            Event::Union {
                name: "Light".to_string(),
                variant: "Green".to_string(),
                tag: 1,
                style: UnionStyle::Internal,
            },
            Event::UnionEnd,
        ]
    );
    assert_eq!(replay::<Light>(&engine, events), Light::Green);
}

#[test]
fn unknown_variant_tag_is_an_error() {
    let engine = Protean::default();
    let events = vec![
        Event::Union {
            name: "Command".to_string(),
            variant: "Warp".to_string(),
            tag: 9,
            style: UnionStyle::External,
        },
        Event::UnionEnd,
    ];
    let mut source = ReplaySource::new(events);
    let result: Result<Command, Error> = engine.deserialize(&mut source);
    assert!(matches!(result, Err(Error::UnknownVariant(_))));
}
