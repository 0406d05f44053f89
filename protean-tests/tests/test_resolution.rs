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

//! Resolution behavior: idempotence, self-reference, mutual recursion,
//! cycles without progress, failure caching, and nullability contexts.

use std::sync::Arc;

use protean::describe::{Describe, StructDef};
use protean::error::Error;
use protean::model::caps::{Caps, FieldDef, StructCaps};
use protean::model::meta::{FieldMeta, TypeMeta};
use protean::model::registry::TypeRegistry;
use protean::prelude::{Event, RecordingSink, ReplaySource};
use protean::types::TypeToken;
use protean::Protean;

fn round_trip<T: Describe>(engine: &Protean, value: &T) -> T {
    let mut sink = RecordingSink::new();
    engine.serialize(value, &mut sink).unwrap();
    let mut source = ReplaySource::new(sink.into_events());
    engine.deserialize(&mut source).unwrap()
}

#[test]
fn resolving_twice_yields_the_same_cached_strategy() {
    let engine = Protean::default();
    let token = engine.token_of::<Vec<i64>>().unwrap();
    let first = engine.resolve_ser(token).unwrap();
    let second = engine.resolve_ser(token).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let de_first = engine.resolve_de(token).unwrap();
    let de_second = engine.resolve_de(token).unwrap();
    assert!(Arc::ptr_eq(&de_first, &de_second));
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    value: i64,
    children: Vec<Node>,
}

impl Describe for Node {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        let token = types.reserve::<Node>(TypeMeta::named("Node"))?;
        let caps = StructDef::new()
            .field(types, "value", |node: &Node| &node.value)?
            .field(types, "children", |node: &Node| &node.children)?
            .assemble(|mut parts| {
                Ok(Node {
                    value: parts.take(0)?,
                    children: parts.take(1)?,
                })
            })
            .into_caps()?;
        types.complete(token, caps)
    }
}

#[test]
fn self_referential_type_resolves_and_round_trips() {
    let engine = Protean::default();
    let tree = Node {
        value: 1,
        children: vec![
            Node {
                value: 2,
                children: vec![Node {
                    value: 4,
                    children: vec![],
                }],
            },
            Node {
                value: 3,
                children: vec![],
            },
        ],
    };
    assert_eq!(round_trip(&engine, &tree), tree);
}

#[derive(Debug, Clone, PartialEq)]
struct Category {
    name: String,
    entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    label: String,
    parent: Option<Box<Category>>,
}

impl Describe for Category {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        let token = types.reserve::<Category>(TypeMeta::named("Category"))?;
        let caps = StructDef::new()
            .field(types, "name", |category: &Category| &category.name)?
            .field(types, "entries", |category: &Category| &category.entries)?
            .assemble(|mut parts| {
                Ok(Category {
                    name: parts.take(0)?,
                    entries: parts.take(1)?,
                })
            })
            .into_caps()?;
        types.complete(token, caps)
    }
}

impl Describe for Entry {
    fn describe(types: &mut TypeRegistry) -> Result<TypeToken, Error> {
        let token = types.reserve::<Entry>(TypeMeta::named("Entry"))?;
        let caps = StructDef::new()
            .field(types, "label", |entry: &Entry| &entry.label)?
            .field(types, "parent", |entry: &Entry| &entry.parent)?
            .assemble(|mut parts| {
                Ok(Entry {
                    label: parts.take(0)?,
                    parent: parts.take(1)?,
                })
            })
            .into_caps()?;
        types.complete(token, caps)
    }
}

#[test]
fn mutually_recursive_types_resolve_without_overflow() {
    let engine = Protean::default();
    let value = Category {
        name: "root".to_string(),
        entries: vec![Entry {
            label: "leaf".to_string(),
            parent: Some(Box::new(Category {
                name: "detached".to_string(),
                entries: vec![],
            })),
        }],
    };
    assert_eq!(round_trip(&engine, &value), value);

    // Both directions resolve from either entry point.
    let category = engine.token_of::<Category>().unwrap();
    let entry = engine.token_of::<Entry>().unwrap();
    assert!(engine.resolve_de(category).is_ok());
    assert!(engine.resolve_de(entry).is_ok());
}

struct DirectA;
struct DirectB;

fn stub_struct_caps(field_name: &str, ty: TypeToken) -> Caps {
    Caps {
        strukt: Some(StructCaps {
            fields: vec![FieldDef {
                meta: FieldMeta::new(field_name),
                ty,
            }],
            get: Box::new(|_, _| Err(Error::type_error("stub accessor"))),
            assemble: Box::new(|_| Err(Error::type_error("stub assemble"))),
        }),
        ..Caps::default()
    }
}

#[test]
fn direct_mutual_inlining_is_a_cycle_without_progress() {
    let engine = Protean::default();
    let token_a = engine
        .with_types(|types| -> Result<TypeToken, Error> {
            let a = types.reserve::<DirectA>(TypeMeta::named("DirectA"))?;
            let b = types.reserve::<DirectB>(TypeMeta::named("DirectB"))?;
            types.complete(a, stub_struct_caps("b", b))?;
            types.complete(b, stub_struct_caps("a", a))?;
            Ok(a)
        })
        .unwrap();

    let error = engine.resolve_ser(token_a).unwrap_err();
    assert!(matches!(error, Error::CycleWithoutProgress(_)));

    // The failure is cached: the next request fails fast with the recorded
    // message instead of re-walking the graph.
    let replayed = engine.resolve_ser(token_a).unwrap_err();
    assert!(matches!(replayed, Error::Resolution(_)));
    assert!(replayed.to_string().contains("no indirection point"));
}

struct Empty;

#[test]
fn zero_field_struct_resolves_and_serializes() {
    let engine = Protean::default();
    let token = engine
        .with_types(|types| -> Result<TypeToken, Error> {
            let token = types.reserve::<Empty>(TypeMeta::named("Empty"))?;
            types.complete(
                token,
                Caps {
                    strukt: Some(StructCaps {
                        fields: vec![],
                        get: Box::new(|_, _| Err(Error::type_error("no fields"))),
                        assemble: Box::new(|_| Ok(Box::new(Empty))),
                    }),
                    ..Caps::default()
                },
            )
        })
        .unwrap();

    let mut sink = RecordingSink::new();
    engine.serialize_value(token, &Empty, &mut sink).unwrap();
    assert_eq!(
        sink.events,
        vec![
            Event::Struct("Empty".to_string()),
            Event::StructEnd,
        ]
    );

    let mut source = ReplaySource::new(sink.into_events());
    let back = engine.deserialize_value(token, &mut source).unwrap();
    assert!(back.downcast::<Empty>().is_ok());
}

struct Opaque;

#[test]
fn capability_free_type_fails_resolution_without_fallback() {
    let engine = Protean::default();
    let token = engine
        .with_types(|types| {
            let token = types.reserve::<Opaque>(TypeMeta::named("Opaque"))?;
            types.complete(token, Caps::default())
        })
        .unwrap();
    let error = engine.resolve_ser(token).unwrap_err();
    assert!(matches!(error, Error::Resolution(_)));
}

#[test]
fn nullable_context_is_a_distinct_descriptor() {
    let engine = Protean::default();
    let required = engine.token_of::<std::rc::Weak<i64>>().unwrap();
    let nullable = engine.nullable_token_of::<std::rc::Weak<i64>>().unwrap();
    assert_ne!(required, nullable);

    let required_strategy = engine.resolve_ser(required).unwrap();
    let nullable_strategy = engine.resolve_ser(nullable).unwrap();
    assert!(!Arc::ptr_eq(&required_strategy, &nullable_strategy));
}

#[test]
fn nullable_context_without_null_representation_is_rejected() {
    let engine = Protean::default();
    let token = engine.nullable_token_of::<i64>().unwrap();
    let error = engine.resolve_ser(token).unwrap_err();
    assert!(matches!(error, Error::Resolution(_)));
    assert!(error.to_string().contains("null representation"));
}
