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

//! Configurable behavior: duplicate-key policies, explicit overrides, the
//! legacy fallback, null guards, and call-time error scoping.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use protean::config::StrategyOverride;
use protean::error::Error;
use protean::model::caps::Caps;
use protean::model::meta::TypeMeta;
use protean::model::registry::TypeDef;
use protean::prelude::{Event, RecordingSink, ReplaySource, Sink, Source};
use protean::strategy::{DeRef, DeStrategy, SerRef, SerStrategy};
use protean::types::{DuplicateKeys, PrimitiveValue, Shape, TypeToken};
use protean::Protean;

fn duplicate_key_events() -> Vec<Event> {
    vec![
        Event::Map(2),
        Event::Text("a".to_string()),
        Event::Primitive(PrimitiveValue::I64(1)),
        Event::Text("a".to_string()),
        Event::Primitive(PrimitiveValue::I64(2)),
        Event::MapEnd,
    ]
}

#[test]
fn duplicate_keys_overwrite_by_default() {
    let engine = Protean::default();
    let mut source = ReplaySource::new(duplicate_key_events());
    let map: HashMap<String, i64> = engine.deserialize(&mut source).unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map["a"], 2);
}

#[test]
fn duplicate_keys_error_under_unique_policy() {
    let engine = Protean::default().duplicate_keys(DuplicateKeys::Unique);
    let mut source = ReplaySource::new(duplicate_key_events());
    let result: Result<HashMap<String, i64>, Error> = engine.deserialize(&mut source);
    assert!(matches!(result, Err(Error::DuplicateKey(_))));
}

/// Serializes an `i64` as decimal text instead of a scalar.
struct TextualInts;

struct TextualIntSer;

impl SerStrategy for TextualIntSer {
    fn shape(&self) -> Shape {
        Shape::Text
    }

    fn drive(&self, value: &dyn Any, sink: &mut dyn Sink) -> Result<(), Error> {
        let value = value
            .downcast_ref::<i64>()
            .ok_or_else(|| Error::type_error("override expects i64"))?;
        sink.text(&value.to_string())
    }
}

struct TextualIntDe;

impl DeStrategy for TextualIntDe {
    fn shape(&self) -> Shape {
        Shape::Text
    }

    fn pull(&self, source: &mut dyn Source) -> Result<Box<dyn Any>, Error> {
        let text = source.text()?;
        let value: i64 = text
            .parse()
            .map_err(|_| Error::mismatched_shape(format!("{:?} is not an integer", text)))?;
        Ok(Box::new(value))
    }
}

impl StrategyOverride for TextualInts {
    fn ser(&self, _def: &TypeDef) -> Result<SerRef, Error> {
        Ok(Arc::new(TextualIntSer))
    }

    fn de(&self, _def: &TypeDef) -> Result<DeRef, Error> {
        Ok(Arc::new(TextualIntDe))
    }
}

#[test]
fn explicit_override_wins_over_shape_rules() {
    let engine = Protean::default().with_override::<i64>(Arc::new(TextualInts));
    let mut sink = RecordingSink::new();
    engine.serialize(&42i64, &mut sink).unwrap();
    assert_eq!(sink.events, vec![Event::Text("42".to_string())]);

    let mut source = ReplaySource::new(sink.into_events());
    let back: i64 = engine.deserialize(&mut source).unwrap();
    assert_eq!(back, 42);

    // The override reaches nested positions through normal resolution.
    let mut sink = RecordingSink::new();
    engine.serialize(&vec![7i64], &mut sink).unwrap();
    assert_eq!(
        sink.events,
        vec![Event::Seq(1), Event::Text("7".to_string()), Event::SeqEnd]
    );
}

struct Opaque;

/// Fallback that renders any unclassifiable value as a fixed marker string.
struct MarkerFallback;

struct MarkerSer;

impl SerStrategy for MarkerSer {
    fn shape(&self) -> Shape {
        Shape::Text
    }

    fn drive(&self, _value: &dyn Any, sink: &mut dyn Sink) -> Result<(), Error> {
        sink.text("<legacy>")
    }
}

struct MarkerDe;

impl DeStrategy for MarkerDe {
    fn shape(&self) -> Shape {
        Shape::Text
    }

    fn pull(&self, source: &mut dyn Source) -> Result<Box<dyn Any>, Error> {
        source.text()?;
        Ok(Box::new(Opaque))
    }
}

impl StrategyOverride for MarkerFallback {
    fn ser(&self, _def: &TypeDef) -> Result<SerRef, Error> {
        Ok(Arc::new(MarkerSer))
    }

    fn de(&self, _def: &TypeDef) -> Result<DeRef, Error> {
        Ok(Arc::new(MarkerDe))
    }
}

#[test]
fn fallback_substitutes_when_no_shape_rule_matches() {
    let engine = Protean::default().with_fallback(Arc::new(MarkerFallback));
    let token = engine
        .with_types(|types| -> Result<TypeToken, Error> {
            let token = types.reserve::<Opaque>(TypeMeta::named("Opaque"))?;
            types.complete(token, Caps::default())
        })
        .unwrap();

    let mut sink = RecordingSink::new();
    engine.serialize_value(token, &Opaque, &mut sink).unwrap();
    assert_eq!(sink.events, vec![Event::Text("<legacy>".to_string())]);

    let mut source = ReplaySource::new(sink.into_events());
    let back = engine.deserialize_value(token, &mut source).unwrap();
    assert!(back.downcast::<Opaque>().is_ok());
}

#[test]
fn weak_pointers_serialize_behind_a_null_guard() {
    let engine = Protean::default();

    let dead: std::rc::Weak<i64> = std::rc::Weak::new();
    let mut sink = RecordingSink::new();
    engine.serialize(&dead, &mut sink).unwrap();
    assert_eq!(sink.events, vec![Event::None]);

    let strong = Rc::new(11i64);
    let live = Rc::downgrade(&strong);
    let mut sink = RecordingSink::new();
    engine.serialize(&live, &mut sink).unwrap();
    assert_eq!(
        sink.events,
        vec![Event::Some, Event::Primitive(PrimitiveValue::I64(11))]
    );

    // Without reference tracking a weak deserializes dangling, in both the
    // null and the live encodings.
    let mut source = ReplaySource::new(vec![Event::None]);
    let back: std::rc::Weak<i64> = engine.deserialize(&mut source).unwrap();
    assert!(back.upgrade().is_none());

    let mut source = ReplaySource::new(vec![
        Event::Some,
        Event::Primitive(PrimitiveValue::I64(11)),
    ]);
    let back: std::rc::Weak<i64> = engine.deserialize(&mut source).unwrap();
    assert!(back.upgrade().is_none());
}

#[test]
fn call_time_mismatch_leaves_the_cached_strategy_valid() {
    let engine = Protean::default();

    // Feed map-shaped events to a seq strategy.
    let mut source = ReplaySource::new(vec![
        Event::Map(1),
        Event::Text("a".to_string()),
        Event::Primitive(PrimitiveValue::I64(1)),
        Event::MapEnd,
    ]);
    let result: Result<Vec<i64>, Error> = engine.deserialize(&mut source);
    assert!(matches!(result, Err(Error::MismatchedShape(_))));

    // The failure was scoped to the call: the same strategy still works.
    let mut source = ReplaySource::new(vec![
        Event::Seq(1),
        Event::Primitive(PrimitiveValue::I64(5)),
        Event::SeqEnd,
    ]);
    let back: Vec<i64> = engine.deserialize(&mut source).unwrap();
    assert_eq!(back, vec![5]);
}
