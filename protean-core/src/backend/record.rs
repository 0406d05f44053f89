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

//! The recording backend: a sink that captures the traversal as a flat
//! event sequence and a source that replays one. This is the reference
//! implementation of the protocol and the backbone of the test suite —
//! `deserialize(replay(record(serialize(v)))) == v` exercises every shape
//! without committing to a wire format.

use std::collections::VecDeque;

use crate::error::Error;
use crate::protocol::{
    PayloadAccess, SizeHint, Sink, Source, StructAccess, WireField, WireVariant,
};
use crate::types::{PrimitiveKind, PrimitiveValue, UnionStyle};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Primitive(PrimitiveValue),
    Text(String),
    Bytes(Vec<u8>),
    None,
    Some,
    Seq(usize),
    SeqEnd,
    Map(usize),
    MapEnd,
    Tuple(usize),
    TupleEnd,
    Struct(String),
    Field(String),
    StructEnd,
    Union {
        name: String,
        variant: String,
        tag: u32,
        style: UnionStyle,
    },
    UnionEnd,
}

/// Captures a traversal into `events`.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<Event>,
}

impl RecordingSink {
    pub fn new() -> RecordingSink {
        RecordingSink::default()
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl Sink for RecordingSink {
    fn primitive(&mut self, value: PrimitiveValue) -> Result<(), Error> {
        self.events.push(Event::Primitive(value));
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), Error> {
        self.events.push(Event::Text(text.to_owned()));
        Ok(())
    }

    fn bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.events.push(Event::Bytes(bytes.to_vec()));
        Ok(())
    }

    fn none(&mut self) -> Result<(), Error> {
        self.events.push(Event::None);
        Ok(())
    }

    fn some(&mut self) -> Result<(), Error> {
        self.events.push(Event::Some);
        Ok(())
    }

    fn begin_seq(&mut self, len: usize) -> Result<(), Error> {
        self.events.push(Event::Seq(len));
        Ok(())
    }

    fn end_seq(&mut self) -> Result<(), Error> {
        self.events.push(Event::SeqEnd);
        Ok(())
    }

    fn begin_map(&mut self, len: usize) -> Result<(), Error> {
        self.events.push(Event::Map(len));
        Ok(())
    }

    fn end_map(&mut self) -> Result<(), Error> {
        self.events.push(Event::MapEnd);
        Ok(())
    }

    fn begin_tuple(&mut self, arity: usize) -> Result<(), Error> {
        self.events.push(Event::Tuple(arity));
        Ok(())
    }

    fn end_tuple(&mut self) -> Result<(), Error> {
        self.events.push(Event::TupleEnd);
        Ok(())
    }

    fn strukt(&mut self, name: &str, access: &dyn StructAccess) -> Result<(), Error> {
        self.events.push(Event::Struct(name.to_owned()));
        for index in 0..access.len() {
            self.events
                .push(Event::Field(access.field(index).label.clone()));
            access.drive(index, self)?;
        }
        self.events.push(Event::StructEnd);
        Ok(())
    }

    fn union(
        &mut self,
        name: &str,
        variant: &WireVariant,
        style: UnionStyle,
        payload: Option<&dyn PayloadAccess>,
    ) -> Result<(), Error> {
        self.events.push(Event::Union {
            name: name.to_owned(),
            variant: variant.label.clone(),
            tag: variant.tag,
            style,
        });
        if let Some(payload) = payload {
            payload.drive(self)?;
        }
        self.events.push(Event::UnionEnd);
        Ok(())
    }
}

/// Replays a recorded event sequence as a pull source.
pub struct ReplaySource {
    events: VecDeque<Event>,
}

impl ReplaySource {
    pub fn new(events: Vec<Event>) -> ReplaySource {
        ReplaySource {
            events: events.into(),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.events.is_empty()
    }

    fn next(&mut self) -> Result<Event, Error> {
        self.events
            .pop_front()
            .ok_or_else(|| Error::format(anyhow::anyhow!("event stream exhausted")))
    }

    fn peek(&self) -> Option<&Event> {
        self.events.front()
    }

    fn unexpected(context: &str, event: Event) -> Error {
        Error::mismatched_shape(format!("expected {}, replay supplied {:?}", context, event))
    }

    /// Consumes one whole value, for skipping unknown struct fields.
    fn skip_value(&mut self) -> Result<(), Error> {
        match self.next()? {
            Event::Primitive(_) | Event::Text(_) | Event::Bytes(_) | Event::None => Ok(()),
            Event::Some => self.skip_value(),
            Event::Seq(_) => self.skip_until(|event| matches!(event, Event::SeqEnd)),
            Event::Map(_) => self.skip_until(|event| matches!(event, Event::MapEnd)),
            Event::Tuple(_) => self.skip_until(|event| matches!(event, Event::TupleEnd)),
            Event::Struct(_) => loop {
                match self.next()? {
                    Event::StructEnd => return Ok(()),
                    Event::Field(_) => self.skip_value()?,
                    other => return Err(Self::unexpected("field or struct end", other)),
                }
            },
            Event::Union { .. } => {
                if !matches!(self.peek(), Some(Event::UnionEnd)) {
                    self.skip_value()?;
                }
                match self.next()? {
                    Event::UnionEnd => Ok(()),
                    other => Err(Self::unexpected("union end", other)),
                }
            }
            other => Err(Self::unexpected("a value", other)),
        }
    }

    fn skip_until(&mut self, is_end: fn(&Event) -> bool) -> Result<(), Error> {
        loop {
            match self.peek() {
                Some(event) if is_end(event) => {
                    self.next()?;
                    return Ok(());
                }
                Some(_) => self.skip_value()?,
                None => {
                    return Err(Error::format(anyhow::anyhow!("event stream exhausted")))
                }
            }
        }
    }
}

impl Source for ReplaySource {
    fn primitive(&mut self, _kind: PrimitiveKind) -> Result<PrimitiveValue, Error> {
        match self.next()? {
            Event::Primitive(value) => Ok(value),
            other => Err(Self::unexpected("a primitive", other)),
        }
    }

    fn text(&mut self) -> Result<String, Error> {
        match self.next()? {
            Event::Text(text) => Ok(text),
            other => Err(Self::unexpected("text", other)),
        }
    }

    fn bytes(&mut self) -> Result<Vec<u8>, Error> {
        match self.next()? {
            Event::Bytes(bytes) => Ok(bytes),
            other => Err(Self::unexpected("bytes", other)),
        }
    }

    fn is_some(&mut self) -> Result<bool, Error> {
        match self.next()? {
            Event::Some => Ok(true),
            Event::None => Ok(false),
            other => Err(Self::unexpected("some or none", other)),
        }
    }

    fn begin_seq(&mut self) -> Result<SizeHint, Error> {
        match self.next()? {
            Event::Seq(len) => Ok(SizeHint::Known(len)),
            other => Err(Self::unexpected("a sequence", other)),
        }
    }

    fn seq_more(&mut self) -> Result<bool, Error> {
        Ok(!matches!(self.peek(), Some(Event::SeqEnd)))
    }

    fn end_seq(&mut self) -> Result<(), Error> {
        match self.next()? {
            Event::SeqEnd => Ok(()),
            other => Err(Self::unexpected("sequence end", other)),
        }
    }

    fn begin_map(&mut self) -> Result<SizeHint, Error> {
        match self.next()? {
            Event::Map(len) => Ok(SizeHint::Known(len)),
            other => Err(Self::unexpected("a map", other)),
        }
    }

    fn map_more(&mut self) -> Result<bool, Error> {
        Ok(!matches!(self.peek(), Some(Event::MapEnd)))
    }

    fn end_map(&mut self) -> Result<(), Error> {
        match self.next()? {
            Event::MapEnd => Ok(()),
            other => Err(Self::unexpected("map end", other)),
        }
    }

    fn begin_tuple(&mut self, arity: usize) -> Result<(), Error> {
        match self.next()? {
            Event::Tuple(recorded) if recorded == arity => Ok(()),
            Event::Tuple(recorded) => Err(Error::mismatched_shape(format!(
                "expected {}-tuple, replay supplied {}-tuple",
                arity, recorded
            ))),
            other => Err(Self::unexpected("a tuple", other)),
        }
    }

    fn end_tuple(&mut self) -> Result<(), Error> {
        match self.next()? {
            Event::TupleEnd => Ok(()),
            other => Err(Self::unexpected("tuple end", other)),
        }
    }

    fn begin_struct(&mut self, _name: &str, _fields: &[WireField]) -> Result<(), Error> {
        match self.next()? {
            Event::Struct(_) => Ok(()),
            other => Err(Self::unexpected("a struct", other)),
        }
    }

    fn field_ordinal(&mut self, fields: &[WireField]) -> Result<Option<usize>, Error> {
        loop {
            match self.next()? {
                Event::StructEnd => return Ok(None),
                Event::Field(label) => {
                    match fields.iter().position(|field| field.label == label) {
                        Some(ordinal) => return Ok(Some(ordinal)),
                        // Unknown field: drop its value and keep going.
                        None => self.skip_value()?,
                    }
                }
                other => return Err(Self::unexpected("field or struct end", other)),
            }
        }
    }

    fn end_struct(&mut self) -> Result<(), Error> {
        // field_ordinal already consumed the end marker.
        Ok(())
    }

    fn variant(
        &mut self,
        name: &str,
        variants: &[WireVariant],
        _style: UnionStyle,
    ) -> Result<usize, Error> {
        match self.next()? {
            Event::Union { tag, variant, .. } => variants
                .iter()
                .position(|wire| wire.tag == tag)
                .ok_or_else(|| {
                    Error::unknown_variant(format!(
                        "variant {} (tag {}) is not declared by {}",
                        variant, tag, name
                    ))
                }),
            other => Err(Self::unexpected("a union", other)),
        }
    }

    fn end_variant(&mut self) -> Result<(), Error> {
        match self.next()? {
            Event::UnionEnd => Ok(()),
            other => Err(Self::unexpected("union end", other)),
        }
    }
}
