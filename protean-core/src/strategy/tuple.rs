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

//! Fixed-arity tuple strategies. Tuple slots are direct: they are always
//! fully resolved before construction, never deferred.

use std::any::Any;
use std::sync::Arc;

use crate::error::Error;
use crate::model::caps::{Caps, FieldParts};
use crate::protocol::{Sink, Source};
use crate::strategy::{DeSlot, DeStrategy, SerSlot, SerStrategy};
use crate::types::Shape;

pub struct TupleSer {
    caps: Arc<Caps>,
    slots: Vec<SerSlot>,
}

impl TupleSer {
    pub(crate) fn new(caps: Arc<Caps>, slots: Vec<SerSlot>) -> TupleSer {
        TupleSer { caps, slots }
    }
}

impl SerStrategy for TupleSer {
    fn shape(&self) -> Shape {
        Shape::Tuple
    }

    fn drive(&self, value: &dyn Any, sink: &mut dyn Sink) -> Result<(), Error> {
        let tuple = self.caps.tuple()?;
        sink.begin_tuple(self.slots.len())?;
        for (index, slot) in self.slots.iter().enumerate() {
            let element = (tuple.get)(value, index)?;
            slot.get()?.drive(element, sink)?;
        }
        sink.end_tuple()
    }
}

pub struct TupleDe {
    caps: Arc<Caps>,
    slots: Vec<DeSlot>,
}

impl TupleDe {
    pub(crate) fn new(caps: Arc<Caps>, slots: Vec<DeSlot>) -> TupleDe {
        TupleDe { caps, slots }
    }
}

impl DeStrategy for TupleDe {
    fn shape(&self) -> Shape {
        Shape::Tuple
    }

    fn pull(&self, source: &mut dyn Source) -> Result<Box<dyn Any>, Error> {
        source.begin_tuple(self.slots.len())?;
        let mut parts = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            parts.push(Some(slot.get()?.pull(source)?));
        }
        source.end_tuple()?;
        (self.caps.tuple()?.assemble)(FieldParts::new(parts))
    }
}
