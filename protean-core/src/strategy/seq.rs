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

//! Homogeneous sequence strategies. The item slot may be deferred across a
//! cycle; it is looked up once per traversal, after every binding is patched.

use std::any::Any;
use std::sync::Arc;

use crate::error::Error;
use crate::model::caps::Caps;
use crate::protocol::{SizeHint, Sink, Source};
use crate::strategy::{DeSlot, DeStrategy, SerSlot, SerStrategy};
use crate::types::Shape;

pub struct SeqSer {
    caps: Arc<Caps>,
    item: SerSlot,
}

impl SeqSer {
    pub(crate) fn new(caps: Arc<Caps>, item: SerSlot) -> SeqSer {
        SeqSer { caps, item }
    }
}

impl SerStrategy for SeqSer {
    fn shape(&self) -> Shape {
        Shape::Seq
    }

    fn drive(&self, value: &dyn Any, sink: &mut dyn Sink) -> Result<(), Error> {
        let seq = self.caps.seq()?;
        let len = (seq.len)(value)?;
        sink.begin_seq(len)?;
        let item = self.item.get()?;
        (seq.visit)(value, &mut |element| item.drive(element, &mut *sink))?;
        sink.end_seq()
    }
}

pub struct SeqDe {
    caps: Arc<Caps>,
    item: DeSlot,
}

impl SeqDe {
    pub(crate) fn new(caps: Arc<Caps>, item: DeSlot) -> SeqDe {
        SeqDe { caps, item }
    }
}

impl DeStrategy for SeqDe {
    fn shape(&self) -> Shape {
        Shape::Seq
    }

    fn pull(&self, source: &mut dyn Source) -> Result<Box<dyn Any>, Error> {
        let seq = self.caps.seq()?;
        let hint = source.begin_seq()?;
        let mut acc = (seq.builder)(hint.known());
        let item = self.item.get()?;
        match hint {
            SizeHint::Known(len) => {
                for _ in 0..len {
                    let element = item.pull(source)?;
                    (seq.push)(acc.as_mut(), element)?;
                }
            }
            SizeHint::Unknown => {
                while source.seq_more()? {
                    let element = item.pull(source)?;
                    (seq.push)(acc.as_mut(), element)?;
                }
            }
        }
        source.end_seq()?;
        (seq.finish)(acc)
    }
}
