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

//! Associative container strategies. The duplicate-key policy is fixed at
//! construction: per-registration override first, engine default otherwise.

use std::any::Any;
use std::sync::Arc;

use crate::error::Error;
use crate::model::caps::Caps;
use crate::protocol::{SizeHint, Sink, Source};
use crate::strategy::{DeSlot, DeStrategy, SerSlot, SerStrategy};
use crate::types::{DuplicateKeys, Shape};

pub struct MapSer {
    caps: Arc<Caps>,
    key: SerSlot,
    val: SerSlot,
}

impl MapSer {
    pub(crate) fn new(caps: Arc<Caps>, key: SerSlot, val: SerSlot) -> MapSer {
        MapSer { caps, key, val }
    }
}

impl SerStrategy for MapSer {
    fn shape(&self) -> Shape {
        Shape::Map
    }

    fn drive(&self, value: &dyn Any, sink: &mut dyn Sink) -> Result<(), Error> {
        let map = self.caps.map()?;
        sink.begin_map((map.len)(value)?)?;
        let key = self.key.get()?;
        let val = self.val.get()?;
        (map.visit)(value, &mut |k, v| {
            sink.map_key()?;
            key.drive(k, &mut *sink)?;
            sink.map_value()?;
            val.drive(v, &mut *sink)
        })?;
        sink.end_map()
    }
}

pub struct MapDe {
    caps: Arc<Caps>,
    key: DeSlot,
    val: DeSlot,
    policy: DuplicateKeys,
}

impl MapDe {
    pub(crate) fn new(caps: Arc<Caps>, key: DeSlot, val: DeSlot, policy: DuplicateKeys) -> MapDe {
        MapDe {
            caps,
            key,
            val,
            policy,
        }
    }
}

impl DeStrategy for MapDe {
    fn shape(&self) -> Shape {
        Shape::Map
    }

    fn pull(&self, source: &mut dyn Source) -> Result<Box<dyn Any>, Error> {
        let map = self.caps.map()?;
        let hint = source.begin_map()?;
        let mut acc = (map.builder)(hint.known());
        let key = self.key.get()?;
        let val = self.val.get()?;
        match hint {
            SizeHint::Known(len) => {
                for _ in 0..len {
                    let k = key.pull(source)?;
                    let v = val.pull(source)?;
                    (map.insert)(acc.as_mut(), k, v, self.policy)?;
                }
            }
            SizeHint::Unknown => {
                while source.map_more()? {
                    let k = key.pull(source)?;
                    let v = val.pull(source)?;
                    (map.insert)(acc.as_mut(), k, v, self.policy)?;
                }
            }
        }
        source.end_map()?;
        (map.finish)(acc)
    }
}
