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

use std::any::Any;
use std::sync::Arc;

use crate::error::Error;
use crate::model::caps::Caps;
use crate::protocol::{Sink, Source};
use crate::strategy::{DeStrategy, SerStrategy};
use crate::types::{PrimitiveKind, Shape};

pub struct PrimitiveSer {
    caps: Arc<Caps>,
    kind: PrimitiveKind,
}

impl PrimitiveSer {
    pub(crate) fn new(caps: Arc<Caps>, kind: PrimitiveKind) -> PrimitiveSer {
        PrimitiveSer { caps, kind }
    }
}

impl SerStrategy for PrimitiveSer {
    fn shape(&self) -> Shape {
        Shape::Primitive(self.kind)
    }

    fn drive(&self, value: &dyn Any, sink: &mut dyn Sink) -> Result<(), Error> {
        let scalar = (self.caps.primitive()?.get)(value)?;
        sink.primitive(scalar)
    }
}

pub struct PrimitiveDe {
    caps: Arc<Caps>,
    kind: PrimitiveKind,
}

impl PrimitiveDe {
    pub(crate) fn new(caps: Arc<Caps>, kind: PrimitiveKind) -> PrimitiveDe {
        PrimitiveDe { caps, kind }
    }
}

impl DeStrategy for PrimitiveDe {
    fn shape(&self) -> Shape {
        Shape::Primitive(self.kind)
    }

    fn pull(&self, source: &mut dyn Source) -> Result<Box<dyn Any>, Error> {
        let scalar = source.primitive(self.kind)?;
        if scalar.kind() != self.kind {
            return Err(Error::mismatched_shape(format!(
                "expected {:?} scalar, source supplied {:?}",
                self.kind,
                scalar.kind()
            )));
        }
        (self.caps.primitive()?.build)(scalar)
    }
}
