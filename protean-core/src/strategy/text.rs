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

//! Text and binary strategies.

use std::any::Any;
use std::sync::Arc;

use crate::error::Error;
use crate::model::caps::Caps;
use crate::protocol::{Sink, Source};
use crate::strategy::{DeStrategy, SerStrategy};
use crate::types::Shape;

pub struct TextSer {
    caps: Arc<Caps>,
}

impl TextSer {
    pub(crate) fn new(caps: Arc<Caps>) -> TextSer {
        TextSer { caps }
    }
}

impl SerStrategy for TextSer {
    fn shape(&self) -> Shape {
        Shape::Text
    }

    fn drive(&self, value: &dyn Any, sink: &mut dyn Sink) -> Result<(), Error> {
        sink.text((self.caps.text()?.get)(value)?)
    }
}

pub struct TextDe {
    caps: Arc<Caps>,
}

impl TextDe {
    pub(crate) fn new(caps: Arc<Caps>) -> TextDe {
        TextDe { caps }
    }
}

impl DeStrategy for TextDe {
    fn shape(&self) -> Shape {
        Shape::Text
    }

    fn pull(&self, source: &mut dyn Source) -> Result<Box<dyn Any>, Error> {
        (self.caps.text()?.build)(source.text()?)
    }
}

pub struct BytesSer {
    caps: Arc<Caps>,
}

impl BytesSer {
    pub(crate) fn new(caps: Arc<Caps>) -> BytesSer {
        BytesSer { caps }
    }
}

impl SerStrategy for BytesSer {
    fn shape(&self) -> Shape {
        Shape::Bytes
    }

    fn drive(&self, value: &dyn Any, sink: &mut dyn Sink) -> Result<(), Error> {
        sink.bytes((self.caps.bytes()?.get)(value)?)
    }
}

pub struct BytesDe {
    caps: Arc<Caps>,
}

impl BytesDe {
    pub(crate) fn new(caps: Arc<Caps>) -> BytesDe {
        BytesDe { caps }
    }
}

impl DeStrategy for BytesDe {
    fn shape(&self) -> Shape {
        Shape::Bytes
    }

    fn pull(&self, source: &mut dyn Source) -> Result<Box<dyn Any>, Error> {
        (self.caps.bytes()?.build)(source.bytes()?)
    }
}
