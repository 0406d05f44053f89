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

//! Cross-cutting wrapper strategies.
//!
//! Option strategies own the inner slot (the inner may be deferred across a
//! cycle — an optional slot is a valid indirection point). Null guards wrap
//! an already-constructed strategy for representations that can hold a dead
//! reference distinct from "option absent"; they are composed outermost by
//! the wrapper pass in [`crate::resolve::wrap`].

use std::any::Any;
use std::sync::Arc;

use crate::error::Error;
use crate::model::caps::Caps;
use crate::protocol::{Sink, Source};
use crate::strategy::{DeRef, DeSlot, DeStrategy, SerRef, SerSlot, SerStrategy};
use crate::types::Shape;

pub struct OptionSer {
    caps: Arc<Caps>,
    inner: SerSlot,
}

impl OptionSer {
    pub(crate) fn new(caps: Arc<Caps>, inner: SerSlot) -> OptionSer {
        OptionSer { caps, inner }
    }
}

impl SerStrategy for OptionSer {
    fn shape(&self) -> Shape {
        Shape::Option
    }

    fn drive(&self, value: &dyn Any, sink: &mut dyn Sink) -> Result<(), Error> {
        match (self.caps.option()?.project)(value)? {
            Some(inner_value) => {
                sink.some()?;
                self.inner.get()?.drive(inner_value, sink)
            }
            None => sink.none(),
        }
    }
}

pub struct OptionDe {
    caps: Arc<Caps>,
    inner: DeSlot,
}

impl OptionDe {
    pub(crate) fn new(caps: Arc<Caps>, inner: DeSlot) -> OptionDe {
        OptionDe { caps, inner }
    }
}

impl DeStrategy for OptionDe {
    fn shape(&self) -> Shape {
        Shape::Option
    }

    fn pull(&self, source: &mut dyn Source) -> Result<Box<dyn Any>, Error> {
        let option = self.caps.option()?;
        if source.is_some()? {
            let inner_value = self.inner.get()?.pull(source)?;
            (option.build_some)(inner_value)
        } else {
            Ok((option.build_none)())
        }
    }
}

pub struct NullGuardSer {
    caps: Arc<Caps>,
    inner: SerRef,
}

impl NullGuardSer {
    pub(crate) fn new(caps: Arc<Caps>, inner: SerRef) -> NullGuardSer {
        NullGuardSer { caps, inner }
    }
}

impl SerStrategy for NullGuardSer {
    fn shape(&self) -> Shape {
        self.inner.shape()
    }

    fn drive(&self, value: &dyn Any, sink: &mut dyn Sink) -> Result<(), Error> {
        if (self.caps.null_repr()?.is_null)(value)? {
            sink.none()
        } else {
            sink.some()?;
            self.inner.drive(value, sink)
        }
    }
}

pub struct NullGuardDe {
    caps: Arc<Caps>,
    inner: DeRef,
}

impl NullGuardDe {
    pub(crate) fn new(caps: Arc<Caps>, inner: DeRef) -> NullGuardDe {
        NullGuardDe { caps, inner }
    }
}

impl DeStrategy for NullGuardDe {
    fn shape(&self) -> Shape {
        self.inner.shape()
    }

    fn pull(&self, source: &mut dyn Source) -> Result<Box<dyn Any>, Error> {
        if source.is_some()? {
            self.inner.pull(source)
        } else {
            Ok((self.caps.null_repr()?.make_null)())
        }
    }
}
