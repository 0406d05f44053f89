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

//! Pointer-indirection strategies (`Box`, `Rc`, `Arc`, weak upgrades).
//! A delegate never appears in the protocol: it projects to the pointee and
//! forwards. Indirection is a legal cycle-breaking point, so the inner slot
//! may be deferred.

use std::any::Any;
use std::sync::Arc;

use crate::error::Error;
use crate::model::caps::Caps;
use crate::protocol::{Sink, Source};
use crate::strategy::{DeSlot, DeStrategy, SerSlot, SerStrategy};
use crate::types::Shape;

pub struct DelegateSer {
    caps: Arc<Caps>,
    inner: SerSlot,
    /// The pointee's classification, known at construction even when the
    /// inner strategy itself is still a placeholder.
    inner_shape: Shape,
}

impl DelegateSer {
    pub(crate) fn new(caps: Arc<Caps>, inner: SerSlot, inner_shape: Shape) -> DelegateSer {
        DelegateSer {
            caps,
            inner,
            inner_shape,
        }
    }
}

impl SerStrategy for DelegateSer {
    fn shape(&self) -> Shape {
        self.inner_shape
    }

    fn drive(&self, value: &dyn Any, sink: &mut dyn Sink) -> Result<(), Error> {
        let delegate = self.caps.delegate()?;
        let inner = self.inner.get()?;
        (delegate.project)(value, &mut |pointee| inner.drive(pointee, &mut *sink))
    }
}

pub struct DelegateDe {
    caps: Arc<Caps>,
    inner: DeSlot,
    inner_shape: Shape,
}

impl DelegateDe {
    pub(crate) fn new(caps: Arc<Caps>, inner: DeSlot, inner_shape: Shape) -> DelegateDe {
        DelegateDe {
            caps,
            inner,
            inner_shape,
        }
    }
}

impl DeStrategy for DelegateDe {
    fn shape(&self) -> Shape {
        self.inner_shape
    }

    fn pull(&self, source: &mut dyn Source) -> Result<Box<dyn Any>, Error> {
        let delegate = self.caps.delegate()?;
        let pointee = self.inner.get()?.pull(source)?;
        (delegate.wrap)(pointee)
    }
}
