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

//! Compiled strategies: one per descriptor per direction.
//!
//! A strategy is an immutable object built once by the resolver and shared
//! process-wide through the cache. Ser strategies traverse-push a borrowed
//! value into a [`Sink`]; De strategies accumulate-pull a value out of a
//! [`Source`]. Strategies hold no mutable state: everything mutable during
//! one call lives in the accumulator or in the backend.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::Error;
use crate::protocol::{Sink, Source};
use crate::resolve::binding::Slot;
use crate::types::Shape;

pub mod delegate;
pub mod map;
pub mod primitive;
pub mod seq;
pub mod struct_;
pub mod text;
pub mod tuple;
pub mod union_;
pub mod wrappers;

/// Serialization side: traverse one value, pushing shape events.
pub trait SerStrategy: Send + Sync {
    fn shape(&self) -> Shape;

    fn drive(&self, value: &dyn Any, sink: &mut dyn Sink) -> Result<(), Error>;
}

/// Deserialization side: accumulate one value from pulled events.
pub trait DeStrategy: Send + Sync {
    fn shape(&self) -> Shape;

    fn pull(&self, source: &mut dyn Source) -> Result<Box<dyn Any>, Error>;
}

impl fmt::Debug for dyn SerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerStrategy")
            .field("shape", &self.shape())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for dyn DeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeStrategy")
            .field("shape", &self.shape())
            .finish_non_exhaustive()
    }
}

pub type SerRef = Arc<dyn SerStrategy>;
pub type DeRef = Arc<dyn DeStrategy>;
pub type SerSlot = Slot<dyn SerStrategy>;
pub type DeSlot = Slot<dyn DeStrategy>;
