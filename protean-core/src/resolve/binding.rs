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

//! Placeholder bindings: the late-bound cells that break dependency cycles.
//!
//! When resolution re-enters a descriptor that is still in progress, the
//! requester receives a [`Binding`] instead of a strategy. The binding is
//! patched exactly once, when the in-progress node completes, and every
//! holder observes the patched strategy from then on.

use std::sync::{Arc, OnceLock};

use crate::error::Error;

/// A late-bound strategy cell. `S` is one of the strategy trait objects.
pub struct Binding<S: ?Sized> {
    cell: OnceLock<Arc<S>>,
    type_name: &'static str,
}

impl<S: ?Sized> Binding<S> {
    pub fn new(type_name: &'static str) -> Arc<Binding<S>> {
        Arc::new(Binding {
            cell: OnceLock::new(),
            type_name,
        })
    }

    /// Installs the resolved strategy. A second patch is an engine bug and
    /// surfaces as an error rather than silently replacing the strategy.
    pub fn patch(&self, strategy: Arc<S>) -> Result<(), Error> {
        self.cell.set(strategy).map_err(|_| {
            Error::type_error(format!("placeholder for {} patched twice", self.type_name))
        })
    }

    pub fn get(&self) -> Result<Arc<S>, Error> {
        self.cell.get().cloned().ok_or_else(|| {
            Error::resolution(format!(
                "placeholder for {} used before resolution completed",
                self.type_name
            ))
        })
    }

    pub fn is_patched(&self) -> bool {
        self.cell.get().is_some()
    }
}

/// A dependency slot of a constructed strategy: either the resolved child
/// strategy or a deferred binding across a cycle.
pub enum Slot<S: ?Sized> {
    Ready(Arc<S>),
    Deferred(Arc<Binding<S>>),
}

impl<S: ?Sized> Slot<S> {
    #[inline(always)]
    pub fn get(&self) -> Result<Arc<S>, Error> {
        match self {
            Slot::Ready(s) => Ok(s.clone()),
            Slot::Deferred(binding) => binding.get(),
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Slot::Deferred(_))
    }
}

impl<S: ?Sized> Clone for Slot<S> {
    fn clone(&self) -> Slot<S> {
        match self {
            Slot::Ready(s) => Slot::Ready(s.clone()),
            Slot::Deferred(b) => Slot::Deferred(b.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Probe: Send + Sync {
        fn id(&self) -> u32;
    }

    struct P(u32);

    impl Probe for P {
        fn id(&self) -> u32 {
            self.0
        }
    }

    #[test]
    fn binding_is_patched_exactly_once() {
        let binding: Arc<Binding<dyn Probe>> = Binding::new("probe");
        assert!(binding.get().is_err());
        binding.patch(Arc::new(P(1))).unwrap();
        assert_eq!(binding.get().unwrap().id(), 1);
        assert!(binding.patch(Arc::new(P(2))).is_err());
        assert_eq!(binding.get().unwrap().id(), 1);
    }

    #[test]
    fn deferred_slot_sees_the_patch() {
        let binding: Arc<Binding<dyn Probe>> = Binding::new("probe");
        let slot = Slot::Deferred(binding.clone());
        assert!(slot.get().is_err());
        binding.patch(Arc::new(P(7))).unwrap();
        assert_eq!(slot.get().unwrap().id(), 7);
    }
}
