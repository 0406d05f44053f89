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

//! The engine value: descriptor registry, per-direction strategy caches,
//! and the resolution entry points.

use std::any::Any;
use std::sync::{Arc, Mutex, RwLock};

use crate::config::{EngineOptions, StrategyOverride};
use crate::describe::Describe;
use crate::error::Error;
use crate::model::registry::TypeRegistry;
use crate::protocol::{Sink, Source};
use crate::resolve::cache::StrategyCache;
use crate::resolve::dispatch::{DeDir, SerDir};
use crate::resolve::resolver::{BuildDir, Session};
use crate::strategy::{DeRef, DeStrategy, SerRef, SerStrategy};
use crate::types::{DuplicateKeys, TypeToken};
use crate::util;

/// The serialization engine.
///
/// A `Protean` owns a descriptor registry and two append-only strategy
/// caches. It is an explicit value — multiple independent engines (one per
/// test, one per tenant) coexist without sharing state.
///
/// Strategies resolve lazily, on the first (de)serialize request for a type,
/// and are immutable and shared from then on: (de)serialize calls against
/// resolved strategies run fully in parallel.
///
/// # Examples
///
/// ```
/// use protean_core::backend::record::{RecordingSink, ReplaySource};
/// use protean_core::Protean;
///
/// let engine = Protean::default();
///
/// let mut sink = RecordingSink::new();
/// engine.serialize(&vec![1i64, 2, 3], &mut sink).unwrap();
///
/// let mut source = ReplaySource::new(sink.into_events());
/// let back: Vec<i64> = engine.deserialize(&mut source).unwrap();
/// assert_eq!(back, vec![1, 2, 3]);
/// ```
///
/// Configuration is builder-style and happens before first use:
///
/// ```
/// use protean_core::types::DuplicateKeys;
/// use protean_core::Protean;
///
/// let engine = Protean::default().duplicate_keys(DuplicateKeys::Unique);
/// ```
pub struct Protean {
    registry: RwLock<TypeRegistry>,
    options: EngineOptions,
    ser_cache: StrategyCache<dyn SerStrategy>,
    de_cache: StrategyCache<dyn DeStrategy>,
    resolve_lock: Mutex<()>,
}

impl Default for Protean {
    fn default() -> Protean {
        Protean {
            registry: RwLock::new(TypeRegistry::new()),
            options: EngineOptions::default(),
            ser_cache: StrategyCache::new(),
            de_cache: StrategyCache::new(),
            resolve_lock: Mutex::new(()),
        }
    }
}

impl Protean {
    /// Sets the engine-wide duplicate-key policy for map deserialization.
    /// Individual map registrations may still override it.
    pub fn duplicate_keys(mut self, policy: DuplicateKeys) -> Protean {
        self.options.duplicate_keys = policy;
        self
    }

    /// Registers an explicit strategy factory for `T`. An override wins over
    /// every shape rule.
    pub fn with_override<T: 'static>(mut self, ov: Arc<dyn StrategyOverride>) -> Protean {
        self.options
            .overrides
            .insert(std::any::TypeId::of::<T>(), ov);
        self
    }

    /// Installs the legacy fallback factory, substituted when no shape rule
    /// matches a descriptor.
    pub fn with_fallback(mut self, fallback: Arc<dyn StrategyOverride>) -> Protean {
        self.options.fallback = Some(fallback);
        self
    }

    /// The token of `T`, describing the type on first request.
    pub fn token_of<T: Describe>(&self) -> Result<TypeToken, Error> {
        util::write(&self.registry).token_of::<T>()
    }

    /// A distinct token for `T` in a nullable context.
    pub fn nullable_token_of<T: Describe>(&self) -> Result<TypeToken, Error> {
        let mut registry = util::write(&self.registry);
        let token = registry.token_of::<T>()?;
        registry.nullable_variant(token)
    }

    /// Direct registry access, for manual descriptor definitions (dynamic
    /// schemas, tests).
    pub fn with_types<R>(&self, f: impl FnOnce(&mut TypeRegistry) -> R) -> R {
        f(&mut util::write(&self.registry))
    }

    /// Resolves the serialization strategy for a descriptor.
    pub fn resolve_ser(&self, token: TypeToken) -> Result<SerRef, Error> {
        self.resolve_dir::<SerDir>(token, &self.ser_cache)
    }

    /// Resolves the deserialization strategy for a descriptor.
    pub fn resolve_de(&self, token: TypeToken) -> Result<DeRef, Error> {
        self.resolve_dir::<DeDir>(token, &self.de_cache)
    }

    fn resolve_dir<D: BuildDir>(
        &self,
        token: TypeToken,
        cache: &StrategyCache<D::S>,
    ) -> Result<Arc<D::S>, Error> {
        if let Some(strategy) = cache.get(token) {
            return Ok(strategy);
        }
        if let Some(message) = cache.failure(token) {
            return Err(Error::resolution(message));
        }
        let _session_guard = util::lock(&self.resolve_lock);
        // Another thread may have finished this descriptor while we waited.
        if let Some(strategy) = cache.get(token) {
            return Ok(strategy);
        }
        if let Some(message) = cache.failure(token) {
            return Err(Error::resolution(message));
        }
        let registry = util::read(&self.registry);
        let mut session = Session::<D>::new(&registry, &self.options, cache);
        match session.resolve(token) {
            Ok(strategy) => {
                cache.publish(session.into_completed());
                Ok(strategy)
            }
            Err(error) => {
                if matches!(
                    error,
                    Error::Resolution(_) | Error::CycleWithoutProgress(_)
                ) {
                    cache.record_failure(token, error.to_string());
                }
                Err(error)
            }
        }
    }

    /// Statically-typed push: resolve (cached) and traverse `value` into the
    /// backend.
    pub fn serialize<T: Describe>(&self, value: &T, sink: &mut dyn Sink) -> Result<(), Error> {
        let token = self.token_of::<T>()?;
        let strategy = self.resolve_ser(token)?;
        strategy.drive(value, sink)
    }

    /// Runtime-typed push, for values whose type is known only by token.
    pub fn serialize_value(
        &self,
        token: TypeToken,
        value: &dyn Any,
        sink: &mut dyn Sink,
    ) -> Result<(), Error> {
        let strategy = self.resolve_ser(token)?;
        strategy.drive(value, sink)
    }

    /// Statically-typed pull.
    pub fn deserialize<T: Describe>(&self, source: &mut dyn Source) -> Result<T, Error> {
        let token = self.token_of::<T>()?;
        let strategy = self.resolve_de(token)?;
        let boxed = strategy.pull(source)?;
        match boxed.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => Err(Error::type_error(format!(
                "deserialized value is not a {}",
                std::any::type_name::<T>()
            ))),
        }
    }

    /// Runtime-typed pull.
    pub fn deserialize_value(
        &self,
        token: TypeToken,
        source: &mut dyn Source,
    ) -> Result<Box<dyn Any>, Error> {
        let strategy = self.resolve_de(token)?;
        strategy.pull(source)
    }

    /// Serializes with the in-repo packed binary backend.
    pub fn to_bytes<T: Describe>(&self, value: &T) -> Result<Vec<u8>, Error> {
        crate::backend::packed::to_bytes(self, value)
    }

    /// Deserializes a packed binary buffer.
    pub fn from_bytes<T: Describe>(&self, bytes: &[u8]) -> Result<T, Error> {
        crate::backend::packed::from_bytes(self, bytes)
    }

    /// The serialization cache, for diagnostics and tests.
    pub fn ser_cache(&self) -> &StrategyCache<dyn SerStrategy> {
        &self.ser_cache
    }

    /// The deserialization cache, for diagnostics and tests.
    pub fn de_cache(&self) -> &StrategyCache<dyn DeStrategy> {
        &self.de_cache
    }
}
