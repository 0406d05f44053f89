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

//! The strategy cache: append-only, token-indexed, shared across threads.
//!
//! A whole resolution session publishes atomically, so readers either see a
//! descriptor's completed strategy or nothing — never a strategy whose
//! placeholder bindings are still unpatched. Failed resolutions land in a
//! failure table and replay as fresh errors on every later request.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::types::TypeToken;
use crate::util;

pub struct StrategyCache<S: ?Sized> {
    slots: RwLock<Vec<Option<Arc<S>>>>,
    failures: RwLock<HashMap<u32, String>>,
}

impl<S: ?Sized> Default for StrategyCache<S> {
    fn default() -> StrategyCache<S> {
        StrategyCache {
            slots: RwLock::new(Vec::new()),
            failures: RwLock::new(HashMap::new()),
        }
    }
}

impl<S: ?Sized> StrategyCache<S> {
    pub fn new() -> StrategyCache<S> {
        StrategyCache::default()
    }

    pub fn get(&self, token: TypeToken) -> Option<Arc<S>> {
        util::read(&self.slots)
            .get(token.index())
            .and_then(|slot| slot.clone())
    }

    pub fn failure(&self, token: TypeToken) -> Option<String> {
        util::read(&self.failures).get(&token.0).cloned()
    }

    /// Flushes one completed resolution session. First publication wins;
    /// a redundant concurrent build of the same descriptor is discarded.
    pub(crate) fn publish(&self, entries: Vec<(TypeToken, Arc<S>)>) {
        let mut slots = util::write(&self.slots);
        for (token, strategy) in entries {
            let index = token.index();
            if slots.len() <= index {
                slots.resize_with(index + 1, || None);
            }
            if slots[index].is_none() {
                slots[index] = Some(strategy);
            }
        }
    }

    pub(crate) fn record_failure(&self, token: TypeToken, message: String) {
        util::write(&self.failures).entry(token.0).or_insert(message);
    }

    /// Number of completed entries; test and diagnostics surface.
    pub fn resolved_count(&self) -> usize {
        util::read(&self.slots)
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }
}
