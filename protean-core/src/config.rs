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

//! Engine configuration supplied out-of-band by the caller.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Error;
use crate::model::registry::TypeDef;
use crate::strategy::{DeRef, SerRef};
use crate::types::DuplicateKeys;

/// A named strategy factory supplied by the caller. An override registered
/// for a type always wins over every shape rule; the same contract doubles
/// as the legacy fallback consulted when no shape rule matches at all.
pub trait StrategyOverride: Send + Sync {
    fn ser(&self, def: &TypeDef) -> Result<SerRef, Error>;

    fn de(&self, def: &TypeDef) -> Result<DeRef, Error>;
}

/// Resolution-time options. Frozen once the engine starts resolving.
pub struct EngineOptions {
    pub(crate) duplicate_keys: DuplicateKeys,
    pub(crate) overrides: HashMap<TypeId, Arc<dyn StrategyOverride>>,
    pub(crate) fallback: Option<Arc<dyn StrategyOverride>>,
}

impl Default for EngineOptions {
    fn default() -> EngineOptions {
        EngineOptions {
            duplicate_keys: DuplicateKeys::Overwrite,
            overrides: HashMap::new(),
            fallback: None,
        }
    }
}

impl EngineOptions {
    pub(crate) fn override_for(&self, rust_id: TypeId) -> Option<&Arc<dyn StrategyOverride>> {
        self.overrides.get(&rust_id)
    }

    pub fn duplicate_keys(&self) -> DuplicateKeys {
        self.duplicate_keys
    }
}
