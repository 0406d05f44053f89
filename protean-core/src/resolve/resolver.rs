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

//! Recursive, cycle-safe strategy resolution.
//!
//! A session walks the dependency graph depth-first over an explicit node
//! table. Entering a node:
//!
//! - already cached (or completed earlier in this session): reuse it;
//! - in progress: a cycle — hand back a placeholder binding instead of
//!   recursing;
//! - unresolved: mark in-progress, resolve every dependency slot, construct
//!   the strategy through the dispatcher, apply wrapper composition, patch
//!   the binding if one was issued, and record the completion.
//!
//! Every node travels Unresolved → InProgress → Resolved at most once per
//! session, so termination does not depend on recursion depth across cycles.
//! A deferred slot in a direct (non-indirection) position is a cycle without
//! progress and fails resolution instead of looping.
//!
//! Completed strategies are buffered and flushed into the cache only when
//! the whole session succeeds: a failing descriptor takes its same-session
//! cycle partners down with it, so the cache never holds a strategy whose
//! binding was never patched.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{EngineOptions, StrategyOverride};
use crate::error::Error;
use crate::model::registry::{TypeDef, TypeRegistry};
use crate::resolve::binding::{Binding, Slot};
use crate::resolve::cache::StrategyCache;
use crate::resolve::plan::{plan, Plan};
use crate::types::TypeToken;

/// Shared construction context handed to the dispatcher.
pub(crate) struct BuildCx<'a> {
    pub registry: &'a TypeRegistry,
    pub options: &'a EngineOptions,
}

/// One resolution direction (ser or de), abstracting the strategy trait
/// object the session produces.
pub(crate) trait BuildDir {
    type S: ?Sized + Send + Sync + 'static;

    fn direction() -> &'static str;

    fn from_override(ov: &dyn StrategyOverride, def: &TypeDef) -> Result<Arc<Self::S>, Error>;

    fn build_core(
        cx: &BuildCx<'_>,
        def: &TypeDef,
        plan: &Plan,
        slots: Vec<Slot<Self::S>>,
    ) -> Result<Arc<Self::S>, Error>;

    fn wrap(def: &TypeDef, core: Arc<Self::S>) -> Result<Arc<Self::S>, Error>;
}

enum NodeState<S: ?Sized> {
    InProgress(Option<Arc<Binding<S>>>),
    Done(Arc<S>),
}

pub(crate) struct Session<'a, D: BuildDir> {
    cx: BuildCx<'a>,
    cache: &'a StrategyCache<D::S>,
    nodes: HashMap<TypeToken, NodeState<D::S>>,
    completed: Vec<(TypeToken, Arc<D::S>)>,
}

impl<'a, D: BuildDir> Session<'a, D> {
    pub fn new(
        registry: &'a TypeRegistry,
        options: &'a EngineOptions,
        cache: &'a StrategyCache<D::S>,
    ) -> Session<'a, D> {
        Session {
            cx: BuildCx { registry, options },
            cache,
            nodes: HashMap::new(),
            completed: Vec::new(),
        }
    }

    /// Resolves the requested descriptor and returns its final strategy.
    pub fn resolve(&mut self, token: TypeToken) -> Result<Arc<D::S>, Error> {
        match self.resolve_slot(token)? {
            Slot::Ready(strategy) => Ok(strategy),
            Slot::Deferred(_) => Err(Error::resolution(format!(
                "{} resolution re-entered its own root",
                D::direction()
            ))),
        }
    }

    /// The session's completions, for atomic publication.
    pub fn into_completed(self) -> Vec<(TypeToken, Arc<D::S>)> {
        self.completed
    }

    fn resolve_slot(&mut self, token: TypeToken) -> Result<Slot<D::S>, Error> {
        if let Some(strategy) = self.cache.get(token) {
            return Ok(Slot::Ready(strategy));
        }
        if let Some(message) = self.cache.failure(token) {
            return Err(Error::resolution(message));
        }
        let registry = self.cx.registry;
        match self.nodes.get(&token) {
            Some(NodeState::Done(strategy)) => return Ok(Slot::Ready(strategy.clone())),
            Some(NodeState::InProgress(_)) => {
                let type_name = registry.def(token)?.rust_name;
                match self.nodes.get_mut(&token) {
                    Some(NodeState::InProgress(binding)) => {
                        let binding = binding
                            .get_or_insert_with(|| Binding::new(type_name))
                            .clone();
                        return Ok(Slot::Deferred(binding));
                    }
                    _ => unreachable!("node state changed between lookups"),
                }
            }
            None => {}
        }

        self.nodes.insert(token, NodeState::InProgress(None));
        let def = registry.def(token)?;
        let strategy = self.build(def)?;
        if let Some(NodeState::InProgress(Some(binding))) = self.nodes.get(&token) {
            binding.patch(strategy.clone())?;
        }
        self.nodes.insert(token, NodeState::Done(strategy.clone()));
        self.completed.push((token, strategy.clone()));
        Ok(Slot::Ready(strategy))
    }

    fn build(&mut self, def: &'a TypeDef) -> Result<Arc<D::S>, Error> {
        // An explicit override always wins, before classification runs.
        if let Some(ov) = self.cx.options.override_for(def.rust_id) {
            let core = D::from_override(ov.as_ref(), def)?;
            return D::wrap(def, core);
        }
        let plan = match plan(def) {
            Ok(plan) => plan,
            Err(no_rule) => {
                // Legacy fallback substitution, only when no shape rule matched.
                if let Some(fallback) = &self.cx.options.fallback {
                    let core = D::from_override(fallback.as_ref(), def)?;
                    return D::wrap(def, core);
                }
                return Err(no_rule);
            }
        };
        let mut slots = Vec::with_capacity(plan.slots.len());
        for (role, dep) in &plan.slots {
            let slot = self.resolve_slot(*dep)?;
            if slot.is_deferred() && !role.deferrable() {
                return Err(Error::cycle_without_progress(format!(
                    "dependency cycle through {} contains no indirection point",
                    def.rust_name
                )));
            }
            slots.push(slot);
        }
        let core = D::build_core(&self.cx, def, &plan, slots)?;
        D::wrap(def, core)
    }
}
