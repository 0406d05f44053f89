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

//! Wrapper composition, in fixed order around the core strategy:
//!
//! 1. legacy fallback substitution — handled in the resolver, since it
//!    replaces the core rather than wrapping it;
//! 2. option wrapping — option-shaped descriptors compose their wrapper at
//!    construction (the wrapper owns the possibly-deferred inner slot), so
//!    this pass covers the nullable-context case;
//! 3. reference null guards, outermost.
//!
//! A descriptor in a nullable context without any null representation is a
//! resolution error: the engine refuses to guess an absence encoding.

use std::sync::Arc;

use crate::error::Error;
use crate::model::registry::TypeDef;
use crate::strategy::wrappers::{NullGuardDe, NullGuardSer};
use crate::strategy::{DeRef, SerRef};
use crate::types::Nullability;

fn wants_guard(def: &TypeDef) -> Result<bool, Error> {
    let caps = def.caps()?;
    if caps.option.is_some() {
        // Absence is already expressed by the option strategy itself.
        return Ok(false);
    }
    if def.nullability == Nullability::Nullable && caps.null_repr.is_none() {
        return Err(Error::resolution(format!(
            "nullable context for {} requires a null representation",
            def.rust_name
        )));
    }
    Ok(def.nullability == Nullability::Nullable || caps.null_repr.is_some())
}

pub(crate) fn wrap_ser(def: &TypeDef, core: SerRef) -> Result<SerRef, Error> {
    if wants_guard(def)? {
        let caps = def.caps()?.clone();
        return Ok(Arc::new(NullGuardSer::new(caps, core)));
    }
    Ok(core)
}

pub(crate) fn wrap_de(def: &TypeDef, core: DeRef) -> Result<DeRef, Error> {
    if wants_guard(def)? {
        let caps = def.caps()?.clone();
        return Ok(Arc::new(NullGuardDe::new(caps, core)));
    }
    Ok(core)
}
