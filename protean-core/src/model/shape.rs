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

//! Shape classification.
//!
//! A capability record may legally satisfy several structural rules (an
//! ordered map enumerates both elements and pairs; `Vec<u8>` is both binary
//! and a sequence). Classification applies a fixed priority order so the
//! outcome is deterministic:
//!
//! 1. well-known: primitive, text, bytes, pointer indirection, option
//! 2. structural: union, map, seq, tuple
//! 3. reflective fallback: struct (zero eligible fields is still a struct)
//!
//! Explicit per-type overrides are consulted by the dispatcher before
//! classification ever runs, which is why they do not appear here.

use crate::error::Error;
use crate::model::registry::TypeDef;
use crate::types::Shape;

/// Classification outcome. `Delegate` never reaches the traversal protocol;
/// it resolves to a strategy that forwards to the pointee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified {
    Shape(Shape),
    Delegate,
}

pub fn classify(def: &TypeDef) -> Result<Classified, Error> {
    let caps = def.caps()?;
    if let Some(primitive) = &caps.primitive {
        return Ok(Classified::Shape(Shape::Primitive(primitive.kind)));
    }
    if caps.text.is_some() {
        return Ok(Classified::Shape(Shape::Text));
    }
    if caps.bytes.is_some() {
        return Ok(Classified::Shape(Shape::Bytes));
    }
    if caps.delegate.is_some() {
        return Ok(Classified::Delegate);
    }
    if caps.option.is_some() {
        return Ok(Classified::Shape(Shape::Option));
    }
    if caps.union_.is_some() {
        return Ok(Classified::Shape(Shape::Union));
    }
    if caps.map.is_some() {
        return Ok(Classified::Shape(Shape::Map));
    }
    if caps.seq.is_some() {
        return Ok(Classified::Shape(Shape::Seq));
    }
    if caps.tuple.is_some() {
        return Ok(Classified::Shape(Shape::Tuple));
    }
    if caps.strukt.is_some() {
        return Ok(Classified::Shape(Shape::Struct));
    }
    Err(Error::resolution(format!(
        "no shape rule matches type {}",
        def.rust_name
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::caps::{BytesCaps, Caps, MapCaps, SeqCaps, StructCaps};
    use crate::model::meta::TypeMeta;
    use crate::model::registry::TypeRegistry;
    use crate::types::{PrimitiveKind, TypeToken};

    fn unused_token() -> TypeToken {
        TypeToken::from_index(0)
    }

    fn stub_seq() -> SeqCaps {
        SeqCaps {
            item: unused_token(),
            len: Box::new(|_| Ok(0)),
            visit: Box::new(|_, _| Ok(())),
            builder: Box::new(|_| Box::new(())),
            push: Box::new(|_, _| Ok(())),
            finish: Box::new(Ok),
        }
    }

    fn stub_map() -> MapCaps {
        MapCaps {
            key: unused_token(),
            value: unused_token(),
            len: Box::new(|_| Ok(0)),
            visit: Box::new(|_, _| Ok(())),
            builder: Box::new(|_| Box::new(())),
            insert: Box::new(|_, _, _, _| Ok(())),
            finish: Box::new(Ok),
            duplicate_keys: None,
        }
    }

    fn classify_caps(caps: Caps) -> Result<Classified, Error> {
        struct Probe;
        let mut types = TypeRegistry::new();
        let token = types.reserve::<Probe>(TypeMeta::named("Probe")).unwrap();
        types.complete(token, caps).unwrap();
        classify(types.def(token).unwrap())
    }

    #[test]
    fn map_outranks_seq_for_ordered_maps() {
        let caps = Caps {
            seq: Some(stub_seq()),
            map: Some(stub_map()),
            ..Caps::default()
        };
        assert_eq!(classify_caps(caps).unwrap(), Classified::Shape(Shape::Map));
    }

    #[test]
    fn bytes_outrank_a_byte_sequence() {
        let caps = Caps {
            seq: Some(stub_seq()),
            bytes: Some(BytesCaps {
                get: Box::new(|_| Ok(&[])),
                build: Box::new(|b| Ok(Box::new(b))),
            }),
            ..Caps::default()
        };
        assert_eq!(
            classify_caps(caps).unwrap(),
            Classified::Shape(Shape::Bytes)
        );
    }

    #[test]
    fn primitive_outranks_everything() {
        let caps = Caps {
            primitive: Some(crate::model::caps::PrimitiveCaps {
                kind: PrimitiveKind::I32,
                get: Box::new(|_| Ok(crate::types::PrimitiveValue::I32(0))),
                build: Box::new(|_| Ok(Box::new(0i32))),
            }),
            seq: Some(stub_seq()),
            ..Caps::default()
        };
        assert_eq!(
            classify_caps(caps).unwrap(),
            Classified::Shape(Shape::Primitive(PrimitiveKind::I32))
        );
    }

    #[test]
    fn zero_field_struct_is_a_valid_struct() {
        let caps = Caps {
            strukt: Some(StructCaps {
                fields: vec![],
                get: Box::new(|_, _| Err(Error::type_error("no fields"))),
                assemble: Box::new(|_| Ok(Box::new(()))),
            }),
            ..Caps::default()
        };
        assert_eq!(
            classify_caps(caps).unwrap(),
            Classified::Shape(Shape::Struct)
        );
    }

    #[test]
    fn empty_capability_record_fails_classification() {
        assert!(classify_caps(Caps::default()).is_err());
    }
}
