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

//! The packed binary backend: a compact, schema-driven little-endian
//! encoding. Every value carries a one-byte [`ValueTag`] validated on read,
//! so a schema drift between writer and reader surfaces as a shape mismatch
//! instead of garbage. Multi-byte integers travel as var-ints (zigzag for
//! signed), lengths and ordinals as unsigned var-ints.
//!
//! Struct fields are written as `ordinal+1` prefixes with a `0` terminator;
//! union variants are written by their stable tag. The backend is
//! schema-consistent: it cannot skip fields it does not know.

use std::any::Any;

use crate::backend::buffer::{Reader, Writer};
use crate::describe::Describe;
use crate::error::Error;
use crate::protean::Protean;
use crate::protocol::{
    PayloadAccess, SizeHint, Sink, Source, StructAccess, WireField, WireVariant,
};
use crate::types::{PrimitiveKind, PrimitiveValue, TypeToken, UnionStyle, ValueTag};

/// Serializes `value` with the packed backend.
pub fn to_bytes<T: Describe>(engine: &Protean, value: &T) -> Result<Vec<u8>, Error> {
    let mut sink = PackedSink::new();
    engine.serialize(value, &mut sink)?;
    Ok(sink.into_bytes())
}

/// Deserializes a packed buffer.
pub fn from_bytes<T: Describe>(engine: &Protean, bytes: &[u8]) -> Result<T, Error> {
    let mut source = PackedSource::new(bytes);
    engine.deserialize(&mut source)
}

/// Dynamic-path variants of [`to_bytes`]/[`from_bytes`].
pub fn value_to_bytes(
    engine: &Protean,
    token: TypeToken,
    value: &dyn Any,
) -> Result<Vec<u8>, Error> {
    let mut sink = PackedSink::new();
    engine.serialize_value(token, value, &mut sink)?;
    Ok(sink.into_bytes())
}

pub fn value_from_bytes(
    engine: &Protean,
    token: TypeToken,
    bytes: &[u8],
) -> Result<Box<dyn Any>, Error> {
    let mut source = PackedSource::new(bytes);
    engine.deserialize_value(token, &mut source)
}

#[derive(Default)]
pub struct PackedSink {
    writer: Writer,
}

impl PackedSink {
    pub fn new() -> PackedSink {
        PackedSink::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_bytes()
    }

    fn tag(&mut self, tag: ValueTag) {
        self.writer.u8(tag.into());
    }
}

impl Sink for PackedSink {
    fn primitive(&mut self, value: PrimitiveValue) -> Result<(), Error> {
        self.tag(value.kind().into());
        match value {
            PrimitiveValue::Bool(v) => self.writer.u8(v as u8),
            PrimitiveValue::I8(v) => self.writer.i8(v),
            PrimitiveValue::I16(v) => self.writer.var_int64(v as i64),
            PrimitiveValue::I32(v) => self.writer.var_int64(v as i64),
            PrimitiveValue::I64(v) => self.writer.var_int64(v),
            PrimitiveValue::U8(v) => self.writer.u8(v),
            PrimitiveValue::U16(v) => self.writer.var_uint64(v as u64),
            PrimitiveValue::U32(v) => self.writer.var_uint64(v as u64),
            PrimitiveValue::U64(v) => self.writer.var_uint64(v),
            PrimitiveValue::F32(v) => self.writer.f32(v),
            PrimitiveValue::F64(v) => self.writer.f64(v),
            PrimitiveValue::Char(v) => self.writer.var_uint32(v as u32),
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), Error> {
        self.tag(ValueTag::Text);
        self.writer.var_uint64(text.len() as u64);
        self.writer.bytes(text.as_bytes());
        Ok(())
    }

    fn bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.tag(ValueTag::Bytes);
        self.writer.var_uint64(bytes.len() as u64);
        self.writer.bytes(bytes);
        Ok(())
    }

    fn none(&mut self) -> Result<(), Error> {
        self.tag(ValueTag::None);
        Ok(())
    }

    fn some(&mut self) -> Result<(), Error> {
        self.tag(ValueTag::Some);
        Ok(())
    }

    fn begin_seq(&mut self, len: usize) -> Result<(), Error> {
        self.tag(ValueTag::Seq);
        self.writer.var_uint64(len as u64);
        Ok(())
    }

    fn end_seq(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn begin_map(&mut self, len: usize) -> Result<(), Error> {
        self.tag(ValueTag::Map);
        self.writer.var_uint64(len as u64);
        Ok(())
    }

    fn end_map(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn begin_tuple(&mut self, arity: usize) -> Result<(), Error> {
        self.tag(ValueTag::Tuple);
        self.writer.var_uint64(arity as u64);
        Ok(())
    }

    fn end_tuple(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn strukt(&mut self, _name: &str, access: &dyn StructAccess) -> Result<(), Error> {
        self.tag(ValueTag::Struct);
        for index in 0..access.len() {
            self.writer.var_uint64(index as u64 + 1);
            access.drive(index, self)?;
        }
        self.writer.var_uint64(0);
        Ok(())
    }

    fn union(
        &mut self,
        _name: &str,
        variant: &WireVariant,
        _style: UnionStyle,
        payload: Option<&dyn PayloadAccess>,
    ) -> Result<(), Error> {
        self.tag(ValueTag::Union);
        self.writer.var_uint32(variant.tag);
        if let Some(payload) = payload {
            payload.drive(self)?;
        }
        Ok(())
    }
}

pub struct PackedSource<'a> {
    reader: Reader<'a>,
}

impl<'a> PackedSource<'a> {
    pub fn new(bytes: &'a [u8]) -> PackedSource<'a> {
        PackedSource {
            reader: Reader::new(bytes),
        }
    }

    fn expect_tag(&mut self, expected: ValueTag) -> Result<(), Error> {
        let raw = self.reader.u8()?;
        let tag = ValueTag::try_from(raw)
            .map_err(|_| Error::format(anyhow::anyhow!("invalid value tag {:#04x}", raw)))?;
        if tag != expected {
            return Err(Error::mismatched_shape(format!(
                "expected {:?} value, buffer holds {:?}",
                expected, tag
            )));
        }
        Ok(())
    }
}

impl Source for PackedSource<'_> {
    fn primitive(&mut self, kind: PrimitiveKind) -> Result<PrimitiveValue, Error> {
        self.expect_tag(kind.into())?;
        Ok(match kind {
            PrimitiveKind::Bool => PrimitiveValue::Bool(self.reader.u8()? != 0),
            PrimitiveKind::I8 => PrimitiveValue::I8(self.reader.i8()?),
            PrimitiveKind::I16 => {
                let value = self.reader.var_int64()?;
                PrimitiveValue::I16(i16::try_from(value).map_err(|_| {
                    Error::format(anyhow::anyhow!("value {} overflows i16", value))
                })?)
            }
            PrimitiveKind::I32 => {
                let value = self.reader.var_int64()?;
                PrimitiveValue::I32(i32::try_from(value).map_err(|_| {
                    Error::format(anyhow::anyhow!("value {} overflows i32", value))
                })?)
            }
            PrimitiveKind::I64 => PrimitiveValue::I64(self.reader.var_int64()?),
            PrimitiveKind::U8 => PrimitiveValue::U8(self.reader.u8()?),
            PrimitiveKind::U16 => {
                let value = self.reader.var_uint64()?;
                PrimitiveValue::U16(u16::try_from(value).map_err(|_| {
                    Error::format(anyhow::anyhow!("value {} overflows u16", value))
                })?)
            }
            PrimitiveKind::U32 => {
                let value = self.reader.var_uint64()?;
                PrimitiveValue::U32(u32::try_from(value).map_err(|_| {
                    Error::format(anyhow::anyhow!("value {} overflows u32", value))
                })?)
            }
            PrimitiveKind::U64 => PrimitiveValue::U64(self.reader.var_uint64()?),
            PrimitiveKind::F32 => PrimitiveValue::F32(self.reader.f32()?),
            PrimitiveKind::F64 => PrimitiveValue::F64(self.reader.f64()?),
            PrimitiveKind::Char => {
                let raw = self.reader.var_uint32()?;
                PrimitiveValue::Char(char::from_u32(raw).ok_or_else(|| {
                    Error::format(anyhow::anyhow!("invalid char scalar {:#x}", raw))
                })?)
            }
        })
    }

    fn text(&mut self) -> Result<String, Error> {
        self.expect_tag(ValueTag::Text)?;
        let length = self.reader.var_uint64()? as usize;
        let raw = self.reader.bytes(length)?;
        String::from_utf8(raw.to_vec())
            .map_err(|source| Error::format(anyhow::Error::new(source)))
    }

    fn bytes(&mut self) -> Result<Vec<u8>, Error> {
        self.expect_tag(ValueTag::Bytes)?;
        let length = self.reader.var_uint64()? as usize;
        Ok(self.reader.bytes(length)?.to_vec())
    }

    fn is_some(&mut self) -> Result<bool, Error> {
        let raw = self.reader.u8()?;
        match ValueTag::try_from(raw) {
            Ok(ValueTag::Some) => Ok(true),
            Ok(ValueTag::None) => Ok(false),
            Ok(tag) => Err(Error::mismatched_shape(format!(
                "expected presence flag, buffer holds {:?}",
                tag
            ))),
            Err(_) => Err(Error::format(anyhow::anyhow!(
                "invalid value tag {:#04x}",
                raw
            ))),
        }
    }

    fn begin_seq(&mut self) -> Result<SizeHint, Error> {
        self.expect_tag(ValueTag::Seq)?;
        Ok(SizeHint::Known(self.reader.var_uint64()? as usize))
    }

    fn seq_more(&mut self) -> Result<bool, Error> {
        Err(Error::unsupported(
            "packed sequences always declare their length",
        ))
    }

    fn end_seq(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn begin_map(&mut self) -> Result<SizeHint, Error> {
        self.expect_tag(ValueTag::Map)?;
        Ok(SizeHint::Known(self.reader.var_uint64()? as usize))
    }

    fn map_more(&mut self) -> Result<bool, Error> {
        Err(Error::unsupported(
            "packed maps always declare their length",
        ))
    }

    fn end_map(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn begin_tuple(&mut self, arity: usize) -> Result<(), Error> {
        self.expect_tag(ValueTag::Tuple)?;
        let recorded = self.reader.var_uint64()? as usize;
        if recorded != arity {
            return Err(Error::mismatched_shape(format!(
                "expected {}-tuple, buffer holds {}-tuple",
                arity, recorded
            )));
        }
        Ok(())
    }

    fn end_tuple(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn begin_struct(&mut self, _name: &str, _fields: &[WireField]) -> Result<(), Error> {
        self.expect_tag(ValueTag::Struct)
    }

    fn field_ordinal(&mut self, fields: &[WireField]) -> Result<Option<usize>, Error> {
        let raw = self.reader.var_uint64()? as usize;
        if raw == 0 {
            return Ok(None);
        }
        let ordinal = raw - 1;
        if ordinal >= fields.len() {
            return Err(Error::mismatched_shape(format!(
                "field ordinal {} out of range ({} fields)",
                ordinal,
                fields.len()
            )));
        }
        Ok(Some(ordinal))
    }

    fn end_struct(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn variant(
        &mut self,
        name: &str,
        variants: &[WireVariant],
        _style: UnionStyle,
    ) -> Result<usize, Error> {
        self.expect_tag(ValueTag::Union)?;
        let tag = self.reader.var_uint32()?;
        variants
            .iter()
            .position(|wire| wire.tag == tag)
            .ok_or_else(|| {
                Error::unknown_variant(format!("tag {} is not declared by {}", tag, name))
            })
    }

    fn end_variant(&mut self) -> Result<(), Error> {
        Ok(())
    }
}
