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

//! Little-endian byte buffer with var-int codecs, used by the packed
//! backend. Reads are bounds-checked and surface
//! [`Error::BufferOutOfBound`] instead of panicking.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::Error;

#[derive(Default)]
pub struct Writer {
    bf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Writer {
        Writer::default()
    }

    pub fn len(&self) -> usize {
        self.bf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.bf.reserve(additional);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bf
    }

    pub fn u8(&mut self, value: u8) {
        self.bf.push(value);
    }

    pub fn i8(&mut self, value: i8) {
        self.bf.push(value as u8);
    }

    pub fn u16(&mut self, value: u16) {
        let mut raw = [0u8; 2];
        LittleEndian::write_u16(&mut raw, value);
        self.bf.extend_from_slice(&raw);
    }

    pub fn u32(&mut self, value: u32) {
        let mut raw = [0u8; 4];
        LittleEndian::write_u32(&mut raw, value);
        self.bf.extend_from_slice(&raw);
    }

    pub fn u64(&mut self, value: u64) {
        let mut raw = [0u8; 8];
        LittleEndian::write_u64(&mut raw, value);
        self.bf.extend_from_slice(&raw);
    }

    pub fn f32(&mut self, value: f32) {
        let mut raw = [0u8; 4];
        LittleEndian::write_f32(&mut raw, value);
        self.bf.extend_from_slice(&raw);
    }

    pub fn f64(&mut self, value: f64) {
        let mut raw = [0u8; 8];
        LittleEndian::write_f64(&mut raw, value);
        self.bf.extend_from_slice(&raw);
    }

    /// LEB128 unsigned var-int, at most 5 bytes for u32.
    pub fn var_uint32(&mut self, value: u32) {
        self.var_uint64(value as u64);
    }

    pub fn var_uint64(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.bf.push(byte);
                return;
            }
            self.bf.push(byte | 0x80);
        }
    }

    /// Zigzag-encoded signed var-int.
    pub fn var_int64(&mut self, value: i64) {
        self.var_uint64(((value << 1) ^ (value >> 63)) as u64);
    }

    pub fn bytes(&mut self, bytes: &[u8]) {
        self.bf.extend_from_slice(bytes);
    }
}

pub struct Reader<'a> {
    bf: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bf: &'a [u8]) -> Reader<'a> {
        Reader { bf, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bf.len() - self.cursor
    }

    fn take(&mut self, length: usize) -> Result<&'a [u8], Error> {
        if self.cursor + length > self.bf.len() {
            return Err(Error::buffer_out_of_bound(
                self.cursor,
                length,
                self.bf.len(),
            ));
        }
        let slice = &self.bf[self.cursor..self.cursor + length];
        self.cursor += length;
        Ok(slice)
    }

    pub fn u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    pub fn i8(&mut self) -> Result<i8, Error> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn u16(&mut self) -> Result<u16, Error> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn u32(&mut self) -> Result<u32, Error> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn u64(&mut self) -> Result<u64, Error> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    pub fn f32(&mut self) -> Result<f32, Error> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    pub fn f64(&mut self) -> Result<f64, Error> {
        Ok(LittleEndian::read_f64(self.take(8)?))
    }

    pub fn var_uint32(&mut self) -> Result<u32, Error> {
        let value = self.var_uint64()?;
        u32::try_from(value)
            .map_err(|_| Error::format(anyhow::anyhow!("var-int {} overflows u32", value)))
    }

    pub fn var_uint64(&mut self) -> Result<u64, Error> {
        let mut value: u64 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.u8()?;
            if shift >= 64 {
                return Err(Error::format(anyhow::anyhow!("var-int longer than 10 bytes")));
            }
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    pub fn var_int64(&mut self) -> Result<i64, Error> {
        let raw = self.var_uint64()?;
        Ok(((raw >> 1) as i64) ^ -((raw & 1) as i64))
    }

    pub fn bytes(&mut self, length: usize) -> Result<&'a [u8], Error> {
        self.take(length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_round_trip() {
        let mut writer = Writer::new();
        writer.u8(7);
        writer.u32(0xdead_beef);
        writer.f64(2.5);
        let bytes = writer.into_bytes();
        let mut reader = Reader::new(&bytes);
        assert_eq!(reader.u8().unwrap(), 7);
        assert_eq!(reader.u32().unwrap(), 0xdead_beef);
        assert_eq!(reader.f64().unwrap(), 2.5);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn var_int_round_trip() {
        let mut writer = Writer::new();
        for value in [0u64, 1, 127, 128, 300, u32::MAX as u64, u64::MAX] {
            writer.var_uint64(value);
        }
        for value in [0i64, -1, 1, i64::MIN, i64::MAX] {
            writer.var_int64(value);
        }
        let bytes = writer.into_bytes();
        let mut reader = Reader::new(&bytes);
        for value in [0u64, 1, 127, 128, 300, u32::MAX as u64, u64::MAX] {
            assert_eq!(reader.var_uint64().unwrap(), value);
        }
        for value in [0i64, -1, 1, i64::MIN, i64::MAX] {
            assert_eq!(reader.var_int64().unwrap(), value);
        }
    }

    #[test]
    fn reads_past_the_end_are_errors() {
        let mut reader = Reader::new(&[1, 2]);
        assert_eq!(reader.u8().unwrap(), 1);
        assert!(matches!(reader.u32(), Err(Error::BufferOutOfBound(..))));
    }
}
