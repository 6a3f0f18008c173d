// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Primitive wire encoding for aggregate state
//!
//! - varint: LEB128, 7 bits per byte, high bit set on every byte but the last
//! - double: 8 bytes little-endian IEEE-754
//!
//! All readers fail with [`Error::Io`] on a truncated source instead of
//! panicking, so corrupt partial state is reported to the caller.

use std::io::{Read, Write};

use super::error::{Error, Result};

/// A u64 never needs more than ten 7-bit groups
pub const MAX_VARINT_LEN: usize = 10;

/// Write a variable-length encoded unsigned integer
pub fn write_varint(sink: &mut dyn Write, mut value: u64) -> Result<usize> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let mut len = 0;
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf[len] = byte;
        len += 1;
        if value == 0 {
            break;
        }
    }
    sink.write_all(&buf[..len])
        .map_err(|e| Error::io(format!("failed to write varint: {}", e)))?;
    Ok(len)
}

/// Read a variable-length encoded unsigned integer
pub fn read_varint(source: &mut dyn Read) -> Result<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;

    for _ in 0..MAX_VARINT_LEN {
        let mut byte = [0u8; 1];
        source
            .read_exact(&mut byte)
            .map_err(|e| Error::io(format!("failed to read varint: {}", e)))?;
        let byte = byte[0];

        let group = (byte & 0x7F) as u64;
        if shift == 63 && group > 1 {
            return Err(Error::internal("varint overflow: value too large"));
        }
        value |= group << shift;

        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }

    Err(Error::internal("varint overflow: value too large"))
}

/// Write an 8-byte little-endian double
pub fn write_f64(sink: &mut dyn Write, value: f64) -> Result<usize> {
    sink.write_all(&value.to_le_bytes())
        .map_err(|e| Error::io(format!("failed to write double: {}", e)))?;
    Ok(8)
}

/// Read an 8-byte little-endian double
pub fn read_f64(source: &mut dyn Read) -> Result<f64> {
    let mut buf = [0u8; 8];
    source
        .read_exact(&mut buf)
        .map_err(|e| Error::io(format!("failed to read double: {}", e)))?;
    Ok(f64::from_le_bytes(buf))
}

/// Write an 8-byte little-endian signed integer
pub fn write_i64(sink: &mut dyn Write, value: i64) -> Result<usize> {
    sink.write_all(&value.to_le_bytes())
        .map_err(|e| Error::io(format!("failed to write integer: {}", e)))?;
    Ok(8)
}

/// Read an 8-byte little-endian signed integer
pub fn read_i64(source: &mut dyn Read) -> Result<i64> {
    let mut buf = [0u8; 8];
    source
        .read_exact(&mut buf)
        .map_err(|e| Error::io(format!("failed to read integer: {}", e)))?;
    Ok(i64::from_le_bytes(buf))
}

/// Write a single byte
pub fn write_u8(sink: &mut dyn Write, value: u8) -> Result<usize> {
    sink.write_all(&[value])
        .map_err(|e| Error::io(format!("failed to write byte: {}", e)))?;
    Ok(1)
}

/// Read a single byte
pub fn read_u8(source: &mut dyn Read) -> Result<u8> {
    let mut buf = [0u8; 1];
    source
        .read_exact(&mut buf)
        .map_err(|e| Error::io(format!("failed to read byte: {}", e)))?;
    Ok(buf[0])
}

/// Write a varint length prefix followed by the raw bytes
pub fn write_bytes(sink: &mut dyn Write, bytes: &[u8]) -> Result<usize> {
    let len = write_varint(sink, bytes.len() as u64)?;
    sink.write_all(bytes)
        .map_err(|e| Error::io(format!("failed to write bytes: {}", e)))?;
    Ok(len + bytes.len())
}

/// Read a varint length prefix followed by that many bytes
pub fn read_bytes(source: &mut dyn Read) -> Result<Vec<u8>> {
    let len = read_varint(source)?;
    let mut buf = Vec::new();
    let read = (&mut *source)
        .take(len)
        .read_to_end(&mut buf)
        .map_err(|e| Error::io(format!("failed to read bytes: {}", e)))?;
    if (read as u64) < len {
        return Err(Error::io(format!(
            "failed to read bytes: expected {}, got {}",
            len, read
        )));
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_varint(value: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        write_varint(&mut buf, value).unwrap();
        buf
    }

    #[test]
    fn test_varint_layout() {
        assert_eq!(encode_varint(0), vec![0x00]);
        assert_eq!(encode_varint(1), vec![0x01]);
        assert_eq!(encode_varint(127), vec![0x7F]);
        assert_eq!(encode_varint(128), vec![0x80, 0x01]);
        assert_eq!(encode_varint(300), vec![0xAC, 0x02]);
        assert_eq!(encode_varint(u64::MAX).len(), MAX_VARINT_LEN);
    }

    #[test]
    fn test_varint_read() {
        for value in [0u64, 1, 127, 128, 16_383, 16_384, 1 << 40, u64::MAX] {
            let buf = encode_varint(value);
            let mut cursor = buf.as_slice();
            assert_eq!(read_varint(&mut cursor).unwrap(), value);
            assert!(cursor.is_empty());
        }
    }

    #[test]
    fn test_varint_truncated() {
        let mut cursor: &[u8] = &[0x80, 0x80];
        assert!(matches!(read_varint(&mut cursor), Err(Error::Io { .. })));
    }

    #[test]
    fn test_varint_overflow() {
        let mut cursor: &[u8] = &[0xFF; 11];
        assert!(matches!(
            read_varint(&mut cursor),
            Err(Error::Internal { .. })
        ));
    }

    #[test]
    fn test_f64_little_endian() {
        let mut buf = Vec::new();
        write_f64(&mut buf, 1.0).unwrap();
        assert_eq!(buf, 1.0f64.to_le_bytes().to_vec());

        let mut cursor = buf.as_slice();
        assert_eq!(read_f64(&mut cursor).unwrap(), 1.0);
    }

    #[test]
    fn test_f64_truncated() {
        let mut cursor: &[u8] = &[0, 0, 0];
        assert!(read_f64(&mut cursor).is_err());
    }

    #[test]
    fn test_bytes() {
        let mut buf = Vec::new();
        write_bytes(&mut buf, b"hello").unwrap();
        assert_eq!(buf[0], 5);

        let mut cursor = buf.as_slice();
        assert_eq!(read_bytes(&mut cursor).unwrap(), b"hello".to_vec());

        let mut short: &[u8] = &[5, b'h', b'i'];
        assert!(read_bytes(&mut short).is_err());
    }
}
