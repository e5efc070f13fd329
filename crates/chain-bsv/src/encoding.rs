//! CompactSize integers and a bounds-checked reader for wire data.

use crate::error::BsvError;

/// Write a Bitcoin-style CompactSize (variable-length integer).
pub fn write_compact_size(buf: &mut Vec<u8>, val: u64) {
    if val < 0xFD {
        buf.push(val as u8);
    } else if val <= 0xFFFF {
        buf.push(0xFD);
        buf.extend_from_slice(&(val as u16).to_le_bytes());
    } else if val <= 0xFFFF_FFFF {
        buf.push(0xFE);
        buf.extend_from_slice(&(val as u32).to_le_bytes());
    } else {
        buf.push(0xFF);
        buf.extend_from_slice(&val.to_le_bytes());
    }
}

/// Encoded length of `val` as a CompactSize: 1, 3, 5 or 9 bytes.
pub fn compact_size_len(val: u64) -> usize {
    match val {
        0..=0xFC => 1,
        0xFD..=0xFFFF => 3,
        0x1_0000..=0xFFFF_FFFF => 5,
        _ => 9,
    }
}

pub fn compact_size_bytes(val: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(compact_size_len(val));
    write_compact_size(&mut buf, val);
    buf
}

/// Cursor over serialized bytes. Every read fails with
/// [`BsvError::MalformedTransaction`] instead of running past the end.
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], BsvError> {
        if len > self.remaining() {
            return Err(BsvError::MalformedTransaction(format!(
                "need {len} bytes at offset {}, only {} left",
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], BsvError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, BsvError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u32_le(&mut self) -> Result<u32, BsvError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, BsvError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_compact_size(&mut self) -> Result<u64, BsvError> {
        match self.read_u8()? {
            0xFD => Ok(u16::from_le_bytes(self.read_array()?) as u64),
            0xFE => Ok(u32::from_le_bytes(self.read_array()?) as u64),
            0xFF => self.read_u64_le(),
            small => Ok(small as u64),
        }
    }

    /// A CompactSize length prefix followed by that many bytes.
    pub fn read_var_bytes(&mut self) -> Result<&'a [u8], BsvError> {
        let len = self.read_compact_size()?;
        let len = usize::try_from(len).map_err(|_| {
            BsvError::MalformedTransaction(format!("length prefix {len} does not fit in memory"))
        })?;
        self.read_bytes(len)
    }

    /// Fail if anything is left unread.
    pub fn finish(self) -> Result<(), BsvError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(BsvError::MalformedTransaction(format!(
                "{} trailing bytes",
                self.remaining()
            )))
        }
    }
}
