use crate::parser::errors::{OpError, OpResult};
use byteorder::{LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

///
/// Forward-only cursor over ledger bytes.
///
/// Offsets are absolute file offsets, also when the reader wraps an
/// in-memory copy of a single record (see `RecordReader::with_base`).
/// Every read checks the remaining length first, so a corrupt length
/// prefix fails with `TruncatedInput` instead of allocating.
///
pub struct RecordReader<R> {
    inner: R,
    base: u64,
    offset: u64,
    len: u64,
}

impl RecordReader<BufReader<File>> {
    pub fn open(path: &Path) -> OpResult<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(RecordReader::new(BufReader::new(file), 0, len))
    }
}

impl RecordReader<Cursor<Vec<u8>>> {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        RecordReader::with_base(bytes, 0)
    }

    /// `bytes` were read from the file starting at offset `base`.
    pub fn with_base(bytes: Vec<u8>, base: u64) -> Self {
        let len = bytes.len() as u64;
        RecordReader::new(Cursor::new(bytes), base, len)
    }
}

impl<R: Read + Seek> RecordReader<R> {
    fn new(inner: R, base: u64, len: u64) -> Self {
        RecordReader {
            inner,
            base,
            offset: base,
            len: base + len,
        }
    }

    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Absolute offset one past the last readable byte.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn remaining(&self) -> u64 {
        self.len - self.offset
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.offset >= self.len
    }

    #[inline]
    fn ensure(&self, n: u64) -> OpResult<()> {
        if self.remaining() < n {
            Err(OpError::truncated(self.offset, n, self.remaining()))
        } else {
            Ok(())
        }
    }

    #[inline]
    pub fn read_u8(&mut self) -> OpResult<u8> {
        self.ensure(1)?;
        let u = self.inner.read_u8()?;
        self.offset += 1;
        Ok(u)
    }

    #[inline]
    pub fn read_u16(&mut self) -> OpResult<u16> {
        self.ensure(2)?;
        let u = self.inner.read_u16::<LittleEndian>()?;
        self.offset += 2;
        Ok(u)
    }

    #[inline]
    pub fn read_u32(&mut self) -> OpResult<u32> {
        self.ensure(4)?;
        let u = self.inner.read_u32::<LittleEndian>()?;
        self.offset += 4;
        Ok(u)
    }

    #[inline]
    pub fn read_u64(&mut self) -> OpResult<u64> {
        self.ensure(8)?;
        let u = self.inner.read_u64::<LittleEndian>()?;
        self.offset += 8;
        Ok(u)
    }

    /// Tag byte below 0xFD is the value, 0xFD/0xFE/0xFF prefix a 2/4/8 byte value.
    pub fn read_varint(&mut self) -> OpResult<u64> {
        let tag = self.read_u8()?;
        let n = match tag {
            0xfd => self.read_u16()? as u64,
            0xfe => self.read_u32()? as u64,
            0xff => self.read_u64()?,
            t => t as u64,
        };
        Ok(n)
    }

    #[inline]
    pub fn read_u256(&mut self) -> OpResult<[u8; 32]> {
        self.ensure(32)?;
        let mut arr = [0u8; 32];
        self.inner.read_exact(&mut arr)?;
        self.offset += 32;
        Ok(arr)
    }

    pub fn read_u8_vec(&mut self, count: u64) -> OpResult<Vec<u8>> {
        self.ensure(count)?;
        let mut arr = vec![0u8; count as usize];
        self.inner.read_exact(&mut arr)?;
        self.offset += count;
        Ok(arr)
    }

    /// varint length followed by that many raw bytes
    #[inline]
    pub fn read_var_bytes(&mut self) -> OpResult<Vec<u8>> {
        let count = self.read_varint()?;
        self.read_u8_vec(count)
    }

    pub fn skip(&mut self, n: u64) -> OpResult<()> {
        self.ensure(n)?;
        self.inner.seek(SeekFrom::Current(n as i64))?;
        self.offset += n;
        Ok(())
    }

    /// Move to an absolute offset inside the readable range.
    pub fn seek_to(&mut self, pos: u64) -> OpResult<()> {
        if pos < self.base || pos > self.len {
            return Err(OpError::truncated(self.offset, pos.saturating_sub(self.offset), self.remaining()));
        }
        self.inner.seek(SeekFrom::Start(pos - self.base))?;
        self.offset = pos;
        Ok(())
    }

    ///
    /// Re-read the bytes from `start` up to the current offset.
    ///
    /// The cursor ends where it was, so this is safe in the middle
    /// of a forward pass.
    ///
    pub fn replay(&mut self, start: u64) -> OpResult<Vec<u8>> {
        let end = self.offset;
        if start > end {
            return Err(OpError::from("replay start is ahead of the cursor"));
        }
        self.seek_to(start)?;
        self.read_u8_vec(end - start)
    }
}
