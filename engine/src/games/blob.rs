//! Reader/writer for engine state blobs.
//!
//! Blobs are fixed little formats owned by each engine; these helpers
//! keep the offset bookkeeping in one place. Reads fail with
//! `GameError::InvalidState` so a truncated blob surfaces as a corrupt
//! session rather than a panic.

use super::GameError;

pub(crate) struct BlobReader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> BlobReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], GameError> {
        let end = self.offset.checked_add(len).ok_or(GameError::InvalidState)?;
        if end > self.buf.len() {
            return Err(GameError::InvalidState);
        }
        let slice = &self.buf[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, GameError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u32(&mut self) -> Result<u32, GameError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes(bytes.try_into().map_err(|_| GameError::InvalidState)?))
    }

    pub(crate) fn u64(&mut self) -> Result<u64, GameError> {
        let bytes = self.take(8)?;
        Ok(u64::from_be_bytes(bytes.try_into().map_err(|_| GameError::InvalidState)?))
    }

    pub(crate) fn bytes(&mut self, len: usize) -> Result<&'a [u8], GameError> {
        self.take(len)
    }
}

#[derive(Default)]
pub(crate) struct BlobWriter {
    buf: Vec<u8>,
}

impl BlobWriter {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub(crate) fn u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub(crate) fn u64(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub(crate) fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.buf
    }
}
